//! Stateless session-token verification.

use axum::http::HeaderMap;

use crate::models::{collections, Token};
use crate::store::FileStore;

/// Extract the session token from the `token` request header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("token")?.to_str().ok()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Verify that a token id is a live session bound to the given phone.
///
/// Returns false for an absent token; otherwise true iff the owning phone
/// matches and the token has not expired. Never mutates state.
pub async fn verify_token(store: &FileStore, token_id: &str, phone: &str) -> bool {
    match store.read::<Token>(collections::TOKENS, token_id).await {
        Ok(token) => token.phone == phone && !token.is_expired(),
        Err(_) => false,
    }
}
