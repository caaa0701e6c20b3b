//! `/tokens` resource handlers.
//!
//! The token itself is the credential here, so none of these operations carry
//! a separate auth guard.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config;
use crate::error::ApiError;
use crate::helpers::{self, ID_LENGTH, PHONE_LENGTH};
use crate::models::{collections, Token, User};
use crate::AppState;

const MISSING_FIELDS: &str = "Missing the required fields.";
const TOKEN_ABSENT: &str = "Token not found.";

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub id: Option<String>,
}

/// POST /tokens - issue a session token for a phone/password pair
pub async fn tokens_post(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload = helpers::parse_json_object(&body);

    let phone = helpers::trimmed_string_of_len(payload.get("phone"), PHONE_LENGTH);
    let password = helpers::trimmed_string(payload.get("password"));
    let (Some(phone), Some(password)) = (phone, password) else {
        return Err(ApiError::bad_request(MISSING_FIELDS));
    };

    let user = state
        .store
        .read::<User>(collections::USERS, &phone)
        .await
        .map_err(|_| ApiError::bad_request("Could not find the user."))?;

    let hashed = helpers::hash_password(&config::config().hashing_secret, &password);
    if hashed != user.hashed_password {
        return Err(ApiError::bad_request("Password did not match."));
    }

    let id = helpers::random_id(ID_LENGTH)
        .ok_or_else(|| ApiError::internal_server_error("Could not create new token."))?;
    let token = Token {
        id: id.clone(),
        phone,
        expires: Token::fresh_expiry(),
    };

    if let Err(e) = state.store.create(collections::TOKENS, &id, &token).await {
        tracing::error!("failed to create token record: {}", e);
        return Err(ApiError::internal_server_error("Could not create new token."));
    }

    Ok(Json(json!(token)))
}

/// GET /tokens?id=
pub async fn tokens_get(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = helpers::trimmed_str_of_len(query.id.as_deref(), ID_LENGTH)
        .ok_or_else(|| ApiError::bad_request(MISSING_FIELDS))?;

    match state.store.read::<Token>(collections::TOKENS, &id).await {
        Ok(token) => Ok(Json(json!(token))),
        Err(_) => Err(ApiError::not_found(TOKEN_ABSENT)),
    }
}

/// PUT /tokens - extend a still-live token by one hour
///
/// Required: id, extend=true. An already-expired token surfaces as not-found
/// and is never mutated.
pub async fn tokens_put(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload = helpers::parse_json_object(&body);

    let id = helpers::trimmed_string_of_len(payload.get("id"), ID_LENGTH);
    let extend = helpers::affirmative_bool(payload.get("extend"));
    let (Some(id), true) = (id, extend) else {
        return Err(ApiError::bad_request(MISSING_FIELDS));
    };

    let mut token = state
        .store
        .read::<Token>(collections::TOKENS, &id)
        .await
        .map_err(|_| ApiError::not_found(TOKEN_ABSENT))?;

    if token.is_expired() {
        return Err(ApiError::not_found("Token already expired."));
    }

    token.expires = Token::fresh_expiry();
    if let Err(e) = state.store.update(collections::TOKENS, &id, &token).await {
        tracing::error!("failed to update token record: {}", e);
        return Err(ApiError::internal_server_error(
            "Could not update token expiration.",
        ));
    }

    Ok(Json(json!({})))
}

/// DELETE /tokens?id=
pub async fn tokens_delete(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = helpers::trimmed_str_of_len(query.id.as_deref(), ID_LENGTH)
        .ok_or_else(|| ApiError::bad_request(MISSING_FIELDS))?;

    if state
        .store
        .read::<Token>(collections::TOKENS, &id)
        .await
        .is_err()
    {
        return Err(ApiError::bad_request(TOKEN_ABSENT));
    }

    if let Err(e) = state.store.delete(collections::TOKENS, &id).await {
        tracing::error!("failed to delete token record: {}", e);
        return Err(ApiError::internal_server_error("Could not delete token."));
    }

    Ok(Json(json!({})))
}
