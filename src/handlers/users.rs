//! `/users` resource handlers.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::config;
use crate::error::ApiError;
use crate::helpers::{self, PHONE_LENGTH};
use crate::models::{collections, User};
use crate::AppState;

const MISSING_FIELDS: &str = "Missing the required fields.";
const INVALID_TOKEN: &str = "Missing required token in header or invalid.";
const USER_ABSENT: &str = "The user does not exist.";

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub phone: Option<String>,
}

/// POST /users - create a user account
///
/// Required: firstName, lastName, phone, password, tosAgreement (must be true).
pub async fn users_post(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload = helpers::parse_json_object(&body);

    let first_name = helpers::trimmed_string(payload.get("firstName"));
    let last_name = helpers::trimmed_string(payload.get("lastName"));
    let phone = helpers::trimmed_string_of_len(payload.get("phone"), PHONE_LENGTH);
    let password = helpers::trimmed_string(payload.get("password"));
    let tos_agreement = helpers::affirmative_bool(payload.get("tosAgreement"));

    let (Some(first_name), Some(last_name), Some(phone), Some(password), true) =
        (first_name, last_name, phone, password, tos_agreement)
    else {
        return Err(ApiError::bad_request(MISSING_FIELDS));
    };

    // The probe read is expected to fail for a new phone
    if state
        .store
        .read::<User>(collections::USERS, &phone)
        .await
        .is_ok()
    {
        return Err(ApiError::bad_request(
            "A user with that phone number already exists.",
        ));
    }

    let user = User {
        first_name,
        last_name,
        phone: phone.clone(),
        hashed_password: helpers::hash_password(&config::config().hashing_secret, &password),
        tos_agreement: true,
        checks: Vec::new(),
    };

    if let Err(e) = state.store.create(collections::USERS, &phone, &user).await {
        tracing::error!("failed to create user record: {}", e);
        return Err(ApiError::bad_request("Could not create the new user."));
    }

    Ok(Json(json!({})))
}

/// GET /users?phone= - fetch a user, token-gated, hashedPassword stripped
pub async fn users_get(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let phone = helpers::trimmed_str_of_len(query.phone.as_deref(), PHONE_LENGTH)
        .ok_or_else(|| ApiError::bad_request(MISSING_FIELDS))?;

    require_token_for(&state, &headers, &phone).await?;

    match state.store.read::<User>(collections::USERS, &phone).await {
        Ok(user) => Ok(Json(user.public())),
        Err(_) => Err(ApiError::not_found_empty()),
    }
}

/// PUT /users - partial update of firstName/lastName/password
pub async fn users_put(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload = helpers::parse_json_object(&body);

    let phone = helpers::trimmed_string_of_len(payload.get("phone"), PHONE_LENGTH)
        .ok_or_else(|| ApiError::bad_request(MISSING_FIELDS))?;

    let first_name = helpers::trimmed_string(payload.get("firstName"));
    let last_name = helpers::trimmed_string(payload.get("lastName"));
    let password = helpers::trimmed_string(payload.get("password"));

    if first_name.is_none() && last_name.is_none() && password.is_none() {
        return Err(ApiError::bad_request("Missing fields to update."));
    }

    require_token_for(&state, &headers, &phone).await?;

    let mut user = state
        .store
        .read::<User>(collections::USERS, &phone)
        .await
        .map_err(|_| ApiError::bad_request(USER_ABSENT))?;

    if let Some(first_name) = first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = last_name {
        user.last_name = last_name;
    }
    if let Some(password) = password {
        user.hashed_password =
            helpers::hash_password(&config::config().hashing_secret, &password);
    }

    if let Err(e) = state.store.update(collections::USERS, &phone, &user).await {
        tracing::error!("failed to update user record: {}", e);
        return Err(ApiError::internal_server_error("Could not update the user."));
    }

    Ok(Json(json!({})))
}

/// DELETE /users?phone=
///
/// Tokens and checks owned by the user are left behind; their cleanup is
/// deliberately deferred.
pub async fn users_delete(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let phone = helpers::trimmed_str_of_len(query.phone.as_deref(), PHONE_LENGTH)
        .ok_or_else(|| ApiError::bad_request(MISSING_FIELDS))?;

    require_token_for(&state, &headers, &phone).await?;

    if state
        .store
        .read::<User>(collections::USERS, &phone)
        .await
        .is_err()
    {
        return Err(ApiError::bad_request(USER_ABSENT));
    }

    if let Err(e) = state.store.delete(collections::USERS, &phone).await {
        tracing::error!("failed to delete user record: {}", e);
        return Err(ApiError::internal_server_error("Could not delete the user."));
    }

    Ok(Json(json!({})))
}

/// Guard shared by the protected user operations: the caller's `token` header
/// must verify against the target phone.
async fn require_token_for(
    state: &AppState,
    headers: &HeaderMap,
    phone: &str,
) -> Result<(), ApiError> {
    let verified = match auth::token_from_headers(headers) {
        Some(token) => auth::verify_token(&state.store, &token, phone).await,
        None => false,
    };
    if verified {
        Ok(())
    } else {
        Err(ApiError::forbidden(INVALID_TOKEN))
    }
}
