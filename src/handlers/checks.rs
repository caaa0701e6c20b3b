//! `/checks` resource handlers.
//!
//! Check creation and deletion are two-phase writes (check record plus the
//! owner's `checks` list). The phases are not atomic; a failure between them
//! surfaces a 500 naming the failed step and leaves the first phase in place.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::config;
use crate::error::ApiError;
use crate::helpers::{self, ID_LENGTH};
use crate::models::{collections, Check, CheckMethod, Protocol, Token, User};
use crate::AppState;

const MISSING_FIELDS: &str = "Missing the required fields.";
const INVALID_TOKEN: &str = "Missing required token in header or invalid.";
const CHECK_ABSENT: &str = "The check ID does not exist.";

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub id: Option<String>,
}

/// POST /checks - register an uptime check for the calling user
///
/// The caller is identified by direct token lookup: the `token` header must
/// name a live token, and its bound phone selects the owning user.
pub async fn checks_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload = helpers::parse_json_object(&body);

    let protocol = helpers::enum_field::<Protocol>(payload.get("protocol"));
    let url = helpers::trimmed_string(payload.get("url"));
    let method = helpers::enum_field::<CheckMethod>(payload.get("method"));
    let success_codes = helpers::int_array(payload.get("successCodes"));
    let timeout_seconds = helpers::int_in_range(payload.get("timeoutSeconds"), 1, 5);

    let (Some(protocol), Some(url), Some(method), Some(success_codes), Some(timeout_seconds)) =
        (protocol, url, method, success_codes, timeout_seconds)
    else {
        return Err(ApiError::bad_request(
            "Missing required inputs, or inputs are invalid.",
        ));
    };

    let token_id =
        auth::token_from_headers(&headers).ok_or_else(|| ApiError::forbidden(""))?;
    let token = state
        .store
        .read::<Token>(collections::TOKENS, &token_id)
        .await
        .map_err(|_| ApiError::forbidden(""))?;
    if token.is_expired() {
        return Err(ApiError::forbidden(""));
    }

    let mut user = state
        .store
        .read::<User>(collections::USERS, &token.phone)
        .await
        .map_err(|_| ApiError::forbidden(""))?;

    if user.checks.len() >= config::config().max_checks {
        return Err(ApiError::bad_request(
            "The user already has the maximum number of checks.",
        ));
    }

    let id = helpers::random_id(ID_LENGTH)
        .ok_or_else(|| ApiError::internal_server_error("Could not create the new check."))?;
    let check = Check {
        id: id.clone(),
        user_phone: user.phone.clone(),
        protocol,
        url,
        method,
        success_codes,
        timeout_seconds,
    };

    if let Err(e) = state.store.create(collections::CHECKS, &id, &check).await {
        tracing::error!("failed to create check record: {}", e);
        return Err(ApiError::internal_server_error(
            "Could not create the new check.",
        ));
    }

    // Second phase: attach the check to its owner. A failure here leaves an
    // orphaned check record behind.
    user.checks.push(id);
    if let Err(e) = state
        .store
        .update(collections::USERS, &user.phone, &user)
        .await
    {
        tracing::error!("failed to attach check to user record: {}", e);
        return Err(ApiError::internal_server_error(
            "Could not update the user with the new check.",
        ));
    }

    Ok(Json(json!(check)))
}

/// GET /checks?id= - fetch a check, gated on its own owner phone
pub async fn checks_get(
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let id = helpers::trimmed_str_of_len(query.id.as_deref(), ID_LENGTH)
        .ok_or_else(|| ApiError::bad_request(MISSING_FIELDS))?;

    let check = state
        .store
        .read::<Check>(collections::CHECKS, &id)
        .await
        .map_err(|_| ApiError::not_found_empty())?;

    require_token_for(&state, &headers, &check.user_phone).await?;

    Ok(Json(json!(check)))
}

/// PUT /checks - partial update of a check's probe configuration
pub async fn checks_put(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload = helpers::parse_json_object(&body);

    let id = helpers::trimmed_string_of_len(payload.get("id"), ID_LENGTH)
        .ok_or_else(|| ApiError::bad_request(MISSING_FIELDS))?;

    let protocol = helpers::enum_field::<Protocol>(payload.get("protocol"));
    let url = helpers::trimmed_string(payload.get("url"));
    let method = helpers::enum_field::<CheckMethod>(payload.get("method"));
    let success_codes = helpers::int_array(payload.get("successCodes"));
    let timeout_seconds = helpers::int_in_range(payload.get("timeoutSeconds"), 1, 5);

    if protocol.is_none()
        && url.is_none()
        && method.is_none()
        && success_codes.is_none()
        && timeout_seconds.is_none()
    {
        return Err(ApiError::bad_request("Missing fields to update."));
    }

    let mut check = state
        .store
        .read::<Check>(collections::CHECKS, &id)
        .await
        .map_err(|_| ApiError::bad_request(CHECK_ABSENT))?;

    require_token_for(&state, &headers, &check.user_phone).await?;

    if let Some(protocol) = protocol {
        check.protocol = protocol;
    }
    if let Some(url) = url {
        check.url = url;
    }
    if let Some(method) = method {
        check.method = method;
    }
    if let Some(success_codes) = success_codes {
        check.success_codes = success_codes;
    }
    if let Some(timeout_seconds) = timeout_seconds {
        check.timeout_seconds = timeout_seconds;
    }

    if let Err(e) = state.store.update(collections::CHECKS, &id, &check).await {
        tracing::error!("failed to update check record: {}", e);
        return Err(ApiError::internal_server_error("Could not update the check."));
    }

    Ok(Json(json!({})))
}

/// DELETE /checks?id= - delete a check and detach it from its owner
pub async fn checks_delete(
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let id = helpers::trimmed_str_of_len(query.id.as_deref(), ID_LENGTH)
        .ok_or_else(|| ApiError::bad_request(MISSING_FIELDS))?;

    let check = state
        .store
        .read::<Check>(collections::CHECKS, &id)
        .await
        .map_err(|_| ApiError::bad_request(CHECK_ABSENT))?;

    require_token_for(&state, &headers, &check.user_phone).await?;

    if let Err(e) = state.store.delete(collections::CHECKS, &id).await {
        tracing::error!("failed to delete check record: {}", e);
        return Err(ApiError::internal_server_error("Could not delete the check."));
    }

    // Second phase: detach the id from the owner's checks list. The check
    // record is already gone if this fails.
    let mut user = state
        .store
        .read::<User>(collections::USERS, &check.user_phone)
        .await
        .map_err(|_| {
            ApiError::internal_server_error(
                "Could not find the user who created the check, so the check was not removed from their list.",
            )
        })?;

    user.checks.retain(|check_id| check_id != &id);
    if let Err(e) = state
        .store
        .update(collections::USERS, &user.phone, &user)
        .await
    {
        tracing::error!("failed to detach check from user record: {}", e);
        return Err(ApiError::internal_server_error("Could not update the user."));
    }

    Ok(Json(json!({})))
}

/// Guard for check reads/writes: the caller's token must verify against the
/// check's own owner phone, never a caller-supplied one.
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
