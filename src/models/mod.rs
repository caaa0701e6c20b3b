//! Record types persisted by the file store.
//!
//! Field names on the wire are camelCase to match the stored JSON documents.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Collection names used with the record store.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TOKENS: &str = "tokens";
    pub const CHECKS: &str = "checks";
}

/// A user account, keyed by phone number.
///
/// Invariant: at most one record per phone; `checks` never exceeds the
/// configured maximum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub hashed_password: String,
    pub tos_agreement: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<String>,
}

impl User {
    /// The user object as returned to clients, with `hashedPassword` stripped.
    pub fn public(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.remove("hashedPassword");
        }
        value
    }
}

/// A session token binding a random id to a user's phone and an expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub phone: String,
    /// Absolute expiry, milliseconds since epoch.
    pub expires: i64,
}

impl Token {
    /// Expiry for a token issued or extended now: one hour out.
    pub fn fresh_expiry() -> i64 {
        (Utc::now() + Duration::hours(1)).timestamp_millis()
    }

    /// Expiry is checked lazily on read/verify; there is no background reaper.
    pub fn is_expired(&self) -> bool {
        self.expires <= Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMethod {
    Post,
    Get,
    Put,
    Delete,
}

/// A user-owned uptime-probe configuration.
///
/// `user_phone` is a back-reference to the owning [`User`], not a lifetime
/// owner; deleting a user leaves its checks behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    pub id: String,
    pub user_phone: String,
    pub protocol: Protocol,
    pub url: String,
    pub method: CheckMethod,
    pub success_codes: Vec<i64>,
    pub timeout_seconds: i64,
}
