//! Validation helpers for untrusted request input, plus the keyed password
//! hash and random identifier generation.
//!
//! Every validator takes a loosely-typed JSON value and returns `Option`:
//! `Some(normalized)` when the field is present and valid, `None` otherwise.
//! Validators never panic.

use hmac::{Hmac, Mac};
use rand::Rng;
use serde_json::{Map, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Identifier length used for token and check ids.
pub const ID_LENGTH: usize = 20;

/// Exact length of a phone number.
pub const PHONE_LENGTH: usize = 10;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Parse a request body as a JSON object, degrading to an empty object on any
/// failure (malformed JSON, non-object top level, empty body).
pub fn parse_json_object(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// A string field, trimmed, that must be non-empty.
pub fn trimmed_string(value: Option<&Value>) -> Option<String> {
    trimmed_str(value?.as_str())
}

/// A string field, trimmed, that must have exactly `len` characters.
pub fn trimmed_string_of_len(value: Option<&Value>, len: usize) -> Option<String> {
    trimmed_string(value).filter(|s| s.chars().count() == len)
}

/// Plain-string variant of [`trimmed_string`], for query parameters.
pub fn trimmed_str(value: Option<&str>) -> Option<String> {
    let s = value?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Plain-string variant of [`trimmed_string_of_len`], for query parameters.
pub fn trimmed_str_of_len(value: Option<&str>, len: usize) -> Option<String> {
    trimmed_str(value).filter(|s| s.chars().count() == len)
}

/// A boolean field where presence *is* the affirmative value: only a literal
/// JSON `true` counts (used for `tosAgreement` and `extend`).
pub fn affirmative_bool(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

/// An integer field within an inclusive range.
pub fn int_in_range(value: Option<&Value>, min: i64, max: i64) -> Option<i64> {
    value?.as_i64().filter(|n| (min..=max).contains(n))
}

/// A field that must equal one of a fixed allowed set, expressed as a
/// deserializable enum (`protocol`, `method`).
pub fn enum_field<T: serde::de::DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    serde_json::from_value(value?.clone()).ok()
}

/// A non-empty array whose elements are all integers.
pub fn int_array(value: Option<&Value>) -> Option<Vec<i64>> {
    let items = value?.as_array()?;
    if items.is_empty() {
        return None;
    }
    items.iter().map(Value::as_i64).collect()
}

/// Deterministic keyed hash over a plaintext password.
///
/// Same secret and input always yield the same hex digest; used both to store
/// and to verify passwords. There is no per-user salt.
pub fn hash_password(secret: &str, password: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(password.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// A random string of `len` characters drawn uniformly from the lowercase
/// alphanumeric alphabet. Returns `None` for a zero length.
///
/// Not cryptographically hardened; used for token and check identifiers.
pub fn random_id(len: usize) -> Option<String> {
    if len == 0 {
        return None;
    }
    let mut rng = rand::thread_rng();
    Some(
        (0..len)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect(),
    )
}
