use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::OsRng;
use serde::{de::DeserializeOwned, Serialize};
use spin_sdk::http::{Request, Response};
use uuid::Uuid;

use crate::core::errors::ApiError;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn validate_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Gravatar URL for an email: 200px, pg rated, mystery-man fallback.
pub fn gravatar_url(email: &str) -> String {
    let digest = md5::compute(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}?s=200&r=pg&d=mm", digest)
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Deserializes the JSON body; an empty body reads as `{}`.
pub fn parse_body<T: DeserializeOwned>(req: &Request) -> Result<T, ApiError> {
    let body = req.body();
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejecting malformed body");
        ApiError::BadRequest("Invalid request body".to_string())
    })
}

pub fn json_response<T: Serialize>(status: u16, value: &T) -> Result<Response, ApiError> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(serde_json::to_vec(value)?)
        .build())
}

pub fn ok_json<T: Serialize>(value: &T) -> Result<Response, ApiError> {
    json_response(200, value)
}

pub fn message(msg: &str) -> Result<Response, ApiError> {
    ok_json(&serde_json::json!({ "msg": msg }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravatar_hashes_normalized_email() {
        let url = gravatar_url("  MyEmailAddress@example.com ");
        assert_eq!(
            url,
            "https://www.gravatar.com/avatar/0bc83cb571cd1c50ba6f3e8a78ef1346?s=200&r=pg&d=mm"
        );
    }

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        let day = parse_date("2019-06-01").unwrap();
        assert_eq!(day.to_rfc3339(), "2019-06-01T00:00:00+00:00");

        let ts = parse_date("2020-01-02T03:04:05Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2020-01-02T03:04:05+00:00");

        assert!(parse_date("June 2019").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-hash"));
    }
}
