use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;
use spin_sdk::http::{Request, Response};
use validator::Validate;

use crate::config::{user_email_key, user_key, Config};
use crate::core::errors::ApiError;
use crate::core::helpers::{ok_json, parse_body, verify_password};
use crate::core::store::JsonStore;
use crate::core::Ctx;
use crate::models::models::{Claims, PublicUser, TokenUser, User};

pub const TOKEN_HEADER: &str = "x-auth-token";

pub fn issue_token(config: &Config, user_id: &str) -> anyhow::Result<String> {
    let iat = Utc::now().timestamp();
    let claims = Claims {
        user: TokenUser {
            id: user_id.to_string(),
        },
        iat,
        exp: iat + config.token_expiration_secs,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))
}

pub fn decode_token(config: &Config, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// Resolves the caller from `x-auth-token`; the account must still exist.
pub fn authenticate(ctx: &Ctx, req: &Request) -> Result<String, ApiError> {
    let token = req
        .header(TOKEN_HEADER)
        .and_then(|h| h.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("No token, authorization denied".to_string()))?;

    let invalid = || ApiError::Unauthorized("Token is not valid".to_string());

    let claims = decode_token(ctx.config, token).map_err(|e| {
        tracing::warn!(error = %e, "rejecting token");
        invalid()
    })?;

    if ctx.store.get_json::<User>(&user_key(&claims.user.id))?.is_none() {
        tracing::warn!(user_id = %claims.user.id, "token for a deleted account");
        return Err(invalid());
    }

    Ok(claims.user.id)
}

/// Loads the caller's user document.
pub fn current_user(ctx: &Ctx, user_id: &str) -> Result<User, ApiError> {
    ctx.store
        .get_json::<User>(&user_key(user_id))?
        .ok_or_else(|| ApiError::Unauthorized("Token is not valid".to_string()))
}

#[derive(Deserialize, Validate)]
struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Please include a valid email"))]
    email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

pub fn get_auth_user(ctx: &Ctx, req: &Request) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let user = current_user(ctx, &user_id)?;
    ok_json(&PublicUser::from(&user))
}

pub fn login_user(ctx: &Ctx, req: &Request) -> Result<Response, ApiError> {
    let creds: LoginRequest = parse_body(req)?;
    creds.validate()?;

    let invalid = || ApiError::Rejected("Invalid Credentials".to_string());

    let user_id: String = ctx
        .store
        .get_json(&user_email_key(&creds.email))?
        .ok_or_else(invalid)?;
    let user = ctx
        .store
        .get_json::<User>(&user_key(&user_id))?
        .ok_or_else(invalid)?;

    if !verify_password(&creds.password, &user.password) {
        return Err(invalid());
    }

    let token = issue_token(ctx.config, &user.id)?;
    tracing::info!(user_id = %user.id, "user logged in");
    ok_json(&serde_json::json!({ "token": token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let config = Config::for_tests();
        let token = issue_token(&config, "abc").unwrap();
        let claims = decode_token(&config, &token).unwrap();
        assert_eq!(claims.user.id, "abc");
        assert_eq!(claims.exp - claims.iat, config.token_expiration_secs);
    }

    #[test]
    fn rejects_expired_and_foreign_tokens() {
        let mut config = Config::for_tests();
        config.token_expiration_secs = -3600;
        let expired = issue_token(&config, "abc").unwrap();
        assert!(decode_token(&Config::for_tests(), &expired).is_err());

        let mut other = Config::for_tests();
        other.jwt_secret = "someone-else".to_string();
        let foreign = issue_token(&other, "abc").unwrap();
        assert!(decode_token(&Config::for_tests(), &foreign).is_err());
    }
}
