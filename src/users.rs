use chrono::Utc;
use serde::Deserialize;
use spin_sdk::http::{Request, Response};
use validator::Validate;

use crate::auth::issue_token;
use crate::config::*;
use crate::core::errors::{ApiError, FieldError};
use crate::core::helpers::{gravatar_url, hash_password, new_id, ok_json, parse_body};
use crate::core::store::JsonStore;
use crate::core::Ctx;
use crate::models::models::User;

#[derive(Deserialize, Validate)]
struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[serde(default)]
    #[validate(email(message = "Please include a valid email"))]
    email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Please enter a password with 6 or more characters"))]
    password: String,
}

pub fn register_user(ctx: &Ctx, req: &Request) -> Result<Response, ApiError> {
    let mut input: RegisterRequest = parse_body(req)?;
    input.name = input.name.trim().to_string();
    input.email = input.email.trim().to_lowercase();
    input.validate()?;
    if input.name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::Validation(vec![FieldError::new(
            "name",
            "Name must be at most 100 characters",
        )]));
    }

    let email_key = user_email_key(&input.email);
    if ctx.store.get_json::<String>(&email_key)?.is_some() {
        return Err(ApiError::Rejected("User already exists".to_string()));
    }

    let user = User {
        id: new_id(),
        avatar: gravatar_url(&input.email),
        password: hash_password(&input.password)?,
        name: input.name,
        email: input.email,
        date: Utc::now(),
    };

    ctx.store.set_json(&user_key(&user.id), &user)?;
    ctx.store.set_json(&email_key, &user.id)?;
    ctx.store.push_back(USERS_LIST_KEY, &user.id)?;

    tracing::info!(user_id = %user.id, "user registered");

    let token = issue_token(ctx.config, &user.id)?;
    ok_json(&serde_json::json!({ "token": token }))
}
