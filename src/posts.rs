use chrono::Utc;
use serde::Deserialize;
use spin_sdk::http::{Request, Response};
use validator::Validate;

use crate::auth::{authenticate, current_user};
use crate::config::*;
use crate::core::errors::{ApiError, FieldError};
use crate::core::helpers::{message, new_id, ok_json, parse_body, validate_uuid};
use crate::core::store::JsonStore;
use crate::core::Ctx;
use crate::models::models::{Like, Post};

#[derive(Deserialize, Validate)]
pub(crate) struct TextRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,
}

impl TextRequest {
    /// Parses and validates a `{ "text": ... }` body.
    pub(crate) fn from_request(req: &Request) -> Result<String, ApiError> {
        let mut input: TextRequest = parse_body(req)?;
        input.text = input.text.trim().to_string();
        input.validate()?;
        if input.text.chars().count() > MAX_TEXT_LENGTH {
            return Err(ApiError::Validation(vec![FieldError::new(
                "text",
                "Text must be at most 5000 characters",
            )]));
        }
        Ok(input.text)
    }
}

/// Loads a post; a malformed id is reported the same as a missing one.
pub(crate) fn load_post(ctx: &Ctx, post_id: &str) -> Result<Post, ApiError> {
    if !validate_uuid(post_id) {
        return Err(ApiError::post_not_found());
    }
    ctx.store
        .get_json::<Post>(&post_key(post_id))?
        .ok_or_else(ApiError::post_not_found)
}

pub(crate) fn save_post(ctx: &Ctx, post: &Post) -> Result<(), ApiError> {
    ctx.store.set_json(&post_key(&post.id), post)?;
    Ok(())
}

pub fn create_post(ctx: &Ctx, req: &Request) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let text = TextRequest::from_request(req)?;
    let user = current_user(ctx, &user_id)?;

    let post = Post {
        id: new_id(),
        user: user.id,
        text,
        name: user.name,
        avatar: user.avatar,
        likes: Vec::new(),
        comments: Vec::new(),
        date: Utc::now(),
    };

    save_post(ctx, &post)?;
    // newest first
    ctx.store.push_front(FEED_KEY, &post.id)?;

    ok_json(&post)
}

pub fn list_posts(ctx: &Ctx, req: &Request) -> Result<Response, ApiError> {
    authenticate(ctx, req)?;

    let feed = ctx.store.get_list(FEED_KEY)?;
    let mut posts = Vec::with_capacity(feed.len());
    for id in &feed {
        if let Some(p) = ctx.store.get_json::<Post>(&post_key(id))? {
            posts.push(p);
        }
    }
    posts.sort_by(|a, b| b.date.cmp(&a.date));

    ok_json(&posts)
}

pub fn get_post(ctx: &Ctx, req: &Request, post_id: &str) -> Result<Response, ApiError> {
    authenticate(ctx, req)?;
    let post = load_post(ctx, post_id)?;
    ok_json(&post)
}

pub fn delete_post(ctx: &Ctx, req: &Request, post_id: &str) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let post = load_post(ctx, post_id)?;

    if post.user != user_id {
        return Err(ApiError::not_authorized());
    }

    ctx.store.delete(&post_key(&post.id))?;
    ctx.store.remove_from_list(FEED_KEY, &post.id)?;

    message("Post removed")
}

pub fn like_post(ctx: &Ctx, req: &Request, post_id: &str) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let mut post = load_post(ctx, post_id)?;

    if post.liked_by(&user_id) {
        return Err(ApiError::BadRequest("Post already liked".to_string()));
    }

    post.likes.insert(
        0,
        Like {
            id: new_id(),
            user: user_id,
        },
    );
    save_post(ctx, &post)?;

    ok_json(&post.likes)
}

pub fn unlike_post(ctx: &Ctx, req: &Request, post_id: &str) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let mut post = load_post(ctx, post_id)?;

    if !post.liked_by(&user_id) {
        return Err(ApiError::BadRequest("Post has not yet been liked".to_string()));
    }

    post.likes.retain(|like| like.user != user_id);
    save_post(ctx, &post)?;

    ok_json(&post.likes)
}
