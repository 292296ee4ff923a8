use chrono::Utc;
use spin_sdk::http::{Request, Response};

use crate::auth::{authenticate, current_user};
use crate::core::errors::ApiError;
use crate::core::helpers::{new_id, ok_json};
use crate::core::Ctx;
use crate::models::models::Comment;
use crate::posts::{load_post, save_post, TextRequest};

pub fn add_comment(ctx: &Ctx, req: &Request, post_id: &str) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let text = TextRequest::from_request(req)?;
    let user = current_user(ctx, &user_id)?;
    let mut post = load_post(ctx, post_id)?;

    post.comments.insert(
        0,
        Comment {
            id: new_id(),
            user: user.id,
            text,
            name: user.name,
            avatar: user.avatar,
            date: Utc::now(),
        },
    );
    save_post(ctx, &post)?;

    ok_json(&post.comments)
}

pub fn delete_comment(
    ctx: &Ctx,
    req: &Request,
    post_id: &str,
    comment_id: &str,
) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let mut post = load_post(ctx, post_id)?;

    let idx = post
        .comments
        .iter()
        .position(|c| c.id == comment_id)
        .ok_or_else(|| ApiError::NotFound("Comment does not exist".to_string()))?;

    if post.comments[idx].user != user_id {
        return Err(ApiError::not_authorized());
    }

    post.comments.remove(idx);
    save_post(ctx, &post)?;

    ok_json(&post.comments)
}
