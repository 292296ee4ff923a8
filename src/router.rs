use spin_sdk::http::{Method, Request, Response};

use crate::core::errors::ApiError;
use crate::core::Ctx;
use crate::github::{github_repos, RepoFetcher};
use crate::{auth, comments, credentials, posts, profile, users};

/// Dispatches one request and renders any handler error.
pub async fn route<F: RepoFetcher>(ctx: &Ctx<'_>, fetcher: &F, req: &Request) -> Response {
    let method = method_name(req.method());
    let path = req.path();
    tracing::debug!(%method, %path, "dispatching");

    match dispatch(ctx, fetcher, req, req.method(), path).await {
        Ok(resp) => resp,
        Err(ApiError::Internal(e)) => {
            tracing::error!(%method, %path, error = %format!("{e:#}"), "request failed");
            ApiError::Internal(e).into()
        }
        Err(e) => e.into(),
    }
}

fn method_name(method: &Method) -> &str {
    match method {
        Method::Get => "GET",
        Method::Post => "POST",
        Method::Put => "PUT",
        Method::Delete => "DELETE",
        Method::Patch => "PATCH",
        Method::Head => "HEAD",
        Method::Options => "OPTIONS",
        Method::Other(other) => other.as_str(),
        _ => "UNKNOWN",
    }
}

async fn dispatch<F: RepoFetcher>(
    ctx: &Ctx<'_>,
    fetcher: &F,
    req: &Request,
    method: &Method,
    path: &str,
) -> Result<Response, ApiError> {
    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match (method, segments.as_slice()) {
        (Method::Get, []) => Ok(Response::builder()
            .status(200)
            .header("content-type", "text/plain; charset=utf-8")
            .body("API Running")
            .build()),

        (Method::Post, ["api", "users"]) => users::register_user(ctx, req),

        (Method::Get, ["api", "auth"]) => auth::get_auth_user(ctx, req),
        (Method::Post, ["api", "auth"]) => auth::login_user(ctx, req),

        (Method::Get, ["api", "profile"]) => profile::list_profiles(ctx),
        (Method::Post, ["api", "profile"]) => profile::upsert_profile(ctx, req),
        (Method::Delete, ["api", "profile"]) => profile::delete_account(ctx, req),
        (Method::Get, ["api", "profile", "me"]) => profile::get_my_profile(ctx, req),
        (Method::Get, ["api", "profile", "user", user_id]) => {
            profile::get_profile_by_user(ctx, user_id)
        }
        (Method::Put, ["api", "profile", "experience"]) => credentials::add_experience(ctx, req),
        (Method::Delete, ["api", "profile", "experience", exp_id]) => {
            credentials::delete_experience(ctx, req, exp_id)
        }
        (Method::Put, ["api", "profile", "education"]) => credentials::add_education(ctx, req),
        (Method::Delete, ["api", "profile", "education", edu_id]) => {
            credentials::delete_education(ctx, req, edu_id)
        }
        (Method::Get, ["api", "profile", "github", username]) => {
            let username = urlencoding::decode(username)
                .map(|u| u.into_owned())
                .unwrap_or_else(|_| username.to_string());
            github_repos(ctx.config, fetcher, &username).await
        }

        (Method::Get, ["api", "posts"]) => posts::list_posts(ctx, req),
        (Method::Post, ["api", "posts"]) => posts::create_post(ctx, req),
        (Method::Put, ["api", "posts", "like", id]) => posts::like_post(ctx, req, id),
        (Method::Put, ["api", "posts", "unlike", id]) => posts::unlike_post(ctx, req, id),
        (Method::Post, ["api", "posts", "comment", id]) => comments::add_comment(ctx, req, id),
        (Method::Delete, ["api", "posts", "comment", post_id, comment_id]) => {
            comments::delete_comment(ctx, req, post_id, comment_id)
        }
        (Method::Get, ["api", "posts", id]) => posts::get_post(ctx, req, id),
        (Method::Delete, ["api", "posts", id]) => posts::delete_post(ctx, req, id),

        _ => Err(ApiError::NotFound("Route not found".to_string())),
    }
}
