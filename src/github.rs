use std::future::Future;
use std::sync::OnceLock;

use regex::Regex;
use spin_sdk::http::Response;

use crate::config::Config;
use crate::core::errors::ApiError;
use crate::core::helpers::ok_json;

/// An outbound GET to the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Performs GitHub requests; each host brings its own HTTP client.
pub trait RepoFetcher {
    fn fetch(&self, req: UpstreamRequest) -> impl Future<Output = anyhow::Result<UpstreamReply>>;
}

fn username_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9](?:-?[A-Za-z0-9]){0,38}$").expect("Regex should compile")
    })
}

pub fn is_valid_username(username: &str) -> bool {
    username.len() <= 39 && username_regex().is_match(username)
}

pub fn repos_request(config: &Config, username: &str) -> UpstreamRequest {
    let mut url = format!(
        "{}/users/{}/repos?per_page=5&sort=created:asc",
        config.github_api_url,
        urlencoding::encode(username)
    );
    if let Some((id, secret)) = &config.github_client {
        url.push_str(&format!(
            "&client_id={}&client_secret={}",
            urlencoding::encode(id),
            urlencoding::encode(secret)
        ));
    }

    let mut headers = vec![
        ("user-agent", "devconnect".to_string()),
        ("accept", "application/vnd.github+json".to_string()),
    ];
    if let Some(token) = &config.github_token {
        headers.push(("authorization", format!("token {}", token)));
    }

    UpstreamRequest { url, headers }
}

fn no_profile() -> ApiError {
    ApiError::NotFound("No Github profile found".to_string())
}

/// Maps the upstream reply onto our response.
pub fn repos_response(reply: UpstreamReply) -> Result<Response, ApiError> {
    if reply.status != 200 {
        tracing::debug!(status = reply.status, "github lookup failed");
        return Err(no_profile());
    }

    let repos: serde_json::Value = serde_json::from_slice(&reply.body)?;
    if !repos.is_array() {
        return Err(ApiError::Internal(anyhow::anyhow!(
            "github returned a non-array repos body"
        )));
    }
    ok_json(&repos)
}

pub async fn github_repos<F: RepoFetcher>(
    config: &Config,
    fetcher: &F,
    username: &str,
) -> Result<Response, ApiError> {
    if !is_valid_username(username) {
        return Err(no_profile());
    }

    let reply = fetcher.fetch(repos_request(config, username)).await?;
    repos_response(reply)
}
