use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub const MAX_TEXT_LENGTH: usize = 5000;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_BIO_LENGTH: usize = 1000;

pub const USERS_LIST_KEY: &str = "users_list";
pub const PROFILES_LIST_KEY: &str = "profiles_list";
pub const FEED_KEY: &str = "feed";

const DEV_JWT_SECRET: &str = "devconnect-dev-secret";

pub fn user_key(id: &str) -> String {
    format!("user:{}", id)
}

pub fn user_email_key(email: &str) -> String {
    format!("user_email:{}", email.trim().to_lowercase())
}

pub fn profile_key(user_id: &str) -> String {
    format!("profile:{}", user_id)
}

pub fn post_key(id: &str) -> String {
    format!("post:{}", id)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub token_expiration_secs: i64,
    pub bind_addr: String,
    pub github_api_url: String,
    pub github_token: Option<String>,
    pub github_client: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> Self {
        let jwt_secret = var("DEVCONNECT_JWT_SECRET").unwrap_or_else(|| {
            warn!("DEVCONNECT_JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let github_client = match (
            var("DEVCONNECT_GITHUB_CLIENT_ID"),
            var("DEVCONNECT_GITHUB_CLIENT_SECRET"),
        ) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        };

        Self {
            jwt_secret,
            token_expiration_secs: try_load("DEVCONNECT_TOKEN_EXPIRATION_SECS", 360_000),
            bind_addr: var("DEVCONNECT_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:5000".to_string()),
            github_api_url: var("DEVCONNECT_GITHUB_API_URL")
                .unwrap_or_else(|| "https://api.github.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            github_token: var("DEVCONNECT_GITHUB_TOKEN"),
            github_client,
        }
    }

    /// Settings for tests and local tooling; never reads the environment.
    pub fn for_tests() -> Self {
        Self {
            jwt_secret: "test-secret".to_string(),
            token_expiration_secs: 3600,
            bind_addr: "127.0.0.1:0".to_string(),
            github_api_url: "https://api.github.test".to_string(),
            github_token: None,
            github_client: None,
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
