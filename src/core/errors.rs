use serde::Serialize;
use serde_json::json;
use spin_sdk::http::Response;
use thiserror::Error;
use validator::ValidationErrors;

/// One entry of a 400 validation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub msg: String,
    pub param: String,
    pub location: &'static str,
}

impl FieldError {
    pub fn new(param: &str, msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
            param: param.to_string(),
            location: "body",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) | ApiError::Rejected(_) | ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn not_authorized() -> Self {
        ApiError::Unauthorized("User not authorized".to_string())
    }

    pub fn post_not_found() -> Self {
        ApiError::NotFound("Post not found".to_string())
    }

    pub fn no_profile() -> Self {
        ApiError::BadRequest("There is no profile for this user".to_string())
    }
}

/// Flattens validator output into the response's error list, ordered by field.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(param, errs)| {
            let param = param.to_string();
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", param));
                FieldError::new(&param, &msg)
            })
        })
        .collect();
    fields.sort_by(|a, b| a.param.cmp(&b.param));
    fields
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(field_errors(&errors))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        let status = err.status();
        let body = match err {
            ApiError::Validation(fields) => json!({ "errors": fields }),
            ApiError::Rejected(msg) => json!({ "errors": [{ "msg": msg }] }),
            ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) | ApiError::NotFound(msg) => {
                json!({ "msg": msg })
            }
            ApiError::Internal(_) => {
                return Response::builder()
                    .status(500)
                    .header("content-type", "text/plain; charset=utf-8")
                    .body("Server Error")
                    .build();
            }
        };

        Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body.to_string())
            .build()
    }
}
