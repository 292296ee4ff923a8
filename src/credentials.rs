//! Experience and education entries embedded in a profile.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use spin_sdk::http::{Request, Response};
use validator::Validate;

use crate::auth::authenticate;
use crate::core::errors::{field_errors, ApiError, FieldError};
use crate::core::helpers::{new_id, parse_body, parse_date};
use crate::core::Ctx;
use crate::models::models::{Education, Experience, Profile};
use crate::profile::{load_profile, render_profile, save_profile};

#[derive(Deserialize, Validate)]
struct ExperienceRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Company is required"))]
    company: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "From date is required"))]
    from: String,
    location: Option<String>,
    to: Option<String>,
    #[serde(default)]
    current: bool,
    description: Option<String>,
}

#[derive(Deserialize, Validate)]
struct EducationRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "School is required"))]
    school: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Degree is required"))]
    degree: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Field of study is required"))]
    fieldofstudy: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "From date is required"))]
    from: String,
    to: Option<String>,
    #[serde(default)]
    current: bool,
    description: Option<String>,
}

fn trim(field: &mut String) {
    *field = field.trim().to_string();
}

impl ExperienceRequest {
    fn trim_required(&mut self) {
        trim(&mut self.title);
        trim(&mut self.company);
        trim(&mut self.from);
    }
}

impl EducationRequest {
    fn trim_required(&mut self) {
        trim(&mut self.school);
        trim(&mut self.degree);
        trim(&mut self.fieldofstudy);
        trim(&mut self.from);
    }
}

struct Period {
    from: DateTime<Utc>,
    to: Option<DateTime<Utc>>,
}

/// Runs field validation plus date parsing; a current entry drops `to`.
fn check_period<V: Validate>(
    input: &V,
    from: &str,
    to: Option<&str>,
    current: bool,
) -> Result<Period, ApiError> {
    let mut errors = input.validate().err().map(|e| field_errors(&e)).unwrap_or_default();

    let from_date = if from.trim().is_empty() {
        if !errors.iter().any(|e| e.param == "from") {
            errors.push(FieldError::new("from", "From date is required"));
        }
        None
    } else {
        let parsed = parse_date(from);
        if parsed.is_none() {
            errors.push(FieldError::new("from", "From date is not a valid date"));
        }
        parsed
    };

    let to_date = match to.map(str::trim).filter(|t| !t.is_empty()) {
        Some(_) if current => None,
        Some(raw) => {
            let parsed = parse_date(raw);
            match (parsed, from_date) {
                (None, _) => errors.push(FieldError::new("to", "To date is not a valid date")),
                (Some(t), Some(f)) if t < f => {
                    errors.push(FieldError::new("to", "To date must not be before from date"))
                }
                _ => {}
            }
            parsed
        }
        None => None,
    };

    match from_date {
        Some(from) if errors.is_empty() => Ok(Period { from, to: to_date }),
        _ => {
            errors.sort_by(|a, b| a.param.cmp(&b.param));
            Err(ApiError::Validation(errors))
        }
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn own_profile(ctx: &Ctx, user_id: &str) -> Result<Profile, ApiError> {
    load_profile(ctx, user_id)?.ok_or_else(ApiError::no_profile)
}

pub fn add_experience(ctx: &Ctx, req: &Request) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let mut input: ExperienceRequest = parse_body(req)?;
    input.trim_required();
    let period = check_period(&input, &input.from, input.to.as_deref(), input.current)?;

    let mut profile = own_profile(ctx, &user_id)?;
    profile.experience.insert(
        0,
        Experience {
            id: new_id(),
            title: input.title,
            company: input.company,
            location: optional(input.location),
            from: period.from,
            to: period.to,
            current: input.current,
            description: optional(input.description),
        },
    );
    save_profile(ctx, &profile)?;

    render_profile(ctx, &profile)
}

pub fn delete_experience(ctx: &Ctx, req: &Request, exp_id: &str) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let mut profile = own_profile(ctx, &user_id)?;

    let before = profile.experience.len();
    profile.experience.retain(|e| e.id != exp_id);
    if profile.experience.len() == before {
        return Err(ApiError::NotFound("Experience not found".to_string()));
    }
    save_profile(ctx, &profile)?;

    render_profile(ctx, &profile)
}

pub fn add_education(ctx: &Ctx, req: &Request) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let mut input: EducationRequest = parse_body(req)?;
    input.trim_required();
    let period = check_period(&input, &input.from, input.to.as_deref(), input.current)?;

    let mut profile = own_profile(ctx, &user_id)?;
    profile.education.insert(
        0,
        Education {
            id: new_id(),
            school: input.school,
            degree: input.degree,
            fieldofstudy: input.fieldofstudy,
            from: period.from,
            to: period.to,
            current: input.current,
            description: optional(input.description),
        },
    );
    save_profile(ctx, &profile)?;

    render_profile(ctx, &profile)
}

pub fn delete_education(ctx: &Ctx, req: &Request, edu_id: &str) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let mut profile = own_profile(ctx, &user_id)?;

    let before = profile.education.len();
    profile.education.retain(|e| e.id != edu_id);
    if profile.education.len() == before {
        return Err(ApiError::NotFound("Education not found".to_string()));
    }
    save_profile(ctx, &profile)?;

    render_profile(ctx, &profile)
}
