use chrono::Utc;
use serde::Deserialize;
use spin_sdk::http::{Request, Response};
use validator::Validate;

use crate::auth::authenticate;
use crate::config::*;
use crate::core::errors::{field_errors, ApiError, FieldError};
use crate::core::helpers::{message, new_id, ok_json, parse_body, validate_uuid};
use crate::core::store::JsonStore;
use crate::core::Ctx;
use crate::models::models::{Post, Profile, ProfileView, Social, User, UserSummary};

/// `skills` arrives either as `"rust, go"` or as `["rust", "go"]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SkillsInput {
    List(Vec<String>),
    Csv(String),
}

impl SkillsInput {
    fn into_skills(self) -> Vec<String> {
        let raw = match self {
            SkillsInput::List(items) => items,
            SkillsInput::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Deserialize, Validate)]
struct ProfileRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Status is required"))]
    status: String,
    skills: Option<SkillsInput>,
    company: Option<String>,
    website: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    githubusername: Option<String>,
    youtube: Option<String>,
    twitter: Option<String>,
    facebook: Option<String>,
    linkedin: Option<String>,
    instagram: Option<String>,
}

/// Absent leaves the stored value alone, an empty string clears it.
fn apply(target: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        let v = v.trim();
        *target = if v.is_empty() { None } else { Some(v.to_string()) };
    }
}

pub(crate) fn load_profile(ctx: &Ctx, user_id: &str) -> Result<Option<Profile>, ApiError> {
    Ok(ctx.store.get_json::<Profile>(&profile_key(user_id))?)
}

pub(crate) fn save_profile(ctx: &Ctx, profile: &Profile) -> Result<(), ApiError> {
    ctx.store.set_json(&profile_key(&profile.user), profile)?;
    Ok(())
}

fn populate<'a>(ctx: &Ctx, profile: &'a Profile) -> Result<ProfileView<'a>, ApiError> {
    let owner = ctx
        .store
        .get_json::<User>(&user_key(&profile.user))?
        .map(|u| UserSummary::from(&u));
    Ok(ProfileView::new(profile, owner))
}

pub(crate) fn render_profile(ctx: &Ctx, profile: &Profile) -> Result<Response, ApiError> {
    ok_json(&populate(ctx, profile)?)
}

pub fn get_my_profile(ctx: &Ctx, req: &Request) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let profile = load_profile(ctx, &user_id)?.ok_or_else(ApiError::no_profile)?;
    render_profile(ctx, &profile)
}

pub fn upsert_profile(ctx: &Ctx, req: &Request) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let mut input: ProfileRequest = parse_body(req)?;
    input.status = input.status.trim().to_string();

    let mut errors = input.validate().err().map(|e| field_errors(&e)).unwrap_or_default();
    if input.bio.as_deref().is_some_and(|b| b.trim().chars().count() > MAX_BIO_LENGTH) {
        errors.push(FieldError::new("bio", "Bio must be at most 1000 characters"));
    }
    let skills = input.skills.map(SkillsInput::into_skills).unwrap_or_default();
    if skills.is_empty() {
        errors.push(FieldError::new("skills", "Skills is required"));
    }
    if !errors.is_empty() {
        errors.sort_by(|a, b| a.param.cmp(&b.param));
        return Err(ApiError::Validation(errors));
    }

    let existing = load_profile(ctx, &user_id)?;
    let created = existing.is_none();
    let mut profile = existing.unwrap_or_else(|| Profile {
        id: new_id(),
        user: user_id.clone(),
        company: None,
        website: None,
        location: None,
        status: String::new(),
        skills: Vec::new(),
        bio: None,
        githubusername: None,
        experience: Vec::new(),
        education: Vec::new(),
        social: Social::default(),
        date: Utc::now(),
    });

    profile.status = input.status;
    profile.skills = skills;
    apply(&mut profile.company, input.company);
    apply(&mut profile.website, input.website);
    apply(&mut profile.location, input.location);
    apply(&mut profile.bio, input.bio);
    apply(&mut profile.githubusername, input.githubusername);
    apply(&mut profile.social.youtube, input.youtube);
    apply(&mut profile.social.twitter, input.twitter);
    apply(&mut profile.social.facebook, input.facebook);
    apply(&mut profile.social.linkedin, input.linkedin);
    apply(&mut profile.social.instagram, input.instagram);

    save_profile(ctx, &profile)?;
    if created {
        ctx.store.push_back(PROFILES_LIST_KEY, &user_id)?;
        tracing::info!(%user_id, "profile created");
    }

    render_profile(ctx, &profile)
}

pub fn list_profiles(ctx: &Ctx) -> Result<Response, ApiError> {
    let owners = ctx.store.get_list(PROFILES_LIST_KEY)?;

    let mut profiles = Vec::with_capacity(owners.len());
    for user_id in owners {
        if let Some(p) = load_profile(ctx, &user_id)? {
            profiles.push(p);
        }
    }

    let views = profiles
        .iter()
        .map(|p| populate(ctx, p))
        .collect::<Result<Vec<_>, _>>()?;
    ok_json(&views)
}

pub fn get_profile_by_user(ctx: &Ctx, user_id: &str) -> Result<Response, ApiError> {
    let not_found = || ApiError::NotFound("Profile not found".to_string());

    if !validate_uuid(user_id) {
        return Err(not_found());
    }
    let profile = load_profile(ctx, user_id)?.ok_or_else(not_found)?;
    render_profile(ctx, &profile)
}

/// Removes the caller's posts, profile and account.
pub fn delete_account(ctx: &Ctx, req: &Request) -> Result<Response, ApiError> {
    let user_id = authenticate(ctx, req)?;
    let store = ctx.store;

    let feed = store.get_list(FEED_KEY)?;
    let mut kept = Vec::with_capacity(feed.len());
    let mut removed = 0usize;
    for post_id in feed {
        let key = post_key(&post_id);
        match store.get_json::<Post>(&key)? {
            Some(p) if p.user == user_id => {
                store.delete(&key)?;
                removed += 1;
            }
            Some(_) => kept.push(post_id),
            None => {}
        }
    }
    store.set_json(FEED_KEY, &kept)?;

    store.delete(&profile_key(&user_id))?;
    store.remove_from_list(PROFILES_LIST_KEY, &user_id)?;

    if let Some(user) = store.get_json::<User>(&user_key(&user_id))? {
        store.delete(&user_email_key(&user.email))?;
    }
    store.delete(&user_key(&user_id))?;
    store.remove_from_list(USERS_LIST_KEY, &user_id)?;

    tracing::info!(%user_id, posts_removed = removed, "account deleted");
    message("User deleted")
}
