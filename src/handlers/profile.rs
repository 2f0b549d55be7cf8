use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ContestError;
use crate::handlers::AppState;
use crate::models::{ExperienceLevel, UserProfile};
use crate::utils::{is_valid_email, sanitize_string};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub native_languages: Vec<String>,
    #[serde(default)]
    pub target_languages: Vec<String>,
    #[serde(default)]
    pub experience_level: String,
    pub profile_picture: Option<String>,
    pub video_intro: Option<String>,
}

/// `POST /api/user/profile` — sign up a learner and hand back their
/// freshly generated referral ID.
pub async fn create_profile(
    State(state): State<AppState>,
    Json(req): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<Value>), ContestError> {
    if req.name.is_empty()
        || req.email.is_empty()
        || req.native_languages.is_empty()
        || req.target_languages.is_empty()
        || req.experience_level.is_empty()
    {
        return Err(ContestError::InvalidArgument(
            "Missing required fields: name, email, nativeLanguages, targetLanguages, experienceLevel"
                .to_string(),
        ));
    }

    if !is_valid_email(&req.email) {
        return Err(ContestError::InvalidArgument(
            "Invalid email address".to_string(),
        ));
    }

    let experience_level = ExperienceLevel::parse(&req.experience_level).ok_or_else(|| {
        ContestError::InvalidArgument(format!(
            "Invalid experience level '{}': must be beginner, intermediate, advanced or native",
            req.experience_level
        ))
    })?;

    let profile = UserProfile::new(
        sanitize_string(&req.name),
        req.email,
        req.native_languages,
        req.target_languages,
        experience_level,
        req.profile_picture,
        req.video_intro,
    );
    state.store.create_profile(&profile).await?;

    info!(
        "User profile created: id={} email={} referral={}",
        profile.id, profile.email, profile.referral_id
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User profile created successfully",
            "data": {
                "id": profile.id,
                "referralId": profile.referral_id,
            },
        })),
    ))
}

/// `GET /api/user/profile/{user_id}`
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ContestError> {
    let profile = state
        .store
        .get_profile(&user_id)
        .await?
        .ok_or_else(|| ContestError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "user": profile,
    })))
}
