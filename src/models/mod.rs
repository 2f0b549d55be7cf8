use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::generate_referral_id;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestEntry {
    pub id: String,
    pub user_id: String,
    pub language: String,
    pub region: String,
    pub caption: String,
    pub video_url: String,
    pub votes: i64,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

impl ContestEntry {
    pub fn new(
        user_id: String,
        language: String,
        region: String,
        caption: String,
        video_url: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            language,
            region,
            caption,
            video_url,
            // Entries always start unvoted and unrated; the vote ledger owns
            // the count from here on and rating is supplied externally.
            votes: 0,
            rating: 0.0,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
    Native,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
            ExperienceLevel::Native => "native",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(ExperienceLevel::Beginner),
            "intermediate" => Some(ExperienceLevel::Intermediate),
            "advanced" => Some(ExperienceLevel::Advanced),
            "native" => Some(ExperienceLevel::Native),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub native_languages: Vec<String>,
    pub target_languages: Vec<String>,
    pub experience_level: ExperienceLevel,
    pub profile_picture: Option<String>,
    pub video_intro: Option<String>,
    pub referral_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(
        name: String,
        email: String,
        native_languages: Vec<String>,
        target_languages: Vec<String>,
        experience_level: ExperienceLevel,
        profile_picture: Option<String>,
        video_intro: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            native_languages,
            target_languages,
            experience_level,
            profile_picture,
            video_intro,
            referral_id: generate_referral_id(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaffleEntry {
    pub id: String,
    /// The referring user (owner of the referral ID), who earns the tickets.
    pub user_id: String,
    pub referral_id: String,
    pub referred_user_id: String,
    pub tickets_earned: i64,
    pub created_at: DateTime<Utc>,
}

impl RaffleEntry {
    pub fn new(user_id: String, referral_id: String, referred_user_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            referral_id,
            referred_user_id,
            tickets_earned: 1,
            created_at: Utc::now(),
        }
    }
}

/// Per-referrer aggregate produced by the store, before ranks are assigned.
#[derive(Debug, Clone)]
pub struct ReferralTotals {
    pub user_id: String,
    pub user_name: String,
    pub referral_id: String,
    pub total_referrals: i64,
    pub tickets_earned: i64,
}
