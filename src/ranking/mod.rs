pub mod rank;
pub mod score;

pub use rank::{rank_entries, rank_referrals};
pub use score::score;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::ContestEntry;

/// Which field drives the primary leaderboard ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriterion {
    Votes,
    Rating,
    Recent,
}

impl SortCriterion {
    /// Unrecognized tokens fall back to votes, the default leaderboard sort.
    pub fn parse(s: &str) -> Self {
        match s {
            "recent" => SortCriterion::Recent,
            "rating" => SortCriterion::Rating,
            _ => SortCriterion::Votes,
        }
    }
}

/// Optional exact-match filters. `None` passes everything; the query value
/// "all" is normalized to `None` before it gets here.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardFilter {
    pub language: Option<String>,
    pub region: Option<String>,
}

impl LeaderboardFilter {
    pub fn new(language: Option<String>, region: Option<String>) -> Self {
        Self {
            language: normalize(language),
            region: normalize(region),
        }
    }

    pub fn matches(&self, entry: &ContestEntry) -> bool {
        if let Some(language) = &self.language {
            if entry.language != *language {
                return false;
            }
        }
        if let Some(region) = &self.region {
            if entry.region != *region {
                return false;
            }
        }
        true
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "all")
}

/// One row of a freshly computed leaderboard. Never persisted; display-name
/// resolution happens in the HTTP layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub user_id: String,
    pub score: f64,
    pub rank: usize,
    pub language: String,
    pub region: String,
    pub caption: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

/// One row of the referral leaderboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralStanding {
    pub user_id: String,
    pub user_name: String,
    pub referral_id: String,
    pub total_referrals: i64,
    pub tickets_earned: i64,
    pub rank: usize,
}
