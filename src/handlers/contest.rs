use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ContestError;
use crate::handlers::{AppState, LEADERBOARD_PAGE_SIZE};
use crate::models::ContestEntry;
use crate::ranking::{LeaderboardFilter, SortCriterion, rank_entries};
use crate::utils::sanitize_string;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEntryRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub video_url: String,
}

/// `POST /api/contest/entry` — create an entry with zero votes and rating.
/// The video arrives as a URL/handle; storage itself is someone else's job.
pub async fn submit_entry(
    State(state): State<AppState>,
    Json(req): Json<SubmitEntryRequest>,
) -> Result<(StatusCode, Json<Value>), ContestError> {
    if req.language.is_empty() || req.region.is_empty() || req.caption.is_empty() {
        return Err(ContestError::InvalidArgument(
            "Missing required fields: language, region, caption".to_string(),
        ));
    }
    if req.user_id.is_empty() {
        return Err(ContestError::InvalidArgument(
            "Missing required field: userId".to_string(),
        ));
    }
    if req.video_url.is_empty() {
        return Err(ContestError::InvalidArgument(
            "Video reference is required".to_string(),
        ));
    }

    let entry = ContestEntry::new(
        req.user_id,
        req.language,
        req.region,
        sanitize_string(&req.caption),
        req.video_url,
    );
    state.store.create_entry(&entry).await?;

    info!(
        "Contest entry created: id={} language={} region={}",
        entry.id, entry.language, entry.region
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "entryId": entry.id,
            "message": "Video submitted!",
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub language: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    id: String,
    user_name: String,
    score: f64,
    rank: usize,
    language: String,
    region: String,
    caption: String,
    rating: f64,
    created_at: DateTime<Utc>,
}

/// `GET /api/contest/leaderboard` — filter, rank and page the entries, then
/// resolve display names from the owning profiles.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardRow>>, ContestError> {
    let criterion = SortCriterion::parse(query.sort_by.as_deref().unwrap_or("votes"));
    let filter = LeaderboardFilter::new(query.language, query.region);

    let entries = state.store.list_entries().await?;
    let mut board = rank_entries(&entries, criterion, &filter);
    board.truncate(LEADERBOARD_PAGE_SIZE);

    // One profile lookup per distinct contestant on the page.
    let mut names: HashMap<String, String> = HashMap::new();
    let mut rows = Vec::with_capacity(board.len());
    for ranked in board {
        let user_name = match names.get(&ranked.user_id) {
            Some(name) => name.clone(),
            None => {
                let name = state
                    .store
                    .get_profile(&ranked.user_id)
                    .await?
                    .map(|p| p.name)
                    .unwrap_or_else(|| "Anonymous".to_string());
                names.insert(ranked.user_id.clone(), name.clone());
                name
            }
        };

        rows.push(LeaderboardRow {
            id: ranked.id,
            user_name,
            score: ranked.score,
            rank: ranked.rank,
            language: ranked.language,
            region: ranked.region,
            caption: ranked.caption,
            rating: ranked.rating,
            created_at: ranked.created_at,
        });
    }

    info!("Contest leaderboard fetched: count={}", rows.len());

    Ok(Json(rows))
}
