mod contest;
mod profile;
mod raffle;
mod vote;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::db::ContestStore;

/// Page-size cap applied to both leaderboards.
pub const LEADERBOARD_PAGE_SIZE: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContestStore>,
    pub ping_message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ping", get(ping))
        .route("/api/user/profile", post(profile::create_profile))
        .route("/api/user/profile/{user_id}", get(profile::get_profile))
        .route("/api/contest/entry", post(contest::submit_entry))
        .route("/api/contest/leaderboard", get(contest::leaderboard))
        .route("/api/contest/vote", post(vote::cast_vote))
        .route("/api/contest/votes/{entry_id}", get(vote::get_votes))
        .route("/api/raffle-entry", post(raffle::enter_raffle))
        .route("/api/referral/leaderboard", get(raffle::referral_leaderboard))
        .with_state(state)
}

async fn ping(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "message": state.ping_message }))
}
