use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ContestError;
use crate::handlers::{AppState, LEADERBOARD_PAGE_SIZE};
use crate::models::RaffleEntry;
use crate::ranking::{ReferralStanding, rank_referrals};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaffleRequest {
    #[serde(default)]
    pub referral_id: String,
    #[serde(default)]
    pub user_id: String,
}

/// `POST /api/raffle-entry` — record that `userId` signed up through
/// `referralId` and award the referrer one raffle ticket. Each (referrer,
/// referred) pair counts once.
pub async fn enter_raffle(
    State(state): State<AppState>,
    Json(req): Json<RaffleRequest>,
) -> Result<(StatusCode, Json<Value>), ContestError> {
    if req.referral_id.is_empty() {
        return Err(ContestError::InvalidArgument(
            "Missing required field: referralId".to_string(),
        ));
    }
    if req.user_id.is_empty() {
        return Err(ContestError::InvalidArgument(
            "Missing required field: userId".to_string(),
        ));
    }

    let referrer = state
        .store
        .find_profile_by_referral(&req.referral_id)
        .await?
        .ok_or_else(|| ContestError::NotFound("Invalid referral ID".to_string()))?;

    let raffle = RaffleEntry::new(referrer.id.clone(), req.referral_id, req.user_id);
    state.store.create_raffle_entry(&raffle).await?;

    info!(
        "Raffle entry created: referrer={} referred={}",
        raffle.user_id, raffle.referred_user_id
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "ticketsEarned": raffle.tickets_earned,
            "message": "🎉 You earned a raffle ticket!",
        })),
    ))
}

/// `GET /api/referral/leaderboard`
pub async fn referral_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReferralStanding>>, ContestError> {
    let totals = state.store.referral_standings().await?;
    let mut standings = rank_referrals(totals);
    standings.truncate(LEADERBOARD_PAGE_SIZE);

    info!("Referral leaderboard fetched: count={}", standings.len());

    Ok(Json(standings))
}
