use axum::Json;
use axum::extract::{Path, State};
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ContestError;
use crate::handlers::AppState;
use crate::voting::{VoteAction, validate_vote_ids};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(default)]
    pub entry_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub action: String,
}

/// `POST /api/contest/vote` — toggle a like and forward the engine's
/// `(votes, isLiked)` pair verbatim.
pub async fn cast_vote(
    State(state): State<AppState>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Value>, ContestError> {
    if req.action.is_empty() {
        return Err(ContestError::InvalidArgument(
            "Missing required fields: entryId, userId, action".to_string(),
        ));
    }
    validate_vote_ids(&req.entry_id, &req.user_id)?;
    let action = VoteAction::parse(&req.action)?;

    let outcome = state
        .store
        .toggle_vote(&req.entry_id, &req.user_id, action)
        .await?;

    info!(
        "Vote processed: entry={} user={} action={} votes={}",
        req.entry_id,
        req.user_id,
        action.as_str(),
        outcome.votes
    );

    Ok(Json(json!({
        "success": true,
        "message": "Vote recorded!",
        "votes": outcome.votes,
        "isLiked": outcome.is_liked,
    })))
}

/// `GET /api/contest/votes/{entry_id}` — current vote count for one entry.
pub async fn get_votes(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<Value>, ContestError> {
    let votes = state.store.vote_count(&entry_id).await?;

    Ok(Json(json!({
        "success": true,
        "votes": votes,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_request_uses_camel_case_field_names() {
        let req: VoteRequest =
            serde_json::from_str(r#"{"entryId":"e1","userId":"u9","action":"like"}"#).unwrap();
        assert_eq!(req.entry_id, "e1");
        assert_eq!(req.user_id, "u9");
        assert_eq!(req.action, "like");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let req: VoteRequest = serde_json::from_str(r#"{"entryId":"e1"}"#).unwrap();
        assert!(req.user_id.is_empty());
        assert!(req.action.is_empty());
    }
}
