use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ContestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Like,
    Unlike,
}

impl VoteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteAction::Like => "like",
            VoteAction::Unlike => "unlike",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ContestError> {
        match s {
            "like" => Ok(VoteAction::Like),
            "unlike" => Ok(VoteAction::Unlike),
            other => Err(ContestError::InvalidArgument(format!(
                "Invalid action '{}': must be 'like' or 'unlike'",
                other
            ))),
        }
    }
}

/// What a toggle reports back to the caller: the ledger's cardinality after
/// the operation and whether the user currently has an active like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub votes: i64,
    pub is_liked: bool,
}

/// The set of users with an active like on one contest entry.
///
/// This set is the source of truth for the entry's vote count; the `votes`
/// field stored on the entry is a cached projection that stores must re-sync
/// from [`VoteLedger::count`] on every toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteLedger {
    voters: HashSet<String>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_voters<I>(voters: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            voters: voters.into_iter().collect(),
        }
    }

    pub fn count(&self) -> i64 {
        self.voters.len() as i64
    }

    pub fn has_voted(&self, user_id: &str) -> bool {
        self.voters.contains(user_id)
    }

    /// Apply a like/unlike for one user. Repeating an action is a no-op:
    /// liking twice never double-counts and unliking an absent user changes
    /// nothing.
    pub fn apply(&mut self, user_id: &str, action: VoteAction) -> VoteOutcome {
        match action {
            VoteAction::Like => {
                if !self.voters.contains(user_id) {
                    self.voters.insert(user_id.to_string());
                }
            }
            VoteAction::Unlike => {
                self.voters.remove(user_id);
            }
        }

        VoteOutcome {
            votes: self.count(),
            is_liked: self.has_voted(user_id),
        }
    }
}

/// Shared precondition for toggle calls: both identifiers must be non-empty.
pub fn validate_vote_ids(entry_id: &str, user_id: &str) -> Result<(), ContestError> {
    if entry_id.is_empty() || user_id.is_empty() {
        return Err(ContestError::InvalidArgument(
            "Missing required fields: entryId, userId, action".to_string(),
        ));
    }
    Ok(())
}
