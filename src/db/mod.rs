mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::Database;

use async_trait::async_trait;

use crate::error::ContestError;
use crate::models::{ContestEntry, RaffleEntry, ReferralTotals, UserProfile};
use crate::voting::{VoteAction, VoteOutcome};

/// Storage boundary for contest entries, their vote ledgers, user profiles
/// and raffle entries.
///
/// Two implementations exist: [`Database`] (SQLite via sqlx) for real
/// deployments and [`MemoryStore`] for demo mode and tests. Implementations
/// must make `toggle_vote` an atomic read-modify-write on the (ledger,
/// cached-count) pair of a single entry, so a concurrent leaderboard read
/// never observes the two disagreeing; toggles on different entries are
/// independent.
#[async_trait]
pub trait ContestStore: Send + Sync {
    async fn create_profile(&self, profile: &UserProfile) -> Result<(), ContestError>;
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ContestError>;
    async fn find_profile_by_referral(
        &self,
        referral_id: &str,
    ) -> Result<Option<UserProfile>, ContestError>;

    async fn create_entry(&self, entry: &ContestEntry) -> Result<(), ContestError>;
    async fn get_entry(&self, entry_id: &str) -> Result<Option<ContestEntry>, ContestError>;
    async fn list_entries(&self) -> Result<Vec<ContestEntry>, ContestError>;

    /// Apply a like/unlike for one user on one entry and re-sync the entry's
    /// cached vote count from the ledger in the same transaction. Fails with
    /// `NotFound` when the entry does not exist.
    async fn toggle_vote(
        &self,
        entry_id: &str,
        user_id: &str,
        action: VoteAction,
    ) -> Result<VoteOutcome, ContestError>;

    /// Current ledger cardinality for one entry. `NotFound` when missing.
    async fn vote_count(&self, entry_id: &str) -> Result<i64, ContestError>;

    /// Fails with `Conflict` when the (referrer, referred) pair is already
    /// recorded.
    async fn create_raffle_entry(&self, entry: &RaffleEntry) -> Result<(), ContestError>;

    /// Unranked per-referrer aggregates; ranking happens in the engine.
    async fn referral_standings(&self) -> Result<Vec<ReferralTotals>, ContestError>;
}
