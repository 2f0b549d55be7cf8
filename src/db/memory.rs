use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::ContestStore;
use crate::error::ContestError;
use crate::models::{
    ContestEntry, ExperienceLevel, RaffleEntry, ReferralTotals, UserProfile,
};
use crate::voting::{VoteAction, VoteLedger, VoteOutcome};

#[derive(Default)]
struct Inner {
    profiles: HashMap<String, UserProfile>,
    entries: HashMap<String, ContestEntry>,
    ledgers: HashMap<String, VoteLedger>,
    raffle: Vec<RaffleEntry>,
}

/// In-memory store used when no database is configured and in tests. The
/// single write lock serializes toggles, which trivially satisfies the
/// per-entry atomicity the trait demands.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo-mode store pre-populated with a few contestants so the
    /// leaderboards are not empty on first run.
    pub fn with_demo_data() -> Self {
        let mut inner = Inner::default();

        let contestants = [
            ("Sarah Chen", "sarah@example.com", "Spanish", "North America",
             "Practicing my Spanish pronunciation!", 125, 4.8),
            ("Miguel Rodriguez", "miguel@example.com", "Japanese", "South America",
             "Learning Japanese through anime!", 98, 4.6),
            ("Emma Thompson", "emma@example.com", "French", "Europe",
             "Bonjour from Paris!", 87, 4.5),
        ];

        let mut voter_seq = 0usize;
        for (name, email, language, region, caption, votes, rating) in contestants {
            let profile = UserProfile::new(
                name.to_string(),
                email.to_string(),
                vec!["English".to_string()],
                vec![language.to_string()],
                ExperienceLevel::Intermediate,
                None,
                None,
            );

            let mut entry = ContestEntry::new(
                profile.id.clone(),
                language.to_string(),
                region.to_string(),
                caption.to_string(),
                format!("https://placeholder.example.com/videos/{}.mp4", entry_slug(name)),
            );
            entry.rating = rating;

            // Seed the ledger rather than the counter so the set stays the
            // source of truth.
            let ledger = VoteLedger::from_voters((0..votes).map(|_| {
                voter_seq += 1;
                format!("demo-voter-{}", voter_seq)
            }));
            entry.votes = ledger.count();

            inner.ledgers.insert(entry.id.clone(), ledger);
            inner.entries.insert(entry.id.clone(), entry);
            inner.profiles.insert(profile.id.clone(), profile);
        }

        Self {
            inner: RwLock::new(inner),
        }
    }
}

fn entry_slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

#[async_trait]
impl ContestStore for MemoryStore {
    async fn create_profile(&self, profile: &UserProfile) -> Result<(), ContestError> {
        let mut inner = self.inner.write().await;

        if inner.profiles.values().any(|p| p.email == profile.email) {
            return Err(ContestError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        inner.profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ContestError> {
        let inner = self.inner.read().await;
        Ok(inner.profiles.get(user_id).cloned())
    }

    async fn find_profile_by_referral(
        &self,
        referral_id: &str,
    ) -> Result<Option<UserProfile>, ContestError> {
        let inner = self.inner.read().await;
        Ok(inner
            .profiles
            .values()
            .find(|p| p.referral_id == referral_id)
            .cloned())
    }

    async fn create_entry(&self, entry: &ContestEntry) -> Result<(), ContestError> {
        let mut inner = self.inner.write().await;
        inner.entries.insert(entry.id.clone(), entry.clone());
        inner
            .ledgers
            .insert(entry.id.clone(), VoteLedger::new());
        Ok(())
    }

    async fn get_entry(&self, entry_id: &str) -> Result<Option<ContestEntry>, ContestError> {
        let inner = self.inner.read().await;
        Ok(inner.entries.get(entry_id).cloned())
    }

    async fn list_entries(&self) -> Result<Vec<ContestEntry>, ContestError> {
        let inner = self.inner.read().await;
        Ok(inner.entries.values().cloned().collect())
    }

    async fn toggle_vote(
        &self,
        entry_id: &str,
        user_id: &str,
        action: VoteAction,
    ) -> Result<VoteOutcome, ContestError> {
        let mut inner = self.inner.write().await;

        if !inner.entries.contains_key(entry_id) {
            return Err(ContestError::NotFound(
                "Contest entry not found".to_string(),
            ));
        }

        let ledger = inner.ledgers.entry(entry_id.to_string()).or_default();
        let outcome = ledger.apply(user_id, action);

        // Both mutations happen under the same write lock, so no reader can
        // see the ledger and the cached count disagree.
        if let Some(entry) = inner.entries.get_mut(entry_id) {
            entry.votes = outcome.votes;
        }

        Ok(outcome)
    }

    async fn vote_count(&self, entry_id: &str) -> Result<i64, ContestError> {
        let inner = self.inner.read().await;

        if !inner.entries.contains_key(entry_id) {
            return Err(ContestError::NotFound(
                "Contest entry not found".to_string(),
            ));
        }

        Ok(inner
            .ledgers
            .get(entry_id)
            .map(VoteLedger::count)
            .unwrap_or(0))
    }

    async fn create_raffle_entry(&self, entry: &RaffleEntry) -> Result<(), ContestError> {
        let mut inner = self.inner.write().await;

        let duplicate = inner
            .raffle
            .iter()
            .any(|r| r.user_id == entry.user_id && r.referred_user_id == entry.referred_user_id);
        if duplicate {
            return Err(ContestError::Conflict(
                "Referral already recorded".to_string(),
            ));
        }

        inner.raffle.push(entry.clone());
        Ok(())
    }

    async fn referral_standings(&self) -> Result<Vec<ReferralTotals>, ContestError> {
        let inner = self.inner.read().await;

        let mut totals: HashMap<&str, (i64, i64)> = HashMap::new();
        for raffle in &inner.raffle {
            let slot = totals.entry(raffle.user_id.as_str()).or_insert((0, 0));
            slot.0 += 1;
            slot.1 += raffle.tickets_earned;
        }

        Ok(totals
            .into_iter()
            .map(|(user_id, (total_referrals, tickets_earned))| {
                let profile = inner.profiles.get(user_id);
                ReferralTotals {
                    user_id: user_id.to_string(),
                    user_name: profile
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| "Anonymous".to_string()),
                    referral_id: profile
                        .map(|p| p.referral_id.clone())
                        .unwrap_or_default(),
                    total_referrals,
                    tickets_earned,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_for(user_id: &str) -> ContestEntry {
        ContestEntry::new(
            user_id.to_string(),
            "Spanish".to_string(),
            "Europe".to_string(),
            "test caption".to_string(),
            "https://example.com/clip.mp4".to_string(),
        )
    }

    fn profile_for(name: &str, email: &str) -> UserProfile {
        UserProfile::new(
            name.to_string(),
            email.to_string(),
            vec!["English".to_string()],
            vec!["Spanish".to_string()],
            ExperienceLevel::Beginner,
            None,
            None,
        )
    }

    #[tokio::test]
    async fn toggle_keeps_cached_count_in_sync_with_ledger() {
        let store = MemoryStore::new();
        let entry = entry_for("u1");
        let entry_id = entry.id.clone();
        store.create_entry(&entry).await.unwrap();

        let outcome = store
            .toggle_vote(&entry_id, "voter-1", VoteAction::Like)
            .await
            .unwrap();
        assert_eq!(outcome, VoteOutcome { votes: 1, is_liked: true });

        let cached = store.get_entry(&entry_id).await.unwrap().unwrap().votes;
        assert_eq!(cached, 1);
        assert_eq!(store.vote_count(&entry_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn repeated_like_does_not_double_count() {
        let store = MemoryStore::new();
        let entry = entry_for("u1");
        let entry_id = entry.id.clone();
        store.create_entry(&entry).await.unwrap();

        let first = store
            .toggle_vote(&entry_id, "voter-1", VoteAction::Like)
            .await
            .unwrap();
        let second = store
            .toggle_vote(&entry_id, "voter-1", VoteAction::Like)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.votes, 1);
    }

    #[tokio::test]
    async fn unlike_restores_previous_count() {
        let store = MemoryStore::new();
        let entry = entry_for("u1");
        let entry_id = entry.id.clone();
        store.create_entry(&entry).await.unwrap();

        store
            .toggle_vote(&entry_id, "voter-1", VoteAction::Like)
            .await
            .unwrap();
        let outcome = store
            .toggle_vote(&entry_id, "voter-1", VoteAction::Unlike)
            .await
            .unwrap();

        assert_eq!(outcome, VoteOutcome { votes: 0, is_liked: false });
        assert_eq!(store.get_entry(&entry_id).await.unwrap().unwrap().votes, 0);
    }

    #[tokio::test]
    async fn toggle_on_unknown_entry_is_not_found() {
        let store = MemoryStore::new();
        let result = store.toggle_vote("missing", "voter-1", VoteAction::Like).await;
        assert!(matches!(result, Err(ContestError::NotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        store
            .create_profile(&profile_for("Ana", "ana@example.com"))
            .await
            .unwrap();

        let result = store
            .create_profile(&profile_for("Ana Again", "ana@example.com"))
            .await;
        assert!(matches!(result, Err(ContestError::Conflict(_))));
    }

    #[tokio::test]
    async fn duplicate_referral_pair_is_a_conflict() {
        let store = MemoryStore::new();
        let referrer = profile_for("Alex", "alex@example.com");
        store.create_profile(&referrer).await.unwrap();

        let raffle = RaffleEntry::new(
            referrer.id.clone(),
            referrer.referral_id.clone(),
            "referred-1".to_string(),
        );
        store.create_raffle_entry(&raffle).await.unwrap();

        let again = RaffleEntry::new(
            referrer.id.clone(),
            referrer.referral_id.clone(),
            "referred-1".to_string(),
        );
        let result = store.create_raffle_entry(&again).await;
        assert!(matches!(result, Err(ContestError::Conflict(_))));
    }

    #[tokio::test]
    async fn referral_standings_aggregate_per_referrer() {
        let store = MemoryStore::new();
        let referrer = profile_for("Alex", "alex@example.com");
        store.create_profile(&referrer).await.unwrap();

        for i in 0..3 {
            let raffle = RaffleEntry::new(
                referrer.id.clone(),
                referrer.referral_id.clone(),
                format!("referred-{}", i),
            );
            store.create_raffle_entry(&raffle).await.unwrap();
        }

        let totals = store.referral_standings().await.unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total_referrals, 3);
        assert_eq!(totals[0].tickets_earned, 3);
        assert_eq!(totals[0].user_name, "Alex");
    }

    #[tokio::test]
    async fn demo_data_counts_match_their_ledgers() {
        let store = MemoryStore::with_demo_data();
        let entries = store.list_entries().await.unwrap();
        assert_eq!(entries.len(), 3);

        for entry in entries {
            assert_eq!(
                store.vote_count(&entry.id).await.unwrap(),
                entry.votes,
                "cached count diverged for {}",
                entry.id
            );
        }
    }
}
