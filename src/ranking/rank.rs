use std::cmp::Ordering;

use crate::models::{ContestEntry, ReferralTotals};
use crate::ranking::{LeaderboardEntry, LeaderboardFilter, ReferralStanding, SortCriterion, score};

/// Order entry snapshots into a leaderboard: filter, sort descending by the
/// criterion's score with deterministic tie-breaks, then assign dense 1-based
/// ranks by sorted position (tied scores still get distinct ranks).
///
/// Inputs are never mutated and no result is cached; every call recomputes
/// from the snapshots it was given. The caller applies any page-size cap.
pub fn rank_entries(
    entries: &[ContestEntry],
    criterion: SortCriterion,
    filter: &LeaderboardFilter,
) -> Vec<LeaderboardEntry> {
    let mut survivors: Vec<&ContestEntry> = entries.iter().filter(|e| filter.matches(e)).collect();
    survivors.sort_by(|a, b| compare(a, b, criterion));

    survivors
        .into_iter()
        .enumerate()
        .map(|(index, entry)| LeaderboardEntry {
            id: entry.id.clone(),
            user_id: entry.user_id.clone(),
            score: score(entry, criterion),
            rank: index + 1,
            language: entry.language.clone(),
            region: entry.region.clone(),
            caption: entry.caption.clone(),
            rating: entry.rating,
            created_at: entry.created_at,
        })
        .collect()
}

fn compare(a: &ContestEntry, b: &ContestEntry, criterion: SortCriterion) -> Ordering {
    match criterion {
        // Ties broken by creation time, more recent first.
        SortCriterion::Votes => b
            .votes
            .cmp(&a.votes)
            .then_with(|| b.created_at.cmp(&a.created_at)),
        // Ties broken by vote count, then creation time.
        SortCriterion::Rating => b
            .rating
            .partial_cmp(&a.rating)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.votes.cmp(&a.votes))
            .then_with(|| b.created_at.cmp(&a.created_at)),
        // Timestamps are normally unique; equal instants fall back to the
        // entry ID so the order never depends on input order.
        SortCriterion::Recent => b
            .created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id)),
    }
}

/// Rank referral aggregates: most referrals first, tickets as tie-break, and
/// the same dense position-based rank assignment as the contest leaderboard.
pub fn rank_referrals(mut totals: Vec<ReferralTotals>) -> Vec<ReferralStanding> {
    totals.sort_by(|a, b| {
        b.total_referrals
            .cmp(&a.total_referrals)
            .then_with(|| b.tickets_earned.cmp(&a.tickets_earned))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    totals
        .into_iter()
        .enumerate()
        .map(|(index, t)| ReferralStanding {
            user_id: t.user_id,
            user_name: t.user_name,
            referral_id: t.referral_id,
            total_referrals: t.total_referrals,
            tickets_earned: t.tickets_earned,
            rank: index + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn entry(id: &str, votes: i64, rating: f64, hour: u32) -> ContestEntry {
        ContestEntry {
            id: id.to_string(),
            user_id: format!("user-{}", id),
            language: "Spanish".to_string(),
            region: "Europe".to_string(),
            caption: format!("caption {}", id),
            video_url: format!("https://example.com/{}.mp4", id),
            votes,
            rating,
            created_at: ts(hour),
        }
    }

    fn with_language(mut e: ContestEntry, language: &str) -> ContestEntry {
        e.language = language.to_string();
        e
    }

    #[test]
    fn already_descending_input_keeps_order() {
        let entries = vec![
            entry("a", 127, 0.0, 1),
            entry("b", 95, 0.0, 2),
            entry("c", 83, 0.0, 3),
        ];

        let board = rank_entries(&entries, SortCriterion::Votes, &LeaderboardFilter::default());

        let ids: Vec<&str> = board.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let ranks: Vec<usize> = board.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn unsorted_input_is_reordered_by_votes() {
        let entries = vec![
            entry("a", 95, 0.0, 1),
            entry("b", 127, 0.0, 2),
            entry("c", 83, 0.0, 3),
        ];

        let board = rank_entries(&entries, SortCriterion::Votes, &LeaderboardFilter::default());

        let ids: Vec<&str> = board.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        let scores: Vec<f64> = board.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![127.0, 95.0, 83.0]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].rank, 2);
        assert_eq!(board[2].rank, 3);
    }

    #[test]
    fn ranks_are_dense_even_with_tied_scores() {
        let entries = vec![
            entry("a", 50, 0.0, 1),
            entry("b", 50, 0.0, 2),
            entry("c", 50, 0.0, 3),
            entry("d", 10, 0.0, 4),
        ];

        let board = rank_entries(&entries, SortCriterion::Votes, &LeaderboardFilter::default());

        // Position-based ranking: ties still get distinct consecutive ranks.
        let ranks: Vec<usize> = board.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn vote_ties_break_by_recency() {
        let entries = vec![entry("old", 50, 0.0, 1), entry("new", 50, 0.0, 5)];

        let board = rank_entries(&entries, SortCriterion::Votes, &LeaderboardFilter::default());

        assert_eq!(board[0].id, "new");
        assert_eq!(board[1].id, "old");
    }

    #[test]
    fn rating_ties_break_by_votes_then_recency() {
        let entries = vec![
            entry("few", 10, 4.5, 5),
            entry("many", 90, 4.5, 1),
            entry("top", 5, 4.9, 1),
        ];

        let board = rank_entries(&entries, SortCriterion::Rating, &LeaderboardFilter::default());

        let ids: Vec<&str> = board.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["top", "many", "few"]);
        // Score is the rating itself, never the tie-break vote count.
        assert_eq!(board[1].score, 4.5);
    }

    #[test]
    fn recent_equal_timestamps_break_by_id() {
        let entries = vec![entry("zz", 1, 0.0, 3), entry("aa", 2, 0.0, 3)];

        let board = rank_entries(&entries, SortCriterion::Recent, &LeaderboardFilter::default());

        assert_eq!(board[0].id, "aa");
        assert_eq!(board[1].id, "zz");
    }

    #[test]
    fn language_filter_keeps_exact_matches_only() {
        let entries = vec![
            with_language(entry("a", 30, 0.0, 1), "French"),
            with_language(entry("b", 20, 0.0, 2), "Spanish"),
            with_language(entry("c", 10, 0.0, 3), "French"),
            // Case-sensitive: "french" is not "French".
            with_language(entry("d", 40, 0.0, 4), "french"),
        ];

        let filter = LeaderboardFilter::new(Some("French".to_string()), None);
        let board = rank_entries(&entries, SortCriterion::Votes, &filter);

        let ids: Vec<&str> = board.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn all_filter_value_passes_everything() {
        let entries = vec![
            with_language(entry("a", 30, 0.0, 1), "French"),
            with_language(entry("b", 20, 0.0, 2), "Spanish"),
        ];

        let filter = LeaderboardFilter::new(Some("all".to_string()), Some("all".to_string()));
        let board = rank_entries(&entries, SortCriterion::Votes, &filter);

        assert_eq!(board.len(), 2);
    }

    #[test]
    fn region_and_language_filters_compose() {
        let mut a = with_language(entry("a", 30, 0.0, 1), "French");
        a.region = "Europe".to_string();
        let mut b = with_language(entry("b", 20, 0.0, 2), "French");
        b.region = "Africa".to_string();

        let filter = LeaderboardFilter::new(Some("French".to_string()), Some("Africa".to_string()));
        let board = rank_entries(&[a, b], SortCriterion::Votes, &filter);

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].id, "b");
    }

    #[test]
    fn inputs_are_not_mutated() {
        let entries = vec![entry("a", 1, 0.0, 1), entry("b", 2, 0.0, 2)];
        let snapshot: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();

        let _ = rank_entries(&entries, SortCriterion::Votes, &LeaderboardFilter::default());

        let after: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
        assert_eq!(snapshot, after);
    }

    fn totals(user_id: &str, referrals: i64, tickets: i64) -> ReferralTotals {
        ReferralTotals {
            user_id: user_id.to_string(),
            user_name: format!("name-{}", user_id),
            referral_id: format!("LK-{}", user_id),
            total_referrals: referrals,
            tickets_earned: tickets,
        }
    }

    #[test]
    fn referral_standings_rank_by_referrals_then_tickets() {
        let standings = rank_referrals(vec![
            totals("u1", 8, 8),
            totals("u2", 15, 15),
            totals("u3", 12, 12),
        ]);

        let ids: Vec<&str> = standings.iter().map(|s| s.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u2", "u3", "u1"]);
        let ranks: Vec<usize> = standings.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
}
