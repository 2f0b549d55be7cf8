use crate::models::ContestEntry;
use crate::ranking::SortCriterion;

/// Derive the primary ordering score for one entry. Pure function of the
/// entry snapshot; tie-break fields are handled by the ranking pass, not here.
pub fn score(entry: &ContestEntry, criterion: SortCriterion) -> f64 {
    match criterion {
        SortCriterion::Votes => entry.votes as f64,
        SortCriterion::Rating => entry.rating,
        SortCriterion::Recent => entry.created_at.timestamp_millis() as f64,
    }
}
