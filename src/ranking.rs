//! Candidate ranking

use crate::models::PlaceCandidate;

/// Maximum number of candidates offered to the user
pub const MAX_CANDIDATES: usize = 5;

/// Orders geocoded places so the most likely match comes first
pub struct CandidateRanker;

impl CandidateRanker {
    /// Drop exact duplicates, sort by population (largest first) and keep the
    /// top [`MAX_CANDIDATES`]. Equal populations keep the geocoder's order.
    #[must_use]
    pub fn rank(candidates: Vec<PlaceCandidate>) -> Vec<PlaceCandidate> {
        let mut unique: Vec<PlaceCandidate> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !unique.contains(&candidate) {
                unique.push(candidate);
            }
        }

        // sort_by is stable
        unique.sort_by(|a, b| b.population.cmp(&a.population));
        unique.truncate(MAX_CANDIDATES);
        unique
    }
}
