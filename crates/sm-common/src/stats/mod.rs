//! Dashboard aggregates over the candidate pool, postings and stored matches.
//!
//! Everything here is a pure function of its inputs. Groups use ordered maps
//! so the output does not depend on input order.

pub mod employer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    Candidate, JobPosting, PlacementStatus, PostingId, PostingStatus, StoredMatch,
    corrections::{correct_gender, correct_state},
    matching::MatchSet,
};

pub use employer::{EmployerDashboard, RecentMatch, TopCandidate, employer_dashboard};

/// Group label for candidates with no state or gender on record.
pub const UNSPECIFIED: &str = "Unspecified";

/// Stored match count per posting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounts(BTreeMap<PostingId, u64>);

impl MatchCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, posting_id: PostingId, count: u64) {
        self.0.insert(posting_id, count);
    }

    pub fn get(&self, posting_id: PostingId) -> u64 {
        self.0.get(&posting_id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn from_sets<'a, I>(sets: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchSet>,
    {
        let mut counts = Self::new();
        for set in sets {
            counts.insert(set.posting_id, set.results.len() as u64);
        }
        counts
    }

    pub fn from_stored(matches: &[StoredMatch]) -> Self {
        let mut counts = Self::new();
        for stored in matches {
            *counts.0.entry(stored.posting_id).or_insert(0) += 1;
        }
        counts
    }

    pub fn iter(&self) -> impl Iterator<Item = (PostingId, u64)> + '_ {
        self.0.iter().map(|(id, count)| (*id, *count))
    }
}

impl FromIterator<(PostingId, u64)> for MatchCounts {
    fn from_iter<T: IntoIterator<Item = (PostingId, u64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateStatistics {
    pub total: u64,
    pub placed: u64,
    pub available: u64,
    /// Percentage of placed candidates, two decimals.
    pub placement_rate: f64,
    pub avg_diploma_score: f64,
    pub by_state: BTreeMap<String, u64>,
    pub by_category: BTreeMap<String, u64>,
    pub by_gender: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingStatistics {
    pub total: u64,
    pub active: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStatistics {
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub candidates: CandidateStatistics,
    pub job_postings: PostingStatistics,
    pub matches: MatchStatistics,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn state_label(candidate: &Candidate) -> String {
    correct_state(&candidate.state).unwrap_or_else(|| UNSPECIFIED.to_string())
}

fn gender_label(candidate: &Candidate) -> String {
    candidate
        .gender
        .as_deref()
        .and_then(correct_gender)
        .unwrap_or_else(|| UNSPECIFIED.to_string())
}

pub fn compute_statistics(
    candidates: &[Candidate],
    postings: &[JobPosting],
    match_counts: &MatchCounts,
) -> StatisticsSnapshot {
    let mut stats = CandidateStatistics::default();
    let mut diploma_sum = 0.0;

    for candidate in candidates {
        stats.total += 1;
        match candidate.placement_status {
            PlacementStatus::Placed => stats.placed += 1,
            PlacementStatus::Available => stats.available += 1,
            PlacementStatus::NotPlaced => {}
        }
        diploma_sum += candidate.diploma_score;

        *stats.by_state.entry(state_label(candidate)).or_insert(0) += 1;
        *stats
            .by_category
            .entry(candidate.category.as_str().to_string())
            .or_insert(0) += 1;
        *stats.by_gender.entry(gender_label(candidate)).or_insert(0) += 1;
    }

    if stats.total > 0 {
        let total = stats.total as f64;
        stats.placement_rate = round2(stats.placed as f64 / total * 100.0);
        stats.avg_diploma_score = round2(diploma_sum / total);
    }

    let job_postings = PostingStatistics {
        total: postings.len() as u64,
        active: postings
            .iter()
            .filter(|posting| posting.status == PostingStatus::Active)
            .count() as u64,
    };

    StatisticsSnapshot {
        candidates: stats,
        job_postings,
        matches: MatchStatistics {
            total: match_counts.total(),
        },
    }
}
