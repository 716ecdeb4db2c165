//! Persistence seam between the HTTP layer and the matching core.
//!
//! The engine and aggregator never touch a store. Read paths take a snapshot
//! through [`Store`] and run the pure functions over it; match generation
//! runs inside the store via [`Store::regenerate_matches`] so the posting,
//! the pool and the written set all come from one consistent view.

pub mod memory;

use async_trait::async_trait;
use deadpool_postgres::PoolError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_postgres::Error as PgError;

use crate::{
    Candidate, CandidateId, Category, JobPosting, NewJobPosting, PostingId, PostingStatus,
    StoredMatch,
    corrections::{correct_state, normalize_place},
    error::MatchingError,
    matching::{MatchSet, MatchingEngine, RankingWindow},
    stats::MatchCounts,
};

pub use memory::{MemoryStore, SeedData};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("posting {posting_id} cannot move from {from} to {to}")]
    InvalidTransition {
        posting_id: PostingId,
        from: PostingStatus,
        to: PostingStatus,
    },
    #[error(transparent)]
    Matching(#[from] MatchingError),
    #[error("failed to load seed data: {0}")]
    Seed(String),
    #[error("invalid stored value for {column}: {value}")]
    Mapping { column: &'static str, value: String },
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

impl StoreError {
    pub fn candidate_not_found(id: CandidateId) -> Self {
        StoreError::NotFound {
            entity: "candidate",
            id,
        }
    }

    pub fn posting_not_found(id: PostingId) -> Self {
        StoreError::NotFound {
            entity: "job posting",
            id,
        }
    }

    pub fn posting_closed(id: PostingId) -> Self {
        StoreError::Conflict(format!("posting {id} is closed"))
    }
}

/// Everything one generation saw and wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMatches {
    pub posting: JobPosting,
    pub pool: Vec<Candidate>,
    pub set: MatchSet,
    /// Rows written by this generation. Accepted rows kept from earlier
    /// generations are not repeated here.
    pub stored: Vec<StoredMatch>,
}

/// Admin listing filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateFilter {
    pub state: Option<String>,
    pub city: Option<String>,
    pub category: Option<Category>,
    /// Case-insensitive substring of the candidate name.
    pub search: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl CandidateFilter {
    pub fn matches(&self, candidate: &Candidate) -> bool {
        if let Some(state) = non_empty(self.state.as_deref()) {
            let wanted = correct_state(state).map(|s| normalize_place(&s));
            let actual = correct_state(&candidate.state).map(|s| normalize_place(&s));
            if wanted != actual {
                return false;
            }
        }
        if let Some(city) = non_empty(self.city.as_deref()) {
            if normalize_place(city) != normalize_place(&candidate.city) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if candidate.category != category {
                return false;
            }
        }
        if let Some(search) = non_empty(self.search.as_deref()) {
            if !candidate
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap liveness check of the backing storage.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn fetch_candidate_pool(&self) -> Result<Vec<Candidate>, StoreError>;

    async fn fetch_candidate(&self, id: CandidateId) -> Result<Candidate, StoreError>;

    async fn fetch_job_postings(&self) -> Result<Vec<JobPosting>, StoreError>;

    async fn fetch_job_posting(&self, id: PostingId) -> Result<JobPosting, StoreError>;

    /// Stores a new posting. Callers validate the criteria first.
    async fn insert_posting(&self, posting: NewJobPosting) -> Result<JobPosting, StoreError>;

    /// Rewrites a posting's criteria. Only the owning employer
    /// (`update.employer_id`) may edit, closed postings are frozen, and the
    /// current status is kept.
    async fn update_posting(
        &self,
        id: PostingId,
        update: NewJobPosting,
    ) -> Result<JobPosting, StoreError>;

    async fn update_posting_status(
        &self,
        id: PostingId,
        status: PostingStatus,
    ) -> Result<JobPosting, StoreError>;

    /// Replaces the stored matches of `set.posting_id` with `set.results`.
    /// Accepted matches survive, and results for their candidates are
    /// skipped. Other postings' matches are untouched.
    async fn replace_matches(&self, set: &MatchSet) -> Result<Vec<StoredMatch>, StoreError>;

    /// Reads the posting and the candidate pool, ranks them with `engine` and
    /// replaces the posting's matches, all against one consistent view.
    /// Closed postings are refused with [`StoreError::Conflict`].
    async fn regenerate_matches(
        &self,
        posting_id: PostingId,
        engine: &MatchingEngine,
        window: RankingWindow,
    ) -> Result<GeneratedMatches, StoreError>;

    async fn fetch_matches_for_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> Result<Vec<StoredMatch>, StoreError>;

    async fn fetch_all_matches(&self) -> Result<Vec<StoredMatch>, StoreError>;

    async fn match_counts(&self) -> Result<MatchCounts, StoreError>;

    /// Accepts a stored match: the candidate must be `Available` and hold a
    /// stored match for `posting_id`. Flips the candidate to `Placed` and
    /// marks the match accepted.
    async fn mark_candidate_placed(
        &self,
        candidate_id: CandidateId,
        posting_id: PostingId,
    ) -> Result<Candidate, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Candidate {
        Candidate {
            id: 1,
            name: "Asha Verma".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            category: Category::Obc,
            ..Candidate::default()
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(CandidateFilter::default().matches(&candidate()));
    }

    #[test]
    fn filters_on_normalized_place_and_name() {
        let by_state = CandidateFilter {
            state: Some("MH".into()),
            city: Some(" PUNE".into()),
            ..CandidateFilter::default()
        };
        assert!(by_state.matches(&candidate()));

        let by_name = CandidateFilter {
            search: Some("verma".into()),
            category: Some(Category::Obc),
            ..CandidateFilter::default()
        };
        assert!(by_name.matches(&candidate()));

        let miss = CandidateFilter {
            category: Some(Category::St),
            ..CandidateFilter::default()
        };
        assert!(!miss.matches(&candidate()));
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = StoreError::posting_not_found(9);
        assert_eq!(err.to_string(), "job posting 9 not found");
    }
}
