use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use super::{GeneratedMatches, Store, StoreError};
use crate::{
    Candidate, CandidateId, JobPosting, NewJobPosting, PlacementStatus, PostingId, PostingStatus,
    StoredMatch,
    matching::{MatchSet, MatchingEngine, RankingWindow},
    stats::MatchCounts,
};

/// Fixture format accepted by [`MemoryStore::from_seed_file`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub job_postings: Vec<JobPosting>,
}

#[derive(Debug, Default)]
struct Inner {
    candidates: BTreeMap<CandidateId, Candidate>,
    postings: BTreeMap<PostingId, JobPosting>,
    matches: BTreeMap<PostingId, Vec<StoredMatch>>,
    next_posting_id: PostingId,
    next_match_id: i64,
}

impl Inner {
    /// Swaps in a generation, keeping accepted rows and skipping results for
    /// their candidates. Returns only the rows written now.
    fn store_generation(&mut self, set: &MatchSet) -> Vec<StoredMatch> {
        let mut kept = self.matches.remove(&set.posting_id).unwrap_or_default();
        kept.retain(|stored| stored.accepted);

        let fresh: Vec<_> = set
            .results
            .iter()
            .filter(|result| !kept.iter().any(|m| m.candidate_id == result.candidate_id))
            .collect();

        let first_id = self.next_match_id;
        self.next_match_id += fresh.len() as i64;

        let written: Vec<StoredMatch> = fresh
            .into_iter()
            .zip(first_id..)
            .map(|(result, id)| StoredMatch::from_result(id, set, result))
            .collect();

        kept.extend(written.iter().cloned());
        self.matches.insert(set.posting_id, kept);
        written
    }
}

/// Process-local store used when no database is configured, and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(candidates: Vec<Candidate>, postings: Vec<JobPosting>) -> Self {
        let next_posting_id = postings.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let inner = Inner {
            candidates: candidates.into_iter().map(|c| (c.id, c)).collect(),
            postings: postings.into_iter().map(|p| (p.id, p)).collect(),
            matches: BTreeMap::new(),
            next_posting_id,
            next_match_id: 1,
        };
        Self {
            inner: RwLock::new(inner),
        }
    }

    pub fn from_seed(seed: SeedData) -> Self {
        Self::with_data(seed.candidates, seed.job_postings)
    }

    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| StoreError::Seed(format!("{}: {err}", path.display())))?;
        let seed: SeedData = serde_json::from_str(&raw)
            .map_err(|err| StoreError::Seed(format!("{}: {err}", path.display())))?;

        info!(
            path = %path.display(),
            candidates = seed.candidates.len(),
            job_postings = seed.job_postings.len(),
            "loaded seed data"
        );
        Ok(Self::from_seed(seed))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn fetch_candidate_pool(&self) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.inner.read().await.candidates.values().cloned().collect())
    }

    async fn fetch_candidate(&self, id: CandidateId) -> Result<Candidate, StoreError> {
        self.inner
            .read()
            .await
            .candidates
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::candidate_not_found(id))
    }

    async fn fetch_job_postings(&self) -> Result<Vec<JobPosting>, StoreError> {
        Ok(self.inner.read().await.postings.values().cloned().collect())
    }

    async fn fetch_job_posting(&self, id: PostingId) -> Result<JobPosting, StoreError> {
        self.inner
            .read()
            .await
            .postings
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::posting_not_found(id))
    }

    #[instrument(skip(self, posting), fields(title = %posting.title))]
    async fn insert_posting(&self, posting: NewJobPosting) -> Result<JobPosting, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_posting_id.max(1);
        inner.next_posting_id = id + 1;

        let posting = posting.into_posting(id, Utc::now());
        inner.postings.insert(id, posting.clone());
        Ok(posting)
    }

    #[instrument(skip(self, update), fields(employer_id = update.employer_id))]
    async fn update_posting(
        &self,
        id: PostingId,
        update: NewJobPosting,
    ) -> Result<JobPosting, StoreError> {
        let mut inner = self.inner.write().await;
        let posting = inner
            .postings
            .get_mut(&id)
            .ok_or_else(|| StoreError::posting_not_found(id))?;

        if posting.employer_id != update.employer_id {
            return Err(StoreError::Forbidden(format!(
                "posting {id} belongs to another employer"
            )));
        }
        if posting.status == PostingStatus::Closed {
            return Err(StoreError::posting_closed(id));
        }

        let mut updated = update.into_posting(id, Utc::now());
        updated.status = posting.status;
        updated.created_at = posting.created_at;
        *posting = updated.clone();
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn update_posting_status(
        &self,
        id: PostingId,
        status: PostingStatus,
    ) -> Result<JobPosting, StoreError> {
        let mut inner = self.inner.write().await;
        let posting = inner
            .postings
            .get_mut(&id)
            .ok_or_else(|| StoreError::posting_not_found(id))?;

        if !posting.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                posting_id: id,
                from: posting.status,
                to: status,
            });
        }

        posting.status = status;
        posting.updated_at = Utc::now();
        Ok(posting.clone())
    }

    #[instrument(skip(self, set), fields(posting_id = set.posting_id, generation_id = %set.generation_id))]
    async fn replace_matches(&self, set: &MatchSet) -> Result<Vec<StoredMatch>, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.postings.contains_key(&set.posting_id) {
            return Err(StoreError::posting_not_found(set.posting_id));
        }

        Ok(inner.store_generation(set))
    }

    #[instrument(skip(self, engine))]
    async fn regenerate_matches(
        &self,
        posting_id: PostingId,
        engine: &MatchingEngine,
        window: RankingWindow,
    ) -> Result<GeneratedMatches, StoreError> {
        let mut inner = self.inner.write().await;
        let posting = inner
            .postings
            .get(&posting_id)
            .cloned()
            .ok_or_else(|| StoreError::posting_not_found(posting_id))?;
        if posting.status == PostingStatus::Closed {
            return Err(StoreError::posting_closed(posting_id));
        }

        let pool: Vec<Candidate> = inner.candidates.values().cloned().collect();
        let set = engine.generate(&posting, &pool, window)?;
        let stored = inner.store_generation(&set);

        Ok(GeneratedMatches {
            posting,
            pool,
            set,
            stored,
        })
    }

    async fn fetch_matches_for_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> Result<Vec<StoredMatch>, StoreError> {
        let inner = self.inner.read().await;
        let mut matches: Vec<StoredMatch> = inner
            .matches
            .values()
            .flatten()
            .filter(|stored| stored.candidate_id == candidate_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(matches)
    }

    async fn fetch_all_matches(&self) -> Result<Vec<StoredMatch>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .matches
            .values()
            .flatten()
            .cloned()
            .collect())
    }

    async fn match_counts(&self) -> Result<MatchCounts, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .matches
            .iter()
            .map(|(posting_id, stored)| (*posting_id, stored.len() as u64))
            .collect())
    }

    #[instrument(skip(self))]
    async fn mark_candidate_placed(
        &self,
        candidate_id: CandidateId,
        posting_id: PostingId,
    ) -> Result<Candidate, StoreError> {
        let mut inner = self.inner.write().await;

        let has_match = inner
            .matches
            .get(&posting_id)
            .is_some_and(|stored| stored.iter().any(|m| m.candidate_id == candidate_id));

        let candidate = inner
            .candidates
            .get_mut(&candidate_id)
            .ok_or_else(|| StoreError::candidate_not_found(candidate_id))?;

        if !has_match {
            return Err(StoreError::Conflict(format!(
                "candidate {candidate_id} has no stored match for posting {posting_id}"
            )));
        }
        if candidate.placement_status != PlacementStatus::Available {
            return Err(StoreError::Conflict(format!(
                "candidate {candidate_id} is {}, not Available",
                candidate.placement_status
            )));
        }

        candidate.placement_status = PlacementStatus::Placed;
        candidate.updated_at = Utc::now();
        let placed = candidate.clone();

        if let Some(stored) = inner.matches.get_mut(&posting_id) {
            stored
                .iter_mut()
                .filter(|m| m.candidate_id == candidate_id)
                .for_each(|m| m.accepted = true);
        }
        Ok(placed)
    }
}
