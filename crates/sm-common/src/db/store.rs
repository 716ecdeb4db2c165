use async_trait::async_trait;
use tracing::{info, instrument};

use super::{PgPool, candidates, match_results, postings};
use crate::{
    Candidate, CandidateId, JobPosting, NewJobPosting, PostingId, PostingStatus, StoredMatch,
    matching::{MatchSet, MatchingEngine, RankingWindow},
    stats::MatchCounts,
    store::{GeneratedMatches, Store, StoreError},
};

/// PostgreSQL-backed [`Store`] over the `sm` schema.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }

    async fn fetch_candidate_pool(&self) -> Result<Vec<Candidate>, StoreError> {
        candidates::fetch_candidates(&self.pool).await
    }

    async fn fetch_candidate(&self, id: CandidateId) -> Result<Candidate, StoreError> {
        candidates::fetch_candidate(&self.pool, id).await
    }

    async fn fetch_job_postings(&self) -> Result<Vec<JobPosting>, StoreError> {
        postings::fetch_postings(&self.pool).await
    }

    async fn fetch_job_posting(&self, id: PostingId) -> Result<JobPosting, StoreError> {
        postings::fetch_posting(&self.pool, id).await
    }

    async fn insert_posting(&self, posting: NewJobPosting) -> Result<JobPosting, StoreError> {
        postings::insert_posting(&self.pool, &posting).await
    }

    #[instrument(skip(self, update), fields(employer_id = update.employer_id))]
    async fn update_posting(
        &self,
        id: PostingId,
        update: NewJobPosting,
    ) -> Result<JobPosting, StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        let posting = postings::update_posting(&tx, id, &update).await?;
        tx.commit().await?;
        Ok(posting)
    }

    #[instrument(skip(self))]
    async fn update_posting_status(
        &self,
        id: PostingId,
        status: PostingStatus,
    ) -> Result<JobPosting, StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        let posting = postings::transition_status(&tx, id, status).await?;
        tx.commit().await?;
        Ok(posting)
    }

    #[instrument(skip(self, set), fields(posting_id = set.posting_id, generation_id = %set.generation_id))]
    async fn replace_matches(&self, set: &MatchSet) -> Result<Vec<StoredMatch>, StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        let stored = match_results::replace_generation(&tx, set).await?;
        tx.commit().await?;

        info!(stored = stored.len(), "replaced match generation");
        Ok(stored)
    }

    #[instrument(skip(self, engine))]
    async fn regenerate_matches(
        &self,
        posting_id: PostingId,
        engine: &MatchingEngine,
        window: RankingWindow,
    ) -> Result<GeneratedMatches, StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        let posting = postings::lock_posting(&tx, posting_id).await?;
        if posting.status == PostingStatus::Closed {
            return Err(StoreError::posting_closed(posting_id));
        }
        let pool = candidates::lock_candidate_pool(&tx).await?;

        let set = engine.generate(&posting, &pool, window)?;
        let stored = match_results::replace_generation(&tx, &set).await?;
        tx.commit().await?;

        info!(
            generation_id = %set.generation_id,
            stored = stored.len(),
            "regenerated matches"
        );
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
        match_results::fetch_matches_for_candidate(&self.pool, candidate_id).await
    }

    async fn fetch_all_matches(&self) -> Result<Vec<StoredMatch>, StoreError> {
        match_results::fetch_all_matches(&self.pool).await
    }

    async fn match_counts(&self) -> Result<MatchCounts, StoreError> {
        match_results::match_counts(&self.pool).await
    }

    #[instrument(skip(self))]
    async fn mark_candidate_placed(
        &self,
        candidate_id: CandidateId,
        posting_id: PostingId,
    ) -> Result<Candidate, StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        if !match_results::has_stored_match(&tx, candidate_id, posting_id).await? {
            // Distinguish a missing candidate from a missing match.
            let exists = tx
                .query_opt("SELECT 1 FROM sm.candidates WHERE id = $1", &[&candidate_id])
                .await?;
            return Err(match exists {
                None => StoreError::candidate_not_found(candidate_id),
                Some(_) => StoreError::Conflict(format!(
                    "candidate {candidate_id} has no stored match for posting {posting_id}"
                )),
            });
        }

        let candidate = candidates::place_candidate(&tx, candidate_id).await?;
        match_results::mark_accepted(&tx, candidate_id, posting_id).await?;
        tx.commit().await?;
        Ok(candidate)
    }
}
