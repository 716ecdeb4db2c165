use deadpool_postgres::GenericClient;
use tokio_postgres::{Row, types::Json};
use tracing::instrument;

use super::{PgPool, util::TimedClientExt};
use crate::{
    CandidateId, PostingId, StoredMatch,
    matching::{MatchSet, ScoreBreakdown},
    stats::MatchCounts,
    store::StoreError,
};

const MATCH_COLUMNS: &str = "id, posting_id, candidate_id, match_score, score_breakdown, reasons, \
     generation_id, created_at, accepted";

pub(crate) fn stored_match_from_row(row: &Row) -> Result<StoredMatch, StoreError> {
    let Json(score_breakdown): Json<ScoreBreakdown> = row.try_get("score_breakdown")?;
    let Json(reasons): Json<Vec<String>> = row.try_get("reasons")?;

    Ok(StoredMatch {
        id: row.try_get("id")?,
        posting_id: row.try_get("posting_id")?,
        candidate_id: row.try_get("candidate_id")?,
        match_score: row.try_get("match_score")?,
        score_breakdown,
        reasons,
        generation_id: row.try_get("generation_id")?,
        created_at: row.try_get("created_at")?,
        accepted: row.try_get("accepted")?,
    })
}

/// Deletes the posting's previous generation and inserts `set` in its place.
/// Accepted rows stay, and results for their candidates are skipped. Runs on
/// the caller's transaction so readers never see a half-written set.
pub(crate) async fn replace_generation<C: GenericClient + Sync>(
    client: &C,
    set: &MatchSet,
) -> Result<Vec<StoredMatch>, StoreError> {
    let exists = client
        .timed_query_opt(
            "SELECT id FROM sm.job_postings WHERE id = $1 FOR UPDATE",
            &[&set.posting_id],
            "lock_posting_for_matches",
        )
        .await?;
    if exists.is_none() {
        return Err(StoreError::posting_not_found(set.posting_id));
    }

    client
        .timed_execute(
            "DELETE FROM sm.match_results WHERE posting_id = $1 AND NOT accepted",
            &[&set.posting_id],
            "delete_match_generation",
        )
        .await?;

    let insert = format!(
        "INSERT INTO sm.match_results (
            posting_id, candidate_id, match_score, score_breakdown, reasons, generation_id, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (posting_id, candidate_id) DO NOTHING
        RETURNING {MATCH_COLUMNS}"
    );

    let mut stored = Vec::with_capacity(set.results.len());
    for result in &set.results {
        let row = client
            .timed_query_opt(
                &insert,
                &[
                    &set.posting_id,
                    &result.candidate_id,
                    &result.match_score,
                    &Json(&result.score_breakdown),
                    &Json(&result.reasons),
                    &set.generation_id,
                    &set.generated_at,
                ],
                "insert_match_result",
            )
            .await?;
        if let Some(row) = row {
            stored.push(stored_match_from_row(&row)?);
        }
    }

    Ok(stored)
}

/// Flags the (posting, candidate) row as accepted inside the caller's
/// transaction.
pub(crate) async fn mark_accepted<C: GenericClient + Sync>(
    client: &C,
    candidate_id: CandidateId,
    posting_id: PostingId,
) -> Result<(), StoreError> {
    client
        .timed_execute(
            "UPDATE sm.match_results SET accepted = TRUE \
             WHERE candidate_id = $1 AND posting_id = $2",
            &[&candidate_id, &posting_id],
            "mark_match_accepted",
        )
        .await?;
    Ok(())
}

#[instrument(skip(pool))]
pub async fn fetch_matches_for_candidate(
    pool: &PgPool,
    candidate_id: CandidateId,
) -> Result<Vec<StoredMatch>, StoreError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            &format!(
                "SELECT {MATCH_COLUMNS} FROM sm.match_results
                 WHERE candidate_id = $1
                 ORDER BY created_at DESC, id DESC"
            ),
            &[&candidate_id],
            "fetch_matches_for_candidate",
        )
        .await?;

    rows.iter().map(stored_match_from_row).collect()
}

#[instrument(skip(pool))]
pub async fn fetch_all_matches(pool: &PgPool) -> Result<Vec<StoredMatch>, StoreError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            &format!("SELECT {MATCH_COLUMNS} FROM sm.match_results ORDER BY posting_id, id"),
            &[],
            "fetch_all_matches",
        )
        .await?;

    rows.iter().map(stored_match_from_row).collect()
}

#[instrument(skip(pool))]
pub async fn match_counts(pool: &PgPool) -> Result<MatchCounts, StoreError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            "SELECT posting_id, COUNT(*) FROM sm.match_results GROUP BY posting_id",
            &[],
            "match_counts",
        )
        .await?;

    rows.iter()
        .map(|row| {
            let posting_id: PostingId = row.try_get(0)?;
            let count: i64 = row.try_get(1)?;
            Ok::<_, StoreError>((posting_id, count.max(0) as u64))
        })
        .collect()
}

/// True when `candidate_id` holds a stored match for the posting, from the
/// current generation or an accepted one.
pub(crate) async fn has_stored_match<C: GenericClient + Sync>(
    client: &C,
    candidate_id: CandidateId,
    posting_id: PostingId,
) -> Result<bool, StoreError> {
    let row = client
        .timed_query_one(
            "SELECT EXISTS (
                SELECT 1 FROM sm.match_results WHERE candidate_id = $1 AND posting_id = $2
            )",
            &[&candidate_id, &posting_id],
            "has_stored_match",
        )
        .await?;
    Ok(row.try_get(0)?)
}
