use axum::{Json, extract::State};
use sm_common::stats::{StatisticsSnapshot, compute_statistics};

use crate::SharedState;
use crate::error::ApiError;

pub async fn statistics(
    State(state): State<SharedState>,
) -> Result<Json<StatisticsSnapshot>, ApiError> {
    let candidates = state.store.fetch_candidate_pool().await?;
    let postings = state.store.fetch_job_postings().await?;
    let counts = state.store.match_counts().await?;

    Ok(Json(compute_statistics(&candidates, &postings, &counts)))
}
