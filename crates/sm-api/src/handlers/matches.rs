use axum::{
    Json,
    extract::{Path, Query, State},
};
use sm_common::PostingId;
use sm_common::api::{MatchQuery, MatchSetResponse};

use crate::SharedState;
use crate::error::ApiError;

/// Runs a fresh generation for the posting, replaces its stored matches and
/// returns the ranked list. The store reads and writes under one lock or
/// transaction, so a concurrent placement cannot slip into the stored set.
pub async fn posting_matches(
    State(state): State<SharedState>,
    Path(posting_id): Path<PostingId>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<MatchSetResponse>, ApiError> {
    let window = query.window()?;
    let generated = state
        .store
        .regenerate_matches(posting_id, &state.engine, window)
        .await?;

    Ok(Json(MatchSetResponse::new(
        &generated.posting,
        &generated.set,
        &generated.pool,
    )))
}
