use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use sm_common::api::{CandidateDetail, CandidateListQuery, MatchHistoryEntry, Page, PlacementRequest};
use sm_common::{Candidate, CandidateId};
use tracing::info;

use super::pagination::validate_offset;
use crate::SharedState;
use crate::error::ApiError;

pub async fn list_candidates(
    State(state): State<SharedState>,
    Query(query): Query<CandidateListQuery>,
) -> Result<Json<Page<Candidate>>, ApiError> {
    let filter = query.filter()?;
    let offset = validate_offset(query.offset())?;

    let matching: Vec<Candidate> = state
        .store
        .fetch_candidate_pool()
        .await?
        .into_iter()
        .filter(|candidate| filter.matches(candidate))
        .collect();

    Ok(Json(Page::from_vec(matching, query.limit(), offset)))
}

pub async fn get_candidate(
    State(state): State<SharedState>,
    Path(candidate_id): Path<CandidateId>,
) -> Result<Json<CandidateDetail>, ApiError> {
    let candidate = state.store.fetch_candidate(candidate_id).await?;
    let stored = state.store.fetch_matches_for_candidate(candidate_id).await?;

    let titles: HashMap<_, _> = state
        .store
        .fetch_job_postings()
        .await?
        .into_iter()
        .map(|posting| (posting.id, posting.title))
        .collect();

    let match_history = stored
        .iter()
        .map(|entry| {
            let title = titles.get(&entry.posting_id).cloned().unwrap_or_default();
            MatchHistoryEntry::new(entry, title)
        })
        .collect();

    Ok(Json(CandidateDetail {
        candidate,
        match_history,
    }))
}

/// Accepts a stored match and marks the candidate placed.
pub async fn place_candidate(
    State(state): State<SharedState>,
    Path(candidate_id): Path<CandidateId>,
    Json(request): Json<PlacementRequest>,
) -> Result<Json<Candidate>, ApiError> {
    let candidate = state
        .store
        .mark_candidate_placed(candidate_id, request.posting_id)
        .await?;

    info!(candidate_id, posting_id = request.posting_id, "candidate placed");
    Ok(Json(candidate))
}
