use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use sm_common::api::{PostingListQuery, StatusUpdateRequest};
use sm_common::matching::validate_new_posting;
use sm_common::{JobPosting, NewJobPosting, PostingId};
use tracing::info;

use crate::SharedState;
use crate::error::ApiError;

pub async fn list_postings(
    State(state): State<SharedState>,
    Query(query): Query<PostingListQuery>,
) -> Result<Json<Vec<JobPosting>>, ApiError> {
    let postings = state.store.fetch_job_postings().await?;
    Ok(Json(query.filter(postings)?))
}

pub async fn get_posting(
    State(state): State<SharedState>,
    Path(posting_id): Path<PostingId>,
) -> Result<Json<JobPosting>, ApiError> {
    Ok(Json(state.store.fetch_job_posting(posting_id).await?))
}

pub async fn create_posting(
    State(state): State<SharedState>,
    Json(posting): Json<NewJobPosting>,
) -> Result<(StatusCode, Json<JobPosting>), ApiError> {
    validate_new_posting(&posting)?;

    let created = state.store.insert_posting(posting).await?;
    info!(posting_id = created.id, title = %created.title, "job posting created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replaces a posting's criteria. The body's `employer_id` must own the
/// posting; the status is changed only through the status endpoint.
pub async fn update_posting(
    State(state): State<SharedState>,
    Path(posting_id): Path<PostingId>,
    Json(update): Json<NewJobPosting>,
) -> Result<Json<JobPosting>, ApiError> {
    validate_new_posting(&update)?;

    let updated = state.store.update_posting(posting_id, update).await?;
    info!(posting_id, employer_id = updated.employer_id, "job posting updated");
    Ok(Json(updated))
}

pub async fn update_status(
    State(state): State<SharedState>,
    Path(posting_id): Path<PostingId>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<JobPosting>, ApiError> {
    let updated = state
        .store
        .update_posting_status(posting_id, request.status)
        .await?;

    info!(posting_id, status = %updated.status, "job posting status changed");
    Ok(Json(updated))
}
