use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use sm_common::stats::{EmployerDashboard, employer_dashboard};

use crate::SharedState;
use crate::error::ApiError;

const MAX_DASHBOARD_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

const fn default_limit() -> usize {
    5
}

pub async fn dashboard(
    State(state): State<SharedState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<EmployerDashboard>, ApiError> {
    if !(1..=MAX_DASHBOARD_LIMIT).contains(&query.limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_DASHBOARD_LIMIT}"
        )));
    }

    let postings = state.store.fetch_job_postings().await?;
    let candidates = state.store.fetch_candidate_pool().await?;
    let stored = state.store.fetch_all_matches().await?;

    Ok(Json(employer_dashboard(
        &postings,
        &candidates,
        &stored,
        query.limit,
    )))
}
