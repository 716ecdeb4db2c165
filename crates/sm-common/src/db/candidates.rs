use deadpool_postgres::GenericClient;
use tokio_postgres::Row;
use tracing::instrument;

use super::{PgPool, column_u32, parse_label, util::TimedClientExt};
use crate::{Candidate, CandidateId, PlacementStatus, store::StoreError};

const CANDIDATE_COLUMNS: &str = "id, name, phone_number, email, city, state, qualifications, \
     diploma_score, experience_years, category, gender, training_result, placement_status, \
     skills, preferred_salary_min, preferred_salary_max, created_at, updated_at";

pub(crate) fn candidate_from_row(row: &Row) -> Result<Candidate, StoreError> {
    let skills: Vec<String> = row.try_get("skills")?;
    let salary_min: Option<i32> = row.try_get("preferred_salary_min")?;
    let salary_max: Option<i32> = row.try_get("preferred_salary_max")?;

    Ok(Candidate {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        phone_number: row.try_get("phone_number")?,
        email: row.try_get("email")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        qualifications: row.try_get("qualifications")?,
        diploma_score: row.try_get("diploma_score")?,
        experience_years: column_u32("experience_years", row.try_get("experience_years")?)?,
        category: parse_label("category", row.try_get("category")?)?,
        gender: row.try_get("gender")?,
        training_result: parse_label("training_result", row.try_get("training_result")?)?,
        placement_status: parse_label("placement_status", row.try_get("placement_status")?)?,
        skills: skills.into_iter().collect(),
        preferred_salary_min: salary_min
            .map(|v| column_u32("preferred_salary_min", v))
            .transpose()?,
        preferred_salary_max: salary_max
            .map(|v| column_u32("preferred_salary_max", v))
            .transpose()?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[instrument(skip(pool))]
pub async fn fetch_candidates(pool: &PgPool) -> Result<Vec<Candidate>, StoreError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            &format!("SELECT {CANDIDATE_COLUMNS} FROM sm.candidates ORDER BY id"),
            &[],
            "fetch_candidates",
        )
        .await?;

    rows.iter().map(candidate_from_row).collect()
}

#[instrument(skip(pool))]
pub async fn fetch_candidate(pool: &PgPool, id: CandidateId) -> Result<Candidate, StoreError> {
    let client = pool.get().await?;
    let row = client
        .timed_query_opt(
            &format!("SELECT {CANDIDATE_COLUMNS} FROM sm.candidates WHERE id = $1"),
            &[&id],
            "fetch_candidate",
        )
        .await?
        .ok_or_else(|| StoreError::candidate_not_found(id))?;

    candidate_from_row(&row)
}

/// The whole pool under `FOR SHARE`, so placements wait until the caller's
/// transaction ends.
pub(crate) async fn lock_candidate_pool<C: GenericClient + Sync>(
    client: &C,
) -> Result<Vec<Candidate>, StoreError> {
    let rows = client
        .timed_query(
            &format!("SELECT {CANDIDATE_COLUMNS} FROM sm.candidates ORDER BY id FOR SHARE"),
            &[],
            "lock_candidate_pool",
        )
        .await?;

    rows.iter().map(candidate_from_row).collect()
}

/// Locks the candidate row and flips it to `Placed`. The caller owns the
/// transaction and has already checked the stored match.
pub(crate) async fn place_candidate<C: GenericClient + Sync>(
    client: &C,
    id: CandidateId,
) -> Result<Candidate, StoreError> {
    let row = client
        .timed_query_opt(
            "SELECT placement_status FROM sm.candidates WHERE id = $1 FOR UPDATE",
            &[&id],
            "lock_candidate",
        )
        .await?
        .ok_or_else(|| StoreError::candidate_not_found(id))?;

    let status: PlacementStatus = parse_label("placement_status", row.try_get(0)?)?;
    if status != PlacementStatus::Available {
        return Err(StoreError::Conflict(format!(
            "candidate {id} is {status}, not Available"
        )));
    }

    let row = client
        .timed_query_one(
            &format!(
                "UPDATE sm.candidates SET placement_status = $2, updated_at = NOW() \
                 WHERE id = $1 RETURNING {CANDIDATE_COLUMNS}"
            ),
            &[&id, &PlacementStatus::Placed.as_str()],
            "place_candidate",
        )
        .await?;

    candidate_from_row(&row)
}
