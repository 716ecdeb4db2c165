use deadpool_postgres::GenericClient;
use tokio_postgres::Row;
use tracing::instrument;

use super::{PgPool, column_i32, column_u32, parse_label, util::TimedClientExt};
use crate::{EmployerId, JobPosting, NewJobPosting, PostingId, PostingStatus, store::StoreError};

const POSTING_COLUMNS: &str = "id, employer_id, title, description, required_qualifications, \
     city, state, salary_min, salary_max, experience_required, minimum_diploma_score, \
     required_skills, preferred_skills, status, created_at, updated_at";

pub(crate) fn posting_from_row(row: &Row) -> Result<JobPosting, StoreError> {
    let required_skills: Vec<String> = row.try_get("required_skills")?;
    let preferred_skills: Vec<String> = row.try_get("preferred_skills")?;
    let salary_min: Option<i32> = row.try_get("salary_min")?;
    let salary_max: Option<i32> = row.try_get("salary_max")?;

    Ok(JobPosting {
        id: row.try_get("id")?,
        employer_id: row.try_get("employer_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        required_qualifications: row.try_get("required_qualifications")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        salary_min: salary_min.map(|v| column_u32("salary_min", v)).transpose()?,
        salary_max: salary_max.map(|v| column_u32("salary_max", v)).transpose()?,
        experience_required: column_u32("experience_required", row.try_get("experience_required")?)?,
        minimum_diploma_score: row.try_get("minimum_diploma_score")?,
        required_skills: required_skills.into_iter().collect(),
        preferred_skills: preferred_skills.into_iter().collect(),
        status: parse_label("status", row.try_get("status")?)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[instrument(skip(pool))]
pub async fn fetch_postings(pool: &PgPool) -> Result<Vec<JobPosting>, StoreError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            &format!("SELECT {POSTING_COLUMNS} FROM sm.job_postings ORDER BY id"),
            &[],
            "fetch_postings",
        )
        .await?;

    rows.iter().map(posting_from_row).collect()
}

#[instrument(skip(pool))]
pub async fn fetch_posting(pool: &PgPool, id: PostingId) -> Result<JobPosting, StoreError> {
    let client = pool.get().await?;
    let row = client
        .timed_query_opt(
            &format!("SELECT {POSTING_COLUMNS} FROM sm.job_postings WHERE id = $1"),
            &[&id],
            "fetch_posting",
        )
        .await?
        .ok_or_else(|| StoreError::posting_not_found(id))?;

    posting_from_row(&row)
}

#[instrument(skip(pool, posting), fields(title = %posting.title))]
pub async fn insert_posting(pool: &PgPool, posting: &NewJobPosting) -> Result<JobPosting, StoreError> {
    let client = pool.get().await?;

    let salary_min = posting
        .salary_min
        .map(|v| column_i32("salary_min", v))
        .transpose()?;
    let salary_max = posting
        .salary_max
        .map(|v| column_i32("salary_max", v))
        .transpose()?;
    let experience_required = column_i32("experience_required", posting.experience_required)?;
    let required_skills: Vec<&String> = posting.required_skills.iter().collect();
    let preferred_skills: Vec<&String> = posting.preferred_skills.iter().collect();

    let row = client
        .timed_query_one(
            &format!(
                "INSERT INTO sm.job_postings (
                    employer_id, title, description, required_qualifications, city, state,
                    salary_min, salary_max, experience_required, minimum_diploma_score,
                    required_skills, preferred_skills, status
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                RETURNING {POSTING_COLUMNS}"
            ),
            &[
                &posting.employer_id,
                &posting.title,
                &posting.description,
                &posting.required_qualifications,
                &posting.city,
                &posting.state,
                &salary_min,
                &salary_max,
                &experience_required,
                &posting.minimum_diploma_score,
                &required_skills,
                &preferred_skills,
                &posting.status.as_str(),
            ],
            "insert_posting",
        )
        .await?;

    posting_from_row(&row)
}

/// Locks the posting row and applies a status transition inside the
/// caller's transaction.
pub(crate) async fn transition_status<C: GenericClient + Sync>(
    client: &C,
    id: PostingId,
    next: PostingStatus,
) -> Result<JobPosting, StoreError> {
    let row = client
        .timed_query_opt(
            "SELECT status FROM sm.job_postings WHERE id = $1 FOR UPDATE",
            &[&id],
            "lock_posting",
        )
        .await?
        .ok_or_else(|| StoreError::posting_not_found(id))?;

    let current: PostingStatus = parse_label("status", row.try_get(0)?)?;
    if !current.can_transition_to(next) {
        return Err(StoreError::InvalidTransition {
            posting_id: id,
            from: current,
            to: next,
        });
    }

    let row = client
        .timed_query_one(
            &format!(
                "UPDATE sm.job_postings SET status = $2, updated_at = NOW() \
                 WHERE id = $1 RETURNING {POSTING_COLUMNS}"
            ),
            &[&id, &next.as_str()],
            "update_posting_status",
        )
        .await?;

    posting_from_row(&row)
}

/// Loads the full posting row under `FOR UPDATE` in the caller's transaction.
pub(crate) async fn lock_posting<C: GenericClient + Sync>(
    client: &C,
    id: PostingId,
) -> Result<JobPosting, StoreError> {
    let row = client
        .timed_query_opt(
            &format!("SELECT {POSTING_COLUMNS} FROM sm.job_postings WHERE id = $1 FOR UPDATE"),
            &[&id],
            "lock_posting_row",
        )
        .await?
        .ok_or_else(|| StoreError::posting_not_found(id))?;

    posting_from_row(&row)
}

/// Rewrites a posting's criteria for its owning employer. Status and
/// `created_at` are left alone.
pub(crate) async fn update_posting<C: GenericClient + Sync>(
    client: &C,
    id: PostingId,
    update: &NewJobPosting,
) -> Result<JobPosting, StoreError> {
    let row = client
        .timed_query_opt(
            "SELECT employer_id, status FROM sm.job_postings WHERE id = $1 FOR UPDATE",
            &[&id],
            "lock_posting_owner",
        )
        .await?
        .ok_or_else(|| StoreError::posting_not_found(id))?;

    let owner: EmployerId = row.try_get(0)?;
    if owner != update.employer_id {
        return Err(StoreError::Forbidden(format!(
            "posting {id} belongs to another employer"
        )));
    }
    let status: PostingStatus = parse_label("status", row.try_get(1)?)?;
    if status == PostingStatus::Closed {
        return Err(StoreError::posting_closed(id));
    }

    let salary_min = update
        .salary_min
        .map(|v| column_i32("salary_min", v))
        .transpose()?;
    let salary_max = update
        .salary_max
        .map(|v| column_i32("salary_max", v))
        .transpose()?;
    let experience_required = column_i32("experience_required", update.experience_required)?;
    let required_skills: Vec<&String> = update.required_skills.iter().collect();
    let preferred_skills: Vec<&String> = update.preferred_skills.iter().collect();

    let row = client
        .timed_query_one(
            &format!(
                "UPDATE sm.job_postings SET
                    title = $2, description = $3, required_qualifications = $4, city = $5,
                    state = $6, salary_min = $7, salary_max = $8, experience_required = $9,
                    minimum_diploma_score = $10, required_skills = $11, preferred_skills = $12,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING {POSTING_COLUMNS}"
            ),
            &[
                &id,
                &update.title,
                &update.description,
                &update.required_qualifications,
                &update.city,
                &update.state,
                &salary_min,
                &salary_max,
                &experience_required,
                &update.minimum_diploma_score,
                &required_skills,
                &preferred_skills,
            ],
            "update_posting",
        )
        .await?;

    posting_from_row(&row)
}
