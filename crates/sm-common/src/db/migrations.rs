use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::PgPool;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        id: 1,
        description: "candidates, job postings and match results",
        sql: r#"
CREATE TABLE IF NOT EXISTS sm.candidates (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    phone_number TEXT NOT NULL DEFAULT '',
    email TEXT,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    qualifications TEXT NOT NULL DEFAULT '',
    diploma_score DOUBLE PRECISION NOT NULL
        CHECK (diploma_score >= 0.0 AND diploma_score <= 100.0),
    experience_years INTEGER NOT NULL DEFAULT 0 CHECK (experience_years >= 0),
    category TEXT NOT NULL DEFAULT 'General',
    gender TEXT,
    training_result TEXT NOT NULL DEFAULT 'Pass',
    placement_status TEXT NOT NULL DEFAULT 'Available',
    skills TEXT[] NOT NULL DEFAULT '{}',
    preferred_salary_min INTEGER CHECK (preferred_salary_min >= 0),
    preferred_salary_max INTEGER CHECK (preferred_salary_max >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS sm.job_postings (
    id BIGSERIAL PRIMARY KEY,
    employer_id BIGINT NOT NULL DEFAULT 0,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    required_qualifications TEXT NOT NULL DEFAULT '',
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    salary_min INTEGER CHECK (salary_min >= 0),
    salary_max INTEGER CHECK (salary_max >= 0),
    experience_required INTEGER NOT NULL DEFAULT 0 CHECK (experience_required >= 0),
    minimum_diploma_score DOUBLE PRECISION
        CHECK (minimum_diploma_score IS NULL
            OR (minimum_diploma_score >= 0.0 AND minimum_diploma_score <= 100.0)),
    required_skills TEXT[] NOT NULL DEFAULT '{}',
    preferred_skills TEXT[] NOT NULL DEFAULT '{}',
    status TEXT NOT NULL DEFAULT 'active'
        CHECK (status IN ('active', 'inactive', 'closed')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_salary_order
        CHECK (salary_min IS NULL OR salary_max IS NULL OR salary_min <= salary_max)
);

CREATE TABLE IF NOT EXISTS sm.match_results (
    id BIGSERIAL PRIMARY KEY,
    posting_id BIGINT NOT NULL REFERENCES sm.job_postings(id) ON DELETE CASCADE,
    candidate_id BIGINT NOT NULL REFERENCES sm.candidates(id),
    match_score DOUBLE PRECISION NOT NULL
        CHECK (match_score >= 0.0 AND match_score <= 1.0),
    score_breakdown JSONB NOT NULL,
    reasons JSONB NOT NULL DEFAULT '[]'::jsonb,
    generation_id TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (posting_id, candidate_id)
);
"#,
    },
    Migration {
        id: 2,
        description: "lookup indexes for listings and dashboards",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_candidates_state_city ON sm.candidates(state, city);
CREATE INDEX IF NOT EXISTS idx_candidates_placement ON sm.candidates(placement_status);
CREATE INDEX IF NOT EXISTS idx_job_postings_status ON sm.job_postings(status);
CREATE INDEX IF NOT EXISTS idx_match_results_candidate ON sm.match_results(candidate_id);
CREATE INDEX IF NOT EXISTS idx_match_results_created ON sm.match_results(created_at DESC, id DESC);
"#,
    },
    Migration {
        id: 3,
        description: "accepted flag on match results",
        sql: r#"
ALTER TABLE sm.match_results ADD COLUMN IF NOT EXISTS accepted BOOLEAN NOT NULL DEFAULT FALSE;
CREATE INDEX IF NOT EXISTS idx_job_postings_employer ON sm.job_postings(employer_id);
"#,
    },
];

/// Applies pending migrations, each in its own transaction. Idempotent.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS sm;
             CREATE TABLE IF NOT EXISTS sm.schema_migrations (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let already_applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM sm.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO sm.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}
