use std::str::FromStr;

use deadpool_postgres::{Config, CreatePoolError, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime};
use thiserror::Error;
use tokio_postgres::NoTls;

pub type PgPool = Pool;

#[derive(Debug, Error)]
pub enum DbPoolError {
    #[error("invalid database url: {0}")]
    InvalidConfig(String),
    #[error("failed to create database pool: {0}")]
    PoolCreation(#[from] CreatePoolError),
    #[error("database is unreachable: {0}")]
    Unreachable(#[from] PoolError),
    #[error("database ping failed: {0}")]
    Ping(#[from] tokio_postgres::Error),
}

/// Builds a lazily connecting pool. No connection is attempted here.
pub fn create_pool_from_url(db_url: &str) -> Result<PgPool, DbPoolError> {
    tokio_postgres::Config::from_str(db_url)
        .map_err(|e| DbPoolError::InvalidConfig(e.to_string()))?;

    let mut cfg = Config::new();
    cfg.url = Some(db_url.to_string());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(DbPoolError::PoolCreation)
}

/// Like [`create_pool_from_url`], then checks out one connection and runs
/// `SELECT 1` so a bad URL or an unreachable server fails at startup.
pub async fn create_pool_from_url_checked(db_url: &str) -> Result<PgPool, DbPoolError> {
    let pool = create_pool_from_url(db_url)?;
    let client = pool.get().await?;
    client.simple_query("SELECT 1").await?;
    drop(client);
    Ok(pool)
}
