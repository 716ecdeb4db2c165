pub mod candidates;
pub mod match_results;
pub mod migrations;
pub mod pool;
pub mod postings;
pub mod store;
pub mod util;

use std::str::FromStr;

use crate::store::StoreError;

pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPoolError, PgPool, create_pool_from_url, create_pool_from_url_checked};
pub use store::PgStore;

/// Stored labels (category, statuses) back into their enums.
pub(crate) fn parse_label<T: FromStr>(column: &'static str, raw: String) -> Result<T, StoreError> {
    raw.parse::<T>()
        .map_err(|_| StoreError::Mapping { column, value: raw })
}

/// INTEGER columns hold non-negative counts and amounts.
pub(crate) fn column_u32(column: &'static str, value: i32) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Mapping {
        column,
        value: value.to_string(),
    })
}

pub(crate) fn column_i32(column: &'static str, value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::Mapping {
        column,
        value: value.to_string(),
    })
}
