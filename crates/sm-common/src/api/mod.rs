//! Request and response shapes of the admin console API.

pub mod candidates;
pub mod match_request;
pub mod match_response;
pub mod postings;

use thiserror::Error;

pub use candidates::{CandidateDetail, CandidateListQuery, Page, PlacementRequest};
pub use match_request::MatchQuery;
pub use match_response::{MatchHistoryEntry, MatchResponse, MatchSetResponse};
pub use postings::{PostingListQuery, StatusUpdateRequest};

/// A query parameter that parsed but is out of range or unknown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {message}")]
pub struct QueryError {
    pub field: &'static str,
    pub message: String,
}

impl QueryError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
