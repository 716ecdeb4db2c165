use serde::{Deserialize, Serialize};

use super::QueryError;
use crate::{EmployerId, JobPosting, PostingStatus};

/// Query string of `GET /api/postings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostingListQuery {
    pub status: Option<String>,
    pub employer_id: Option<EmployerId>,
}

impl PostingListQuery {
    /// Applies the status and employer filters; both are optional.
    pub fn filter(&self, postings: Vec<JobPosting>) -> Result<Vec<JobPosting>, QueryError> {
        let status = self.status()?;
        Ok(postings
            .into_iter()
            .filter(|posting| status.is_none_or(|status| posting.status == status))
            .filter(|posting| {
                self.employer_id
                    .is_none_or(|employer_id| posting.employer_id == employer_id)
            })
            .collect())
    }

    pub fn status(&self) -> Result<Option<PostingStatus>, QueryError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<PostingStatus>()
                .map(Some)
                .map_err(|err| QueryError::invalid("status", err.to_string())),
        }
    }
}

/// Body of `PATCH /api/postings/:id/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: PostingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_is_optional_and_validated() {
        assert_eq!(PostingListQuery::default().status().unwrap(), None);

        let active = PostingListQuery {
            status: Some("Active".into()),
            ..PostingListQuery::default()
        };
        assert_eq!(active.status().unwrap(), Some(PostingStatus::Active));

        let bad = PostingListQuery {
            status: Some("archived".into()),
            ..PostingListQuery::default()
        };
        assert!(bad.status().is_err());
    }

    #[test]
    fn filters_by_status_and_employer() {
        let posting = |id, employer_id, status| JobPosting {
            id,
            employer_id,
            status,
            ..JobPosting::default()
        };
        let postings = vec![
            posting(1, 10, PostingStatus::Active),
            posting(2, 10, PostingStatus::Closed),
            posting(3, 11, PostingStatus::Active),
        ];

        let ids = |query: PostingListQuery| -> Vec<i64> {
            query
                .filter(postings.clone())
                .unwrap()
                .iter()
                .map(|p| p.id)
                .collect()
        };

        assert_eq!(ids(PostingListQuery::default()), vec![1, 2, 3]);
        assert_eq!(
            ids(PostingListQuery {
                employer_id: Some(10),
                ..PostingListQuery::default()
            }),
            vec![1, 2]
        );
        assert_eq!(
            ids(PostingListQuery {
                status: Some("active".into()),
                employer_id: Some(10),
            }),
            vec![1]
        );
    }
}
