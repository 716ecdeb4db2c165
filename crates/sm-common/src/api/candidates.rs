use serde::{Deserialize, Serialize};

use super::{QueryError, match_response::MatchHistoryEntry};
use crate::{Candidate, Category, PostingId, store::CandidateFilter};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Query string of `GET /api/candidates`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateListQuery {
    pub state: Option<String>,
    pub city: Option<String>,
    /// Any spelling accepted by the category corrector ("Gen", "obc", ...).
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl CandidateListQuery {
    pub fn filter(&self) -> Result<CandidateFilter, QueryError> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<Category>()
                    .map_err(|err| QueryError::invalid("category", err.to_string()))?,
            ),
        };

        Ok(CandidateFilter {
            state: self.state.clone(),
            city: self.city.clone(),
            category,
            search: self.search.clone(),
        })
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    /// Slices an already filtered, ordered listing.
    pub fn from_vec(all: Vec<T>, limit: usize, offset: usize) -> Self {
        let total = all.len();
        let items = all.into_iter().skip(offset).take(limit).collect();
        Self {
            items,
            total,
            limit,
            offset,
        }
    }
}

/// Body of `GET /api/candidates/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDetail {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub match_history: Vec<MatchHistoryEntry>,
}

/// Body of `POST /api/candidates/:id/placement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub posting_id: PostingId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_aliases() {
        let query = CandidateListQuery {
            category: Some("Gen".into()),
            ..CandidateListQuery::default()
        };
        assert_eq!(query.filter().unwrap().category, Some(Category::General));

        let bad = CandidateListQuery {
            category: Some("Martian".into()),
            ..CandidateListQuery::default()
        };
        assert!(bad.filter().is_err());
    }

    #[test]
    fn paginates_with_clamped_limit() {
        let query = CandidateListQuery {
            limit: Some(1_000),
            offset: Some(2),
            ..CandidateListQuery::default()
        };
        assert_eq!(query.limit(), MAX_PAGE_SIZE);

        let page = Page::from_vec((1..=5).collect::<Vec<i32>>(), 2, query.offset());
        assert_eq!(page.items, vec![3, 4]);
        assert_eq!(page.total, 5);
    }
}
