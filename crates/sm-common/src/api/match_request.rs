use serde::{Deserialize, Serialize};

use super::QueryError;
use crate::matching::RankingWindow;

pub const DEFAULT_TOP_K: usize = 10;
pub const MAX_TOP_K: usize = 200;

/// Query string of `GET /api/postings/:id/matches`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchQuery {
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub min_score: Option<f64>,
}

impl MatchQuery {
    /// `top_k` defaults to 10 and is clamped to 1..=200; `min_score` must lie
    /// in 0.0..=1.0.
    pub fn window(&self) -> Result<RankingWindow, QueryError> {
        if let Some(min_score) = self.min_score {
            if !min_score.is_finite() || !(0.0..=1.0).contains(&min_score) {
                return Err(QueryError::invalid(
                    "min_score",
                    format!("must be between 0 and 1, got {min_score}"),
                ));
            }
        }

        Ok(RankingWindow {
            min_score: self.min_score,
            top_k: Some(self.top_k.unwrap_or(DEFAULT_TOP_K).clamp(1, MAX_TOP_K)),
        })
    }
}
