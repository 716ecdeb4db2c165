use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Candidate, CandidateId, JobPosting, PostingId, StoredMatch,
    matching::{MatchResult, MatchSet, ScoreBreakdown, match_percentage},
};

/// One ranked candidate as returned to the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub posting_id: PostingId,
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub city: String,
    pub state: String,
    pub diploma_score: f64,
    pub match_score: f64,
    pub match_percentage: f64,
    pub score_breakdown: ScoreBreakdown,
    pub reasons: Vec<String>,
}

impl MatchResponse {
    pub fn from_result(result: &MatchResult, candidate: Option<&Candidate>) -> Self {
        Self {
            posting_id: result.posting_id,
            candidate_id: result.candidate_id,
            candidate_name: candidate.map(|c| c.name.clone()).unwrap_or_default(),
            city: candidate.map(|c| c.city.clone()).unwrap_or_default(),
            state: candidate.map(|c| c.state.clone()).unwrap_or_default(),
            diploma_score: candidate.map(|c| c.diploma_score).unwrap_or_default(),
            match_score: result.match_score,
            match_percentage: result.match_percentage(),
            score_breakdown: result.score_breakdown,
            reasons: result.reasons.clone(),
        }
    }
}

/// Body of `GET /api/postings/:id/matches`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSetResponse {
    pub posting_id: PostingId,
    pub job_title: String,
    pub generation_id: String,
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub matches: Vec<MatchResponse>,
}

impl MatchSetResponse {
    pub fn new(posting: &JobPosting, set: &MatchSet, pool: &[Candidate]) -> Self {
        let matches: Vec<MatchResponse> = set
            .results
            .iter()
            .map(|result| {
                let candidate = pool.iter().find(|c| c.id == result.candidate_id);
                MatchResponse::from_result(result, candidate)
            })
            .collect();

        Self {
            posting_id: set.posting_id,
            job_title: posting.title.clone(),
            generation_id: set.generation_id.clone(),
            generated_at: set.generated_at,
            total: matches.len(),
            matches,
        }
    }
}

/// A stored match as listed in a candidate's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchHistoryEntry {
    pub id: i64,
    pub posting_id: PostingId,
    pub job_title: String,
    pub match_score: f64,
    pub match_percentage: f64,
    pub score_breakdown: ScoreBreakdown,
    pub reasons: Vec<String>,
    pub generation_id: String,
    pub created_at: DateTime<Utc>,
    pub accepted: bool,
}

impl MatchHistoryEntry {
    pub fn new(stored: &StoredMatch, job_title: impl Into<String>) -> Self {
        Self {
            id: stored.id,
            posting_id: stored.posting_id,
            job_title: job_title.into(),
            match_score: stored.match_score,
            match_percentage: match_percentage(stored.match_score),
            score_breakdown: stored.score_breakdown,
            reasons: stored.reasons.clone(),
            generation_id: stored.generation_id.clone(),
            created_at: stored.created_at,
            accepted: stored.accepted,
        }
    }
}
