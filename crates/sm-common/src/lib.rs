pub mod api;
pub mod corrections;
pub mod db;
pub mod enums;
pub mod error;
pub mod logging;
pub mod matching;
pub mod run_id;
pub mod skill_normalizer;
pub mod stats;
pub mod store;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use enums::{Category, PlacementStatus, PostingStatus, TrainingResult, UnknownLabel};

use matching::{MatchResult, MatchSet, ScoreBreakdown, match_percentage};

pub type CandidateId = i64;
pub type PostingId = i64;
pub type EmployerId = i64;

// Data models shared by the matching engine, the aggregator and the stores.

/// A job seeker profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub qualifications: String,
    /// 0–100
    pub diploma_score: f64,
    #[serde(default)]
    pub experience_years: u32,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub training_result: TrainingResult,
    #[serde(default)]
    pub placement_status: PlacementStatus,
    #[serde(default)]
    pub skills: BTreeSet<String>,
    #[serde(default)]
    pub preferred_salary_min: Option<u32>,
    #[serde(default)]
    pub preferred_salary_max: Option<u32>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    pub fn is_available(&self) -> bool {
        self.placement_status == PlacementStatus::Available
    }

    /// Expected monthly compensation inferred from the preferred salary band:
    /// the midpoint when both bounds are known, otherwise whichever bound exists.
    pub fn expected_salary(&self) -> Option<f64> {
        match (self.preferred_salary_min, self.preferred_salary_max) {
            (Some(min), Some(max)) => Some((f64::from(min) + f64::from(max)) / 2.0),
            (Some(value), None) | (None, Some(value)) => Some(f64::from(value)),
            (None, None) => None,
        }
    }
}

/// An employer-authored opening.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: PostingId,
    #[serde(default)]
    pub employer_id: EmployerId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_qualifications: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub salary_min: Option<u32>,
    #[serde(default)]
    pub salary_max: Option<u32>,
    #[serde(default)]
    pub experience_required: u32,
    #[serde(default)]
    pub minimum_diploma_score: Option<f64>,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    #[serde(default)]
    pub preferred_skills: BTreeSet<String>,
    #[serde(default)]
    pub status: PostingStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn is_active(&self) -> bool {
        self.status == PostingStatus::Active
    }
}

/// Payload for creating a posting; the store assigns the id and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewJobPosting {
    #[serde(default)]
    pub employer_id: EmployerId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_qualifications: String,
    pub city: String,
    pub state: String,
    pub salary_min: Option<u32>,
    pub salary_max: Option<u32>,
    #[serde(default)]
    pub experience_required: u32,
    #[serde(default)]
    pub minimum_diploma_score: Option<f64>,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    #[serde(default)]
    pub preferred_skills: BTreeSet<String>,
    #[serde(default)]
    pub status: PostingStatus,
}

impl NewJobPosting {
    pub fn into_posting(self, id: PostingId, now: DateTime<Utc>) -> JobPosting {
        JobPosting {
            id,
            employer_id: self.employer_id,
            title: self.title,
            description: self.description,
            required_qualifications: self.required_qualifications,
            city: self.city,
            state: self.state,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            experience_required: self.experience_required,
            minimum_diploma_score: self.minimum_diploma_score,
            required_skills: self.required_skills,
            preferred_skills: self.preferred_skills,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A persisted match result, tagged with the generation that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMatch {
    pub id: i64,
    pub posting_id: PostingId,
    pub candidate_id: CandidateId,
    pub match_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub reasons: Vec<String>,
    pub generation_id: String,
    pub created_at: DateTime<Utc>,
    /// Set once the candidate is placed through this match; accepted rows
    /// outlive later generations.
    #[serde(default)]
    pub accepted: bool,
}

impl StoredMatch {
    pub fn from_result(id: i64, set: &MatchSet, result: &MatchResult) -> Self {
        Self {
            id,
            posting_id: result.posting_id,
            candidate_id: result.candidate_id,
            match_score: result.match_score,
            score_breakdown: result.score_breakdown,
            reasons: result.reasons.clone(),
            generation_id: set.generation_id.clone(),
            created_at: set.generated_at,
            accepted: false,
        }
    }

    pub fn match_percentage(&self) -> f64 {
        match_percentage(self.match_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_salary_uses_midpoint_or_single_bound() {
        let mut candidate = Candidate {
            preferred_salary_min: Some(20_000),
            preferred_salary_max: Some(30_000),
            ..Candidate::default()
        };
        assert_eq!(candidate.expected_salary(), Some(25_000.0));

        candidate.preferred_salary_max = None;
        assert_eq!(candidate.expected_salary(), Some(20_000.0));

        candidate.preferred_salary_min = None;
        assert_eq!(candidate.expected_salary(), None);
    }

    #[test]
    fn deserializes_candidate_with_original_labels() {
        let json = serde_json::json!({
            "id": 7,
            "name": "Asha",
            "city": "Pune",
            "state": "Maharashtra",
            "diploma_score": 78.5,
            "category": "Gen",
            "placement_status": "Not Placed",
            "skills": ["Solar Panel Installation", "Safety", "Safety"]
        });

        let candidate: Candidate = serde_json::from_value(json).unwrap();
        assert_eq!(candidate.category, Category::General);
        assert_eq!(candidate.placement_status, PlacementStatus::NotPlaced);
        assert_eq!(candidate.skills.len(), 2);
        assert!(!candidate.is_available());
    }

    #[test]
    fn new_posting_keeps_criteria() {
        let now = Utc::now();
        let posting = NewJobPosting {
            title: "Solar Technician".into(),
            city: "Jaipur".into(),
            state: "Rajasthan".into(),
            salary_min: Some(18_000),
            salary_max: Some(30_000),
            ..NewJobPosting::default()
        }
        .into_posting(3, now);

        assert_eq!(posting.id, 3);
        assert_eq!(posting.salary_max, Some(30_000));
        assert_eq!(posting.created_at, now);
        assert!(posting.is_active());
    }
}
