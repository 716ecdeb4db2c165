use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    eligibility::EligibilityFilter,
    reasons::build_reasons,
    scoring::{BusinessRulesEngine, MatchingConfig, ScoreBreakdown},
    weights::Weights,
};
use crate::{Candidate, CandidateId, JobPosting, NewJobPosting, PostingId, error::MatchingError, run_id};

/// One scored (posting, candidate) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub posting_id: PostingId,
    pub candidate_id: CandidateId,
    /// 0.0..=1.0, full precision.
    pub match_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub reasons: Vec<String>,
}

impl MatchResult {
    pub fn match_percentage(&self) -> f64 {
        match_percentage(self.match_score)
    }
}

/// Display value: `score × 100` rounded to one decimal.
pub fn match_percentage(score: f64) -> f64 {
    (score * 1000.0).round() / 10.0
}

/// Optional post-ranking cut: drop results below `min_score`, then keep the
/// first `top_k`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingWindow {
    pub min_score: Option<f64>,
    pub top_k: Option<usize>,
}

impl RankingWindow {
    fn apply(&self, mut results: Vec<MatchResult>) -> Vec<MatchResult> {
        if let Some(min_score) = self.min_score {
            results.retain(|result| result.match_score >= min_score);
        }
        if let Some(top_k) = self.top_k {
            results.truncate(top_k);
        }
        results
    }
}

/// The full output of one generation. Storing it replaces every previous
/// result for the same posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSet {
    pub posting_id: PostingId,
    pub generation_id: String,
    pub generated_at: DateTime<Utc>,
    pub results: Vec<MatchResult>,
}

/// Salary bounds and diploma minimum shared by stored and new postings.
fn check_criteria(
    salary_min: Option<u32>,
    salary_max: Option<u32>,
    minimum_diploma_score: Option<f64>,
) -> Result<(), String> {
    let (min, max) = match (salary_min, salary_max) {
        (Some(min), Some(max)) => (min, max),
        _ => return Err("salary_min and salary_max are both required".into()),
    };
    if min > max {
        return Err(format!("salary_min {min} exceeds salary_max {max}"));
    }
    if let Some(minimum) = minimum_diploma_score {
        if !minimum.is_finite() || !(0.0..=100.0).contains(&minimum) {
            return Err(format!("minimum_diploma_score {minimum} is outside 0-100"));
        }
    }
    Ok(())
}

pub fn validate_posting(posting: &JobPosting) -> Result<(), MatchingError> {
    check_criteria(
        posting.salary_min,
        posting.salary_max,
        posting.minimum_diploma_score,
    )
    .map_err(|reason| MatchingError::invalid_posting(posting.id, reason))
}

pub fn validate_new_posting(posting: &NewJobPosting) -> Result<(), MatchingError> {
    if posting.title.trim().is_empty() {
        return Err(MatchingError::InvalidCriteria {
            reason: "title must not be empty".into(),
        });
    }
    check_criteria(
        posting.salary_min,
        posting.salary_max,
        posting.minimum_diploma_score,
    )
    .map_err(|reason| MatchingError::InvalidCriteria { reason })
}

/// Descending score, then descending diploma score, then ascending id.
fn rank_order(a: &(MatchResult, f64), b: &(MatchResult, f64)) -> Ordering {
    b.0.match_score
        .total_cmp(&a.0.match_score)
        .then_with(|| b.1.total_cmp(&a.1))
        .then_with(|| a.0.candidate_id.cmp(&b.0.candidate_id))
}

/// Ranks a candidate pool for one posting. Stateless apart from its
/// configuration, so one instance can be shared across request tasks.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    rules: BusinessRulesEngine,
    eligibility: EligibilityFilter,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(MatchingConfig::default())
    }
}

impl MatchingEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            eligibility: EligibilityFilter::new(config.eligibility),
            rules: BusinessRulesEngine::new(config),
        }
    }

    /// Like [`MatchingEngine::new`], but rejects a configuration that fails
    /// [`MatchingConfig::validate`].
    pub fn try_new(config: MatchingConfig) -> Result<Self, MatchingError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &MatchingConfig {
        self.rules.config()
    }

    /// Scores a single pair without eligibility or posting checks.
    pub fn score_pair(&self, posting: &JobPosting, candidate: &Candidate) -> MatchResult {
        let score = self.rules.calculate_match_score(posting, candidate);
        MatchResult {
            posting_id: posting.id,
            candidate_id: candidate.id,
            match_score: score.total,
            score_breakdown: score.breakdown(),
            reasons: build_reasons(&score, &self.config().reason_thresholds),
        }
    }

    /// One result per eligible candidate, best first. An empty or fully
    /// placed pool yields an empty list. Fails on an invalid posting or an
    /// invalid engine configuration (non-finite or negative weights).
    pub fn rank_candidates(
        &self,
        posting: &JobPosting,
        pool: &[Candidate],
    ) -> Result<Vec<MatchResult>, MatchingError> {
        self.config().validate()?;
        validate_posting(posting)?;

        let mut scored: Vec<(MatchResult, f64)> = self
            .eligibility
            .filter(pool)
            .into_iter()
            .map(|candidate| (self.score_pair(posting, candidate), candidate.diploma_score))
            .collect();

        scored.sort_by(rank_order);

        Ok(scored.into_iter().map(|(result, _)| result).collect())
    }

    pub fn rank_candidates_windowed(
        &self,
        posting: &JobPosting,
        pool: &[Candidate],
        window: RankingWindow,
    ) -> Result<Vec<MatchResult>, MatchingError> {
        let ranked = self.rank_candidates(posting, pool)?;
        Ok(window.apply(ranked))
    }

    /// Ranks the pool and wraps the results in a new generation.
    pub fn generate(
        &self,
        posting: &JobPosting,
        pool: &[Candidate],
        window: RankingWindow,
    ) -> Result<MatchSet, MatchingError> {
        let results = self.rank_candidates_windowed(posting, pool, window)?;
        let set = MatchSet {
            posting_id: posting.id,
            generation_id: run_id::generate(),
            generated_at: Utc::now(),
            results,
        };

        info!(
            posting_id = posting.id,
            generation_id = %set.generation_id,
            pool_size = pool.len(),
            matches = set.results.len(),
            "generated match set"
        );

        Ok(set)
    }
}

/// Ranks `pool` for `posting` with default settings and the given weights.
/// Weights that are non-finite, negative or sum to zero are rejected.
pub fn compute_matches(
    posting: &JobPosting,
    pool: &[Candidate],
    weights: &Weights,
) -> Result<Vec<MatchResult>, MatchingError> {
    weights.validate()?;
    let engine = MatchingEngine::try_new(MatchingConfig {
        weights: *weights,
        ..MatchingConfig::default()
    })?;
    engine.rank_candidates(posting, pool)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;
    use crate::{PlacementStatus, error::ConfigError, matching::weights::DEFAULT_WEIGHTS};

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn posting() -> JobPosting {
        JobPosting {
            id: 7,
            title: "Solar Technician".into(),
            city: "Jaipur".into(),
            state: "Rajasthan".into(),
            salary_min: Some(18_000),
            salary_max: Some(30_000),
            experience_required: 2,
            minimum_diploma_score: Some(60.0),
            required_skills: set(&["Solar Panel Installation", "Wiring", "Safety"]),
            ..JobPosting::default()
        }
    }

    fn candidate(id: i64, city: &str, state: &str, skills: &[&str]) -> Candidate {
        Candidate {
            id,
            name: format!("candidate-{id}"),
            city: city.into(),
            state: state.into(),
            diploma_score: 75.0,
            experience_years: 2,
            skills: set(skills),
            preferred_salary_min: Some(20_000),
            preferred_salary_max: Some(26_000),
            ..Candidate::default()
        }
    }

    #[test]
    fn same_city_outranks_other_state_with_identical_profile() {
        let skills = ["Solar Panel Installation", "Wiring", "Safety"];
        let a = candidate(1, "Jaipur", "Rajasthan", &skills);
        let b = candidate(2, "Chennai", "Tamil Nadu", &skills);

        let results = MatchingEngine::default()
            .rank_candidates(&posting(), &[b, a])
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].candidate_id, 1);
        assert!(results[0].match_score > results[1].match_score);
        assert_eq!(results[0].score_breakdown.location, 100.0);
        assert_eq!(results[1].score_breakdown.location, 20.0);
    }

    #[test]
    fn placed_candidates_are_excluded() {
        let mut placed = candidate(1, "Jaipur", "Rajasthan", &["Wiring"]);
        placed.placement_status = PlacementStatus::Placed;
        let available = candidate(2, "Jaipur", "Rajasthan", &["Wiring"]);

        let results = MatchingEngine::default()
            .rank_candidates(&posting(), &[placed.clone(), available])
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].candidate_id, 2);

        let only_placed = MatchingEngine::default()
            .rank_candidates(&posting(), &[placed])
            .unwrap();
        assert!(only_placed.is_empty());
    }

    #[test]
    fn empty_pool_is_not_an_error() {
        let results = MatchingEngine::default()
            .rank_candidates(&posting(), &[])
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn ties_break_by_diploma_then_id() {
        let skills = ["Solar Panel Installation", "Wiring", "Safety"];
        let mut high = candidate(9, "Jaipur", "Rajasthan", &skills);
        high.diploma_score = 95.0;
        let low_a = candidate(3, "Jaipur", "Rajasthan", &skills);
        let low_b = candidate(2, "Jaipur", "Rajasthan", &skills);

        // Diploma is capped at 100 above the minimum, so all three tie on score.
        let results = MatchingEngine::default()
            .rank_candidates(&posting(), &[low_a, high, low_b])
            .unwrap();
        let ids: Vec<i64> = results.iter().map(|r| r.candidate_id).collect();
        assert_eq!(ids, vec![9, 2, 3]);
        assert_eq!(results[0].match_score, results[2].match_score);
    }

    #[test]
    fn invalid_salary_bounds_are_rejected() {
        let mut inverted = posting();
        inverted.salary_min = Some(40_000);
        let err = MatchingEngine::default()
            .rank_candidates(&inverted, &[candidate(1, "Jaipur", "Rajasthan", &[])])
            .unwrap_err();
        assert!(matches!(err, MatchingError::InvalidPosting { posting_id: 7, .. }));

        let mut missing = posting();
        missing.salary_max = None;
        assert!(validate_posting(&missing).is_err());

        let mut diploma = posting();
        diploma.minimum_diploma_score = Some(f64::NAN);
        assert!(validate_posting(&diploma).is_err());
    }

    #[test]
    fn new_posting_validation_uses_same_rules() {
        let ok = NewJobPosting {
            title: "Solar Technician".into(),
            salary_min: Some(1),
            salary_max: Some(1),
            ..NewJobPosting::default()
        };
        assert!(validate_new_posting(&ok).is_ok());

        let bad = NewJobPosting {
            minimum_diploma_score: Some(120.0),
            ..ok.clone()
        };
        assert!(matches!(
            validate_new_posting(&bad),
            Err(MatchingError::InvalidCriteria { .. })
        ));

        let untitled = NewJobPosting {
            title: "  ".into(),
            ..ok
        };
        assert!(validate_new_posting(&untitled).is_err());
    }

    #[test]
    fn window_filters_then_truncates() {
        let pool: Vec<Candidate> = vec![
            candidate(1, "Jaipur", "Rajasthan", &["Solar Panel Installation", "Wiring", "Safety"]),
            candidate(2, "Udaipur", "Rajasthan", &["Wiring"]),
            candidate(3, "Chennai", "Tamil Nadu", &[]),
        ];
        let engine = MatchingEngine::default();
        let all = engine.rank_candidates(&posting(), &pool).unwrap();
        assert_eq!(all.len(), 3);

        let top = engine
            .rank_candidates_windowed(
                &posting(),
                &pool,
                RankingWindow {
                    min_score: None,
                    top_k: Some(1),
                },
            )
            .unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0], all[0]);

        let threshold = all[1].match_score;
        let above = engine
            .rank_candidates_windowed(
                &posting(),
                &pool,
                RankingWindow {
                    min_score: Some(threshold),
                    top_k: None,
                },
            )
            .unwrap();
        assert_eq!(above.len(), 2);
    }

    #[test]
    fn generate_stamps_a_fresh_generation() {
        let engine = MatchingEngine::default();
        let pool = vec![candidate(1, "Jaipur", "Rajasthan", &["Wiring"])];
        let first = engine
            .generate(&posting(), &pool, RankingWindow::default())
            .unwrap();
        let second = engine
            .generate(&posting(), &pool, RankingWindow::default())
            .unwrap();

        assert_eq!(first.posting_id, 7);
        assert_ne!(first.generation_id, second.generation_id);
        assert_eq!(first.results, second.results);
    }

    #[test]
    fn match_percentage_rounds_to_one_decimal() {
        assert_eq!(match_percentage(0.8567), 85.7);
        assert_eq!(match_percentage(1.0), 100.0);
        assert_eq!(match_percentage(0.0), 0.0);
    }

    #[test]
    fn compute_matches_honours_weights() {
        let skills_only = Weights {
            skills: 1.0,
            location: 0.0,
            salary: 0.0,
            experience: 0.0,
            diploma: 0.0,
        };
        let pool = vec![
            candidate(1, "Chennai", "Tamil Nadu", &["Solar Panel Installation", "Wiring", "Safety"]),
            candidate(2, "Jaipur", "Rajasthan", &["Wiring"]),
        ];
        let results = compute_matches(&posting(), &pool, &skills_only).unwrap();
        assert_eq!(results[0].candidate_id, 1);
        assert!((results[0].match_score - 1.0).abs() < 1e-9);

        let default = compute_matches(&posting(), &pool, &DEFAULT_WEIGHTS).unwrap();
        assert_eq!(default.len(), 2);
    }

    #[test]
    fn compute_matches_rejects_invalid_weights() {
        let pool = vec![candidate(1, "Jaipur", "Rajasthan", &["Wiring"])];

        let nan = Weights {
            skills: f64::NAN,
            ..DEFAULT_WEIGHTS
        };
        let err = compute_matches(&posting(), &pool, &nan).unwrap_err();
        assert!(matches!(
            err,
            MatchingError::InvalidConfig(ConfigError::InvalidValue { .. })
        ));

        let negative = Weights {
            skills: -5.0,
            location: 3.0,
            ..DEFAULT_WEIGHTS
        };
        assert!(matches!(
            compute_matches(&posting(), &pool, &negative),
            Err(MatchingError::InvalidConfig(_))
        ));

        let zero = Weights {
            skills: 0.0,
            location: 0.0,
            salary: 0.0,
            experience: 0.0,
            diploma: 0.0,
        };
        assert!(compute_matches(&posting(), &pool, &zero).is_err());
    }

    #[test]
    fn engine_built_from_unchecked_config_refuses_to_rank() {
        let config = MatchingConfig {
            weights: Weights {
                salary: f64::INFINITY,
                ..DEFAULT_WEIGHTS
            },
            ..MatchingConfig::default()
        };
        assert!(MatchingEngine::try_new(config.clone()).is_err());

        let pool = vec![candidate(1, "Jaipur", "Rajasthan", &["Wiring"])];
        let err = MatchingEngine::new(config)
            .rank_candidates(&posting(), &pool)
            .unwrap_err();
        assert!(matches!(err, MatchingError::InvalidConfig(_)));
    }

    const SKILLS: [&str; 6] = ["Solar Panel Installation", "Wiring", "Safety", "Welding", "Excel", "Driving"];
    const PLACES: [(&str, &str); 4] = [
        ("Jaipur", "Rajasthan"),
        ("Udaipur", "Rajasthan"),
        ("Pune", "Maharashtra"),
        ("Chennai", "Tamil Nadu"),
    ];

    fn arb_candidate() -> impl Strategy<Value = Candidate> {
        (
            1i64..500,
            0usize..PLACES.len(),
            0.0f64..=100.0,
            0u32..10,
            prop::collection::btree_set(0usize..SKILLS.len(), 0..=4),
            prop::option::of(10_000u32..40_000),
            0u8..3,
        )
            .prop_map(|(id, place, diploma, years, skills, salary, status)| Candidate {
                id,
                name: format!("c{id}"),
                city: PLACES[place].0.into(),
                state: PLACES[place].1.into(),
                diploma_score: diploma,
                experience_years: years,
                skills: skills.into_iter().map(|i| SKILLS[i].to_string()).collect(),
                preferred_salary_min: salary,
                preferred_salary_max: salary.map(|s| s + 2_000),
                placement_status: match status {
                    0 => PlacementStatus::Available,
                    1 => PlacementStatus::Placed,
                    _ => PlacementStatus::NotPlaced,
                },
                ..Candidate::default()
            })
    }

    /// Pools with unique ids, as a store would return them.
    fn arb_pool() -> impl Strategy<Value = Vec<Candidate>> {
        prop::collection::vec(arb_candidate(), 0..20).prop_map(|mut pool| {
            for (index, candidate) in pool.iter_mut().enumerate() {
                candidate.id = index as i64 + 1;
            }
            pool
        })
    }

    proptest! {
        #[test]
        fn ranking_is_deterministic_and_sorted(pool in arb_pool()) {
            let engine = MatchingEngine::default();
            let first = engine.rank_candidates(&posting(), &pool).unwrap();

            let mut reversed = pool.clone();
            reversed.reverse();
            let second = engine.rank_candidates(&posting(), &reversed).unwrap();

            prop_assert_eq!(&first, &second);
            for pair in first.windows(2) {
                prop_assert!(pair[0].match_score >= pair[1].match_score);
            }
            for result in &first {
                prop_assert!((0.0..=1.0).contains(&result.match_score));
            }
        }

        #[test]
        fn only_available_candidates_are_ranked(pool in arb_pool()) {
            let results = MatchingEngine::default().rank_candidates(&posting(), &pool).unwrap();
            let available = pool.iter().filter(|c| c.is_available()).count();
            prop_assert_eq!(results.len(), available);
        }

        #[test]
        fn gaining_a_required_skill_never_lowers_the_score(
            candidate in arb_candidate(),
            skill in 0usize..3,
        ) {
            let engine = MatchingEngine::default();
            let before = engine.score_pair(&posting(), &candidate);

            let mut improved = candidate.clone();
            improved.skills.insert(SKILLS[skill].to_string());
            let after = engine.score_pair(&posting(), &improved);

            prop_assert!(after.match_score >= before.match_score);
        }
    }
}
