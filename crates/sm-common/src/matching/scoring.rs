use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{
    eligibility::EligibilityConfig,
    location::{LocationScores, evaluate_location},
    reasons::ReasonThresholds,
    salary::score_salary,
    skills::{check_preferred_skills, check_required_skills},
    weights::{DEFAULT_WEIGHTS, Dimension, Weights},
};
use crate::{Candidate, JobPosting, error::ConfigError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub weights: Weights,
    pub eligibility: EligibilityConfig,
    /// Full skills base when a posting lists no required skills.
    pub vacuous_skill_match: bool,
    pub preferred_skill_bonus: f64,
    pub preferred_skill_bonus_cap: f64,
    pub location: LocationScores,
    pub salary_falloff_ratio: f64,
    pub neutral_salary_score: f64,
    pub reason_thresholds: ReasonThresholds,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
            eligibility: EligibilityConfig::default(),
            vacuous_skill_match: true,
            preferred_skill_bonus: 5.0,
            preferred_skill_bonus_cap: 10.0,
            location: LocationScores::default(),
            salary_falloff_ratio: 0.5,
            neutral_salary_score: 50.0,
            reason_thresholds: ReasonThresholds::default(),
        }
    }
}

impl MatchingConfig {
    /// Reads `SM_*` overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Absent or unparsable values keep their defaults; the merged result is
    /// validated as a whole.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let f = |key: &str, default: f64| parse_or(&lookup, key, default);
        let b = |key: &str, default: bool| parse_or(&lookup, key, default);

        let config = Self {
            weights: Weights {
                skills: f("SM_WEIGHT_SKILLS", defaults.weights.skills),
                location: f("SM_WEIGHT_LOCATION", defaults.weights.location),
                salary: f("SM_WEIGHT_SALARY", defaults.weights.salary),
                experience: f("SM_WEIGHT_EXPERIENCE", defaults.weights.experience),
                diploma: f("SM_WEIGHT_DIPLOMA", defaults.weights.diploma),
            },
            eligibility: EligibilityConfig {
                require_available: b(
                    "SM_REQUIRE_AVAILABLE",
                    defaults.eligibility.require_available,
                ),
            },
            vacuous_skill_match: b("SM_VACUOUS_SKILL_MATCH", defaults.vacuous_skill_match),
            preferred_skill_bonus: f("SM_PREFERRED_SKILL_BONUS", defaults.preferred_skill_bonus),
            preferred_skill_bonus_cap: f(
                "SM_PREFERRED_SKILL_BONUS_CAP",
                defaults.preferred_skill_bonus_cap,
            ),
            location: LocationScores {
                same_city: f("SM_LOCATION_SAME_CITY", defaults.location.same_city),
                same_state: f("SM_LOCATION_SAME_STATE", defaults.location.same_state),
                other_state: f("SM_LOCATION_OTHER_STATE", defaults.location.other_state),
            },
            salary_falloff_ratio: f("SM_SALARY_FALLOFF_RATIO", defaults.salary_falloff_ratio),
            neutral_salary_score: f("SM_NEUTRAL_SALARY_SCORE", defaults.neutral_salary_score),
            reason_thresholds: ReasonThresholds {
                strong: f("SM_REASON_STRONG", defaults.reason_thresholds.strong),
                adequate: f("SM_REASON_ADEQUATE", defaults.reason_thresholds.adequate),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;

        check_range("location.same_city", self.location.same_city, 0.0, 100.0)?;
        check_range("location.same_state", self.location.same_state, 0.0, 100.0)?;
        check_range("location.other_state", self.location.other_state, 0.0, 100.0)?;
        check_range("preferred_skill_bonus", self.preferred_skill_bonus, 0.0, 100.0)?;
        check_range(
            "preferred_skill_bonus_cap",
            self.preferred_skill_bonus_cap,
            0.0,
            100.0,
        )?;
        check_range("salary_falloff_ratio", self.salary_falloff_ratio, 0.0, 10.0)?;
        check_range("neutral_salary_score", self.neutral_salary_score, 0.0, 100.0)?;
        check_range("reason_thresholds.strong", self.reason_thresholds.strong, 0.0, 100.0)?;
        check_range(
            "reason_thresholds.adequate",
            self.reason_thresholds.adequate,
            0.0,
            100.0,
        )?;

        if self.reason_thresholds.adequate > self.reason_thresholds.strong {
            return Err(ConfigError::ThresholdOrder {
                adequate: self.reason_thresholds.adequate,
                strong: self.reason_thresholds.strong,
            });
        }

        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, "ignoring unparsable matching option, using default");
                default
            }
        },
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        });
    }
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// One dimension's sub-score (0–100) with a short explanation.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionScore {
    pub score: f64,
    pub details: String,
}

/// Per-dimension sub-scores as exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills: f64,
    pub location: f64,
    pub salary: f64,
    pub experience: f64,
    pub diploma: f64,
}

impl ScoreBreakdown {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Skills => self.skills,
            Dimension::Location => self.location,
            Dimension::Salary => self.salary,
            Dimension::Experience => self.experience,
            Dimension::Diploma => self.diploma,
        }
    }

    /// `Σ(wᵢ × sᵢ) / (100 × Σwᵢ)`, in 0.0..=1.0.
    pub fn weighted_total(&self, weights: &Weights) -> f64 {
        let sum = weights.sum();
        if sum <= 0.0 {
            return 0.0;
        }
        let weighted: f64 = Dimension::ALL
            .into_iter()
            .map(|dimension| weights.get(dimension) * self.get(dimension))
            .sum();
        (weighted / (100.0 * sum)).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    /// Aggregate score, 0.0..=1.0.
    pub total: f64,
    pub skills: DimensionScore,
    pub location: DimensionScore,
    pub salary: DimensionScore,
    pub experience: DimensionScore,
    pub diploma: DimensionScore,
}

impl MatchScore {
    pub fn get(&self, dimension: Dimension) -> &DimensionScore {
        match dimension {
            Dimension::Skills => &self.skills,
            Dimension::Location => &self.location,
            Dimension::Salary => &self.salary,
            Dimension::Experience => &self.experience,
            Dimension::Diploma => &self.diploma,
        }
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        ScoreBreakdown {
            skills: self.skills.score,
            location: self.location.score,
            salary: self.salary.score,
            experience: self.experience.score,
            diploma: self.diploma.score,
        }
    }
}

/// Scores one (posting, candidate) pair. Does not check eligibility or
/// posting validity; the pipeline does that first.
#[derive(Debug, Clone)]
pub struct BusinessRulesEngine {
    config: MatchingConfig,
}

impl BusinessRulesEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn calculate_match_score(&self, posting: &JobPosting, candidate: &Candidate) -> MatchScore {
        let skills = self.score_skills(posting, candidate);
        let location = self.score_location(posting, candidate);
        let salary = self.score_salary(posting, candidate);
        let experience = self.score_experience(posting, candidate);
        let diploma = self.score_diploma(posting, candidate);

        let mut score = MatchScore {
            total: 0.0,
            skills,
            location,
            salary,
            experience,
            diploma,
        };
        score.total = score.breakdown().weighted_total(&self.config.weights);
        score
    }

    fn score_skills(&self, posting: &JobPosting, candidate: &Candidate) -> DimensionScore {
        let required = check_required_skills(
            &posting.required_skills,
            &candidate.skills,
            self.config.vacuous_skill_match,
        );
        let preferred = check_preferred_skills(&posting.preferred_skills, &candidate.skills);

        let bonus = (preferred.matched_skills.len() as f64 * self.config.preferred_skill_bonus)
            .min(self.config.preferred_skill_bonus_cap);
        let score = (100.0 * required.match_ratio + bonus).clamp(0.0, 100.0);

        let details = if preferred.matched_skills.is_empty() {
            required.reason
        } else {
            format!(
                "{}; preferred: {} (+{:.0})",
                required.reason,
                preferred.matched_skills.join(", "),
                bonus
            )
        };

        DimensionScore { score, details }
    }

    fn score_location(&self, posting: &JobPosting, candidate: &Candidate) -> DimensionScore {
        let evaluation = evaluate_location(posting, candidate, &self.config.location);
        DimensionScore {
            score: evaluation.score,
            details: evaluation.details,
        }
    }

    fn score_salary(&self, posting: &JobPosting, candidate: &Candidate) -> DimensionScore {
        let (Some(min), Some(max)) = (posting.salary_min, posting.salary_max) else {
            // Validated postings always carry both bounds.
            return DimensionScore {
                score: self.config.neutral_salary_score,
                details: "posting salary range unknown (neutral)".into(),
            };
        };

        let evaluation = score_salary(
            min,
            max,
            candidate.expected_salary(),
            self.config.salary_falloff_ratio,
            self.config.neutral_salary_score,
        );
        DimensionScore {
            score: evaluation.score,
            details: evaluation.details,
        }
    }

    fn score_experience(&self, posting: &JobPosting, candidate: &Candidate) -> DimensionScore {
        let required = posting.experience_required;
        let years = candidate.experience_years;

        if required == 0 {
            return DimensionScore {
                score: 100.0,
                details: "no experience required".into(),
            };
        }
        if years >= required {
            return DimensionScore {
                score: 100.0,
                details: format!("{years} years (requires {required})"),
            };
        }

        DimensionScore {
            score: 100.0 * f64::from(years) / f64::from(required),
            details: format!("{years} of {required} required years"),
        }
    }

    fn score_diploma(&self, posting: &JobPosting, candidate: &Candidate) -> DimensionScore {
        let diploma = candidate.diploma_score.clamp(0.0, 100.0);

        match posting.minimum_diploma_score {
            Some(minimum) if minimum > 0.0 => {
                if diploma >= minimum {
                    DimensionScore {
                        score: (100.0 * diploma / minimum).min(100.0),
                        details: format!("diploma {diploma:.1} meets minimum {minimum:.1}"),
                    }
                } else {
                    DimensionScore {
                        score: diploma,
                        details: format!("diploma {diploma:.1} below minimum {minimum:.1}"),
                    }
                }
            }
            _ => DimensionScore {
                score: 100.0,
                details: format!("diploma {diploma:.1}, no minimum"),
            },
        }
    }
}
