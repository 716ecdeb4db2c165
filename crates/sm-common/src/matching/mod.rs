pub mod eligibility;
pub mod location;
pub mod pipeline;
pub mod reasons;
pub mod salary;
pub mod scoring;
pub mod skills;
pub mod weights;

pub use eligibility::{EligibilityConfig, EligibilityFilter};
pub use location::{LocationScores, LocationTier};
pub use pipeline::{
    MatchResult, MatchSet, MatchingEngine, RankingWindow, compute_matches, match_percentage,
    validate_new_posting, validate_posting,
};
pub use reasons::ReasonThresholds;
pub use scoring::{BusinessRulesEngine, MatchScore, MatchingConfig, ScoreBreakdown};
pub use weights::{DEFAULT_WEIGHTS, Dimension, Weights};
