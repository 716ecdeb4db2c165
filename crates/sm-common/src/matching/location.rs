use serde::{Deserialize, Serialize};

use crate::{
    Candidate, JobPosting,
    corrections::{correct_state, normalize_place},
};

/// Sub-scores awarded per proximity tier (0–100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationScores {
    pub same_city: f64,
    pub same_state: f64,
    pub other_state: f64,
}

impl Default for LocationScores {
    fn default() -> Self {
        Self {
            same_city: 100.0,
            same_state: 60.0,
            other_state: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationTier {
    SameCity,
    SameState,
    OtherState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationEvaluation {
    pub tier: LocationTier,
    pub score: f64,
    pub details: String,
}

fn state_key(state: &str) -> String {
    correct_state(state)
        .map(|official| normalize_place(&official))
        .unwrap_or_default()
}

/// Single location rule shared by scoring and reason generation.
///
/// An exact city match dominates. The one exception is a city name shared by
/// two known, different states (Aurangabad in Maharashtra and Bihar), which
/// scores as `same_state` so it never falls below that tier. An empty state
/// on either side never produces a state match on its own.
pub fn evaluate_location(
    posting: &JobPosting,
    candidate: &Candidate,
    scores: &LocationScores,
) -> LocationEvaluation {
    let posting_state = state_key(&posting.state);
    let candidate_state = state_key(&candidate.state);
    let both_states_known = !posting_state.is_empty() && !candidate_state.is_empty();

    let posting_city = normalize_place(&posting.city);
    let same_city = !posting_city.is_empty() && posting_city == normalize_place(&candidate.city);

    if same_city && !(both_states_known && posting_state != candidate_state) {
        return LocationEvaluation {
            tier: LocationTier::SameCity,
            score: scores.same_city,
            details: format!("same city ({})", posting.city.trim()),
        };
    }

    if same_city || (both_states_known && posting_state == candidate_state) {
        return LocationEvaluation {
            tier: LocationTier::SameState,
            score: scores.same_state,
            details: if same_city {
                format!(
                    "same city name in another state ({} vs {})",
                    candidate.state.trim(),
                    posting.state.trim()
                )
            } else {
                format!("same state ({})", posting.state.trim())
            },
        };
    }

    LocationEvaluation {
        tier: LocationTier::OtherState,
        score: scores.other_state,
        details: format!(
            "different state ({} vs {})",
            display_or_unknown(&candidate.state),
            display_or_unknown(&posting.state)
        ),
    }
}

fn display_or_unknown(label: &str) -> &str {
    let trimmed = label.trim();
    if trimmed.is_empty() { "unknown" } else { trimmed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(city: &str, state: &str) -> JobPosting {
        JobPosting {
            city: city.into(),
            state: state.into(),
            ..JobPosting::default()
        }
    }

    fn candidate(city: &str, state: &str) -> Candidate {
        Candidate {
            city: city.into(),
            state: state.into(),
            ..Candidate::default()
        }
    }

    #[test]
    fn same_city_in_same_state_scores_top_tier() {
        let eval = evaluate_location(
            &posting("Pune", "Maharashtra"),
            &candidate(" pune ", "MAHARASHTRA"),
            &LocationScores::default(),
        );
        assert_eq!(eval.tier, LocationTier::SameCity);
        assert_eq!(eval.score, 100.0);
    }

    #[test]
    fn same_city_with_missing_state_still_scores_top_tier() {
        let scores = LocationScores::default();

        let neither = evaluate_location(&posting("Pune", ""), &candidate("Pune", ""), &scores);
        assert_eq!(neither.tier, LocationTier::SameCity);
        assert_eq!(neither.score, 100.0);

        let one_side = evaluate_location(
            &posting("Jaipur", "Rajasthan"),
            &candidate("Jaipur", ""),
            &scores,
        );
        assert_eq!(one_side.score, 100.0);
    }

    #[test]
    fn shared_city_name_across_states_is_same_state_tier() {
        // Aurangabad exists in both Maharashtra and Bihar.
        let eval = evaluate_location(
            &posting("Aurangabad", "Maharashtra"),
            &candidate("Aurangabad", "Bihar"),
            &LocationScores::default(),
        );
        assert_eq!(eval.tier, LocationTier::SameState);
        assert_eq!(eval.score, 60.0);
    }

    #[test]
    fn state_aliases_resolve_before_comparison() {
        let eval = evaluate_location(
            &posting("Nagpur", "MH"),
            &candidate("Mumbai", "Maharashtra"),
            &LocationScores::default(),
        );
        assert_eq!(eval.tier, LocationTier::SameState);
        assert_eq!(eval.score, 60.0);
    }

    #[test]
    fn empty_states_in_different_cities_never_match() {
        let eval = evaluate_location(
            &posting("Pune", ""),
            &candidate("Nashik", ""),
            &LocationScores::default(),
        );
        assert_eq!(eval.tier, LocationTier::OtherState);
        assert!(eval.details.contains("unknown"));
    }

    #[test]
    fn uses_configured_tier_scores() {
        let scores = LocationScores {
            same_city: 90.0,
            same_state: 50.0,
            other_state: 0.0,
        };
        let eval = evaluate_location(
            &posting("Jaipur", "Rajasthan"),
            &candidate("Chennai", "Tamil Nadu"),
            &scores,
        );
        assert_eq!(eval.score, 0.0);
    }
}
