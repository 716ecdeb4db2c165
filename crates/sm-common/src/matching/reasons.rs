use serde::{Deserialize, Serialize};

use super::{scoring::MatchScore, weights::Dimension};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReasonThresholds {
    pub strong: f64,
    pub adequate: f64,
}

impl Default for ReasonThresholds {
    fn default() -> Self {
        Self {
            strong: 80.0,
            adequate: 60.0,
        }
    }
}

/// Human-readable reasons for a match, most significant first.
///
/// Dimensions below `adequate` are omitted. The sort is stable over
/// [`Dimension::ALL`], so equal sub-scores keep the fixed dimension order.
pub fn build_reasons(score: &MatchScore, thresholds: &ReasonThresholds) -> Vec<String> {
    let mut scored: Vec<(Dimension, f64, &str)> = Dimension::ALL
        .into_iter()
        .map(|dimension| {
            let dimension_score = score.get(dimension);
            (dimension, dimension_score.score, dimension_score.details.as_str())
        })
        .filter(|(_, value, _)| *value >= thresholds.adequate)
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .map(|(dimension, value, details)| {
            let strength = if value >= thresholds.strong {
                "Strong"
            } else {
                "Adequate"
            };
            format!("{strength} {dimension} match: {details}")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scoring::DimensionScore;

    fn dim(score: f64, details: &str) -> DimensionScore {
        DimensionScore {
            score,
            details: details.into(),
        }
    }

    fn score(skills: f64, location: f64, salary: f64, experience: f64, diploma: f64) -> MatchScore {
        MatchScore {
            total: 0.0,
            skills: dim(skills, "skills"),
            location: dim(location, "location"),
            salary: dim(salary, "salary"),
            experience: dim(experience, "experience"),
            diploma: dim(diploma, "diploma"),
        }
    }

    #[test]
    fn omits_weak_dimensions_and_sorts_descending() {
        let reasons = build_reasons(
            &score(66.7, 100.0, 50.0, 100.0, 59.9),
            &ReasonThresholds::default(),
        );
        assert_eq!(
            reasons,
            vec![
                "Strong location match: location".to_string(),
                "Strong experience match: experience".to_string(),
                "Adequate skills match: skills".to_string(),
            ]
        );
    }

    #[test]
    fn thresholds_are_inclusive() {
        let reasons = build_reasons(
            &score(80.0, 60.0, 0.0, 0.0, 0.0),
            &ReasonThresholds::default(),
        );
        assert_eq!(reasons.len(), 2);
        assert!(reasons[0].starts_with("Strong skills"));
        assert!(reasons[1].starts_with("Adequate location"));
    }

    #[test]
    fn nothing_above_threshold_yields_no_reasons() {
        let reasons = build_reasons(&score(10.0, 20.0, 30.0, 40.0, 50.0), &ReasonThresholds::default());
        assert!(reasons.is_empty());
    }
}
