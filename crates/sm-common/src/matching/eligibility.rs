use serde::{Deserialize, Serialize};

use crate::Candidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    /// Exclude candidates whose placement status is not `Available`.
    pub require_available: bool,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            require_available: true,
        }
    }
}

/// Hard gate applied before any scoring. Excluded candidates never appear in
/// a result set.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityFilter {
    config: EligibilityConfig,
}

impl EligibilityFilter {
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    pub fn is_eligible(&self, candidate: &Candidate) -> bool {
        !self.config.require_available || candidate.is_available()
    }

    pub fn filter<'a>(&self, pool: &'a [Candidate]) -> Vec<&'a Candidate> {
        pool.iter()
            .filter(|candidate| self.is_eligible(candidate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlacementStatus;

    fn with_status(id: i64, status: PlacementStatus) -> Candidate {
        Candidate {
            id,
            placement_status: status,
            ..Candidate::default()
        }
    }

    #[test]
    fn keeps_only_available_by_default() {
        let pool = vec![
            with_status(1, PlacementStatus::Available),
            with_status(2, PlacementStatus::Placed),
            with_status(3, PlacementStatus::NotPlaced),
        ];
        let kept: Vec<i64> = EligibilityFilter::default()
            .filter(&pool)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(kept, vec![1]);
    }

    #[test]
    fn disabled_gate_keeps_everyone() {
        let pool = vec![
            with_status(1, PlacementStatus::Placed),
            with_status(2, PlacementStatus::NotPlaced),
        ];
        let filter = EligibilityFilter::new(EligibilityConfig {
            require_available: false,
        });
        assert_eq!(filter.filter(&pool).len(), 2);
    }
}
