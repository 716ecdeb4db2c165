use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Starting calibration: skills dominate, location next, the remaining three
/// dimensions share the rest equally.
pub const DEFAULT_WEIGHTS: Weights = Weights {
    skills: 0.35,
    location: 0.20,
    salary: 0.15,
    experience: 0.15,
    diploma: 0.15,
};

/// The five scored dimensions of a match, in their fixed reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Skills,
    Location,
    Salary,
    Experience,
    Diploma,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Skills,
        Dimension::Location,
        Dimension::Salary,
        Dimension::Experience,
        Dimension::Diploma,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Skills => "skills",
            Dimension::Location => "location",
            Dimension::Salary => "salary",
            Dimension::Experience => "experience",
            Dimension::Diploma => "diploma",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub skills: f64,
    pub location: f64,
    pub salary: f64,
    pub experience: f64,
    pub diploma: f64,
}

impl Default for Weights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.skills + self.location + self.salary + self.experience + self.diploma
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Skills => self.skills,
            Dimension::Location => self.location,
            Dimension::Salary => self.salary,
            Dimension::Experience => self.experience,
            Dimension::Diploma => self.diploma,
        }
    }

    /// Every weight must be finite and non-negative, and at least one positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for dimension in Dimension::ALL {
            let weight = self.get(dimension);
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidValue {
                    name: weight_name(dimension),
                    value: weight.to_string(),
                });
            }
        }

        let sum = self.sum();
        if sum <= 0.0 {
            return Err(ConfigError::ZeroWeights(sum));
        }

        Ok(())
    }
}

pub(crate) fn weight_name(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Skills => "weights.skills",
        Dimension::Location => "weights.location",
        Dimension::Salary => "weights.salary",
        Dimension::Experience => "weights.experience",
        Dimension::Diploma => "weights.diploma",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        assert!((DEFAULT_WEIGHTS.sum() - 1.0).abs() < 1e-9);
        assert!(DEFAULT_WEIGHTS.validate().is_ok());
    }

    #[test]
    fn rejects_negative_and_nan_weights() {
        let negative = Weights {
            salary: -0.1,
            ..DEFAULT_WEIGHTS
        };
        assert!(matches!(
            negative.validate(),
            Err(ConfigError::InvalidValue { name: "weights.salary", .. })
        ));

        let nan = Weights {
            diploma: f64::NAN,
            ..DEFAULT_WEIGHTS
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn rejects_all_zero_weights() {
        let zero = Weights {
            skills: 0.0,
            location: 0.0,
            salary: 0.0,
            experience: 0.0,
            diploma: 0.0,
        };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroWeights(0.0)));
    }
}
