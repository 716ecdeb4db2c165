use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::corrections::{correct_category, correct_placement_status, correct_training_result};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} label: {value:?}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownLabel {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Reservation category recorded for every candidate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    #[default]
    #[serde(alias = "Gen", alias = "GEN", alias = "general")]
    General,
    #[serde(rename = "OBC", alias = "obc")]
    Obc,
    #[serde(rename = "SC", alias = "sc")]
    Sc,
    #[serde(rename = "ST", alias = "st")]
    St,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::General, Category::Obc, Category::Sc, Category::St];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Obc => "OBC",
            Category::Sc => "SC",
            Category::St => "ST",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        correct_category(s).ok_or_else(|| UnknownLabel::new("category", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrainingResult {
    #[default]
    #[serde(alias = "pass", alias = "PASS")]
    Pass,
    #[serde(alias = "fail", alias = "FAIL")]
    Fail,
}

impl TrainingResult {
    pub fn as_str(self) -> &'static str {
        match self {
            TrainingResult::Pass => "Pass",
            TrainingResult::Fail => "Fail",
        }
    }
}

impl fmt::Display for TrainingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingResult {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        correct_training_result(s).ok_or_else(|| UnknownLabel::new("training_result", s))
    }
}

/// Only `Available` candidates take part in new match generations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementStatus {
    #[default]
    #[serde(alias = "available")]
    Available,
    #[serde(alias = "placed")]
    Placed,
    #[serde(rename = "Not Placed", alias = "NotPlaced", alias = "not_placed")]
    NotPlaced,
}

impl PlacementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlacementStatus::Available => "Available",
            PlacementStatus::Placed => "Placed",
            PlacementStatus::NotPlaced => "Not Placed",
        }
    }
}

impl fmt::Display for PlacementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlacementStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        correct_placement_status(s).ok_or_else(|| UnknownLabel::new("placement_status", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingStatus {
    #[default]
    Active,
    Inactive,
    Closed,
}

impl PostingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostingStatus::Active => "active",
            PostingStatus::Inactive => "inactive",
            PostingStatus::Closed => "closed",
        }
    }

    /// `closed` is terminal; active and inactive may toggle or close.
    pub fn can_transition_to(self, next: PostingStatus) -> bool {
        match (self, next) {
            (PostingStatus::Closed, _) => false,
            (current, next) if current == next => false,
            _ => true,
        }
    }
}

impl fmt::Display for PostingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostingStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(PostingStatus::Active),
            "inactive" => Ok(PostingStatus::Inactive),
            "closed" => Ok(PostingStatus::Closed),
            _ => Err(UnknownLabel::new("posting_status", s)),
        }
    }
}
