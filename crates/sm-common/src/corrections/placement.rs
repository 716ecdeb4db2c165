use crate::{PlacementStatus, TrainingResult};

fn compact_lower(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// PlacementStatus ENUM: ["Available", "Placed", "Not Placed"]
///
/// "Unknown" and empty values are not corrected; callers decide the default.
pub fn correct_placement_status(input: &str) -> Option<PlacementStatus> {
    match compact_lower(input).as_str() {
        "available" | "open" | "seeking" => Some(PlacementStatus::Available),
        "placed" | "employed" | "selected" => Some(PlacementStatus::Placed),
        "notplaced" | "unplaced" | "notselected" => Some(PlacementStatus::NotPlaced),
        _ => None,
    }
}

/// TrainingResult ENUM: ["Pass", "Fail"]
pub fn correct_training_result(input: &str) -> Option<TrainingResult> {
    match compact_lower(input).as_str() {
        "pass" | "passed" | "p" | "qualified" => Some(TrainingResult::Pass),
        "fail" | "failed" | "f" | "notqualified" => Some(TrainingResult::Fail),
        _ => None,
    }
}
