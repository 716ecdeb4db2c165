use std::collections::BTreeSet;

use crate::skill_normalizer::normalize_skill_set;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatchResult {
    /// Share of the posting's required skills the candidate holds (0.0..=1.0).
    pub match_ratio: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// The posting lists no required skills.
    pub vacuous: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreferredSkillResult {
    pub matched_skills: Vec<String>,
    pub total: usize,
}

/// Required-skill overlap: `|candidate ∩ required| / |required|` on normalized labels.
///
/// With no required skills the result is vacuous; `vacuous_match` decides
/// whether that counts as a full match (1.0) or as no evidence at all (0.0).
pub fn check_required_skills(
    required: &BTreeSet<String>,
    candidate: &BTreeSet<String>,
    vacuous_match: bool,
) -> SkillMatchResult {
    let required_set = normalize_skill_set(required);

    if required_set.is_empty() {
        return SkillMatchResult {
            match_ratio: if vacuous_match { 1.0 } else { 0.0 },
            matched_skills: vec![],
            missing_skills: vec![],
            vacuous: true,
            reason: if vacuous_match {
                "no required skills (vacuous match)".to_string()
            } else {
                "no required skills".to_string()
            },
        };
    }

    let candidate_set = normalize_skill_set(candidate);
    let matched_skills: Vec<String> = required_set.intersection(&candidate_set).cloned().collect();
    let missing_skills: Vec<String> = required_set.difference(&candidate_set).cloned().collect();
    let match_ratio = matched_skills.len() as f64 / required_set.len() as f64;

    let reason = format!(
        "{}/{} required skills (matched: {} / missing: {})",
        matched_skills.len(),
        required_set.len(),
        if matched_skills.is_empty() {
            "none".to_string()
        } else {
            matched_skills.join(", ")
        },
        if missing_skills.is_empty() {
            "none".to_string()
        } else {
            missing_skills.join(", ")
        }
    );

    SkillMatchResult {
        match_ratio,
        matched_skills,
        missing_skills,
        vacuous: false,
        reason,
    }
}

/// Preferred skills never penalise; they only feed the bonus.
pub fn check_preferred_skills(
    preferred: &BTreeSet<String>,
    candidate: &BTreeSet<String>,
) -> PreferredSkillResult {
    let preferred_set = normalize_skill_set(preferred);
    if preferred_set.is_empty() {
        return PreferredSkillResult {
            matched_skills: vec![],
            total: 0,
        };
    }

    let candidate_set = normalize_skill_set(candidate);
    PreferredSkillResult {
        matched_skills: preferred_set.intersection(&candidate_set).cloned().collect(),
        total: preferred_set.len(),
    }
}
