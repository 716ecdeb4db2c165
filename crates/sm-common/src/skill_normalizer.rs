use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

/// Canonical comparison form of a skill label: NFKC, trimmed, inner whitespace
/// collapsed to single spaces, lowercased.
///
/// Labels keep their original spelling on the candidate/posting records; only
/// the matcher compares normalized forms.
pub fn normalize_skill(skill: &str) -> String {
    let folded: String = skill.nfkc().collect();
    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalizes every label and drops the empty ones. Labels that only differ by
/// case or spacing collapse into one entry.
pub fn normalize_skill_set<'a, I>(skills: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    skills
        .into_iter()
        .map(|skill| normalize_skill(skill))
        .filter(|skill| !skill.is_empty())
        .collect()
}
