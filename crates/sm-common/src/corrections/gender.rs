/// Gender labels are free text; the common spellings are folded onto
/// "Male" / "Female" / "Other". Anything else is kept as typed (trimmed).
pub fn correct_gender(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let corrected = match trimmed.to_ascii_lowercase().as_str() {
        "m" | "male" | "man" => "Male",
        "f" | "female" | "woman" => "Female",
        "o" | "other" | "others" | "transgender" | "tg" => "Other",
        _ => return Some(trimmed.to_string()),
    };

    Some(corrected.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_common_spellings() {
        assert_eq!(correct_gender("M").as_deref(), Some("Male"));
        assert_eq!(correct_gender(" female ").as_deref(), Some("Female"));
        assert_eq!(correct_gender("TG").as_deref(), Some("Other"));
    }

    #[test]
    fn keeps_unrecognised_labels() {
        assert_eq!(correct_gender("Non-binary").as_deref(), Some("Non-binary"));
        assert_eq!(correct_gender("   "), None);
    }
}
