use crate::Category;

/// Category ENUM: ["General", "OBC", "SC", "ST"]
///
/// Spreadsheet imports spell these inconsistently ("Gen", "Other Backward Class",
/// "S.C."), so punctuation and spacing are dropped before comparison.
pub fn correct_category(input: &str) -> Option<Category> {
    let compact: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    if compact.is_empty() {
        return None;
    }

    match compact.as_str() {
        "gen" | "general" | "gn" | "ur" | "unreserved" | "open" => Some(Category::General),
        "obc" | "otherbackwardclass" | "otherbackwardclasses" => Some(Category::Obc),
        "sc" | "scheduledcaste" | "scheduledcastes" => Some(Category::Sc),
        "st" | "scheduledtribe" | "scheduledtribes" => Some(Category::St),
        _ if compact.starts_with("obc") => Some(Category::Obc),
        _ => None,
    }
}
