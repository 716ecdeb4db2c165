use std::collections::HashMap;
use std::sync::LazyLock;

/// State / union territory aliases (vehicle codes, old names) → official name.
static STATE_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let table: &[(&str, &[&str])] = &[
        ("Andhra Pradesh", &["ap", "andhra"]),
        ("Arunachal Pradesh", &["ar", "arunachal"]),
        ("Assam", &["as"]),
        ("Bihar", &["br"]),
        ("Chhattisgarh", &["cg", "ct", "chattisgarh"]),
        ("Goa", &["ga"]),
        ("Gujarat", &["gj"]),
        ("Haryana", &["hr"]),
        ("Himachal Pradesh", &["hp", "himachal"]),
        ("Jharkhand", &["jh"]),
        ("Karnataka", &["ka"]),
        ("Kerala", &["kl"]),
        ("Madhya Pradesh", &["mp"]),
        ("Maharashtra", &["mh"]),
        ("Manipur", &["mn"]),
        ("Meghalaya", &["ml"]),
        ("Mizoram", &["mz"]),
        ("Nagaland", &["nl"]),
        ("Odisha", &["od", "or", "orissa"]),
        ("Punjab", &["pb"]),
        ("Rajasthan", &["rj"]),
        ("Sikkim", &["sk"]),
        ("Tamil Nadu", &["tn", "tamilnadu"]),
        ("Telangana", &["ts", "tg"]),
        ("Tripura", &["tr"]),
        ("Uttar Pradesh", &["up"]),
        ("Uttarakhand", &["uk", "uttaranchal"]),
        ("West Bengal", &["wb"]),
        ("Andaman and Nicobar Islands", &["an", "andaman & nicobar islands"]),
        ("Chandigarh", &["ch"]),
        (
            "Dadra and Nagar Haveli and Daman and Diu",
            &["dn", "dd", "dnhdd"],
        ),
        ("Delhi", &["dl", "nct of delhi", "new delhi"]),
        ("Jammu and Kashmir", &["jk", "j&k", "jammu & kashmir"]),
        ("Ladakh", &["la"]),
        ("Lakshadweep", &["ld"]),
        ("Puducherry", &["py", "pondicherry"]),
    ];

    let mut map = HashMap::new();
    for (official, aliases) in table {
        map.insert(*official, *official);
        for alias in *aliases {
            map.insert(*alias, *official);
        }
    }
    map
});

/// Trims, collapses inner whitespace and lowercases a city/state label so that
/// "  New   Delhi" and "new delhi" compare equal.
pub fn normalize_place(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Returns the official state name for known aliases, or the cleaned input
/// when the label is not in the table. Empty input yields `None`.
pub fn correct_state(input: &str) -> Option<String> {
    let cleaned = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return None;
    }

    let key = cleaned.to_lowercase();
    if let Some(official) = STATE_ALIASES.get(key.as_str()) {
        return Some((*official).to_string());
    }

    let official = STATE_ALIASES
        .values()
        .find(|official| official.to_lowercase() == key)
        .map(|official| (*official).to_string());

    Some(official.unwrap_or(cleaned))
}
