//! Fixed topical categories for citizen feedback.

/// Category to keyword-list table, checked in order; first match wins.
/// A slice keeps the precedence order that a map would lose.
pub const TOPIC_FILTERS: &[(&str, &[&str])] = &[
    ("roads", &["road", "street", "highway", "pothole", "traffic", "bridge"]),
    ("electricity", &["electricity", "power", "current", "voltage", "blackout"]),
    ("water", &["water", "supply", "pipe", "tanker", "leak", "drinking water"]),
    ("healthcare", &["hospital", "clinic", "doctor", "nurse", "ambulance"]),
    ("education", &["school", "college", "teacher", "student", "exam"]),
];

pub const FALLBACK_CATEGORY: &str = "general";

/// Maps free text to the first category with a keyword substring match,
/// or `"general"` when nothing matches.
pub fn detect_category(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    for (category, keywords) in TOPIC_FILTERS {
        if keywords.iter().any(|keyword| lower.contains(keyword)) {
            return category;
        }
    }
    FALLBACK_CATEGORY
}
