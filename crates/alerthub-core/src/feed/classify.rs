//! Keyword rules over search results: incident alert levels and likely
//! duplicates of a new report.

use alerthub_types::feed::{AlertLevel, CommunityAlert, DuplicateCandidate};
use serde_json::Value;

/// Ordered keyword table. The first keyword found wins.
pub const ALERT_KEYWORDS: &[(&str, AlertLevel)] = &[
    ("fatal", AlertLevel::Red),
    ("shutdown", AlertLevel::Red),
    ("evacuation", AlertLevel::Red),
    ("fire", AlertLevel::Red),
    ("shooting", AlertLevel::Red),
    ("explosion", AlertLevel::Red),
    ("major crash", AlertLevel::Red),
    ("power outage", AlertLevel::Yellow),
    ("highway closed", AlertLevel::Yellow),
    ("road closure", AlertLevel::Yellow),
    ("severe weather", AlertLevel::Red),
    ("flooding", AlertLevel::Red),
    ("water main break", AlertLevel::Yellow),
    ("missing person", AlertLevel::Red),
    ("emergency services", AlertLevel::Red),
    ("traffic jam", AlertLevel::Green),
    ("minor accident", AlertLevel::Green),
];

/// Minimum number of description words that must appear in a result.
pub const DUPLICATE_MATCH_THRESHOLD: usize = 2;

/// Alert level for a result, from its title or snippet.
pub fn classify_alert(title: &str, snippet: &str) -> Option<AlertLevel> {
    let title = title.to_lowercase();
    let snippet = snippet.to_lowercase();
    ALERT_KEYWORDS
        .iter()
        .find(|(keyword, _)| title.contains(keyword) || snippet.contains(keyword))
        .map(|(_, level)| *level)
}

/// Classify organic results, dropping the ones no keyword matches.
pub fn community_alerts(organic_results: &[Value]) -> Vec<CommunityAlert> {
    organic_results
        .iter()
        .filter_map(|item| {
            let title = text(item, "title");
            let level = classify_alert(&title, &text(item, "snippet"))?;
            Some(CommunityAlert {
                link: text(item, "link"),
                title,
                level,
            })
        })
        .collect()
}

/// Results mentioning at least [`DUPLICATE_MATCH_THRESHOLD`] words of the
/// description. Repeated words count once per occurrence.
pub fn find_duplicates(description: &str, organic_results: &[Value]) -> Vec<DuplicateCandidate> {
    let description = description.to_lowercase();
    let words: Vec<&str> = description.split_whitespace().collect();

    organic_results
        .iter()
        .filter(|item| {
            let title = text(item, "title").to_lowercase();
            let snippet = text(item, "snippet").to_lowercase();
            let hits = words
                .iter()
                .filter(|w| title.contains(*w) || snippet.contains(*w))
                .count();
            hits >= DUPLICATE_MATCH_THRESHOLD
        })
        .map(|item| DuplicateCandidate {
            title: text(item, "title"),
            link: text(item, "link"),
            snippet: text(item, "snippet"),
        })
        .collect()
}

fn text(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
