//! Community feed items produced from third-party search results.

use serde::{Deserialize, Serialize};

use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    /// Human-readable "when" text as published by the source.
    pub date: String,
    pub address: String,
    pub description: String,
    pub link: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature: String,
    pub unit: String,
    pub description: String,
    pub precipitation: String,
    pub humidity: String,
    pub wind: String,
}

/// An emergency-relevant place near the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafePlace {
    pub name: String,
    pub address: String,
    /// Source rating, or `"No Rating"`.
    pub rating: serde_json::Value,
    pub link: String,
    pub directions_link: String,
    pub distance_miles: Option<f64>,
}

/// Alert level assigned to a detected incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Red,
    Yellow,
    Green,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertLevel::Red => write!(f, "red"),
            AlertLevel::Yellow => write!(f, "yellow"),
            AlertLevel::Green => write!(f, "green"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityAlert {
    pub title: String,
    pub link: String,
    pub level: AlertLevel,
}

/// A published item that looks like the same incident as a new report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCandidate {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Background material for an incident type at a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentContext {
    pub news: Vec<serde_json::Value>,
    pub web_results: Vec<serde_json::Value>,
    pub related_concerns: Vec<serde_json::Value>,
}

/// Payload for a duplicate check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCheckRequest {
    /// Blank or absent descriptions are rejected by the feed service.
    #[serde(default)]
    pub description: String,
    pub location: Option<String>,
}
