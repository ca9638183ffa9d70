use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::geo::{Coordinates, Geometry};
use crate::user::UserId;

/// Unique identifier for a report, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub Uuid);

impl ReportId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Report lifecycle states.
///
/// - Submitted: newly filed, not yet triaged
/// - InProgress: a department is working on it
/// - Resolved: fixed
/// - Closed: no further action (duplicate, out of scope, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Submitted,
    #[serde(alias = "in-progress")]
    InProgress,
    Resolved,
    Closed,
}

impl ReportStatus {
    /// Resolved and closed reports count towards resolution time.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Closed)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Submitted => write!(f, "submitted"),
            ReportStatus::InProgress => write!(f, "in_progress"),
            ReportStatus::Resolved => write!(f, "resolved"),
            ReportStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "submitted" => Ok(ReportStatus::Submitted),
            "in_progress" | "in-progress" => Ok(ReportStatus::InProgress),
            "resolved" => Ok(ReportStatus::Resolved),
            "closed" => Ok(ReportStatus::Closed),
            other => Err(format!("invalid status: '{other}'")),
        }
    }
}

impl Default for ReportStatus {
    fn default() -> Self {
        ReportStatus::Submitted
    }
}

/// Severity on a 1-5 scale, 5 being most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Severity(u8);

impl Severity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(level: i64) -> Result<Self, String> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&level) {
            Ok(Self(level as u8))
        } else {
            Err(format!(
                "severity {level} out of range {}..={}",
                Self::MIN,
                Self::MAX
            ))
        }
    }

    pub fn level(&self) -> u8 {
        self.0
    }
}

impl FromStr for Severity {
    type Err = String;

    /// Accepts a numeric level or the web form's `low` / `medium` / `high`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self(1)),
            "medium" => Ok(Self(3)),
            "high" => Ok(Self(5)),
            other => other
                .parse::<i64>()
                .map_err(|_| format!("unrecognized severity '{other}'"))
                .and_then(Self::new),
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match SeverityInput::deserialize(deserializer)? {
            SeverityInput::Level(level) => Severity::new(level).map_err(serde::de::Error::custom),
            SeverityInput::Label(label) => label.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeverityInput {
    Level(i64),
    Label(String),
}

/// Kind of media attached to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
    Document,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
            MediaType::Audio => write!(f, "audio"),
            MediaType::Document => write!(f, "document"),
        }
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            "document" => Ok(MediaType::Document),
            other => Err(format!("invalid media type: '{other}'")),
        }
    }
}

/// A media reference attached to a report. Files live elsewhere; only the URL
/// and metadata are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMedia {
    pub media_id: Uuid,
    pub report_id: ReportId,
    pub media_type: MediaType,
    pub file_url: String,
    pub original_filename: Option<String>,
    pub content_type: Option<String>,
    pub file_size: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A user-submitted safety issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: ReportId,
    /// Human-readable reference: `YYYYmmddHHMMSS-<first 8 chars of report_id>`.
    pub tracking_number: String,
    pub user_id: UserId,
    pub category_id: String,
    pub title: Option<String>,
    pub description: String,
    pub severity: Severity,
    /// Serialized as a GeoJSON point.
    #[serde(with = "as_geometry")]
    pub location: Coordinates,
    pub address: Option<String>,
    pub neighborhood_id: Option<i64>,
    pub council_district: Option<i64>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub media: Vec<ReportMedia>,
}

mod as_geometry {
    use super::*;

    pub fn serialize<S: Serializer>(at: &Coordinates, serializer: S) -> Result<S::Ok, S::Error> {
        at.to_geometry().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Coordinates, D::Error> {
        Ok(Geometry::deserialize(deserializer)?.coordinates())
    }
}

/// Status change and comment appended to a report's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportUpdate {
    pub update_id: Uuid,
    pub report_id: ReportId,
    pub user_id: UserId,
    pub status_change: ReportStatus,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Issue category reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: String,
    pub name: String,
    pub icon_name: Option<String>,
    pub default_severity: u8,
}

/// Location as sent by the web form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationInput {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
}

/// Media reference supplied on report creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInput {
    pub media_type: MediaType,
    pub file_url: String,
    pub original_filename: Option<String>,
    pub content_type: Option<String>,
    pub file_size: Option<i64>,
}

/// Report creation payload.
///
/// Accepts both the flat shape (`latitude`/`longitude`/`category_id`) and the
/// web form shape (`location {..}`/`category`). Required fields are optional
/// here so that missing ones can be reported by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateReportRequest {
    #[serde(alias = "category")]
    pub category_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location: Option<LocationInput>,
    pub address: Option<String>,
    pub neighborhood_id: Option<i64>,
    pub council_district: Option<i64>,
    #[serde(default)]
    pub media: Vec<MediaInput>,
}

impl CreateReportRequest {
    /// Resolve coordinates from either the flat fields or the nested location.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let nested = self.location.as_ref();
        let latitude = self.latitude.or_else(|| nested.and_then(|l| l.latitude))?;
        let longitude = self.longitude.or_else(|| nested.and_then(|l| l.longitude))?;
        Some(Coordinates::new(latitude, longitude))
    }

    pub fn resolved_address(&self) -> Option<String> {
        self.address
            .clone()
            .or_else(|| self.location.as_ref().and_then(|l| l.address.clone()))
    }
}

/// Payload for appending a status update to a report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddUpdateRequest {
    pub status_change: Option<ReportStatus>,
    pub comment: Option<String>,
}

/// Build the tracking number for a report created at `created_at`.
pub fn tracking_number(created_at: &DateTime<Utc>, id: &ReportId) -> String {
    let id = id.to_string();
    format!("{}-{}", created_at.format("%Y%m%d%H%M%S"), &id[..8])
}
