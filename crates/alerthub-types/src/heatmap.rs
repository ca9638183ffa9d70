//! Heatmap filters, map feature properties, and aggregate statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{BoundingBox, Coordinates};
use crate::report::{ReportId, ReportStatus};

/// Filters shared by the heatmap and statistics queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeatmapFilter {
    pub category_id: Option<String>,
    /// Inclusive lower bound on the creation date (UTC).
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date (UTC).
    pub end_date: Option<NaiveDate>,
    pub status: Option<ReportStatus>,
    pub council_district: Option<i64>,
}

impl HeatmapFilter {
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(format!("start_date {start} is after end_date {end}"));
            }
        }
        Ok(())
    }
}

/// Properties of a report feature on the heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFeatureProperties {
    pub report_id: ReportId,
    pub category_id: String,
    pub severity: u8,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub description: String,
}

/// A point of public infrastructure shown as a map overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureSite {
    pub site_id: i64,
    pub name: String,
    pub site_type: String,
    pub address: String,
    pub location: Coordinates,
}

/// Properties of an infrastructure overlay feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureProperties {
    pub name: String,
    #[serde(rename = "type")]
    pub site_type: String,
    pub address: String,
}

/// A named neighborhood approximated by its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighborhood {
    pub neighborhood_id: i64,
    pub name: String,
    pub bounds: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodStatistic {
    pub neighborhood_id: i64,
    pub neighborhood_name: String,
    pub report_count: u64,
    /// Mean hours from creation to resolution, one decimal; `None` when no
    /// report in the neighborhood has been resolved.
    pub avg_resolution_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTrend {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub report_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapStatistics {
    pub neighborhood_statistics: Vec<NeighborhoodStatistic>,
    pub time_trends: Vec<TimeTrend>,
}
