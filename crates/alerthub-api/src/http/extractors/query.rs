//! Query parameter extractors for list, heatmap and feed endpoints.
//!
//! Parameters arrive as strings so that bad values produce a named
//! validation error instead of a generic deserialization failure. Empty
//! values (the web client sends `?status=` for "any") count as absent.

use chrono::NaiveDate;
use serde::Deserialize;

use alerthub_core::repository::report::ReportFilter;
use alerthub_types::error::HeatmapError;
use alerthub_types::geo::Coordinates;
use alerthub_types::heatmap::HeatmapFilter;
use alerthub_types::report::ReportStatus;
use alerthub_types::user::UserId;

use crate::http::error::AppError;

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Query parameters for `GET /reports`.
#[derive(Debug, Deserialize, Default)]
pub struct ReportListQuery {
    pub user_id: Option<String>,
    pub limit: Option<i64>,
}

impl ReportListQuery {
    pub fn into_filter(self) -> Result<ReportFilter, AppError> {
        let user_id = present(&self.user_id)
            .map(|id| {
                id.parse::<UserId>()
                    .map_err(|_| AppError::Validation(format!("invalid user_id: '{id}'")))
            })
            .transpose()?;

        Ok(ReportFilter {
            user_id,
            limit: self.limit,
        })
    }
}

/// Query parameters shared by the heatmap endpoints.
#[derive(Debug, Deserialize, Default)]
pub struct HeatmapQuery {
    pub category_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub council_district: Option<String>,
}

impl HeatmapQuery {
    pub fn into_filter(self) -> Result<HeatmapFilter, AppError> {
        let invalid = |msg: String| AppError::Heatmap(HeatmapError::InvalidFilter(msg));

        let date = |name: &str, value: &Option<String>| {
            present(value)
                .map(|raw| {
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                        invalid(format!("{name} must be a YYYY-MM-DD date, got '{raw}'"))
                    })
                })
                .transpose()
        };

        let filter = HeatmapFilter {
            category_id: present(&self.category_id).map(str::to_string),
            start_date: date("start_date", &self.start_date)?,
            end_date: date("end_date", &self.end_date)?,
            status: present(&self.status)
                .map(|raw| raw.parse::<ReportStatus>().map_err(invalid))
                .transpose()?,
            council_district: present(&self.council_district)
                .map(|raw| {
                    raw.parse::<i64>().map_err(|_| {
                        invalid(format!("council_district must be an integer, got '{raw}'"))
                    })
                })
                .transpose()?,
        };

        filter.validate().map_err(invalid)?;
        Ok(filter)
    }
}

/// `?q=` for general news.
#[derive(Debug, Deserialize, Default)]
pub struct NewsQuery {
    #[serde(default)]
    pub q: String,
}

/// `?name=` for neighborhood news.
#[derive(Debug, Deserialize, Default)]
pub struct NeighborhoodQuery {
    #[serde(default)]
    pub name: String,
}

/// Optional `?location=` (weather).
#[derive(Debug, Deserialize, Default)]
pub struct LocationQuery {
    pub location: Option<String>,
}

/// `?lat=&lon=` for safe places.
#[derive(Debug, Deserialize, Default)]
pub struct SafePlacesQuery {
    #[serde(alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(alias = "longitude", alias = "lng")]
    pub lon: Option<f64>,
}

impl SafePlacesQuery {
    pub fn coordinates(&self) -> Result<Coordinates, AppError> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            (lat, lon) => {
                let missing: Vec<&str> = [("lat", lat.is_none()), ("lon", lon.is_none())]
                    .into_iter()
                    .filter_map(|(name, absent)| absent.then_some(name))
                    .collect();
                Err(AppError::Validation(format!(
                    "Missing fields: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// `?incident_type=&location=` for incident context.
#[derive(Debug, Deserialize, Default)]
pub struct ContextQuery {
    #[serde(default)]
    pub incident_type: String,
    pub location: Option<String>,
}
