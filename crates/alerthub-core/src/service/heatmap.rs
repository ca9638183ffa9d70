//! Map features and neighborhood statistics over stored reports.

use std::collections::{BTreeMap, HashMap};

use alerthub_types::error::{HeatmapError, RepositoryError};
use alerthub_types::geo::{Feature, FeatureCollection};
use alerthub_types::heatmap::{
    HeatmapFilter, HeatmapStatistics, InfrastructureProperties, Neighborhood,
    NeighborhoodStatistic, ReportFeatureProperties, TimeTrend,
};
use alerthub_types::report::Report;

use crate::geo::round_to;
use crate::repository::reference::ReferenceRepository;
use crate::repository::report::ReportRepository;

pub struct HeatmapService<R: ReportRepository, C: ReferenceRepository> {
    reports: R,
    reference: C,
}

impl<R: ReportRepository, C: ReferenceRepository> HeatmapService<R, C> {
    pub fn new(reports: R, reference: C) -> Self {
        Self { reports, reference }
    }

    /// Reports matching `filter` as GeoJSON point features.
    pub async fn heatmap(
        &self,
        filter: &HeatmapFilter,
    ) -> Result<FeatureCollection<ReportFeatureProperties>, HeatmapError> {
        filter.validate().map_err(HeatmapError::InvalidFilter)?;
        let reports = self.reports.query(filter).await.map_err(storage)?;

        tracing::debug!(count = reports.len(), "heatmap query");

        Ok(FeatureCollection::new(
            reports.iter().map(report_feature).collect(),
        ))
    }

    /// Per-neighborhood counts and resolution times, plus monthly volume.
    /// The council district filter does not apply here.
    pub async fn statistics(
        &self,
        filter: &HeatmapFilter,
    ) -> Result<HeatmapStatistics, HeatmapError> {
        filter.validate().map_err(HeatmapError::InvalidFilter)?;
        let filter = HeatmapFilter {
            council_district: None,
            ..filter.clone()
        };
        let reports = self.reports.query(&filter).await.map_err(storage)?;
        let neighborhoods = self.reference.neighborhoods().await.map_err(storage)?;
        Ok(aggregate_statistics(&reports, &neighborhoods))
    }

    pub async fn infrastructure(
        &self,
    ) -> Result<FeatureCollection<InfrastructureProperties>, HeatmapError> {
        let sites = self.reference.infrastructure().await.map_err(storage)?;
        Ok(FeatureCollection::new(
            sites
                .into_iter()
                .map(|site| {
                    Feature::point(
                        site.location,
                        InfrastructureProperties {
                            name: site.name,
                            site_type: site.site_type,
                            address: site.address,
                        },
                    )
                })
                .collect(),
        ))
    }
}

fn report_feature(report: &Report) -> Feature<ReportFeatureProperties> {
    Feature::point(
        report.location,
        ReportFeatureProperties {
            report_id: report.report_id,
            category_id: report.category_id.clone(),
            severity: report.severity.level(),
            status: report.status,
            created_at: report.created_at,
            resolved_at: report.resolved_at,
            title: report.title.clone(),
            description: report.description.clone(),
        },
    )
}

#[derive(Default)]
struct Tally {
    count: u64,
    resolution_hours: Vec<f64>,
}

/// Aggregate already-filtered reports.
///
/// Reports without a neighborhood (or pointing at an unknown one) count
/// toward the monthly trend only.
pub fn aggregate_statistics(reports: &[Report], neighborhoods: &[Neighborhood]) -> HeatmapStatistics {
    let names: HashMap<i64, &str> = neighborhoods
        .iter()
        .map(|n| (n.neighborhood_id, n.name.as_str()))
        .collect();

    let mut tallies: HashMap<i64, Tally> = HashMap::new();
    let mut months: BTreeMap<String, u64> = BTreeMap::new();

    for report in reports {
        *months
            .entry(report.created_at.format("%Y-%m").to_string())
            .or_default() += 1;

        let Some(id) = report.neighborhood_id.filter(|id| names.contains_key(id)) else {
            continue;
        };
        let tally = tallies.entry(id).or_default();
        tally.count += 1;
        if let Some(resolved_at) = report.resolved_at {
            let seconds = (resolved_at - report.created_at).num_seconds();
            tally.resolution_hours.push(seconds as f64 / 3600.0);
        }
    }

    let mut neighborhood_statistics: Vec<NeighborhoodStatistic> = tallies
        .into_iter()
        .map(|(id, tally)| NeighborhoodStatistic {
            neighborhood_id: id,
            neighborhood_name: names.get(&id).copied().unwrap_or_default().to_string(),
            report_count: tally.count,
            avg_resolution_hours: mean(&tally.resolution_hours).map(|h| round_to(h, 1)),
        })
        .collect();
    neighborhood_statistics.sort_by(|a, b| {
        b.report_count
            .cmp(&a.report_count)
            .then(a.neighborhood_id.cmp(&b.neighborhood_id))
    });

    let time_trends = months
        .into_iter()
        .map(|(month, report_count)| TimeTrend {
            month,
            report_count,
        })
        .collect();

    HeatmapStatistics {
        neighborhood_statistics,
        time_trends,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn storage(e: RepositoryError) -> HeatmapError {
    HeatmapError::StorageError(e.to_string())
}
