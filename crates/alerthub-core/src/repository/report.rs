//! Report repository trait definition.

use alerthub_types::error::RepositoryError;
use alerthub_types::heatmap::HeatmapFilter;
use alerthub_types::report::{Report, ReportId, ReportUpdate};
use alerthub_types::user::UserId;
use chrono::{DateTime, Utc};

/// Filter criteria for listing reports. Results are always newest first.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Only reports filed by this user.
    pub user_id: Option<UserId>,
    /// Maximum number of results.
    pub limit: Option<i64>,
}

/// Repository trait for reports, their media and their update history.
pub trait ReportRepository: Send + Sync {
    /// Insert a report together with its media references, atomically.
    fn create(
        &self,
        report: &Report,
    ) -> impl std::future::Future<Output = Result<Report, RepositoryError>> + Send;

    fn get(
        &self,
        id: &ReportId,
    ) -> impl std::future::Future<Output = Result<Option<Report>, RepositoryError>> + Send;

    fn list(
        &self,
        filter: ReportFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Report>, RepositoryError>> + Send;

    /// All reports matching the heatmap filter, unpaginated, oldest first.
    /// Media is not loaded.
    fn query(
        &self,
        filter: &HeatmapFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Report>, RepositoryError>> + Send;

    /// Append an update and apply its status change (plus `resolved_at`) to
    /// the report in a single transaction. `RepositoryError::NotFound` when
    /// the report does not exist.
    fn add_update(
        &self,
        update: &ReportUpdate,
        resolved_at: Option<DateTime<Utc>>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Update history for a report, oldest first.
    fn list_updates(
        &self,
        id: &ReportId,
    ) -> impl std::future::Future<Output = Result<Vec<ReportUpdate>, RepositoryError>> + Send;
}
