//! Report submission and lifecycle service.
//!
//! Validates incoming reports against the category reference data, assigns a
//! neighborhood from the report's coordinates, and applies status updates
//! (including `resolved_at` bookkeeping).

use alerthub_types::error::{RepositoryError, ReportError};
use alerthub_types::report::{
    AddUpdateRequest, Category, CreateReportRequest, Report, ReportId, ReportMedia, ReportStatus,
    ReportUpdate, tracking_number,
};
use alerthub_types::user::UserId;
use chrono::Utc;
use uuid::Uuid;

use crate::geo::locate_neighborhood;
use crate::repository::reference::ReferenceRepository;
use crate::repository::report::{ReportFilter, ReportRepository};

/// Cap applied to listings that are not scoped to a single user.
pub const UNSCOPED_LIST_LIMIT: i64 = 100;

/// Service orchestrating the report lifecycle.
pub struct ReportService<R: ReportRepository, C: ReferenceRepository> {
    reports: R,
    reference: C,
}

impl<R: ReportRepository, C: ReferenceRepository> ReportService<R, C> {
    pub fn new(reports: R, reference: C) -> Self {
        Self { reports, reference }
    }

    /// File a new report on behalf of `user_id`.
    ///
    /// Required: category, description, severity, latitude and longitude.
    /// When no neighborhood is given, the first neighborhood whose bounds
    /// contain the point is assigned.
    pub async fn create_report(
        &self,
        user_id: UserId,
        request: CreateReportRequest,
    ) -> Result<Report, ReportError> {
        let location = request.coordinates();

        let mut missing = Vec::new();
        if request.category_id.is_none() {
            missing.push("category_id");
        }
        if request.description.is_none() {
            missing.push("description");
        }
        if request.severity.is_none() {
            missing.push("severity");
        }
        if location.is_none() {
            missing.push("latitude");
            missing.push("longitude");
        }
        let (Some(category_id), Some(description), Some(severity), Some(location)) = (
            request.category_id.as_deref(),
            request.description.as_deref(),
            request.severity,
            location,
        ) else {
            return Err(ReportError::MissingFields(
                missing.into_iter().map(str::to_string).collect(),
            ));
        };

        let description = description.trim();
        if description.is_empty() {
            return Err(ReportError::EmptyDescription);
        }
        location.validate().map_err(ReportError::InvalidLocation)?;

        let category_id = category_id.trim().to_lowercase();
        self.reference
            .category(&category_id)
            .await
            .map_err(storage)?
            .ok_or_else(|| ReportError::UnknownCategory(category_id.clone()))?;

        for media in &request.media {
            if media.file_url.trim().is_empty() {
                return Err(ReportError::InvalidMedia("file_url cannot be empty".to_string()));
            }
            if media.file_size.is_some_and(|size| size < 0) {
                return Err(ReportError::InvalidMedia("file_size cannot be negative".to_string()));
            }
        }

        let neighborhood_id = match request.neighborhood_id {
            Some(id) => Some(id),
            None => {
                let neighborhoods = self.reference.neighborhoods().await.map_err(storage)?;
                locate_neighborhood(&neighborhoods, &location).map(|n| n.neighborhood_id)
            }
        };

        let report_id = ReportId::new();
        let now = Utc::now();
        let media = request
            .media
            .iter()
            .map(|m| ReportMedia {
                media_id: Uuid::now_v7(),
                report_id,
                media_type: m.media_type,
                file_url: m.file_url.trim().to_string(),
                original_filename: m.original_filename.clone(),
                content_type: m.content_type.clone(),
                file_size: m.file_size,
                created_at: now,
            })
            .collect();

        let report = Report {
            report_id,
            tracking_number: tracking_number(&now, &report_id),
            user_id,
            category_id,
            title: request.title.clone().filter(|t| !t.trim().is_empty()),
            description: description.to_string(),
            severity,
            location,
            address: request.resolved_address(),
            neighborhood_id,
            council_district: request.council_district,
            status: ReportStatus::Submitted,
            created_at: now,
            updated_at: now,
            resolved_at: None,
            media,
        };

        let report = self.reports.create(&report).await.map_err(storage)?;

        tracing::info!(
            report_id = %report.report_id,
            tracking_number = %report.tracking_number,
            user_id = %user_id,
            category = %report.category_id,
            "report submitted"
        );

        Ok(report)
    }

    /// List reports newest first. Unscoped listings are capped at
    /// [`UNSCOPED_LIST_LIMIT`].
    pub async fn list_reports(&self, mut filter: ReportFilter) -> Result<Vec<Report>, ReportError> {
        if filter.user_id.is_none() {
            filter.limit = Some(
                filter
                    .limit
                    .map_or(UNSCOPED_LIST_LIMIT, |l| l.clamp(0, UNSCOPED_LIST_LIMIT)),
            );
        } else if let Some(limit) = filter.limit {
            filter.limit = Some(limit.max(0));
        }
        self.reports.list(filter).await.map_err(storage)
    }

    pub async fn get_report(&self, id: &ReportId) -> Result<Report, ReportError> {
        self.reports
            .get(id)
            .await
            .map_err(storage)?
            .ok_or(ReportError::NotFound)
    }

    /// Append a status update. Moving to resolved/closed stamps `resolved_at`
    /// (keeping an earlier stamp); moving back to an open status clears it.
    pub async fn add_update(
        &self,
        report_id: &ReportId,
        user_id: UserId,
        request: AddUpdateRequest,
    ) -> Result<ReportUpdate, ReportError> {
        let comment = request
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let mut missing = Vec::new();
        if request.status_change.is_none() {
            missing.push("status_change".to_string());
        }
        if comment.is_none() {
            missing.push("comment".to_string());
        }
        let (Some(status_change), Some(comment)) = (request.status_change, comment) else {
            return Err(ReportError::MissingFields(missing));
        };

        let report = self.get_report(report_id).await?;

        let now = Utc::now();
        let resolved_at = if status_change.is_terminal() {
            Some(report.resolved_at.unwrap_or(now))
        } else {
            None
        };

        let update = ReportUpdate {
            update_id: Uuid::now_v7(),
            report_id: *report_id,
            user_id,
            status_change,
            comment,
            created_at: now,
        };

        self.reports
            .add_update(&update, resolved_at)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ReportError::NotFound,
                other => storage(other),
            })?;

        tracing::info!(
            report_id = %report_id,
            from = %report.status,
            to = %status_change,
            "report status updated"
        );

        Ok(update)
    }

    pub async fn list_updates(&self, report_id: &ReportId) -> Result<Vec<ReportUpdate>, ReportError> {
        self.get_report(report_id).await?;
        self.reports.list_updates(report_id).await.map_err(storage)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ReportError> {
        self.reference.categories().await.map_err(storage)
    }
}

fn storage(e: RepositoryError) -> ReportError {
    ReportError::StorageError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{InMemoryReports, StaticReference};
    use alerthub_types::report::{LocationInput, MediaInput, MediaType, Severity};

    fn service() -> ReportService<InMemoryReports, StaticReference> {
        ReportService::new(InMemoryReports::default(), StaticReference::default())
    }

    fn pothole() -> CreateReportRequest {
        CreateReportRequest {
            category_id: Some("infrastructure".to_string()),
            title: Some("Pothole on Congress Ave".to_string()),
            description: Some("Large pothole in the middle of the road".to_string()),
            severity: Some(Severity::new(3).unwrap()),
            latitude: Some(30.2672),
            longitude: Some(-97.7431),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_report_assigns_tracking_and_neighborhood() {
        let svc = service();
        let user = UserId::new();
        let report = svc.create_report(user, pothole()).await.unwrap();

        assert_eq!(report.status, ReportStatus::Submitted);
        assert_eq!(report.user_id, user);
        assert_eq!(report.neighborhood_id, Some(1));
        let (stamp, suffix) = report.tracking_number.split_once('-').unwrap();
        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
        assert!(report.report_id.to_string().starts_with(suffix));
        assert_eq!(suffix.len(), 8);
    }

    #[tokio::test]
    async fn test_create_report_outside_known_neighborhoods() {
        let mut req = pothole();
        req.latitude = Some(29.0);
        let report = service().create_report(UserId::new(), req).await.unwrap();
        assert!(report.neighborhood_id.is_none());
    }

    #[tokio::test]
    async fn test_create_report_accepts_nested_location() {
        let mut req = pothole();
        req.latitude = None;
        req.longitude = None;
        req.location = Some(LocationInput {
            latitude: Some(30.27),
            longitude: Some(-97.70),
            address: Some("E 12th St".to_string()),
        });
        let report = service().create_report(UserId::new(), req).await.unwrap();
        assert_eq!(report.neighborhood_id, Some(3));
        assert_eq!(report.address.as_deref(), Some("E 12th St"));
    }

    #[tokio::test]
    async fn test_create_report_lists_missing_fields() {
        let err = service()
            .create_report(UserId::new(), CreateReportRequest::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing fields: category_id, description, severity, latitude, longitude"
        );
    }

    #[tokio::test]
    async fn test_create_report_validation() {
        let svc = service();

        let mut req = pothole();
        req.category_id = Some("zombies".to_string());
        assert!(matches!(
            svc.create_report(UserId::new(), req).await,
            Err(ReportError::UnknownCategory(_))
        ));

        let mut req = pothole();
        req.description = Some("   ".to_string());
        assert!(matches!(
            svc.create_report(UserId::new(), req).await,
            Err(ReportError::EmptyDescription)
        ));

        let mut req = pothole();
        req.latitude = Some(120.0);
        assert!(matches!(
            svc.create_report(UserId::new(), req).await,
            Err(ReportError::InvalidLocation(_))
        ));

        let mut req = pothole();
        req.media = vec![MediaInput {
            media_type: MediaType::Image,
            file_url: " ".to_string(),
            original_filename: None,
            content_type: None,
            file_size: None,
        }];
        assert!(matches!(
            svc.create_report(UserId::new(), req).await,
            Err(ReportError::InvalidMedia(_))
        ));
    }

    #[tokio::test]
    async fn test_create_report_keeps_media() {
        let mut req = pothole();
        req.media = vec![MediaInput {
            media_type: MediaType::Image,
            file_url: "https://cdn.example.com/p.jpg".to_string(),
            original_filename: Some("p.jpg".to_string()),
            content_type: Some("image/jpeg".to_string()),
            file_size: Some(2048),
        }];
        let report = service().create_report(UserId::new(), req).await.unwrap();
        assert_eq!(report.media.len(), 1);
        assert_eq!(report.media[0].report_id, report.report_id);
    }

    #[tokio::test]
    async fn test_list_reports_scoped_to_user() {
        let svc = service();
        let alice = UserId::new();
        let bob = UserId::new();
        svc.create_report(alice, pothole()).await.unwrap();
        svc.create_report(bob, pothole()).await.unwrap();
        svc.create_report(alice, pothole()).await.unwrap();

        let mine = svc
            .list_reports(ReportFilter {
                user_id: Some(alice),
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|r| r.user_id == alice));
        assert!(mine[0].created_at >= mine[1].created_at);
    }

    #[tokio::test]
    async fn test_unscoped_listing_is_capped() {
        let svc = service();
        let user = UserId::new();
        for _ in 0..105 {
            svc.create_report(user, pothole()).await.unwrap();
        }
        let all = svc.list_reports(ReportFilter::default()).await.unwrap();
        assert_eq!(all.len(), 100);

        let huge = svc
            .list_reports(ReportFilter {
                user_id: None,
                limit: Some(500),
            })
            .await
            .unwrap();
        assert_eq!(huge.len(), 100);
    }

    #[tokio::test]
    async fn test_get_missing_report() {
        assert!(matches!(
            service().get_report(&ReportId::new()).await,
            Err(ReportError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_status_updates_track_resolution() {
        let svc = service();
        let user = UserId::new();
        let report = svc.create_report(user, pothole()).await.unwrap();

        svc.add_update(
            &report.report_id,
            user,
            AddUpdateRequest {
                status_change: Some(ReportStatus::Resolved),
                comment: Some("Patched".to_string()),
            },
        )
        .await
        .unwrap();
        let resolved = svc.get_report(&report.report_id).await.unwrap();
        assert_eq!(resolved.status, ReportStatus::Resolved);
        let first_stamp = resolved.resolved_at.unwrap();

        svc.add_update(
            &report.report_id,
            user,
            AddUpdateRequest {
                status_change: Some(ReportStatus::Closed),
                comment: Some("Verified".to_string()),
            },
        )
        .await
        .unwrap();
        let closed = svc.get_report(&report.report_id).await.unwrap();
        assert_eq!(closed.resolved_at, Some(first_stamp));

        svc.add_update(
            &report.report_id,
            user,
            AddUpdateRequest {
                status_change: Some(ReportStatus::InProgress),
                comment: Some("Reopened".to_string()),
            },
        )
        .await
        .unwrap();
        let reopened = svc.get_report(&report.report_id).await.unwrap();
        assert!(reopened.resolved_at.is_none());

        let history = svc.list_updates(&report.report_id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].comment, "Patched");
    }

    #[tokio::test]
    async fn test_update_requires_fields_and_report() {
        let svc = service();
        let err = svc
            .add_update(&ReportId::new(), UserId::new(), AddUpdateRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing fields: status_change, comment");

        let err = svc
            .add_update(
                &ReportId::new(),
                UserId::new(),
                AddUpdateRequest {
                    status_change: Some(ReportStatus::Closed),
                    comment: Some("dup".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::NotFound));
    }
}
