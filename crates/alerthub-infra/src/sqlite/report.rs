//! SQLite report repository implementation.
//!
//! Reports, their media references and their update history. Report + media
//! inserts and update + status changes each run in one writer transaction.

use std::collections::HashMap;

use alerthub_core::repository::report::{ReportFilter, ReportRepository};
use alerthub_types::error::RepositoryError;
use alerthub_types::geo::Coordinates;
use alerthub_types::heatmap::HeatmapFilter;
use alerthub_types::report::{
    MediaType, Report, ReportId, ReportMedia, ReportStatus, ReportUpdate, Severity,
};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use super::pool::{DatabasePool, format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `ReportRepository`.
pub struct SqliteReportRepository {
    pool: DatabasePool,
}

impl SqliteReportRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ReportRow {
    report_id: String,
    tracking_number: String,
    user_id: String,
    category_id: String,
    title: Option<String>,
    description: String,
    severity: i64,
    latitude: f64,
    longitude: f64,
    address: Option<String>,
    neighborhood_id: Option<i64>,
    council_district: Option<i64>,
    status: String,
    created_at: String,
    updated_at: String,
    resolved_at: Option<String>,
}

impl ReportRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            report_id: row.try_get("report_id")?,
            tracking_number: row.try_get("tracking_number")?,
            user_id: row.try_get("user_id")?,
            category_id: row.try_get("category_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            severity: row.try_get("severity")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            address: row.try_get("address")?,
            neighborhood_id: row.try_get("neighborhood_id")?,
            council_district: row.try_get("council_district")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            resolved_at: row.try_get("resolved_at")?,
        })
    }

    fn into_report(self) -> Result<Report, RepositoryError> {
        let report_id = self
            .report_id
            .parse::<ReportId>()
            .map_err(|e| RepositoryError::Query(format!("invalid report id: {e}")))?;
        let user_id = self
            .user_id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        let status: ReportStatus = self.status.parse().map_err(RepositoryError::Query)?;
        let severity = Severity::new(self.severity).map_err(RepositoryError::Query)?;

        Ok(Report {
            report_id,
            tracking_number: self.tracking_number,
            user_id,
            category_id: self.category_id,
            title: self.title,
            description: self.description,
            severity,
            location: Coordinates::new(self.latitude, self.longitude),
            address: self.address,
            neighborhood_id: self.neighborhood_id,
            council_district: self.council_district,
            status,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
            resolved_at: self.resolved_at.as_deref().map(parse_datetime).transpose()?,
            media: Vec::new(),
        })
    }
}

fn media_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ReportMedia, RepositoryError> {
    let media_id: String = row.try_get("media_id").map_err(query_error)?;
    let report_id: String = row.try_get("report_id").map_err(query_error)?;
    let media_type: String = row.try_get("media_type").map_err(query_error)?;
    let created_at: String = row.try_get("created_at").map_err(query_error)?;

    Ok(ReportMedia {
        media_id: Uuid::parse_str(&media_id)
            .map_err(|e| RepositoryError::Query(format!("invalid media id: {e}")))?,
        report_id: report_id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid report id: {e}")))?,
        media_type: media_type.parse::<MediaType>().map_err(RepositoryError::Query)?,
        file_url: row.try_get("file_url").map_err(query_error)?,
        original_filename: row.try_get("original_filename").map_err(query_error)?,
        content_type: row.try_get("content_type").map_err(query_error)?,
        file_size: row.try_get("file_size").map_err(query_error)?,
        created_at: parse_datetime(&created_at)?,
    })
}

fn update_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ReportUpdate, RepositoryError> {
    let update_id: String = row.try_get("update_id").map_err(query_error)?;
    let report_id: String = row.try_get("report_id").map_err(query_error)?;
    let user_id: String = row.try_get("user_id").map_err(query_error)?;
    let status_change: String = row.try_get("status_change").map_err(query_error)?;
    let created_at: String = row.try_get("created_at").map_err(query_error)?;

    Ok(ReportUpdate {
        update_id: Uuid::parse_str(&update_id)
            .map_err(|e| RepositoryError::Query(format!("invalid update id: {e}")))?,
        report_id: report_id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid report id: {e}")))?,
        user_id: user_id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?,
        status_change: status_change.parse().map_err(RepositoryError::Query)?,
        comment: row.try_get("comment").map_err(query_error)?,
        created_at: parse_datetime(&created_at)?,
    })
}

fn reports_from_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Report>, RepositoryError> {
    rows.iter()
        .map(|row| ReportRow::from_row(row).map_err(query_error)?.into_report())
        .collect()
}

impl SqliteReportRepository {
    /// Attach media to already-loaded reports with a single query.
    async fn attach_media(&self, reports: &mut [Report]) -> Result<(), RepositoryError> {
        if reports.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM report_media WHERE report_id IN (");
        let mut ids = qb.separated(", ");
        for report in reports.iter() {
            ids.push_bind(report.report_id.to_string());
        }
        qb.push(") ORDER BY created_at ASC, media_id ASC");

        let rows = qb
            .build()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut by_report: HashMap<ReportId, Vec<ReportMedia>> = HashMap::new();
        for row in &rows {
            let media = media_from_row(row)?;
            by_report.entry(media.report_id).or_default().push(media);
        }
        for report in reports.iter_mut() {
            report.media = by_report.remove(&report.report_id).unwrap_or_default();
        }
        Ok(())
    }
}

impl ReportRepository for SqliteReportRepository {
    async fn create(&self, report: &Report) -> Result<Report, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        sqlx::query(
            "INSERT INTO reports (report_id, tracking_number, user_id, category_id, title, description, severity, latitude, longitude, address, neighborhood_id, council_district, status, created_at, updated_at, resolved_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(report.report_id.to_string())
        .bind(&report.tracking_number)
        .bind(report.user_id.to_string())
        .bind(&report.category_id)
        .bind(&report.title)
        .bind(&report.description)
        .bind(i64::from(report.severity.level()))
        .bind(report.location.latitude)
        .bind(report.location.longitude)
        .bind(&report.address)
        .bind(report.neighborhood_id)
        .bind(report.council_district)
        .bind(report.status.to_string())
        .bind(format_datetime(&report.created_at))
        .bind(format_datetime(&report.updated_at))
        .bind(report.resolved_at.as_ref().map(format_datetime))
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE") => {
                RepositoryError::Conflict(format!(
                    "tracking number '{}' already exists",
                    report.tracking_number
                ))
            }
            other => query_error(other),
        })?;

        for media in &report.media {
            sqlx::query(
                "INSERT INTO report_media (media_id, report_id, media_type, file_url, original_filename, content_type, file_size, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(media.media_id.to_string())
            .bind(report.report_id.to_string())
            .bind(media.media_type.to_string())
            .bind(&media.file_url)
            .bind(&media.original_filename)
            .bind(&media.content_type)
            .bind(media.file_size)
            .bind(format_datetime(&media.created_at))
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }

        tx.commit().await.map_err(query_error)?;
        Ok(report.clone())
    }

    async fn get(&self, id: &ReportId) -> Result<Option<Report>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM reports WHERE report_id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut reports = vec![ReportRow::from_row(&row).map_err(query_error)?.into_report()?];
        self.attach_media(&mut reports).await?;
        Ok(reports.pop())
    }

    async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>, RepositoryError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM reports");
        if let Some(user_id) = filter.user_id {
            qb.push(" WHERE user_id = ").push_bind(user_id.to_string());
        }
        qb.push(" ORDER BY created_at DESC, report_id DESC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let rows = qb
            .build()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;
        let mut reports = reports_from_rows(&rows)?;
        self.attach_media(&mut reports).await?;
        Ok(reports)
    }

    async fn query(&self, filter: &HeatmapFilter) -> Result<Vec<Report>, RepositoryError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM reports WHERE 1 = 1");
        if let Some(category_id) = &filter.category_id {
            qb.push(" AND category_id = ").push_bind(category_id.clone());
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.to_string());
        }
        if let Some(district) = filter.council_district {
            qb.push(" AND council_district = ").push_bind(district);
        }
        // created_at is fixed-width RFC 3339 UTC, so its first 10 chars are the date.
        if let Some(start) = filter.start_date {
            qb.push(" AND substr(created_at, 1, 10) >= ")
                .push_bind(start.format("%Y-%m-%d").to_string());
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND substr(created_at, 1, 10) <= ")
                .push_bind(end.format("%Y-%m-%d").to_string());
        }
        qb.push(" ORDER BY created_at ASC");

        let rows = qb
            .build()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;
        reports_from_rows(&rows)
    }

    async fn add_update(
        &self,
        update: &ReportUpdate,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let result = sqlx::query(
            "UPDATE reports SET status = ?, updated_at = ?, resolved_at = ? WHERE report_id = ?",
        )
        .bind(update.status_change.to_string())
        .bind(format_datetime(&update.created_at))
        .bind(resolved_at.as_ref().map(format_datetime))
        .bind(update.report_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            "INSERT INTO report_updates (update_id, report_id, user_id, status_change, comment, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(update.update_id.to_string())
        .bind(update.report_id.to_string())
        .bind(update.user_id.to_string())
        .bind(update.status_change.to_string())
        .bind(&update.comment)
        .bind(format_datetime(&update.created_at))
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(())
    }

    async fn list_updates(&self, id: &ReportId) -> Result<Vec<ReportUpdate>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM report_updates WHERE report_id = ? ORDER BY created_at ASC, update_id ASC",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter().map(update_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_pool;
    use crate::sqlite::user::SqliteUserRepository;
    use crate::sqlite::user::tests::make_user;
    use alerthub_core::repository::user::UserRepository;
    use alerthub_types::report::tracking_number;
    use alerthub_types::user::UserId;
    use chrono::{Duration, NaiveDate, TimeZone};

    async fn setup() -> (tempfile::TempDir, SqliteReportRepository, UserId) {
        let (dir, pool) = test_pool().await;
        let users = SqliteUserRepository::new(pool.clone());
        let user = make_user("reporter@example.com");
        users.create(&user).await.unwrap();
        (dir, SqliteReportRepository::new(pool), user.id)
    }

    fn make_report(user_id: UserId, category: &str, created_at: DateTime<Utc>) -> Report {
        let report_id = ReportId::new();
        Report {
            report_id,
            tracking_number: tracking_number(&created_at, &report_id),
            user_id,
            category_id: category.to_string(),
            title: Some("Broken signal".to_string()),
            description: "Signal stuck on red".to_string(),
            severity: Severity::new(4).unwrap(),
            location: Coordinates::new(30.2672, -97.7431),
            address: Some("Congress Ave & 6th St".to_string()),
            neighborhood_id: Some(1),
            council_district: Some(9),
            status: ReportStatus::Submitted,
            created_at,
            updated_at: created_at,
            resolved_at: None,
            media: Vec::new(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 23, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_with_media() {
        let (_dir, repo, user_id) = setup().await;
        let mut report = make_report(user_id, "traffic", day(2024, 1, 5));
        report.media.push(ReportMedia {
            media_id: Uuid::now_v7(),
            report_id: report.report_id,
            media_type: MediaType::Image,
            file_url: "https://cdn.example.com/signal.jpg".to_string(),
            original_filename: Some("signal.jpg".to_string()),
            content_type: Some("image/jpeg".to_string()),
            file_size: Some(1024),
            created_at: day(2024, 1, 5),
        });
        repo.create(&report).await.unwrap();

        let stored = repo.get(&report.report_id).await.unwrap().unwrap();
        assert_eq!(stored.tracking_number, report.tracking_number);
        assert_eq!(stored.severity.level(), 4);
        assert_eq!(stored.location, report.location);
        assert_eq!(stored.created_at, report.created_at);
        assert_eq!(stored.media.len(), 1);
        assert_eq!(stored.media[0].media_type, MediaType::Image);

        assert!(repo.get(&ReportId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category() {
        let (_dir, repo, user_id) = setup().await;
        let report = make_report(user_id, "zombies", day(2024, 1, 5));
        assert!(repo.create(&report).await.is_err());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_limit() {
        let (_dir, repo, user_id) = setup().await;
        for d in 1..=3 {
            repo.create(&make_report(user_id, "traffic", day(2024, 1, d)))
                .await
                .unwrap();
        }

        let all = repo
            .list(ReportFilter {
                user_id: Some(user_id),
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].created_at, day(2024, 1, 3));

        let limited = repo
            .list(ReportFilter {
                user_id: None,
                limit: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);

        let nobody = repo
            .list(ReportFilter {
                user_id: Some(UserId::new()),
                limit: None,
            })
            .await
            .unwrap();
        assert!(nobody.is_empty());
    }

    #[tokio::test]
    async fn test_query_filters() {
        let (_dir, repo, user_id) = setup().await;
        repo.create(&make_report(user_id, "traffic", day(2024, 1, 5)))
            .await
            .unwrap();
        repo.create(&make_report(user_id, "noise", day(2024, 1, 6)))
            .await
            .unwrap();
        let mut other_district = make_report(user_id, "traffic", day(2024, 2, 1));
        other_district.council_district = Some(3);
        repo.create(&other_district).await.unwrap();

        let traffic = repo
            .query(&HeatmapFilter {
                category_id: Some("traffic".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(traffic.len(), 2);

        // Inclusive bounds on whole days, even late in the day.
        let january_fifth = repo
            .query(&HeatmapFilter {
                start_date: NaiveDate::from_ymd_opt(2024, 1, 5),
                end_date: NaiveDate::from_ymd_opt(2024, 1, 5),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(january_fifth.len(), 1);

        let district = repo
            .query(&HeatmapFilter {
                council_district: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(district.len(), 1);

        let resolved = repo
            .query(&HeatmapFilter {
                status: Some(ReportStatus::Resolved),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn test_add_update_applies_status() {
        let (_dir, repo, user_id) = setup().await;
        let report = make_report(user_id, "traffic", day(2024, 1, 5));
        repo.create(&report).await.unwrap();

        let at = day(2024, 1, 5) + Duration::hours(3);
        let update = ReportUpdate {
            update_id: Uuid::now_v7(),
            report_id: report.report_id,
            user_id,
            status_change: ReportStatus::Resolved,
            comment: "Signal repaired".to_string(),
            created_at: at,
        };
        repo.add_update(&update, Some(at)).await.unwrap();

        let stored = repo.get(&report.report_id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReportStatus::Resolved);
        assert_eq!(stored.resolved_at, Some(at));
        assert_eq!(stored.updated_at, at);

        let history = repo.list_updates(&report.report_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].comment, "Signal repaired");
    }

    #[tokio::test]
    async fn test_add_update_missing_report() {
        let (_dir, repo, user_id) = setup().await;
        let update = ReportUpdate {
            update_id: Uuid::now_v7(),
            report_id: ReportId::new(),
            user_id,
            status_change: ReportStatus::Closed,
            comment: "n/a".to_string(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            repo.add_update(&update, None).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
