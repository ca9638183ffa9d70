//! Report submission, listing and status update handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use alerthub_types::error::ReportError;
use alerthub_types::feed::{DuplicateCandidate, DuplicateCheckRequest};
use alerthub_types::report::{
    AddUpdateRequest, Category, CreateReportRequest, Report, ReportId, ReportUpdate,
};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::query::ReportListQuery;
use crate::http::extractors::{ApiJson, ApiQuery};
use crate::state::AppState;

/// Unparsable ids cannot name an existing report.
fn parse_report_id(raw: &str) -> Result<ReportId, AppError> {
    raw.parse().map_err(|_| AppError::Report(ReportError::NotFound))
}

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.report_service.list_categories().await?))
}

/// POST /api/v1/reports - File a report as the authenticated user.
///
/// A `user_id` in the body is ignored; the token decides who files it.
pub async fn create_report(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateReportRequest>,
) -> Result<(StatusCode, Json<Report>), AppError> {
    let report = state.report_service.create_report(user_id, body).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /api/v1/reports?user_id=&limit=
pub async fn list_reports(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReportListQuery>,
) -> Result<Json<Vec<Report>>, AppError> {
    let filter = query.into_filter()?;
    Ok(Json(state.report_service.list_reports(filter).await?))
}

/// GET /api/v1/reports/{id}
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Report>, AppError> {
    let id = parse_report_id(&id)?;
    Ok(Json(state.report_service.get_report(&id).await?))
}

/// GET /api/v1/reports/{id}/updates - Status history, oldest first.
pub async fn list_updates(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ReportUpdate>>, AppError> {
    let id = parse_report_id(&id)?;
    Ok(Json(state.report_service.list_updates(&id).await?))
}

/// POST /api/v1/reports/{id}/updates
pub async fn add_update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AddUpdateRequest>,
) -> Result<(StatusCode, Json<ReportUpdate>), AppError> {
    let id = parse_report_id(&id)?;
    let update = state.report_service.add_update(&id, user_id, body).await?;
    Ok((StatusCode::CREATED, Json(update)))
}

/// POST /api/v1/reports/duplicates - Published items resembling a draft report.
pub async fn check_duplicates(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DuplicateCheckRequest>,
) -> Result<Json<Vec<DuplicateCandidate>>, AppError> {
    let candidates = state
        .feed_service
        .duplicates(&body.description, body.location.as_deref())
        .await?;
    Ok(Json(candidates))
}
