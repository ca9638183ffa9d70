//! Heatmap GeoJSON and statistics handlers.

use axum::Json;
use axum::extract::State;

use alerthub_types::geo::FeatureCollection;
use alerthub_types::heatmap::{
    HeatmapStatistics, InfrastructureProperties, ReportFeatureProperties,
};

use crate::http::error::AppError;
use crate::http::extractors::ApiQuery;
use crate::http::extractors::query::HeatmapQuery;
use crate::state::AppState;

/// GET /api/v1/heatmap - Matching reports as GeoJSON points.
pub async fn heatmap(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HeatmapQuery>,
) -> Result<Json<FeatureCollection<ReportFeatureProperties>>, AppError> {
    let filter = query.into_filter()?;
    Ok(Json(state.heatmap_service.heatmap(&filter).await?))
}

/// GET /api/v1/heatmap/statistics
pub async fn statistics(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HeatmapQuery>,
) -> Result<Json<HeatmapStatistics>, AppError> {
    let filter = query.into_filter()?;
    Ok(Json(state.heatmap_service.statistics(&filter).await?))
}

/// GET /api/v1/heatmap/infrastructure
pub async fn infrastructure(
    State(state): State<AppState>,
) -> Result<Json<FeatureCollection<InfrastructureProperties>>, AppError> {
    Ok(Json(state.heatmap_service.infrastructure().await?))
}
