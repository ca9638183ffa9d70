//! Community feed handlers proxying the search provider.

use axum::Json;
use axum::extract::State;

use alerthub_types::feed::{
    CommunityAlert, Event, IncidentContext, NewsArticle, SafePlace, WeatherReport,
};

use crate::http::error::AppError;
use crate::http::extractors::ApiQuery;
use crate::http::extractors::query::{
    ContextQuery, LocationQuery, NeighborhoodQuery, NewsQuery, SafePlacesQuery,
};
use crate::state::AppState;

/// GET /api/v1/serpapi/news?q=
pub async fn news(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NewsQuery>,
) -> Result<Json<Vec<NewsArticle>>, AppError> {
    Ok(Json(state.feed_service.news(&query.q).await?))
}

/// GET /api/v1/serpapi/neighborhood-news?name=
pub async fn neighborhood_news(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NeighborhoodQuery>,
) -> Result<Json<Vec<NewsArticle>>, AppError> {
    Ok(Json(state.feed_service.neighborhood_news(&query.name).await?))
}

/// GET /api/v1/serpapi/events
pub async fn events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(state.feed_service.events().await?))
}

/// GET /api/v1/serpapi/volunteer-events
pub async fn volunteer_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(state.feed_service.volunteer_events().await?))
}

/// GET /api/v1/serpapi/weather?location=
pub async fn weather(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LocationQuery>,
) -> Result<Json<WeatherReport>, AppError> {
    state
        .feed_service
        .weather(query.location.as_deref())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Weather data not available".to_string()))
}

/// GET /api/v1/serpapi/safe-places?lat=&lon=
pub async fn safe_places(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SafePlacesQuery>,
) -> Result<Json<Vec<SafePlace>>, AppError> {
    let at = query.coordinates()?;
    Ok(Json(state.feed_service.safe_places(at).await?))
}

/// GET /api/v1/serpapi/context?incident_type=&location=
pub async fn context(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ContextQuery>,
) -> Result<Json<IncidentContext>, AppError> {
    let context = state
        .feed_service
        .incident_context(&query.incident_type, query.location.as_deref())
        .await?;
    Ok(Json(context))
}

/// GET /api/v1/serpapi/alerts
pub async fn alerts(
    State(state): State<AppState>,
) -> Result<Json<Vec<CommunityAlert>>, AppError> {
    Ok(Json(state.feed_service.community_alerts().await?))
}
