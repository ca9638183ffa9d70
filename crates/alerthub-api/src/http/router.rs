//! Axum router configuration with middleware.
//!
//! API routes live under `/api/v1/`; `/` and `/health` are unauthenticated
//! probes. Middleware: CORS, request tracing.
//!
//! When `ALERTHUB_WEB_DIR` (default `dist`) exists, the built web client is
//! served from it. API routes take priority; unknown paths fall through to
//! `index.html` for client-side routing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Auth
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
        // Reports
        .route("/categories", get(handlers::report::list_categories))
        .route(
            "/reports",
            get(handlers::report::list_reports).post(handlers::report::create_report),
        )
        .route(
            "/reports/duplicates",
            post(handlers::report::check_duplicates),
        )
        .route("/reports/{id}", get(handlers::report::get_report))
        .route(
            "/reports/{id}/updates",
            get(handlers::report::list_updates).post(handlers::report::add_update),
        )
        // Heatmap
        .route("/heatmap", get(handlers::heatmap::heatmap))
        .route("/heatmap/statistics", get(handlers::heatmap::statistics))
        .route(
            "/heatmap/infrastructure",
            get(handlers::heatmap::infrastructure),
        )
        // Community feed
        .route("/serpapi/news", get(handlers::feed::news))
        .route(
            "/serpapi/neighborhood-news",
            get(handlers::feed::neighborhood_news),
        )
        .route("/serpapi/events", get(handlers::feed::events))
        .route(
            "/serpapi/volunteer-events",
            get(handlers::feed::volunteer_events),
        )
        .route("/serpapi/weather", get(handlers::feed::weather))
        .route("/serpapi/safe-places", get(handlers::feed::safe_places))
        .route("/serpapi/context", get(handlers::feed::context))
        .route("/serpapi/alerts", get(handlers::feed::alerts));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/", get(index))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let web_dir = std::env::var("ALERTHUB_WEB_DIR").unwrap_or_else(|_| "dist".to_string());
    if std::path::Path::new(&web_dir).join("index.html").exists() {
        let index_path = format!("{web_dir}/index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "web client static file serving enabled");
    }

    router
}

/// GET / - Liveness banner.
async fn index() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "message": "AlertHub API is up",
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
    }))
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::body::Body;
    use axum::extract::Query;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use alerthub_infra::crypto::token::HmacTokenSigner;
    use alerthub_infra::search::SerpApiClient;
    use alerthub_infra::sqlite::pool::{DatabasePool, database_url};
    use alerthub_types::config::AppConfig;

    use super::*;

    async fn test_app(search: SerpApiClient) -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::new(&database_url(dir.path())).await.unwrap();
        let state = AppState::build(
            dir.path().to_path_buf(),
            AppConfig::default(),
            pool,
            HmacTokenSigner::new(b"router-test-key".to_vec()),
            search,
        );
        (dir, build_router(state))
    }

    fn unconfigured_search() -> SerpApiClient {
        SerpApiClient::new("http://127.0.0.1:9/search", None, Duration::from_secs(1))
    }

    /// Local stand-in for the search API, answering by engine.
    async fn fake_search_api() -> SerpApiClient {
        async fn search(Query(params): Query<HashMap<String, String>>) -> axum::Json<Value> {
            assert_eq!(params.get("api_key").map(String::as_str), Some("test-key"));
            let doc = match params.get("engine").map(String::as_str) {
                Some("google_news") => json!({"news_results": [
                    {"title": "Congress Ave lane closures", "link": "https://news.example/1",
                     "snippet": "Crews repave downtown", "thumbnail": "https://img.example/1.png"}
                ]}),
                Some("google_events") => json!({"events_results": [
                    {"title": "Farmers market", "date": {"when": "Sat, 9 AM"},
                     "address": ["Republic Square", "Austin, TX"], "link": "https://events.example/1"}
                ]}),
                Some("google_maps") => json!({"local_results": [
                    {"title": "Central Fire Station", "address": "401 E 5th St",
                     "rating": 4.6, "place_id": "pid1",
                     "gps_coordinates": {"latitude": 30.2665, "longitude": -97.7394}}
                ]}),
                _ => json!({
                    "organic_results": [
                        {"title": "Major crash closes I-35", "link": "https://news.example/crash",
                         "snippet": "Broken streetlight blamed for downtown crash"},
                        {"title": "City council meeting", "link": "https://news.example/council",
                         "snippet": "Budget talks continue"}
                    ],
                    "answer_box": {"temperature": "88", "weather": "Sunny", "humidity": "40%"}
                }),
            };
            axum::Json(doc)
        }

        let app = Router::new().route("/search", get(search));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        SerpApiClient::new(
            format!("http://{addr}/search"),
            Some("test-key".to_string().into()),
            Duration::from_secs(5),
        )
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn signup(app: &Router, email: &str) -> (String, String) {
        let (status, body) = send(
            app,
            post_json(
                "/api/v1/auth/signup",
                None,
                json!({"email": email, "password": "correct horse", "first_name": "Ada"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["user"]["user_id"].as_str().unwrap().to_string(),
        )
    }

    fn downtown_report() -> Value {
        json!({
            "category_id": "infrastructure",
            "title": "Streetlight out",
            "description": "Broken streetlight at the corner",
            "severity": "high",
            "latitude": 30.2672,
            "longitude": -97.7431
        })
    }

    #[tokio::test]
    async fn test_index_and_health() {
        let (_dir, app) = test_app(unconfigured_search()).await;

        let (status, body) = send(&app, get_req("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "AlertHub API is up");

        let (status, body) = send(&app, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_signup_login_and_me() {
        let (_dir, app) = test_app(unconfigured_search()).await;
        let (_, user_id) = signup(&app, "ada@example.com").await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/auth/login",
                None,
                json!({"email": "ADA@example.com", "password": "correct horse"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], user_id.as_str());
        let token = body["access_token"].as_str().unwrap().to_string();

        let request = Request::builder()
            .uri("/api/v1/auth/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "ada@example.com");
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_auth_errors() {
        let (_dir, app) = test_app(unconfigured_search()).await;
        signup(&app, "dup@example.com").await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/auth/signup",
                None,
                json!({"email": "dup@example.com", "password": "another one"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "EMAIL_TAKEN");

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/auth/login",
                None,
                json!({"email": "dup@example.com", "password": "wrong password"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");

        let (status, body) =
            send(&app, post_json("/api/v1/auth/signup", None, json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing fields: email, password");

        let (status, _) = send(&app, get_req("/api/v1/auth/me")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (_dir, app) = test_app(unconfigured_search()).await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_report_lifecycle() {
        let (_dir, app) = test_app(unconfigured_search()).await;
        let (token, user_id) = signup(&app, "reporter@example.com").await;

        let (status, _) =
            send(&app, post_json("/api/v1/reports", None, downtown_report())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, report) = send(
            &app,
            post_json("/api/v1/reports", Some(&token), downtown_report()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{report}");
        assert_eq!(report["user_id"], user_id.as_str());
        assert_eq!(report["status"], "submitted");
        assert_eq!(report["severity"], 5);
        assert_eq!(report["neighborhood_id"], 1);
        assert_eq!(report["location"]["type"], "Point");
        assert_eq!(report["location"]["coordinates"][0], -97.7431);
        let report_id = report["report_id"].as_str().unwrap().to_string();

        let (status, fetched) = send(&app, get_req(&format!("/api/v1/reports/{report_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["tracking_number"], report["tracking_number"]);

        let (status, list) =
            send(&app, get_req(&format!("/api/v1/reports?user_id={user_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, update) = send(
            &app,
            post_json(
                &format!("/api/v1/reports/{report_id}/updates"),
                Some(&token),
                json!({"status_change": "resolved", "comment": "Bulb replaced"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{update}");
        assert_eq!(update["status_change"], "resolved");

        let (_, fetched) = send(&app, get_req(&format!("/api/v1/reports/{report_id}"))).await;
        assert_eq!(fetched["status"], "resolved");
        assert!(!fetched["resolved_at"].is_null());

        let (status, updates) = send(
            &app,
            get_req(&format!("/api/v1/reports/{report_id}/updates")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updates.as_array().unwrap().len(), 1);

        let (status, stats) = send(&app, get_req("/api/v1/heatmap/statistics")).await;
        assert_eq!(status, StatusCode::OK);
        let downtown = &stats["neighborhood_statistics"][0];
        assert_eq!(downtown["neighborhood_name"], "Downtown");
        assert_eq!(downtown["report_count"], 1);
        assert!(!downtown["avg_resolution_hours"].is_null());
        assert_eq!(stats["time_trends"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_report_errors() {
        let (_dir, app) = test_app(unconfigured_search()).await;
        let (token, _) = signup(&app, "errors@example.com").await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/reports",
                Some(&token),
                json!({"description": "Pothole"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Missing fields: category_id, severity, latitude, longitude"
        );

        let (status, body) = send(&app, get_req("/api/v1/reports/not-a-uuid")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Report not found");

        let (status, _) = send(
            &app,
            get_req("/api/v1/reports/01890a5d-ac96-774b-bcce-b302099a8057"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            post_json(
                "/api/v1/reports/01890a5d-ac96-774b-bcce-b302099a8057/updates",
                Some(&token),
                json!({"status_change": "closed"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing fields: comment");
    }

    #[tokio::test]
    async fn test_categories_and_heatmap() {
        let (_dir, app) = test_app(unconfigured_search()).await;
        let (token, _) = signup(&app, "map@example.com").await;
        send(&app, post_json("/api/v1/reports", Some(&token), downtown_report())).await;

        let (status, categories) = send(&app, get_req("/api/v1/categories")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(categories.as_array().unwrap().len(), 8);

        let (status, heatmap) = send(&app, get_req("/api/v1/heatmap")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(heatmap["type"], "FeatureCollection");
        let feature = &heatmap["features"][0];
        assert_eq!(feature["geometry"]["coordinates"][0], -97.7431);
        assert_eq!(feature["geometry"]["coordinates"][1], 30.2672);
        assert_eq!(feature["properties"]["category_id"], "infrastructure");

        let (_, filtered) = send(&app, get_req("/api/v1/heatmap?category_id=noise&status=")).await;
        assert!(filtered["features"].as_array().unwrap().is_empty());

        let (status, body) = send(&app, get_req("/api/v1/heatmap?start_date=yesterday")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, infra) = send(&app, get_req("/api/v1/heatmap/infrastructure")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!infra["features"].as_array().unwrap().is_empty());
        assert!(infra["features"][0]["properties"]["type"].is_string());
    }

    #[tokio::test]
    async fn test_feed_without_api_key_is_unavailable() {
        let (_dir, app) = test_app(unconfigured_search()).await;
        let (status, body) = send(&app, get_req("/api/v1/serpapi/events")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "SEARCH_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_feed_unreachable_upstream_is_bad_gateway() {
        let search = SerpApiClient::new(
            "http://127.0.0.1:9/search",
            Some("test-key".to_string().into()),
            Duration::from_secs(2),
        );
        let (_dir, app) = test_app(search).await;
        let (status, body) = send(&app, get_req("/api/v1/serpapi/alerts")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_feed_endpoints_against_fake_search_api() {
        let (_dir, app) = test_app(fake_search_api().await).await;

        let (status, news) = send(&app, get_req("/api/v1/serpapi/news?q=roads")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(news[0]["title"], "Congress Ave lane closures");

        let (status, _) = send(&app, get_req("/api/v1/serpapi/news")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, hood) = send(
            &app,
            get_req("/api/v1/serpapi/neighborhood-news?name=Downtown"),
        )
        .await;
        assert_eq!(hood.as_array().unwrap().len(), 1);

        let (status, events) = send(&app, get_req("/api/v1/serpapi/events")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(events[0]["date"], "Sat, 9 AM");
        assert_eq!(events[0]["address"], "Republic Square, Austin, TX");
        assert_eq!(events[0]["description"], "No Description");

        let (status, _) = send(&app, get_req("/api/v1/serpapi/volunteer-events")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, weather) = send(&app, get_req("/api/v1/serpapi/weather")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(weather["temperature"], "88");
        assert_eq!(weather["unit"], "°F");
        assert_eq!(weather["wind"], "Unknown");

        let (status, places) = send(
            &app,
            get_req("/api/v1/serpapi/safe-places?lat=30.2672&lon=-97.7431"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let places = places.as_array().unwrap();
        assert_eq!(places.len(), 4);
        assert!(places[0]["distance_miles"].as_f64().unwrap() < 1.0);
        assert_eq!(
            places[0]["link"],
            "https://www.google.com/maps/place/?q=place_id:pid1"
        );

        let (status, _) = send(&app, get_req("/api/v1/serpapi/safe-places?lat=30.2")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, context) = send(
            &app,
            get_req("/api/v1/serpapi/context?incident_type=flooding"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(context["web_results"].as_array().unwrap().len(), 2);

        let (status, alerts) = send(&app, get_req("/api/v1/serpapi/alerts")).await;
        assert_eq!(status, StatusCode::OK);
        let alerts = alerts.as_array().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["level"], "red");

        let (status, duplicates) = send(
            &app,
            post_json(
                "/api/v1/reports/duplicates",
                None,
                json!({"description": "Broken streetlight downtown"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let duplicates = duplicates.as_array().unwrap();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0]["link"], "https://news.example/crash");
    }
}
