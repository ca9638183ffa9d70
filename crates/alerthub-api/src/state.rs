//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository/credential/search traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use alerthub_core::feed::FeedService;
use alerthub_core::feed::monitor::AlertMonitor;
use alerthub_core::service::auth::AuthService;
use alerthub_core::service::heatmap::HeatmapService;
use alerthub_core::service::report::ReportService;
use alerthub_infra::config::load_config;
use alerthub_infra::crypto::password::Argon2PasswordHasher;
use alerthub_infra::crypto::token::HmacTokenSigner;
use alerthub_infra::filesystem::resolve_data_dir;
use alerthub_infra::search::{CachingSearchProvider, SerpApiClient};
use alerthub_infra::sqlite::pool::{DatabasePool, database_url};
use alerthub_infra::sqlite::reference::SqliteReferenceRepository;
use alerthub_infra::sqlite::report::SqliteReportRepository;
use alerthub_infra::sqlite::user::SqliteUserRepository;
use alerthub_types::config::AppConfig;

/// Search backend: SerpApi behind the in-memory TTL cache.
pub type SearchBackend = CachingSearchProvider<SerpApiClient>;

pub type ConcreteAuthService =
    AuthService<SqliteUserRepository, Argon2PasswordHasher, HmacTokenSigner>;

pub type ConcreteReportService = ReportService<SqliteReportRepository, SqliteReferenceRepository>;

pub type ConcreteHeatmapService = HeatmapService<SqliteReportRepository, SqliteReferenceRepository>;

pub type ConcreteFeedService = FeedService<SearchBackend>;

pub type ConcreteAlertMonitor = AlertMonitor<SearchBackend>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<ConcreteAuthService>,
    pub report_service: Arc<ConcreteReportService>,
    pub heatmap_service: Arc<ConcreteHeatmapService>,
    pub feed_service: Arc<ConcreteFeedService>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, open the DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;

        let db_pool = DatabasePool::new(&database_url(&data_dir))
            .await
            .context("failed to open database")?;

        let signer = HmacTokenSigner::from_env_or_data_dir(&data_dir)?;
        let search = SerpApiClient::from_config(&config.search);

        Ok(Self::build(data_dir, config, db_pool, signer, search))
    }

    /// Wire services from already-constructed infrastructure.
    pub fn build(
        data_dir: PathBuf,
        config: AppConfig,
        db_pool: DatabasePool,
        signer: HmacTokenSigner,
        search: SerpApiClient,
    ) -> Self {
        let auth_service = AuthService::new(
            SqliteUserRepository::new(db_pool.clone()),
            Argon2PasswordHasher::new(),
            signer,
            chrono::Duration::hours(i64::from(config.auth.token_ttl_hours)),
        );

        let report_service = ReportService::new(
            SqliteReportRepository::new(db_pool.clone()),
            SqliteReferenceRepository::new(db_pool.clone()),
        );

        let heatmap_service = HeatmapService::new(
            SqliteReportRepository::new(db_pool.clone()),
            SqliteReferenceRepository::new(db_pool),
        );

        let search = CachingSearchProvider::new(
            search,
            Duration::from_secs(config.search.cache_ttl_secs),
        );
        let feed_service = FeedService::new(search, config.search.default_location.clone());

        Self {
            auth_service: Arc::new(auth_service),
            report_service: Arc::new(report_service),
            heatmap_service: Arc::new(heatmap_service),
            feed_service: Arc::new(feed_service),
            config: Arc::new(config),
            data_dir,
        }
    }

    /// Alert monitor sharing this state's feed (and its search cache).
    pub fn alert_monitor(&self) -> ConcreteAlertMonitor {
        AlertMonitor::new(
            self.feed_service.clone(),
            Duration::from_secs(self.config.alerts.interval_secs.max(1)),
        )
    }
}
