//! In-memory fakes of the core ports, shared by service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use alerthub_types::error::{AuthError, RepositoryError, SearchError};
use alerthub_types::geo::{BoundingBox, Coordinates};
use alerthub_types::heatmap::{HeatmapFilter, InfrastructureSite, Neighborhood};
use alerthub_types::report::{Category, Report, ReportId, ReportUpdate};
use alerthub_types::user::{TokenClaims, User, UserId};
use chrono::{DateTime, Utc};

use crate::feed::{SearchParams, SearchProvider};
use crate::repository::reference::ReferenceRepository;
use crate::repository::report::{ReportFilter, ReportRepository};
use crate::repository::user::UserRepository;
use crate::service::credentials::{PasswordHasher, TokenSigner};

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

impl UserRepository for InMemoryUsers {
    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(user.email.clone()));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == *id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        user.last_login = Some(at);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryReports {
    pub reports: Mutex<Vec<Report>>,
    pub updates: Mutex<Vec<ReportUpdate>>,
}

impl InMemoryReports {
    pub fn with_reports(reports: Vec<Report>) -> Self {
        Self {
            reports: Mutex::new(reports),
            updates: Mutex::default(),
        }
    }
}

impl ReportRepository for InMemoryReports {
    async fn create(&self, report: &Report) -> Result<Report, RepositoryError> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(report.clone())
    }

    async fn get(&self, id: &ReportId) -> Result<Option<Report>, RepositoryError> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.report_id == *id)
            .cloned())
    }

    async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>, RepositoryError> {
        let mut reports: Vec<Report> = self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filter.user_id.is_none_or(|u| r.user_id == u))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            reports.truncate(limit.max(0) as usize);
        }
        Ok(reports)
    }

    async fn query(&self, filter: &HeatmapFilter) -> Result<Vec<Report>, RepositoryError> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                let day = r.created_at.date_naive();
                filter.category_id.as_ref().is_none_or(|c| &r.category_id == c)
                    && filter.status.is_none_or(|s| r.status == s)
                    && filter
                        .council_district
                        .is_none_or(|d| r.council_district == Some(d))
                    && filter.start_date.is_none_or(|s| day >= s)
                    && filter.end_date.is_none_or(|e| day <= e)
            })
            .cloned()
            .collect())
    }

    async fn add_update(
        &self,
        update: &ReportUpdate,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        let mut reports = self.reports.lock().unwrap();
        let report = reports
            .iter_mut()
            .find(|r| r.report_id == update.report_id)
            .ok_or(RepositoryError::NotFound)?;
        report.status = update.status_change;
        report.updated_at = update.created_at;
        report.resolved_at = resolved_at;
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }

    async fn list_updates(&self, id: &ReportId) -> Result<Vec<ReportUpdate>, RepositoryError> {
        Ok(self
            .updates
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.report_id == *id)
            .cloned()
            .collect())
    }
}

pub struct StaticReference {
    pub categories: Vec<Category>,
    pub neighborhoods: Vec<Neighborhood>,
    pub sites: Vec<InfrastructureSite>,
}

impl Default for StaticReference {
    fn default() -> Self {
        let category = |id: &str, name: &str| Category {
            category_id: id.to_string(),
            name: name.to_string(),
            icon_name: None,
            default_severity: 3,
        };
        Self {
            categories: vec![
                category("infrastructure", "Infrastructure"),
                category("traffic", "Traffic"),
                category("noise", "Noise"),
            ],
            neighborhoods: vec![
                Neighborhood {
                    neighborhood_id: 1,
                    name: "Downtown".to_string(),
                    bounds: BoundingBox {
                        min_lat: 30.260,
                        min_lon: -97.755,
                        max_lat: 30.280,
                        max_lon: -97.735,
                    },
                },
                Neighborhood {
                    neighborhood_id: 3,
                    name: "East Austin".to_string(),
                    bounds: BoundingBox {
                        min_lat: 30.250,
                        min_lon: -97.735,
                        max_lat: 30.290,
                        max_lon: -97.690,
                    },
                },
            ],
            sites: vec![InfrastructureSite {
                site_id: 1,
                name: "Fire Station 1".to_string(),
                site_type: "fire_station".to_string(),
                address: "401 E 5th St".to_string(),
                location: Coordinates::new(30.2665, -97.7391),
            }],
        }
    }
}

impl ReferenceRepository for StaticReference {
    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.categories.clone())
    }

    async fn category(&self, category_id: &str) -> Result<Option<Category>, RepositoryError> {
        Ok(self
            .categories
            .iter()
            .find(|c| c.category_id == category_id)
            .cloned())
    }

    async fn neighborhoods(&self) -> Result<Vec<Neighborhood>, RepositoryError> {
        Ok(self.neighborhoods.clone())
    }

    async fn infrastructure(&self) -> Result<Vec<InfrastructureSite>, RepositoryError> {
        Ok(self.sites.clone())
    }
}

/// Reversible "hash" so tests don't pay for argon2.
pub struct FakeHasher;

impl PasswordHasher for FakeHasher {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("hashed:{password}"))
    }
}

/// Unsigned `sub.iat.exp` tokens.
pub struct FakeSigner;

impl TokenSigner for FakeSigner {
    fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        Ok(format!("{}.{}.{}", claims.sub, claims.iat, claims.exp))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [sub, iat, exp] = parts.as_slice() else {
            return Err(AuthError::InvalidToken);
        };
        Ok(TokenClaims {
            sub: sub.parse().map_err(|_| AuthError::InvalidToken)?,
            iat: iat.parse().map_err(|_| AuthError::InvalidToken)?,
            exp: exp.parse().map_err(|_| AuthError::InvalidToken)?,
        })
    }
}

/// Search provider answering from canned documents keyed by engine
/// (falling back to `"google"` when no engine is set), recording every call.
#[derive(Default)]
pub struct ScriptedSearch {
    pub responses: HashMap<String, serde_json::Value>,
    pub calls: Mutex<Vec<SearchParams>>,
    pub fail: bool,
}

impl ScriptedSearch {
    pub fn with(mut self, engine: &str, doc: serde_json::Value) -> Self {
        self.responses.insert(engine.to_string(), doc);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<SearchParams> {
        self.calls.lock().unwrap().clone()
    }
}

impl SearchProvider for ScriptedSearch {
    async fn search(&self, params: &SearchParams) -> Result<serde_json::Value, SearchError> {
        self.calls.lock().unwrap().push(params.clone());
        if self.fail {
            return Err(SearchError::Upstream("scripted failure".to_string()));
        }
        let engine = params.get("engine").map(String::as_str).unwrap_or("google");
        Ok(self
            .responses
            .get(engine)
            .cloned()
            .unwrap_or_else(|| serde_json::json!({})))
    }
}
