//! SQLite reference data repository (seeded by migrations).

use alerthub_core::repository::reference::ReferenceRepository;
use alerthub_types::error::RepositoryError;
use alerthub_types::geo::{BoundingBox, Coordinates};
use alerthub_types::heatmap::{InfrastructureSite, Neighborhood};
use alerthub_types::report::Category;
use sqlx::Row;

use super::pool::{DatabasePool, query_error};

pub struct SqliteReferenceRepository {
    pool: DatabasePool,
}

impl SqliteReferenceRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn category_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Category, sqlx::Error> {
    let severity: i64 = row.try_get("severity_level")?;
    Ok(Category {
        category_id: row.try_get("category_id")?,
        name: row.try_get("name")?,
        icon_name: row.try_get("icon_name")?,
        default_severity: severity.clamp(1, 5) as u8,
    })
}

impl ReferenceRepository for SqliteReferenceRepository {
    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM issue_categories ORDER BY rowid")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| category_from_row(row).map_err(query_error))
            .collect()
    }

    async fn category(&self, category_id: &str) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM issue_categories WHERE category_id = ?")
            .bind(category_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref()
            .map(category_from_row)
            .transpose()
            .map_err(query_error)
    }

    async fn neighborhoods(&self) -> Result<Vec<Neighborhood>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM neighborhoods ORDER BY neighborhood_id")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| -> Result<Neighborhood, sqlx::Error> {
                Ok(Neighborhood {
                    neighborhood_id: row.try_get("neighborhood_id")?,
                    name: row.try_get("name")?,
                    bounds: BoundingBox {
                        min_lat: row.try_get("min_lat")?,
                        min_lon: row.try_get("min_lon")?,
                        max_lat: row.try_get("max_lat")?,
                        max_lon: row.try_get("max_lon")?,
                    },
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(query_error)
    }

    async fn infrastructure(&self) -> Result<Vec<InfrastructureSite>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM infrastructure_sites ORDER BY site_id")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| -> Result<InfrastructureSite, sqlx::Error> {
                Ok(InfrastructureSite {
                    site_id: row.try_get("site_id")?,
                    name: row.try_get("name")?,
                    site_type: row.try_get("site_type")?,
                    address: row.try_get("address")?,
                    location: Coordinates::new(
                        row.try_get("latitude")?,
                        row.try_get("longitude")?,
                    ),
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(query_error)
    }
}
