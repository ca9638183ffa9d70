//! Read-only reference data: categories, neighborhoods, infrastructure.

use alerthub_types::error::RepositoryError;
use alerthub_types::heatmap::{InfrastructureSite, Neighborhood};
use alerthub_types::report::Category;

/// Repository trait for seeded reference data.
pub trait ReferenceRepository: Send + Sync {
    fn categories(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Category>, RepositoryError>> + Send;

    fn category(
        &self,
        category_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Category>, RepositoryError>> + Send;

    /// Neighborhoods ordered by id.
    fn neighborhoods(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Neighborhood>, RepositoryError>> + Send;

    fn infrastructure(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<InfrastructureSite>, RepositoryError>> + Send;
}
