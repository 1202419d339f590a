//! Feature repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::Feature;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeatureRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Feature>, DomainError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Feature>, DomainError>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Feature>, DomainError>;

    /// All features in insertion order, global ones included.
    async fn list_all(&self) -> Result<Vec<Feature>, DomainError>;

    /// Features scoped to `menu_id`; `None` lists the global features.
    async fn list_by_menu(&self, menu_id: Option<Uuid>) -> Result<Vec<Feature>, DomainError>;

    async fn create(&self, feature: &Feature) -> Result<Feature, DomainError>;
    async fn update(&self, feature: &Feature) -> Result<Feature, DomainError>;

    /// Soft-deletes the feature and drops its grant rows in one transaction.
    async fn delete(&self, id: &Uuid, deleted_by: &Uuid) -> Result<(), DomainError>;
}
