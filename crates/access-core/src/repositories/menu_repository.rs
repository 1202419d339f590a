//! Menu repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Menu, SubtreeDeletion};
use crate::error::DomainError;

/// Menu store. Every read ignores soft-deleted rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Menu>, DomainError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Menu>, DomainError>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Menu>, DomainError>;

    /// Flat listing in insertion order (`created_at`, then `id`).
    async fn list_all(&self) -> Result<Vec<Menu>, DomainError>;
    async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<Menu>, DomainError>;
    async fn count(&self) -> Result<i64, DomainError>;

    /// Menus the role holds an access row for, in insertion order.
    async fn list_by_role(&self, role_id: &Uuid) -> Result<Vec<Menu>, DomainError>;

    async fn create(&self, menu: &Menu) -> Result<Menu, DomainError>;

    /// Persists `menu`, refusing a parent that sits inside the menu's own subtree.
    async fn update(&self, menu: &Menu) -> Result<Menu, DomainError>;

    /// Removes the menus in `ids` plus any descendant, their features and
    /// every grant referencing them, in one transaction.
    async fn delete_subtree(&self, ids: &[Uuid], deleted_by: &Uuid) -> Result<SubtreeDeletion, DomainError>;
}
