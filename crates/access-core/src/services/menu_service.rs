// ============================================================================
// Access Core - Menu Service
// File: crates/access-core/src/services/menu_service.rs
// ============================================================================
//! Menu CRUD with uniqueness, parent existence and cycle checks.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use access_shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use access_shared::Pagination;

use crate::domain::{CreateMenuInput, FeatureView, Menu, MenuPage, MenuPatch, ResolvedTree, SubtreeDeletion};
use crate::error::DomainError;
use crate::repositories::{FeatureRepository, MenuRepository};
use crate::services::cascade::{collect_subtree_ids, descendant_ids};
use crate::services::HierarchyBuilder;

pub struct MenuService<M: MenuRepository, F: FeatureRepository> {
    menu_repo: Arc<M>,
    feature_repo: Arc<F>,
    default_page_size: u32,
    max_page_size: u32,
}

impl<M: MenuRepository, F: FeatureRepository> MenuService<M, F> {
    pub fn new(menu_repo: Arc<M>, feature_repo: Arc<F>) -> Self {
        Self {
            menu_repo,
            feature_repo,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn with_page_limits(mut self, default_page_size: u32, max_page_size: u32) -> Self {
        self.default_page_size = default_page_size;
        self.max_page_size = max_page_size;
        self
    }

    /// One page of the flat listing, assembled into a tree with every
    /// feature attached. Menus whose parent sits on another page become roots.
    pub async fn get_menus(&self, page: Option<u32>, limit: Option<u32>) -> Result<MenuPage, DomainError> {
        let pagination = Pagination::new(page, limit, self.default_page_size, self.max_page_size);

        let menus = self
            .menu_repo
            .list_page(pagination.offset(), pagination.limit())
            .await?;
        let total = self.menu_repo.count().await?;
        let features = self.feature_repo.list_all().await?;

        let resolved = HierarchyBuilder::new(menus)
            .with_features(features.into_iter().map(FeatureView::unscoped).collect())
            .build()?;

        Ok(MenuPage {
            resolved,
            pagination: pagination.meta(total),
        })
    }

    pub async fn get_menu_by_id(&self, id: &Uuid) -> Result<Menu, DomainError> {
        self.menu_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::MenuNotFound(*id))
    }

    pub async fn get_menu_by_name(&self, name: &str) -> Result<Option<Menu>, DomainError> {
        self.menu_repo.find_by_name(name.trim()).await
    }

    /// Whole menu forest without features.
    pub async fn resolve_tree(&self) -> Result<ResolvedTree, DomainError> {
        let menus = self.menu_repo.list_all().await?;
        HierarchyBuilder::new(menus).build()
    }

    pub async fn create_menu(&self, input: CreateMenuInput, actor_id: Uuid) -> Result<Uuid, DomainError> {
        let name = input.name.trim().to_string();
        info!("Creating menu: {}", name);

        // 1. Name must be unique
        if self.menu_repo.find_by_name(&name).await?.is_some() {
            warn!("Menu creation rejected: name already exists: {}", name);
            return Err(DomainError::MenuNameAlreadyExists(name));
        }

        // 2. Parent must exist
        let parent_level = match input.parent_id {
            Some(parent_id) => Some(self.get_menu_by_id(&parent_id).await?.hierarchy_level),
            None => None,
        };

        // 3. Build and validate entity
        let menu = Menu::new(input, parent_level, Some(actor_id))?;

        // 4. Save
        let created = self.menu_repo.create(&menu).await?;

        info!("Menu created: {} ({})", created.name, created.id);
        Ok(created.id)
    }

    pub async fn update_menu(&self, id: &Uuid, patch: MenuPatch, actor_id: Uuid) -> Result<(), DomainError> {
        let mut menu = self.get_menu_by_id(id).await?;

        if let Some(name) = patch.name.as_deref().map(str::trim) {
            if !name.eq_ignore_ascii_case(&menu.name) {
                if let Some(other) = self.menu_repo.find_by_name(name).await? {
                    if other.id != menu.id {
                        warn!("Menu update rejected: name already exists: {}", name);
                        return Err(DomainError::MenuNameAlreadyExists(name.to_string()));
                    }
                }
            }
        }

        let mut parent_level = None;
        if let Some(Some(parent_id)) = patch.parent_id {
            if parent_id == *id {
                warn!("Menu update rejected: {} cannot be its own parent", id);
                return Err(DomainError::CyclicParent { menu_id: *id, parent_id });
            }

            let parent = self.get_menu_by_id(&parent_id).await?;

            let tree = self.resolve_tree().await?;
            if descendant_ids(&tree, id)?.contains(&parent_id) {
                warn!("Menu update rejected: {} is a descendant of {}", parent_id, id);
                return Err(DomainError::CyclicParent { menu_id: *id, parent_id });
            }
            parent_level = Some(parent.hierarchy_level);
        }

        menu.apply_patch(patch, parent_level, actor_id)?;
        self.menu_repo.update(&menu).await?;

        info!("Menu updated: {}", id);
        Ok(())
    }

    /// Deletes the menu, its whole subtree, their features and every grant
    /// pointing at any of them.
    pub async fn delete_menu(&self, id: &Uuid, actor_id: Uuid) -> Result<SubtreeDeletion, DomainError> {
        let tree = self.resolve_tree().await?;
        let ids = collect_subtree_ids(&tree, id)?;

        let deleted = self.menu_repo.delete_subtree(&ids, &actor_id).await?;

        info!(
            "Menu {} deleted with {} menus, {} features, {} menu grants, {} feature grants",
            id, deleted.menus, deleted.features, deleted.access_menus, deleted.access_features
        );
        Ok(deleted)
    }
}
