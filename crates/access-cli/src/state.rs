use std::sync::Arc;

use sqlx::PgPool;

use access_core::services::{AccessService, FeatureService, MenuService};
use access_infrastructure::{PgAccessRepository, PgFeatureRepository, PgMenuRepository, PgRoleRepository};
use access_shared::config::AppConfig;

pub type PgMenuService = MenuService<PgMenuRepository, PgFeatureRepository>;
pub type PgFeatureService = FeatureService<PgFeatureRepository, PgMenuRepository>;
pub type PgAccessService = AccessService<PgMenuRepository, PgFeatureRepository, PgAccessRepository, PgRoleRepository>;

pub struct AppState {
    pub db: PgPool,
    pub menus: PgMenuService,
    pub features: PgFeatureService,
    pub access: PgAccessService,
}

impl AppState {
    pub fn new(db: PgPool, config: &AppConfig) -> Self {
        let menu_repo = Arc::new(PgMenuRepository::new(db.clone()));
        let feature_repo = Arc::new(PgFeatureRepository::new(db.clone()));
        let access_repo = Arc::new(PgAccessRepository::new(db.clone()));
        let role_repo = Arc::new(PgRoleRepository::new(db.clone()));

        Self {
            menus: MenuService::new(menu_repo.clone(), feature_repo.clone()).with_page_limits(
                config.pagination.default_page_size,
                config.pagination.max_page_size,
            ),
            features: FeatureService::new(feature_repo.clone(), menu_repo.clone()),
            access: AccessService::new(menu_repo, feature_repo, access_repo, role_repo),
            db,
        }
    }
}
