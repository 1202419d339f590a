//! PostgreSQL repository implementations

pub mod menu_repo_impl;
pub mod feature_repo_impl;
pub mod access_repo_impl;
pub mod role_repo_impl;

pub use menu_repo_impl::PgMenuRepository;
pub use feature_repo_impl::PgFeatureRepository;
pub use access_repo_impl::PgAccessRepository;
pub use role_repo_impl::PgRoleRepository;

use access_core::error::DomainError;
use sqlx::{Postgres, Transaction};
use tracing::{error, warn};
use uuid::Uuid;

/// Logs and wraps a driver error raised inside a multi-statement unit.
pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        error!("Database error {}: {}", context, e);
        DomainError::DatabaseError(e.to_string())
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    let msg = e.to_string();
    msg.contains("unique") || msg.contains("duplicate")
}

/// Share-locks a live menu for the rest of the transaction, so a concurrent
/// subtree delete cannot remove it before the referencing row commits.
pub(crate) async fn lock_live_menu(tx: &mut Transaction<'_, Postgres>, menu_id: &Uuid) -> Result<(), DomainError> {
    let live: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM menus WHERE id = $1 AND removed_at IS NULL FOR SHARE")
            .bind(menu_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_error("locking referenced menu"))?;

    match live {
        Some(_) => Ok(()),
        None => {
            warn!("Referenced menu is gone: {}", menu_id);
            Err(DomainError::MenuNotFound(*menu_id))
        }
    }
}
