//! Database module (PostgreSQL adapters)

pub mod connection;
pub mod postgres;

pub use connection::{create_pool, run_migrations, InfraError};
pub use postgres::{PgAccessRepository, PgFeatureRepository, PgMenuRepository, PgRoleRepository};
