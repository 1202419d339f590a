//! # Access Infrastructure
//! 
//! PostgreSQL implementations of the access-core repository ports.

pub mod database;

pub use database::{
    create_pool, run_migrations, InfraError, PgAccessRepository, PgFeatureRepository, PgMenuRepository,
    PgRoleRepository,
};
