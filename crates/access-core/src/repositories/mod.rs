//! Repository traits (ports)

pub mod menu_repository;
pub mod feature_repository;
pub mod access_repository;
pub mod role_repository;

pub use menu_repository::MenuRepository;
pub use feature_repository::FeatureRepository;
pub use access_repository::AccessRepository;
pub use role_repository::RoleRepository;

#[cfg(test)]
pub use menu_repository::MockMenuRepository;
#[cfg(test)]
pub use feature_repository::MockFeatureRepository;
#[cfg(test)]
pub use access_repository::MockAccessRepository;
#[cfg(test)]
pub use role_repository::MockRoleRepository;
