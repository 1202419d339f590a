//! Domain services (business logic)

pub mod hierarchy;
pub mod cascade;
pub mod submission;
pub mod menu_service;
pub mod feature_service;
pub mod access_service;

pub use hierarchy::HierarchyBuilder;
pub use submission::{CollectedAccess, SubmittedFeature};
pub use menu_service::MenuService;
pub use feature_service::FeatureService;
pub use access_service::AccessService;
