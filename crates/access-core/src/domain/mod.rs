//! # Access Core - Domain Module
//!
//! Domain entities for menu and feature access control.

pub mod menu;
pub mod feature;
pub mod access_menu;
pub mod access_feature;
pub mod tree;
pub mod submission;

// Re-export all entities
pub use menu::{Menu, CreateMenuInput, MenuPatch};
pub use feature::{Feature, CreateFeatureInput, FeaturePatch};
pub use access_menu::AccessMenu;
pub use access_feature::{AccessFeature, FeatureGrant, FeaturePermissions};
pub use tree::{FeatureView, MenuPage, ResolvedMenuNode, ResolvedTree, SubtreeDeletion};
pub use submission::{AccessSubmission, FeaturePermissionInput, GrantCounts, SubmittedMenuNode};

use serde::{Deserialize, Deserializer};

/// Keeps "absent" and "explicit null" apart for nullable patch fields:
/// absent stays `None` through `#[serde(default)]`, null becomes `Some(None)`.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
