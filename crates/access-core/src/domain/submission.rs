//! Bulk access submission: the full desired grant state for one role,
//! shaped like the access tree the administrator was shown.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FeaturePermissions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturePermissionInput {
    pub feature_id: Uuid,
    #[serde(flatten)]
    pub permissions: FeaturePermissions,
}

impl FeaturePermissionInput {
    pub fn new(feature_id: Uuid, permissions: FeaturePermissions) -> Self {
        Self { feature_id, permissions }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedMenuNode {
    pub menu_id: Uuid,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub features: Vec<FeaturePermissionInput>,
    #[serde(default)]
    pub children: Vec<SubmittedMenuNode>,
}

impl SubmittedMenuNode {
    pub fn new(menu_id: Uuid, selected: bool) -> Self {
        Self {
            menu_id,
            selected,
            features: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_feature(mut self, feature: FeaturePermissionInput) -> Self {
        self.features.push(feature);
        self
    }

    pub fn with_child(mut self, child: SubmittedMenuNode) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSubmission {
    #[serde(default)]
    pub menus: Vec<SubmittedMenuNode>,
    #[serde(default)]
    pub global_features: Vec<FeaturePermissionInput>,
}

/// Grant rows written (or removed) for one role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantCounts {
    pub access_menus: u64,
    pub access_features: u64,
}
