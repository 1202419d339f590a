//! Flattens an [`AccessSubmission`] into the ids and grants to persist.

use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::{AccessSubmission, FeatureGrant, FeaturePermissions, SubmittedMenuNode};
use crate::error::DomainError;

/// A feature as referenced by the submission, with where it was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedFeature {
    pub feature_id: Uuid,
    /// Menu node it was submitted under; `None` for the global list.
    pub placement: Option<Uuid>,
    pub permissions: FeaturePermissions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedAccess {
    /// Every menu id in the submitted tree, selected or not.
    pub referenced_menu_ids: Vec<Uuid>,
    pub selected_menu_ids: Vec<Uuid>,
    pub features: Vec<SubmittedFeature>,
}

impl CollectedAccess {
    /// Walks the submitted tree depth-first. Selection is per node: a
    /// selected child under an unselected parent is still granted.
    pub fn collect(submission: &AccessSubmission) -> Result<Self, DomainError> {
        let mut collected = Self::default();
        let mut seen_menus = HashSet::new();
        let mut seen_features = HashSet::new();

        for node in &submission.menus {
            collected.visit(node, &mut seen_menus, &mut seen_features)?;
        }
        for input in &submission.global_features {
            if !seen_features.insert(input.feature_id) {
                return Err(duplicate_feature(input.feature_id));
            }
            collected.features.push(SubmittedFeature {
                feature_id: input.feature_id,
                placement: None,
                permissions: input.permissions,
            });
        }

        Ok(collected)
    }

    fn visit(
        &mut self,
        node: &SubmittedMenuNode,
        seen_menus: &mut HashSet<Uuid>,
        seen_features: &mut HashSet<Uuid>,
    ) -> Result<(), DomainError> {
        if !seen_menus.insert(node.menu_id) {
            return Err(DomainError::InvalidSubmission(format!(
                "menu {} submitted more than once",
                node.menu_id
            )));
        }
        self.referenced_menu_ids.push(node.menu_id);
        if node.selected {
            self.selected_menu_ids.push(node.menu_id);
        }

        for input in &node.features {
            if !seen_features.insert(input.feature_id) {
                return Err(duplicate_feature(input.feature_id));
            }
            self.features.push(SubmittedFeature {
                feature_id: input.feature_id,
                placement: Some(node.menu_id),
                permissions: input.permissions,
            });
        }

        for child in &node.children {
            self.visit(child, seen_menus, seen_features)?;
        }
        Ok(())
    }

    pub fn referenced_feature_ids(&self) -> Vec<Uuid> {
        self.features.iter().map(|f| f.feature_id).collect()
    }

    /// Grants worth persisting: all-false permission sets are dropped.
    pub fn feature_grants(&self) -> Vec<FeatureGrant> {
        self.features
            .iter()
            .filter(|f| f.permissions.has_any())
            .map(|f| FeatureGrant {
                feature_id: f.feature_id,
                permissions: f.permissions,
            })
            .collect()
    }
}

fn duplicate_feature(feature_id: Uuid) -> DomainError {
    DomainError::InvalidSubmission(format!("feature {} submitted more than once", feature_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeaturePermissionInput;

    #[test]
    fn test_collects_selected_menus_at_any_depth() {
        let (root, mid, leaf) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let submission = AccessSubmission {
            menus: vec![SubmittedMenuNode::new(root, false)
                .with_child(SubmittedMenuNode::new(mid, true).with_child(SubmittedMenuNode::new(leaf, true)))],
            global_features: Vec::new(),
        };

        let collected = CollectedAccess::collect(&submission).unwrap();
        assert_eq!(collected.referenced_menu_ids, vec![root, mid, leaf]);
        assert_eq!(collected.selected_menu_ids, vec![mid, leaf]);
    }

    #[test]
    fn test_zero_permission_features_are_pruned() {
        let menu_id = Uuid::new_v4();
        let (kept, pruned, global) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let submission = AccessSubmission {
            menus: vec![SubmittedMenuNode::new(menu_id, true)
                .with_feature(FeaturePermissionInput::new(kept, FeaturePermissions::read_only()))
                .with_feature(FeaturePermissionInput::new(pruned, FeaturePermissions::no_access()))],
            global_features: vec![FeaturePermissionInput::new(
                global,
                FeaturePermissions {
                    can_delete: true,
                    ..Default::default()
                },
            )],
        };

        let collected = CollectedAccess::collect(&submission).unwrap();
        assert_eq!(collected.referenced_feature_ids(), vec![kept, pruned, global]);

        let grants = collected.feature_grants();
        let granted: Vec<Uuid> = grants.iter().map(|g| g.feature_id).collect();
        assert_eq!(granted, vec![kept, global]);
        assert_eq!(collected.features[2].placement, None);
        assert_eq!(collected.features[0].placement, Some(menu_id));
    }

    #[test]
    fn test_duplicate_menu_is_malformed() {
        let id = Uuid::new_v4();
        let submission = AccessSubmission {
            menus: vec![SubmittedMenuNode::new(id, true).with_child(SubmittedMenuNode::new(id, false))],
            global_features: Vec::new(),
        };

        let result = CollectedAccess::collect(&submission);
        assert!(matches!(result, Err(DomainError::InvalidSubmission(_))));
    }

    #[test]
    fn test_duplicate_feature_across_tree_and_globals_is_malformed() {
        let feature_id = Uuid::new_v4();
        let submission = AccessSubmission {
            menus: vec![SubmittedMenuNode::new(Uuid::new_v4(), true)
                .with_feature(FeaturePermissionInput::new(feature_id, FeaturePermissions::read_only()))],
            global_features: vec![FeaturePermissionInput::new(feature_id, FeaturePermissions::read_only())],
        };

        let result = CollectedAccess::collect(&submission);
        assert!(matches!(result, Err(DomainError::InvalidSubmission(_))));
    }

    #[test]
    fn test_submission_deserializes_flat_flags() {
        let feature_id = Uuid::new_v4();
        let json = format!(
            r#"{{"menus": [], "global_features": [{{"feature_id": "{}", "can_read": true}}]}}"#,
            feature_id
        );
        let submission: AccessSubmission = serde_json::from_str(&json).unwrap();
        let perms = submission.global_features[0].permissions;
        assert!(perms.can_read);
        assert!(!perms.can_access);
    }
}
