// ============================================================================
// Access Core - Access Feature Entity (Permission Matrix)
// File: crates/access-core/src/domain/access_feature.rs
// Description: Permission flags linking roles to features
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Feature permission flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeaturePermissions {
    #[serde(default)]
    pub can_access: bool,
    #[serde(default)]
    pub can_read: bool,
    #[serde(default)]
    pub can_insert: bool,
    #[serde(default)]
    pub can_update: bool,
    #[serde(default)]
    pub can_delete: bool,
}

impl FeaturePermissions {
    pub fn full_access() -> Self {
        Self {
            can_access: true,
            can_read: true,
            can_insert: true,
            can_update: true,
            can_delete: true,
        }
    }

    pub fn read_only() -> Self {
        Self {
            can_access: true,
            can_read: true,
            ..Self::default()
        }
    }

    pub fn no_access() -> Self {
        Self::default()
    }

    /// An all-false set is the same as having no grant at all.
    pub fn has_any(&self) -> bool {
        self.can_access || self.can_read || self.can_insert || self.can_update || self.can_delete
    }
}

/// Access Feature entity (Permission Matrix)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessFeature {
    pub id: Uuid,
    pub role_id: Uuid,
    pub feature_id: Uuid,

    // Permission flags
    pub can_access: bool,
    pub can_read: bool,
    pub can_insert: bool,
    pub can_update: bool,
    pub can_delete: bool,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl AccessFeature {
    pub fn new(
        role_id: Uuid,
        feature_id: Uuid,
        permissions: FeaturePermissions,
        created_by: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            role_id,
            feature_id,
            can_access: permissions.can_access,
            can_read: permissions.can_read,
            can_insert: permissions.can_insert,
            can_update: permissions.can_update,
            can_delete: permissions.can_delete,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
        }
    }

    pub fn to_permissions(&self) -> FeaturePermissions {
        FeaturePermissions {
            can_access: self.can_access,
            can_read: self.can_read,
            can_insert: self.can_insert,
            can_update: self.can_update,
            can_delete: self.can_delete,
        }
    }
}

/// A feature-scoped grant ready to be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureGrant {
    pub feature_id: Uuid,
    pub permissions: FeaturePermissions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_access_permissions() {
        let perms = FeaturePermissions::full_access();
        assert!(perms.can_access);
        assert!(perms.can_insert);
        assert!(perms.can_delete);
        assert!(perms.has_any());
    }

    #[test]
    fn test_read_only_permissions() {
        let perms = FeaturePermissions::read_only();
        assert!(perms.can_read);
        assert!(!perms.can_insert);
        assert!(!perms.can_update);
        assert!(!perms.can_delete);
    }

    #[test]
    fn test_no_access_has_nothing() {
        assert!(!FeaturePermissions::no_access().has_any());
    }

    #[test]
    fn test_create_access_feature() {
        let grant = AccessFeature::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            FeaturePermissions::read_only(),
            None,
        );
        assert!(grant.to_permissions().has_any());
        assert_eq!(grant.to_permissions(), FeaturePermissions::read_only());
    }
}
