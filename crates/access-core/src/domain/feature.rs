// ============================================================================
// Access Core - Feature Entity
// File: crates/access-core/src/domain/feature.rs
// Description: Fine-grained capability, menu-scoped or global
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::double_option;

/// Feature entity. `menu_id = None` marks a global feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Feature {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Feature name must be between 1 and 100 characters"))]
    pub name: String,

    pub menu_id: Option<Uuid>,

    #[validate(length(max = 500, message = "Description too long"))]
    pub description: Option<String>,

    pub is_active: bool,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFeatureInput {
    pub name: String,
    #[serde(default)]
    pub menu_id: Option<Uuid>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub menu_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Feature {
    pub fn new(input: CreateFeatureInput, created_by: Option<Uuid>) -> Result<Self, validator::ValidationErrors> {
        let feature = Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            menu_id: input.menu_id,
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            is_active: input.is_active.unwrap_or(true),
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        };

        feature.validate()?;
        Ok(feature)
    }

    pub fn apply_patch(&mut self, patch: FeaturePatch, modified_by: Uuid) -> Result<(), validator::ValidationErrors> {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(menu_id) = patch.menu_id {
            self.menu_id = menu_id;
        }
        if let Some(description) = patch.description {
            self.description = description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty());
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);

        self.validate()
    }

    pub fn is_global(&self) -> bool {
        self.menu_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_global_feature() {
        let feature = Feature::new(
            CreateFeatureInput {
                name: " export-report ".to_string(),
                description: Some("  ".to_string()),
                ..Default::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(feature.name, "export-report");
        assert!(feature.description.is_none());
        assert!(feature.is_global());
    }

    #[test]
    fn test_patch_rescopes_feature() {
        let mut feature = Feature::new(
            CreateFeatureInput {
                name: "approve".to_string(),
                ..Default::default()
            },
            None,
        )
        .unwrap();
        let menu_id = Uuid::new_v4();
        feature
            .apply_patch(
                FeaturePatch {
                    menu_id: Some(Some(menu_id)),
                    ..Default::default()
                },
                Uuid::new_v4(),
            )
            .unwrap();
        assert_eq!(feature.menu_id, Some(menu_id));
        assert!(!feature.is_global());
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = Feature::new(CreateFeatureInput::default(), None);
        assert!(result.is_err());
    }
}
