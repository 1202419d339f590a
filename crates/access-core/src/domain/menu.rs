// ============================================================================
// Access Core - Menu Entity
// File: crates/access-core/src/domain/menu.rs
// Description: Navigation tree node
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use access_shared::constants::ROOT_HIERARCHY_LEVEL;

use super::double_option;

/// Menu entity. `parent_id = None` marks a root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Menu {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Menu name must be between 1 and 100 characters"))]
    pub name: String,

    pub parent_id: Option<Uuid>,

    #[validate(length(max = 255, message = "Route path too long"))]
    pub route_path: Option<String>,

    #[validate(length(max = 100, message = "Menu icon too long"))]
    pub icon: Option<String>,

    /// Display hint only; the tree shape comes from `parent_id`.
    #[validate(range(min = 1, message = "Hierarchy level must be at least 1"))]
    pub hierarchy_level: i32,

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

/// Payload for `create_menu`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMenuInput {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub route_path: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Derived from the parent when omitted.
    #[serde(default)]
    pub hierarchy_level: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Partial update. Outer `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub route_path: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub icon: Option<Option<String>>,
    #[serde(default)]
    pub hierarchy_level: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Menu {
    pub fn new(
        input: CreateMenuInput,
        parent_level: Option<i32>,
        created_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let hierarchy_level = input
            .hierarchy_level
            .unwrap_or_else(|| Self::level_below(parent_level));

        let menu = Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            parent_id: input.parent_id,
            route_path: trimmed(input.route_path),
            icon: trimmed(input.icon),
            hierarchy_level,
            description: trimmed(input.description),
            is_active: input.is_active.unwrap_or(true),
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        };

        menu.validate()?;
        Ok(menu)
    }

    /// Level a child of a menu at `parent_level` gets by default.
    pub fn level_below(parent_level: Option<i32>) -> i32 {
        parent_level.map_or(ROOT_HIERARCHY_LEVEL, |level| level.saturating_add(1))
    }

    /// Applies `patch` in place. `parent_level` is the level of the new parent
    /// and is only consulted when the patch moves the menu without naming a level.
    pub fn apply_patch(
        &mut self,
        patch: MenuPatch,
        parent_level: Option<i32>,
        modified_by: Uuid,
    ) -> Result<(), validator::ValidationErrors> {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = parent_id;
            if patch.hierarchy_level.is_none() {
                self.hierarchy_level = Self::level_below(parent_level);
            }
        }
        if let Some(route_path) = patch.route_path {
            self.route_path = trimmed(route_path);
        }
        if let Some(icon) = patch.icon {
            self.icon = trimmed(icon);
        }
        if let Some(level) = patch.hierarchy_level {
            self.hierarchy_level = level;
        }
        if let Some(description) = patch.description {
            self.description = trimmed(description);
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);

        self.validate()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> CreateMenuInput {
        CreateMenuInput {
            name: name.to_string(),
            route_path: Some(" /dashboard ".to_string()),
            icon: Some("home".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_root_menu() {
        let menu = Menu::new(input("  Dashboard "), None, None).unwrap();
        assert_eq!(menu.name, "Dashboard");
        assert_eq!(menu.route_path.as_deref(), Some("/dashboard"));
        assert_eq!(menu.hierarchy_level, ROOT_HIERARCHY_LEVEL);
        assert!(menu.is_root());
        assert!(menu.is_active);
    }

    #[test]
    fn test_child_level_defaults_from_parent() {
        let mut child = input("Reports");
        child.parent_id = Some(Uuid::new_v4());
        let menu = Menu::new(child, Some(2), None).unwrap();
        assert_eq!(menu.hierarchy_level, 3);
        assert!(!menu.is_root());
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(Menu::new(input("   "), None, None).is_err());
    }

    #[test]
    fn test_patch_moves_to_root_and_recomputes_level() {
        let mut child = input("Reports");
        child.parent_id = Some(Uuid::new_v4());
        let mut menu = Menu::new(child, Some(1), None).unwrap();
        assert_eq!(menu.hierarchy_level, 2);

        let actor = Uuid::new_v4();
        let patch = MenuPatch {
            parent_id: Some(None),
            icon: Some(None),
            ..Default::default()
        };
        menu.apply_patch(patch, None, actor).unwrap();

        assert!(menu.is_root());
        assert_eq!(menu.hierarchy_level, ROOT_HIERARCHY_LEVEL);
        assert!(menu.icon.is_none());
        assert_eq!(menu.modified_by, Some(actor));
    }

    #[test]
    fn test_patch_deserializes_null_as_clear() {
        let patch: MenuPatch = serde_json::from_str(r#"{"parent_id": null}"#).unwrap();
        assert_eq!(patch.parent_id, Some(None));

        let patch: MenuPatch = serde_json::from_str(r#"{"name": "Settings"}"#).unwrap();
        assert!(patch.parent_id.is_none());
    }

    #[test]
    fn test_level_has_no_depth_limit() {
        let mut child = input("Leaf");
        child.parent_id = Some(Uuid::new_v4());
        let menu = Menu::new(child, Some(32), None).unwrap();
        assert_eq!(menu.hierarchy_level, 33);

        let mut moved = Menu::new(input("Moved"), None, None).unwrap();
        let patch = MenuPatch {
            parent_id: Some(Some(Uuid::new_v4())),
            ..Default::default()
        };
        moved.apply_patch(patch, Some(40), Uuid::new_v4()).unwrap();
        assert_eq!(moved.hierarchy_level, 41);
    }

    #[test]
    fn test_zero_level_rejected() {
        let mut root = input("Dashboard");
        root.hierarchy_level = Some(0);
        assert!(Menu::new(root, None, None).is_err());
    }
}
