// ============================================================================
// Access Core - Access Menu Entity
// File: crates/access-core/src/domain/access_menu.rs
// Description: Grant row linking a role to a navigable menu
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Presence of the row is the grant; there is no flag column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessMenu {
    pub id: Uuid,
    pub role_id: Uuid,
    pub menu_id: Uuid,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl AccessMenu {
    pub fn new(role_id: Uuid, menu_id: Uuid, created_by: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role_id,
            menu_id,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
        }
    }
}
