//! Domain errors

use thiserror::Error;
use uuid::Uuid;

/// Coarse classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    Internal,
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Menu not found: {0}")]
    MenuNotFound(Uuid),

    #[error("Feature not found: {0}")]
    FeatureNotFound(Uuid),

    #[error("Role not found: {0}")]
    RoleNotFound(Uuid),

    #[error("Menu name already exists: {0}")]
    MenuNameAlreadyExists(String),

    #[error("Feature name already exists: {0}")]
    FeatureNameAlreadyExists(String),

    #[error("Menu {menu_id} cannot take {parent_id} as parent: it would create a cycle")]
    CyclicParent { menu_id: Uuid, parent_id: Uuid },

    #[error("Cycle detected in menu hierarchy at menu {0}")]
    HierarchyCycle(Uuid),

    #[error("Invalid access submission: {0}")]
    InvalidSubmission(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::MenuNotFound(_)
            | DomainError::FeatureNotFound(_)
            | DomainError::RoleNotFound(_) => ErrorKind::NotFound,
            DomainError::MenuNameAlreadyExists(_)
            | DomainError::FeatureNameAlreadyExists(_) => ErrorKind::Conflict,
            DomainError::CyclicParent { .. }
            | DomainError::HierarchyCycle(_)
            | DomainError::InvalidSubmission(_)
            | DomainError::ValidationError(_) => ErrorKind::InvalidInput,
            DomainError::DatabaseError(_) => ErrorKind::Internal,
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}
