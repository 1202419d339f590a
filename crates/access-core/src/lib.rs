//! # Access Core
//! 
//! Domain entities, repository traits and services for role-based access to
//! the menu tree and its features.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, ErrorKind};
