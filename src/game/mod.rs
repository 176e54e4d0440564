//! Game entities
//!
//! A small entity layer for a 2D side-scroller:
//! - Entity: generational handle, used for non-owning references
//! - Body: position/velocity/acceleration plus liveness and contact flags
//! - Articulated: the steppable, animatable, loadable entity capability
//! - Enemy: pursuit enemy built on top of an articulated entity
//! - World: owns bodies and enemies, steps them, drops the dead
//!
//! Screen coordinates: +x right, +y down. Gravity is positive.

pub mod animation;
pub mod articulated;
pub mod body;
pub mod collision;
pub mod component;
pub mod enemy;
pub mod entity;
pub mod runtime;
pub mod world;

use std::fmt;

use crate::content::ContentError;

pub use articulated::{Articulated, ArticulatedEntity};
pub use body::Body;
pub use enemy::Enemy;
pub use entity::Entity;
pub use world::World;

/// Error type for entity loading
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Content provider or file I/O failure
    Content(ContentError),
    /// Identifier could not be resolved to a local file
    Unresolved(String),
    /// Resource is not valid RON for the expected type
    Parse(String),
    /// Resource parsed but is inconsistent
    Invalid(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Content(e) => write!(f, "{}", e),
            LoadError::Unresolved(uri) => write!(f, "unable to resolve {}", uri),
            LoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            LoadError::Invalid(msg) => write!(f, "invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<ContentError> for LoadError {
    fn from(e: ContentError) -> Self {
        LoadError::Content(e)
    }
}
