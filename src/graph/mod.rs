//! Knowledge graph data model and storage seam
//!
//! This module implements the typed entity/relationship model:
//! - Entities with a type label and an open, typed property bag
//! - Directed, weighted relationships between entities
//! - The [`GraphRepository`] trait every query component calls through
//! - An in-memory reference backend with hash-based indices

pub mod entity;
pub mod memory;
pub mod property;
pub mod relationship;
pub mod repository;
pub mod types;

// Re-export main types
pub use entity::Entity;
pub use memory::{GraphError, GraphResult, MemoryGraphRepository};
pub use property::{PropertyMap, PropertyValue};
pub use relationship::{Relationship, DEFAULT_WEIGHT};
pub use repository::{GraphRepository, RepositoryError, RepositoryResult};
pub use types::{EntityId, EntityType, RelationshipId, RelationshipType};
