//! Relationship implementation for the knowledge graph
//!
//! Relationships are directed, weighted edges between two entities. The
//! storage layer guarantees that both endpoint ids resolve.

use super::property::{PropertyMap, PropertyValue};
use super::types::{EntityId, RelationshipId, RelationshipType};
use serde::{Deserialize, Serialize};

/// Default weight for relationships created without an explicit one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A directed, weighted relationship in the knowledge graph
///
/// Relationships have:
/// - A unique ID
/// - A source entity (the relationship goes FROM this entity)
/// - A target entity (the relationship goes TO this entity)
/// - A type label (e.g., "KNOWS", "WORKS_AT")
/// - Properties (key-value pairs)
/// - A non-negative weight (used by weighted path search)
/// - A directed flag (undirected relationships are traversable both ways)
/// - A creation timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier for this relationship
    pub id: RelationshipId,

    /// Source entity (relationship goes FROM this entity)
    pub source: EntityId,

    /// Target entity (relationship goes TO this entity)
    pub target: EntityId,

    /// Type of relationship (e.g., "KNOWS", "WORKS_AT")
    pub relationship_type: RelationshipType,

    /// Properties associated with this relationship
    pub properties: PropertyMap,

    /// Traversal weight, non-negative
    pub weight: f64,

    /// Whether this relationship is directed
    pub directed: bool,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Relationship {
    /// Create a new directed relationship with the default weight
    pub fn new(
        id: RelationshipId,
        source: EntityId,
        target: EntityId,
        relationship_type: impl Into<RelationshipType>,
    ) -> Self {
        Relationship {
            id,
            source,
            target,
            relationship_type: relationship_type.into(),
            properties: PropertyMap::new(),
            weight: DEFAULT_WEIGHT,
            directed: true,
            created_at: Self::current_timestamp(),
        }
    }

    /// Create a new directed relationship with an explicit weight
    pub fn new_weighted(
        id: RelationshipId,
        source: EntityId,
        target: EntityId,
        relationship_type: impl Into<RelationshipType>,
        weight: f64,
    ) -> Self {
        Relationship {
            weight,
            ..Self::new(id, source, target, relationship_type)
        }
    }

    /// Set a property value
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Check if property exists
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Check if this relationship connects two specific entities (in either direction)
    pub fn connects(&self, a: EntityId, b: EntityId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    /// Resolve the far endpoint when traversing out of `origin`.
    ///
    /// Directed relationships are traversable source to target only;
    /// undirected ones are traversable from either endpoint. Returns
    /// `None` when the relationship cannot be followed out of `origin`.
    pub fn traverse_from(&self, origin: EntityId) -> Option<EntityId> {
        if self.source == origin {
            Some(self.target)
        } else if !self.directed && self.target == origin {
            Some(self.source)
        } else {
            None
        }
    }

    fn current_timestamp() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
