//! Entity implementation for the knowledge graph
//!
//! Entities are owned and mutated by the storage layer; the query core
//! only ever sees them as immutable snapshots.

use super::property::{PropertyMap, PropertyValue};
use super::types::{EntityId, EntityType};
use serde::{Deserialize, Serialize};

/// A typed entity in the knowledge graph
///
/// Entities have:
/// - A unique ID
/// - A type label (e.g., "Person")
/// - Properties (key-value pairs)
/// - A creation timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier for this entity
    pub id: EntityId,

    /// Type label for this entity
    pub entity_type: EntityType,

    /// Properties associated with this entity
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Entity {
    /// Create a new entity
    pub fn new(id: EntityId, entity_type: impl Into<EntityType>) -> Self {
        Entity {
            id,
            entity_type: entity_type.into(),
            properties: PropertyMap::new(),
            created_at: Self::current_timestamp(),
        }
    }

    /// Create a new entity with properties
    pub fn new_with_properties(
        id: EntityId,
        entity_type: impl Into<EntityType>,
        properties: PropertyMap,
    ) -> Self {
        Entity {
            id,
            entity_type: entity_type.into(),
            properties,
            created_at: Self::current_timestamp(),
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

    /// Get number of properties
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    fn current_timestamp() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
