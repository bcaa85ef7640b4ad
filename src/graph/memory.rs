//! In-memory graph repository
//!
//! Reference backend for the query core and the test double used across
//! the crate. Uses hash maps for O(1) lookups:
//! - entities: EntityId -> Entity
//! - relationships: RelationshipId -> Relationship
//! - outgoing/incoming: EntityId -> Vec<RelationshipId> (adjacency lists)
//! - type_index: EntityType -> Vec<EntityId>
//!
//! Adjacency lists and the type index preserve insertion order, so scans
//! and traversal expansion are deterministic.

use super::entity::Entity;
use super::relationship::{Relationship, DEFAULT_WEIGHT};
use super::repository::{GraphRepository, RepositoryResult};
use super::types::{EntityId, EntityType, RelationshipId, RelationshipType};
use crate::graph::{PropertyMap, PropertyValue};
use crate::query::{GraphQuery, GraphQueryResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;

/// Errors that can occur while building the graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    #[error("invalid relationship: source entity {0} does not exist")]
    UnknownSource(EntityId),

    #[error("invalid relationship: target entity {0} does not exist")]
    UnknownTarget(EntityId),

    #[error("invalid relationship: negative weight {0}")]
    NegativeWeight(f64),
}

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Default)]
struct GraphData {
    entities: FxHashMap<EntityId, Entity>,
    relationships: FxHashMap<RelationshipId, Relationship>,
    outgoing: FxHashMap<EntityId, Vec<RelationshipId>>,
    incoming: FxHashMap<EntityId, Vec<RelationshipId>>,
    type_index: HashMap<EntityType, Vec<EntityId>>,
    insertion_order: Vec<EntityId>,
    next_entity_id: u64,
    next_relationship_id: u64,
}

/// In-memory graph storage implementing [`GraphRepository`]
///
/// The construction-side `add_*` API builds the graph; once handed to the
/// query core (behind `Arc<dyn GraphRepository>`) it is only read.
#[derive(Debug, Default)]
pub struct MemoryGraphRepository {
    data: RwLock<GraphData>,
}

impl MemoryGraphRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, returning its assigned id
    pub fn add_entity(&self, entity_type: impl Into<EntityType>) -> EntityId {
        self.add_entity_with_properties(entity_type, PropertyMap::new())
    }

    /// Add an entity with initial properties
    pub fn add_entity_with_properties(
        &self,
        entity_type: impl Into<EntityType>,
        properties: PropertyMap,
    ) -> EntityId {
        let mut data = self.data.write();
        let id = EntityId::new(data.next_entity_id);
        data.next_entity_id += 1;

        let entity = Entity::new_with_properties(id, entity_type, properties);
        data.type_index
            .entry(entity.entity_type.clone())
            .or_default()
            .push(id);
        data.insertion_order.push(id);
        data.entities.insert(id, entity);
        id
    }

    /// Set a property on an existing entity
    pub fn set_entity_property(
        &self,
        id: EntityId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<()> {
        let mut data = self.data.write();
        let entity = data
            .entities
            .get_mut(&id)
            .ok_or(GraphError::EntityNotFound(id))?;
        entity.set_property(key, value);
        Ok(())
    }

    /// Add a directed relationship with the default weight
    pub fn add_relationship(
        &self,
        source: EntityId,
        target: EntityId,
        relationship_type: impl Into<RelationshipType>,
    ) -> GraphResult<RelationshipId> {
        self.add_relationship_with(source, target, relationship_type, DEFAULT_WEIGHT, true)
    }

    /// Add a directed relationship with an explicit weight
    pub fn add_relationship_with_weight(
        &self,
        source: EntityId,
        target: EntityId,
        relationship_type: impl Into<RelationshipType>,
        weight: f64,
    ) -> GraphResult<RelationshipId> {
        self.add_relationship_with(source, target, relationship_type, weight, true)
    }

    /// Add a relationship, validating endpoints and weight
    ///
    /// Negative weights are rejected here rather than inside the weighted
    /// path search, which assumes non-negative weights.
    pub fn add_relationship_with(
        &self,
        source: EntityId,
        target: EntityId,
        relationship_type: impl Into<RelationshipType>,
        weight: f64,
        directed: bool,
    ) -> GraphResult<RelationshipId> {
        if weight < 0.0 {
            return Err(GraphError::NegativeWeight(weight));
        }

        let mut data = self.data.write();
        if !data.entities.contains_key(&source) {
            return Err(GraphError::UnknownSource(source));
        }
        if !data.entities.contains_key(&target) {
            return Err(GraphError::UnknownTarget(target));
        }

        let id = RelationshipId::new(data.next_relationship_id);
        data.next_relationship_id += 1;

        let mut relationship =
            Relationship::new_weighted(id, source, target, relationship_type, weight);
        relationship.directed = directed;

        data.outgoing.entry(source).or_default().push(id);
        data.incoming.entry(target).or_default().push(id);
        if !directed && source != target {
            // Undirected relationships are traversable from either endpoint.
            data.outgoing.entry(target).or_default().push(id);
            data.incoming.entry(source).or_default().push(id);
        }
        data.relationships.insert(id, relationship);
        Ok(id)
    }

    /// Number of entities stored
    pub fn entity_count(&self) -> usize {
        self.data.read().entities.len()
    }

    /// Number of relationships stored
    pub fn relationship_count(&self) -> usize {
        self.data.read().relationships.len()
    }
}

#[async_trait]
impl GraphRepository for MemoryGraphRepository {
    async fn entity_by_id(&self, id: EntityId) -> RepositoryResult<Option<Entity>> {
        Ok(self.data.read().entities.get(&id).cloned())
    }

    async fn relationships_for_entity(
        &self,
        entity_id: EntityId,
        include_outgoing: bool,
        include_incoming: bool,
    ) -> RepositoryResult<Vec<Relationship>> {
        let data = self.data.read();
        let mut seen = FxHashSet::default();
        let mut result = Vec::new();

        let mut collect = |ids: Option<&Vec<RelationshipId>>| {
            for id in ids.into_iter().flatten() {
                if seen.insert(*id) {
                    if let Some(rel) = data.relationships.get(id) {
                        result.push(rel.clone());
                    }
                }
            }
        };

        if include_outgoing {
            collect(data.outgoing.get(&entity_id));
        }
        if include_incoming {
            collect(data.incoming.get(&entity_id));
        }
        Ok(result)
    }

    async fn execute_query(&self, query: &GraphQuery) -> RepositoryResult<GraphQueryResult> {
        let started = Instant::now();
        let data = self.data.read();

        let candidates: Vec<&Entity> = match &query.entity_type {
            Some(entity_type) => data
                .type_index
                .get(entity_type)
                .map(|ids| ids.iter().filter_map(|id| data.entities.get(id)).collect())
                .unwrap_or_default(),
            None => data
                .insertion_order
                .iter()
                .filter_map(|id| data.entities.get(id))
                .collect(),
        };

        let matched: Vec<&Entity> = candidates
            .into_iter()
            .filter(|entity| {
                query
                    .property_filters
                    .iter()
                    .all(|(key, value)| entity.properties.get(key) == Some(value))
            })
            .collect();
        let total_count = matched.len();

        let entities: Vec<Entity> = matched
            .into_iter()
            .skip(query.skip)
            .take(query.page_size.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        // Relationships whose endpoints both lie in the returned page, so
        // that a paged result is a self-contained subgraph.
        let page_ids: FxHashSet<EntityId> = entities.iter().map(|e| e.id).collect();
        let mut seen = FxHashSet::default();
        let mut relationships = Vec::new();
        for entity in &entities {
            for rel_id in data.outgoing.get(&entity.id).into_iter().flatten() {
                if let Some(rel) = data.relationships.get(rel_id) {
                    if page_ids.contains(&rel.source)
                        && page_ids.contains(&rel.target)
                        && seen.insert(*rel_id)
                    {
                        relationships.push(rel.clone());
                    }
                }
            }
        }

        Ok(GraphQueryResult {
            entities,
            relationships,
            total_count,
            execution_time: started.elapsed(),
            from_cache: false,
        })
    }
}
