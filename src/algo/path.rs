//! Path value type returned by the search algorithms

use crate::graph::{Entity, Relationship};
use serde::{Deserialize, Serialize};

/// A concrete path through the graph
///
/// Entities run from source to target inclusive; relationships carry one
/// entry per hop. `hops == relationships.len() == entities.len() - 1`
/// always holds. `total_weight` is meaningful for weighted search only
/// and 0.0 for unweighted results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    /// Entities along the path, source first, target last
    pub entities: Vec<Entity>,

    /// Relationships traversed, one per hop
    pub relationships: Vec<Relationship>,

    /// Number of hops
    pub hops: usize,

    /// Cumulative weight of the traversed relationships
    pub total_weight: f64,
}

impl Path {
    /// Build a path from its entity and relationship sequences
    pub fn new(entities: Vec<Entity>, relationships: Vec<Relationship>, total_weight: f64) -> Self {
        debug_assert_eq!(entities.len(), relationships.len() + 1);
        Path {
            hops: relationships.len(),
            entities,
            relationships,
            total_weight,
        }
    }

    /// The zero-hop path consisting of one entity
    pub fn single(entity: Entity) -> Self {
        Path {
            entities: vec![entity],
            relationships: Vec::new(),
            hops: 0,
            total_weight: 0.0,
        }
    }

    /// First entity on the path
    pub fn source(&self) -> Option<&Entity> {
        self.entities.first()
    }

    /// Last entity on the path
    pub fn target(&self) -> Option<&Entity> {
        self.entities.last()
    }
}
