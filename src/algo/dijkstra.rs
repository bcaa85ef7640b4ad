//! Weighted shortest path search
//!
//! Dijkstra's algorithm over relationship weights. Weights must be
//! non-negative; the in-memory backend enforces this at creation time,
//! and behavior on a backend that supplies negative weights is
//! undefined.

use super::common::{materialize_path, unwind_predecessors, PredecessorMap};
use super::path::Path;
use crate::graph::{EntityId, GraphRepository, RepositoryResult};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use tracing::debug;

/// Frontier entry for the priority queue
#[derive(Copy, Clone, PartialEq)]
struct FrontierEntry {
    cost: f64,
    entity: EntityId,
}

// BinaryHeap is a max-heap, so Ord is reversed for min-heap behavior.
impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Weighted shortest-path search over the graph repository
pub struct DijkstraPathFinder {
    repository: Arc<dyn GraphRepository>,
}

impl DijkstraPathFinder {
    /// Create a path finder backed by the given repository
    pub fn new(repository: Arc<dyn GraphRepository>) -> Self {
        Self { repository }
    }

    /// Minimum-weight path, or `None` when target is unreachable
    ///
    /// The frontier is keyed by cumulative weight and the search stops
    /// as soon as the target is popped with its final distance. Among
    /// equal-weight paths the first one discovered wins: relaxation is
    /// strict, so a tie never replaces an already-recorded predecessor.
    /// Runs in O((V+E) log V).
    pub async fn find_shortest_path(
        &self,
        source: EntityId,
        target: EntityId,
    ) -> RepositoryResult<Option<Path>> {
        if source == target {
            return Ok(self.repository.entity_by_id(source).await?.map(Path::single));
        }

        let mut distances: FxHashMap<EntityId, f64> = FxHashMap::default();
        let mut predecessors = PredecessorMap::default();
        let mut frontier = BinaryHeap::new();

        distances.insert(source, 0.0);
        predecessors.insert(source, None);
        frontier.push(FrontierEntry {
            cost: 0.0,
            entity: source,
        });

        while let Some(FrontierEntry { cost, entity }) = frontier.pop() {
            if entity == target {
                let (ids, relationships) = unwind_predecessors(&predecessors, target);
                let path =
                    materialize_path(self.repository.as_ref(), &ids, relationships, cost).await?;
                debug!(hops = path.hops, total_weight = cost, "weighted search found a path");
                return Ok(Some(path));
            }

            // A shorter path to this entity was already settled.
            if cost > *distances.get(&entity).unwrap_or(&f64::INFINITY) {
                continue;
            }

            let relationships = self
                .repository
                .relationships_for_entity(entity, true, false)
                .await?;
            for relationship in relationships {
                let next = match relationship.traverse_from(entity) {
                    Some(next) => next,
                    None => continue,
                };
                let next_cost = cost + relationship.weight;
                if next_cost < *distances.get(&next).unwrap_or(&f64::INFINITY) {
                    distances.insert(next, next_cost);
                    predecessors.insert(next, Some((entity, relationship)));
                    frontier.push(FrontierEntry {
                        cost: next_cost,
                        entity: next,
                    });
                }
            }
        }

        Ok(None)
    }
}
