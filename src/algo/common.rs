//! Shared plumbing for the search algorithms
//!
//! Both the unweighted and the weighted searches record predecessor
//! links during expansion and only materialize full entity snapshots for
//! the one path they return.

use super::path::Path;
use crate::graph::{EntityId, GraphRepository, Relationship, RepositoryError, RepositoryResult};
use rustc_hash::FxHashMap;

/// Predecessor links recorded during a search; the search source maps to
/// `None`, every other discovered entity to its parent and the
/// relationship it was discovered through.
pub(crate) type PredecessorMap = FxHashMap<EntityId, Option<(EntityId, Relationship)>>;

/// Walk the predecessor chain back from `target`, returning the entity
/// id sequence (source first) and the relationships per hop.
pub(crate) fn unwind_predecessors(
    predecessors: &PredecessorMap,
    target: EntityId,
) -> (Vec<EntityId>, Vec<Relationship>) {
    let mut ids = Vec::new();
    let mut relationships = Vec::new();

    let mut cursor = Some(target);
    while let Some(id) = cursor {
        ids.push(id);
        cursor = match predecessors.get(&id) {
            Some(Some((parent, relationship))) => {
                relationships.push(relationship.clone());
                Some(*parent)
            }
            _ => None,
        };
    }
    ids.reverse();
    relationships.reverse();
    (ids, relationships)
}

/// Resolve entity snapshots for a discovered path.
///
/// The storage layer guarantees relationship endpoints resolve; an
/// entity vanishing between expansion and reconstruction is a backend
/// fault, not a "no path" outcome.
pub(crate) async fn materialize_path(
    repository: &dyn GraphRepository,
    entity_ids: &[EntityId],
    relationships: Vec<Relationship>,
    total_weight: f64,
) -> RepositoryResult<Path> {
    let mut entities = Vec::with_capacity(entity_ids.len());
    for id in entity_ids {
        let entity = repository.entity_by_id(*id).await?.ok_or_else(|| {
            RepositoryError::Backend(format!("{} missing during path reconstruction", id))
        })?;
        entities.push(entity);
    }
    Ok(Path::new(entities, relationships, total_weight))
}
