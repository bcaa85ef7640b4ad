//! Unweighted graph traversal
//!
//! Breadth-first shortest path by hop count and exhaustive bounded-depth
//! depth-first search. Both expand the frontier through repository
//! calls, so every step is a suspension point and dropping the future
//! cancels the search.

use super::common::{materialize_path, unwind_predecessors, PredecessorMap};
use super::path::Path;
use crate::graph::{Entity, EntityId, GraphRepository, Relationship, RepositoryResult};
use futures::future::BoxFuture;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Unweighted path search over the graph repository
pub struct GraphTraversalService {
    repository: Arc<dyn GraphRepository>,
}

impl GraphTraversalService {
    /// Create a traversal service backed by the given repository
    pub fn new(repository: Arc<dyn GraphRepository>) -> Self {
        Self { repository }
    }

    /// Shortest path by hop count, or `None` when target is unreachable
    ///
    /// Expands outgoing relationships in FIFO order; the first time the
    /// target is dequeued its path is the shortest one. Runs in O(V+E)
    /// over the reachable subgraph.
    pub async fn breadth_first_search(
        &self,
        source: EntityId,
        target: EntityId,
    ) -> RepositoryResult<Option<Path>> {
        if source == target {
            return Ok(self.repository.entity_by_id(source).await?.map(Path::single));
        }

        let mut frontier = VecDeque::new();
        let mut visited = PredecessorMap::default();
        visited.insert(source, None);
        frontier.push_back(source);

        while let Some(current) = frontier.pop_front() {
            if current == target {
                let (ids, relationships) = unwind_predecessors(&visited, target);
                let path =
                    materialize_path(self.repository.as_ref(), &ids, relationships, 0.0).await?;
                debug!(hops = path.hops, "breadth-first search found a path");
                return Ok(Some(path));
            }

            let relationships = self
                .repository
                .relationships_for_entity(current, true, false)
                .await?;
            for relationship in relationships {
                if let Some(next) = relationship.traverse_from(current) {
                    if !visited.contains_key(&next) {
                        visited.insert(next, Some((current, relationship)));
                        frontier.push_back(next);
                    }
                }
            }
        }

        Ok(None)
    }

    /// Every directed path from source to target within `max_depth` hops
    ///
    /// Avoids revisiting entities already on the current path, so cycles
    /// terminate; the same entity may still appear on two different
    /// emitted paths. Returns an empty sequence when no path qualifies.
    pub async fn depth_first_search(
        &self,
        source: EntityId,
        target: EntityId,
        max_depth: usize,
    ) -> RepositoryResult<Vec<Path>> {
        let start = match self.repository.entity_by_id(source).await? {
            Some(entity) => entity,
            None => return Ok(Vec::new()),
        };

        let mut entities = vec![start];
        let mut relationships = Vec::new();
        let mut on_path = FxHashSet::default();
        on_path.insert(source);
        let mut found = Vec::new();

        self.visit(
            source,
            target,
            max_depth,
            &mut entities,
            &mut relationships,
            &mut on_path,
            &mut found,
        )
        .await?;

        debug!(paths = found.len(), max_depth, "depth-first search finished");
        Ok(found)
    }

    /// Recursive step of the depth-first search.
    #[allow(clippy::too_many_arguments)]
    fn visit<'a>(
        &'a self,
        current: EntityId,
        target: EntityId,
        max_depth: usize,
        entities: &'a mut Vec<Entity>,
        relationships: &'a mut Vec<Relationship>,
        on_path: &'a mut FxHashSet<EntityId>,
        found: &'a mut Vec<Path>,
    ) -> BoxFuture<'a, RepositoryResult<()>> {
        Box::pin(async move {
            if current == target {
                found.push(Path::new(entities.clone(), relationships.clone(), 0.0));
                return Ok(());
            }
            // One more hop would exceed the bound, prune this branch.
            if relationships.len() >= max_depth {
                return Ok(());
            }

            let candidates = self
                .repository
                .relationships_for_entity(current, true, false)
                .await?;
            for relationship in candidates {
                let next = match relationship.traverse_from(current) {
                    Some(next) => next,
                    None => continue,
                };
                if on_path.contains(&next) {
                    continue;
                }
                let entity = match self.repository.entity_by_id(next).await? {
                    Some(entity) => entity,
                    None => continue,
                };

                on_path.insert(next);
                entities.push(entity);
                relationships.push(relationship);

                self.visit(next, target, max_depth, entities, relationships, on_path, found)
                    .await?;

                relationships.pop();
                entities.pop();
                on_path.remove(&next);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryGraphRepository;

    fn line_graph() -> (Arc<MemoryGraphRepository>, EntityId, EntityId, EntityId) {
        let repo = Arc::new(MemoryGraphRepository::new());
        let a = repo.add_entity("Node");
        let b = repo.add_entity("Node");
        let c = repo.add_entity("Node");
        repo.add_relationship(a, b, "LINK").unwrap();
        repo.add_relationship(b, c, "LINK").unwrap();
        (repo, a, b, c)
    }

    #[tokio::test]
    async fn test_bfs_finds_shortest_path() {
        let (repo, a, b, c) = line_graph();
        let service = GraphTraversalService::new(repo);

        let path = service.breadth_first_search(a, c).await.unwrap().unwrap();
        assert_eq!(path.hops, 2);
        assert_eq!(
            path.entities.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![a, b, c]
        );
        assert_eq!(path.relationships.len(), 2);
        assert_eq!(path.total_weight, 0.0);
    }

    #[tokio::test]
    async fn test_bfs_same_entity() {
        let (repo, a, _, _) = line_graph();
        let service = GraphTraversalService::new(repo);

        let path = service.breadth_first_search(a, a).await.unwrap().unwrap();
        assert_eq!(path.hops, 0);
        assert_eq!(path.entities.len(), 1);
        assert!(path.relationships.is_empty());
    }

    #[tokio::test]
    async fn test_bfs_unreachable() {
        let (repo, a, _, c) = line_graph();
        // Edges only run towards c; nothing reaches back.
        let service = GraphTraversalService::new(repo);
        assert!(service.breadth_first_search(c, a).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bfs_missing_source() {
        let (repo, _, _, _) = line_graph();
        let service = GraphTraversalService::new(repo);
        let ghost = EntityId::new(999);
        assert!(service
            .breadth_first_search(ghost, ghost)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_dfs_respects_max_depth() {
        let repo = Arc::new(MemoryGraphRepository::new());
        let a = repo.add_entity("Node");
        let b = repo.add_entity("Node");
        let c = repo.add_entity("Node");
        let d = repo.add_entity("Node");
        let e = repo.add_entity("Node");
        // Short route: a -> b -> e. Long route: a -> c -> d -> e.
        repo.add_relationship(a, b, "LINK").unwrap();
        repo.add_relationship(b, e, "LINK").unwrap();
        repo.add_relationship(a, c, "LINK").unwrap();
        repo.add_relationship(c, d, "LINK").unwrap();
        repo.add_relationship(d, e, "LINK").unwrap();

        let service = GraphTraversalService::new(repo);

        let paths = service.depth_first_search(a, e, 3).await.unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.hops <= 3));

        let paths = service.depth_first_search(a, e, 2).await.unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].hops, 2);
    }

    #[tokio::test]
    async fn test_dfs_terminates_on_cycles() {
        let repo = Arc::new(MemoryGraphRepository::new());
        let a = repo.add_entity("Node");
        let b = repo.add_entity("Node");
        let c = repo.add_entity("Node");
        repo.add_relationship(a, b, "LINK").unwrap();
        repo.add_relationship(b, a, "LINK").unwrap();
        repo.add_relationship(b, c, "LINK").unwrap();

        let service = GraphTraversalService::new(repo);
        let paths = service.depth_first_search(a, c, 10).await.unwrap();

        assert_eq!(paths.len(), 1);
        assert_eq!(
            paths[0].entities.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![a, b, c]
        );
    }

    #[tokio::test]
    async fn test_dfs_no_path_is_empty() {
        let (repo, a, _, c) = line_graph();
        let service = GraphTraversalService::new(repo);
        let paths = service.depth_first_search(c, a, 5).await.unwrap();
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn test_dfs_same_entity() {
        let (repo, a, _, _) = line_graph();
        let service = GraphTraversalService::new(repo);
        let paths = service.depth_first_search(a, a, 0).await.unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].hops, 0);
    }
}
