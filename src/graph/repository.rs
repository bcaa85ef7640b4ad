//! Storage seam for the query core
//!
//! Every component reaches the graph through this trait; none of them
//! touch storage directly. Production backends live in the storage layer;
//! this crate ships [`MemoryGraphRepository`](super::memory::MemoryGraphRepository)
//! as the in-memory reference implementation.

use crate::graph::{Entity, EntityId, Relationship};
use crate::query::{GraphQuery, GraphQueryResult};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a graph repository backend
///
/// These propagate unmodified through the query core; retry policy
/// belongs to the storage layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Read-only access to the underlying graph storage
///
/// All calls are suspension points; dropping a future returned by any
/// method cancels the in-flight call cooperatively.
#[async_trait]
pub trait GraphRepository: Send + Sync {
    /// Look up a single entity by id. Absent entities are `Ok(None)`.
    async fn entity_by_id(&self, id: EntityId) -> RepositoryResult<Option<Entity>>;

    /// List the relationships attached to an entity.
    ///
    /// `include_outgoing` selects relationships traversable out of the
    /// entity, `include_incoming` those arriving at it. Undirected
    /// relationships count as outgoing for both endpoints.
    async fn relationships_for_entity(
        &self,
        entity_id: EntityId,
        include_outgoing: bool,
        include_incoming: bool,
    ) -> RepositoryResult<Vec<Relationship>>;

    /// Execute a declarative attribute query against the backend.
    async fn execute_query(&self, query: &GraphQuery) -> RepositoryResult<GraphQueryResult>;
}
