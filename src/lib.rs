//! Marga Knowledge Graph Query Engine
//!
//! A read-only query core for knowledge graphs of typed entities and
//! relationships: unweighted and weighted path search, attribute-filtered
//! queries with cost-based planning, and TTL result caching.
//!
//! # Architecture
//!
//! Storage is an external collaborator behind the
//! [`GraphRepository`](graph::GraphRepository) trait; every component
//! reaches the graph through it and nothing else. Path requests go
//! straight to [`GraphTraversalService`](algo::GraphTraversalService) or
//! [`DijkstraPathFinder`](algo::DijkstraPathFinder). Attribute queries
//! go through the [`QueryCacheService`](query::QueryCacheService) first
//! and, on a miss, to the [`GraphQueryEngine`](query::GraphQueryEngine);
//! the [`CostBasedOptimizer`](query::CostBasedOptimizer) produces
//! auditable plans independent of execution.
//!
//! # Example
//!
//! ```rust
//! use marga::algo::GraphTraversalService;
//! use marga::graph::MemoryGraphRepository;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = Arc::new(MemoryGraphRepository::new());
//!     let alice = repo.add_entity("Person");
//!     let bob = repo.add_entity("Person");
//!     let charlie = repo.add_entity("Person");
//!     repo.add_relationship(alice, bob, "KNOWS")?;
//!     repo.add_relationship(bob, charlie, "KNOWS")?;
//!
//!     let traversal = GraphTraversalService::new(repo);
//!     let path = traversal
//!         .breadth_first_search(alice, charlie)
//!         .await?
//!         .expect("alice reaches charlie");
//!     assert_eq!(path.hops, 2);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod graph;
pub mod query;

// Re-export main types for convenience
pub use graph::{
    Entity, EntityId, EntityType, GraphError, GraphRepository, GraphResult,
    MemoryGraphRepository, PropertyMap, PropertyValue, Relationship, RelationshipId,
    RelationshipType, RepositoryError, RepositoryResult,
};

pub use algo::{DijkstraPathFinder, GraphTraversalService, Path};

pub use query::{
    CacheError, CacheStatistics, CostBasedOptimizer, GraphQuery, GraphQueryEngine,
    GraphQueryResult, PlanOperation, PlanStep, QueryCacheService, QueryError, QueryPlan,
    QueryResult,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
