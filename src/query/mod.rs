//! Declarative attribute queries over the knowledge graph
//!
//! A [`GraphQuery`] names an optional entity type, a set of AND-combined
//! property filters, pagination, and an execution timeout. Queries are
//! planned by the [`CostBasedOptimizer`], executed by the
//! [`GraphQueryEngine`] against the repository, and memoized by the
//! [`QueryCacheService`]. Caching is composed by the caller; the engine
//! itself never consults the cache.

pub mod cache;
pub mod engine;
pub mod optimizer;

// Re-export main types
pub use cache::{CacheError, CacheStatistics, QueryCacheService};
pub use engine::GraphQueryEngine;
pub use optimizer::{CostBasedOptimizer, PlanOperation, PlanStep, QueryPlan};

use crate::graph::{Entity, EntityType, PropertyValue, Relationship, RepositoryError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced while executing a query
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The repository call did not complete within the query's timeout.
    /// Reported as a failure, never as a truncated result.
    #[error("query execution exceeded the {0:?} timeout")]
    Timeout(Duration),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// A declarative attribute query
///
/// Property filters are AND-combined and order-irrelevant: two queries
/// with the same filters in different insertion order are identical, and
/// the cache treats them as one. Cancellation is cooperative: dropping
/// the execution future cancels the in-flight repository call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphQuery {
    /// Restrict matches to one entity type
    pub entity_type: Option<EntityType>,

    /// Property filters, AND-combined
    pub property_filters: HashMap<String, PropertyValue>,

    /// Maximum number of entities to return
    pub page_size: Option<usize>,

    /// Number of matching entities to skip before the page starts
    pub skip: usize,

    /// Hard upper bound on execution time
    pub timeout: Option<Duration>,
}

impl GraphQuery {
    /// Create an empty query matching every entity
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the query to one entity type
    pub fn with_entity_type(mut self, entity_type: impl Into<EntityType>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Add a property filter
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.property_filters.insert(key.into(), value.into());
        self
    }

    /// Request a result page
    pub fn with_page(mut self, page_size: usize, skip: usize) -> Self {
        self.page_size = Some(page_size);
        self.skip = skip;
        self
    }

    /// Bound execution time
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Result of an attribute query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphQueryResult {
    /// Matching entities, in backend scan order, after pagination
    pub entities: Vec<Entity>,

    /// Relationships connecting the returned entities
    pub relationships: Vec<Relationship>,

    /// Number of matches before pagination
    pub total_count: usize,

    /// Time the backend spent executing the query
    pub execution_time: Duration,

    /// Whether this result was served from the cache
    pub from_cache: bool,
}
