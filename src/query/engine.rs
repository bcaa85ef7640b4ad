//! Graph query engine
//!
//! A thin, validating, timeout-aware orchestrator: the repository does
//! the actual scan and filter work, the engine enforces the query's time
//! bound and keeps cancellation cooperative. Result caching is composed
//! by the caller, not embedded here.

use crate::graph::GraphRepository;
use crate::query::optimizer::{CostBasedOptimizer, QueryPlan};
use crate::query::{GraphQuery, GraphQueryResult, QueryError, QueryResult};
use std::sync::Arc;
use tracing::debug;

/// Executes declarative queries against the graph repository
pub struct GraphQueryEngine {
    repository: Arc<dyn GraphRepository>,
    optimizer: CostBasedOptimizer,
}

impl GraphQueryEngine {
    /// Create an engine backed by the given repository
    pub fn new(repository: Arc<dyn GraphRepository>) -> Self {
        Self {
            repository,
            optimizer: CostBasedOptimizer::new(),
        }
    }

    /// Execute a query, honoring its timeout
    ///
    /// The query's timeout is a hard upper bound: when the repository
    /// call does not complete in time the engine reports
    /// [`QueryError::Timeout`] instead of a partial result. Dropping the
    /// returned future cancels the in-flight repository call.
    pub async fn execute_query(&self, query: &GraphQuery) -> QueryResult<GraphQueryResult> {
        debug!(
            entity_type = query.entity_type.as_ref().map(|t| t.as_str()),
            filters = query.property_filters.len(),
            timeout = ?query.timeout,
            "executing graph query"
        );

        let result = match query.timeout {
            Some(limit) => tokio::time::timeout(limit, self.repository.execute_query(query))
                .await
                .map_err(|_| QueryError::Timeout(limit))??,
            None => self.repository.execute_query(query).await?,
        };

        debug!(
            total_count = result.total_count,
            elapsed = ?result.execution_time,
            "graph query completed"
        );
        Ok(result)
    }

    /// Produce the cost-estimated plan for a query without executing it
    pub fn explain(&self, query: &GraphQuery) -> QueryPlan {
        self.optimizer.optimize_query(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        Entity, EntityId, MemoryGraphRepository, Relationship, RepositoryResult,
    };
    use async_trait::async_trait;
    use std::time::Duration;

    /// Repository double whose queries never finish in time.
    struct SlowRepository;

    #[async_trait]
    impl GraphRepository for SlowRepository {
        async fn entity_by_id(&self, _id: EntityId) -> RepositoryResult<Option<Entity>> {
            Ok(None)
        }

        async fn relationships_for_entity(
            &self,
            _entity_id: EntityId,
            _include_outgoing: bool,
            _include_incoming: bool,
        ) -> RepositoryResult<Vec<Relationship>> {
            Ok(Vec::new())
        }

        async fn execute_query(&self, _query: &GraphQuery) -> RepositoryResult<GraphQueryResult> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(GraphQueryResult::default())
        }
    }

    #[tokio::test]
    async fn test_execute_query_passes_through() {
        let repo = Arc::new(MemoryGraphRepository::new());
        let id = repo.add_entity("Person");
        repo.set_entity_property(id, "name", "Alice").unwrap();

        let engine = GraphQueryEngine::new(repo);
        let result = engine
            .execute_query(&GraphQuery::new().with_entity_type("Person"))
            .await
            .unwrap();

        assert_eq!(result.total_count, 1);
        assert!(!result.from_cache);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_a_distinct_error() {
        let engine = GraphQueryEngine::new(Arc::new(SlowRepository));
        let query = GraphQuery::new().with_timeout(Duration::from_millis(100));

        let result = engine.execute_query(&query).await;
        assert_eq!(result.unwrap_err(), QueryError::Timeout(Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_no_timeout_runs_to_completion() {
        let repo = Arc::new(MemoryGraphRepository::new());
        repo.add_entity("Person");

        let engine = GraphQueryEngine::new(repo);
        let result = engine.execute_query(&GraphQuery::new()).await.unwrap();
        assert_eq!(result.total_count, 1);
    }

    #[test]
    fn test_explain_consults_the_optimizer() {
        let engine = GraphQueryEngine::new(Arc::new(MemoryGraphRepository::new()));
        let plan = engine.explain(
            &GraphQuery::new()
                .with_entity_type("Person")
                .with_filter("user_id", "u-1"),
        );

        assert!(plan.index_scan_recommended);
        assert!(plan.to_readable_string().contains("Cost:"));
    }
}
