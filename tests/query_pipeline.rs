use marga::graph::{
    Entity, EntityId, GraphRepository, MemoryGraphRepository, Relationship, RepositoryResult,
};
use marga::query::{
    GraphQuery, GraphQueryEngine, GraphQueryResult, QueryCacheService, QueryError,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

fn people_repo() -> Arc<MemoryGraphRepository> {
    let repo = Arc::new(MemoryGraphRepository::new());
    for (name, country) in [
        ("Alice", "DE"),
        ("Bob", "DE"),
        ("Charlie", "FR"),
        ("Diana", "DE"),
    ] {
        let id = repo.add_entity("Person");
        repo.set_entity_property(id, "name", name).unwrap();
        repo.set_entity_property(id, "country", country).unwrap();
    }
    repo
}

/// Cache-then-engine composition as a caller would wire it.
async fn run_cached(
    cache: &QueryCacheService,
    engine: &GraphQueryEngine,
    query: &GraphQuery,
) -> Result<GraphQueryResult, QueryError> {
    if let Some(result) = cache.try_get(query) {
        return Ok(result);
    }
    let result = engine.execute_query(query).await?;
    cache.set(query, result.clone());
    Ok(result)
}

#[tokio::test]
async fn cache_miss_then_hit_round_trip() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let engine = GraphQueryEngine::new(people_repo());
    let cache = QueryCacheService::new(Duration::from_secs(60)).unwrap();
    let query = GraphQuery::new()
        .with_entity_type("Person")
        .with_filter("country", "DE");

    let first = run_cached(&cache, &engine, &query).await.unwrap();
    assert_eq!(first.total_count, 3);
    assert!(!first.from_cache);

    let second = run_cached(&cache, &engine, &query).await.unwrap();
    assert_eq!(second.total_count, 3);
    assert!(second.from_cache);

    // Same filters in a different insertion order hit the same entry.
    let reordered = GraphQuery::new()
        .with_filter("country", "DE")
        .with_entity_type("Person");
    let third = run_cached(&cache, &engine, &reordered).await.unwrap();
    assert!(third.from_cache);
}

#[tokio::test]
async fn hit_rate_counts_both_outcomes() {
    let engine = GraphQueryEngine::new(people_repo());
    let cache = QueryCacheService::new(Duration::from_secs(60)).unwrap();

    let de = GraphQuery::new().with_filter("country", "DE");
    let fr = GraphQuery::new().with_filter("country", "FR");

    // Two misses, then two hits.
    run_cached(&cache, &engine, &de).await.unwrap();
    run_cached(&cache, &engine, &fr).await.unwrap();
    run_cached(&cache, &engine, &de).await.unwrap();
    run_cached(&cache, &engine, &fr).await.unwrap();

    let stats = cache.statistics();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.total_requests, 4);
    assert_eq!(stats.hit_rate, 0.5);
}

#[tokio::test(start_paused = true)]
async fn expired_entries_fall_back_to_the_engine() {
    let engine = GraphQueryEngine::new(people_repo());
    let cache = QueryCacheService::new(Duration::from_secs(1)).unwrap();
    let query = GraphQuery::new().with_entity_type("Person");

    let first = run_cached(&cache, &engine, &query).await.unwrap();
    assert!(!first.from_cache);

    tokio::time::advance(Duration::from_millis(1500)).await;

    let after_expiry = run_cached(&cache, &engine, &query).await.unwrap();
    assert!(!after_expiry.from_cache);
}

#[tokio::test]
async fn clear_empties_the_cache() {
    let engine = GraphQueryEngine::new(people_repo());
    let cache = QueryCacheService::new(Duration::from_secs(60)).unwrap();
    let query = GraphQuery::new().with_entity_type("Person");

    run_cached(&cache, &engine, &query).await.unwrap();
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
    let refetched = run_cached(&cache, &engine, &query).await.unwrap();
    assert!(!refetched.from_cache);
}

#[tokio::test]
async fn pagination_flows_through_the_pipeline() {
    let engine = GraphQueryEngine::new(people_repo());
    let query = GraphQuery::new()
        .with_entity_type("Person")
        .with_filter("country", "DE")
        .with_page(2, 1);

    let result = engine.execute_query(&query).await.unwrap();
    assert_eq!(result.total_count, 3);
    assert_eq!(result.entities.len(), 2);
    assert_eq!(
        result.entities[0].get_property("name").unwrap().as_string(),
        Some("Bob")
    );
}

/// Repository double that never answers in time.
struct StalledRepository;

#[async_trait]
impl GraphRepository for StalledRepository {
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
        tokio::time::sleep(Duration::from_secs(600)).await;
        Ok(GraphQueryResult::default())
    }
}

#[tokio::test(start_paused = true)]
async fn timeouts_surface_as_errors_not_partial_results() {
    let engine = GraphQueryEngine::new(Arc::new(StalledRepository));
    let query = GraphQuery::new().with_timeout(Duration::from_millis(250));

    let err = engine.execute_query(&query).await.unwrap_err();
    assert_eq!(err, QueryError::Timeout(Duration::from_millis(250)));
}

#[tokio::test]
async fn explain_costs_grow_with_constraints() {
    let engine = GraphQueryEngine::new(people_repo());

    let narrow = GraphQuery::new().with_entity_type("Person");
    let wider = narrow.clone().with_filter("country", "DE");
    let widest = wider.clone().with_filter("name", "Alice");

    let cost_narrow = engine.explain(&narrow).estimated_cost;
    let cost_wider = engine.explain(&wider).estimated_cost;
    let cost_widest = engine.explain(&widest).estimated_cost;

    assert!(cost_wider >= cost_narrow);
    assert!(cost_widest >= cost_wider);
}
