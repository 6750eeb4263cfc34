//! Test utilities for API server integration tests

use axum_test::TestServer;
use ovotrix::core::http::{create_router, AppState, HealthStatus};
use ovotrix::metrics::Metrics;
use ovotrix::services::{
    DailyRecordRepository, FlockRepository, GuideService, InMemoryStore,
    ProductionIndicatorService,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Test helper for API server integration tests, backed by an in-memory
/// store so the full flock/record/guide flow runs without Postgres.
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub metrics: Arc<Metrics>,
}

impl TestApiServer {
    pub async fn new() -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let store = Arc::new(InMemoryStore::new());

        let flocks: Arc<dyn FlockRepository> = store.clone();
        let records: Arc<dyn DailyRecordRepository> = store.clone();
        let indicators = Arc::new(ProductionIndicatorService::new(
            flocks.clone(),
            records.clone(),
            store.clone(),
            Some(metrics.clone()),
        ));
        let guides = Arc::new(GuideService::new(store.clone(), Some(metrics.clone())));

        let state = AppState {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
            indicators: Some(indicators),
            guides: Some(guides),
            flocks: Some(flocks),
            records: Some(records),
        };

        let app = create_router(state);
        let server = TestServer::new(app).expect("start test server");

        Self { server, metrics }
    }

    /// Server without backing services, as when the database is unreachable.
    pub async fn without_services() -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let state = AppState {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
            indicators: None,
            guides: None,
            flocks: None,
            records: None,
        };

        let app = create_router(state);
        let server = TestServer::new(app).expect("start test server");

        Self { server, metrics }
    }
}
