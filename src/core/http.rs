//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::db::PgDatabase;
use crate::error::DomainError;
use crate::indicators::weekly::{compute_weekly_indicators, WeeklyFilter};
use crate::metrics::Metrics;
use crate::models::flock::Flock;
use crate::models::guide::{GuideReference, GuideRow};
use crate::models::indicators::WeeklyIndicatorReport;
use crate::models::production::DailyProductionRecord;
use crate::services::repository::{DailyRecordRepository, FlockRepository};
use crate::services::{GuideService, ProductionIndicatorService};
use crate::tenant::TenantContext;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub indicators: Option<Arc<ProductionIndicatorService>>,
    pub guides: Option<Arc<GuideService>>,
    pub flocks: Option<Arc<dyn FlockRepository>>,
    pub records: Option<Arc<dyn DailyRecordRepository>>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "ovotrix-indicator-engine"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// Resolve the tenant from the `x-company-id` header. Tenancy is always an
/// explicit parameter from here down.
fn tenant_from_headers(headers: &HeaderMap) -> Result<TenantContext, StatusCode> {
    headers
        .get("x-company-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(TenantContext::new)
        .ok_or(StatusCode::BAD_REQUEST)
}

fn status_for(e: &DomainError) -> StatusCode {
    match e {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::NotConfigured(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateFlockRequest {
    name: String,
    breed: String,
    guide_year: String,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    initial_female_count: i64,
    #[serde(default)]
    initial_male_count: i64,
}

async fn create_flock(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateFlockRequest>,
) -> Result<Json<Flock>, StatusCode> {
    let ctx = tenant_from_headers(&headers)?;
    let repo = state.flocks.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let mut flock = Flock {
        id: None,
        company_id: ctx.company_id,
        name: request.name,
        breed: request.breed,
        guide_year: request.guide_year,
        start_date: request.start_date,
        initial_female_count: request.initial_female_count,
        initial_male_count: request.initial_male_count,
    };
    let id = repo.create_flock(&ctx, &flock).await.map_err(|e| {
        error!(error = %e, "Failed to create flock");
        status_for(&e)
    })?;
    flock.id = Some(id);
    Ok(Json(flock))
}

async fn get_flock(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Flock>, StatusCode> {
    let ctx = tenant_from_headers(&headers)?;
    let repo = state.flocks.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let flock = repo
        .get_flock(&ctx, id)
        .await
        .map_err(|e| {
            error!(error = %e, flock_id = id, "Failed to load flock");
            status_for(&e)
        })?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(flock))
}

#[derive(Debug, Deserialize)]
struct DateRangeQuery {
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

async fn list_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(flock_id): Path<i64>,
    Query(params): Query<DateRangeQuery>,
) -> Result<Json<Vec<DailyProductionRecord>>, StatusCode> {
    let ctx = tenant_from_headers(&headers)?;
    let repo = state
        .records
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let records = repo
        .get_records(&ctx, flock_id, params.date_from, params.date_to)
        .await
        .map_err(|e| {
            error!(error = %e, flock_id = flock_id, "Failed to load daily records");
            status_for(&e)
        })?;
    Ok(Json(records))
}

async fn create_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(flock_id): Path<i64>,
    Json(mut record): Json<DailyProductionRecord>,
) -> Result<Json<DailyProductionRecord>, StatusCode> {
    let ctx = tenant_from_headers(&headers)?;
    let repo = state
        .records
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    record.flock_id = flock_id;
    record.company_id = ctx.company_id;
    record.id = None;
    let id = repo.insert_record(&ctx, &record).await.map_err(|e| {
        error!(error = %e, flock_id = flock_id, "Failed to insert daily record");
        status_for(&e)
    })?;
    record.id = Some(id);
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
struct WeeklyQuery {
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    week_from: Option<u32>,
    week_to: Option<u32>,
}

impl From<WeeklyQuery> for WeeklyFilter {
    fn from(q: WeeklyQuery) -> Self {
        Self {
            date_from: q.date_from,
            date_to: q.date_to,
            week_from: q.week_from,
            week_to: q.week_to,
        }
    }
}

/// Weekly indicators for one flock, compared against its genetic guide
async fn weekly_indicators(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(flock_id): Path<i64>,
    Query(params): Query<WeeklyQuery>,
) -> Result<Json<WeeklyIndicatorReport>, StatusCode> {
    let ctx = tenant_from_headers(&headers)?;
    let service = state
        .indicators
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let report = service
        .compute_weekly(&ctx, flock_id, &params.into())
        .await
        .map_err(|e| {
            error!(error = %e, flock_id = flock_id, "Failed to compute weekly indicators");
            status_for(&e)
        })?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
struct PreviewRequest {
    flock: Flock,
    #[serde(default)]
    records: Vec<DailyProductionRecord>,
    #[serde(default)]
    guide_rows: Vec<GuideRow>,
    week_from: Option<u32>,
    week_to: Option<u32>,
}

/// Stateless weekly computation over an inline payload. Nothing is loaded or
/// persisted; useful for what-if runs and imports not yet committed.
async fn preview_weekly_indicators(
    headers: HeaderMap,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<WeeklyIndicatorReport>, StatusCode> {
    tenant_from_headers(&headers)?;
    let filter = WeeklyFilter {
        week_from: request.week_from,
        week_to: request.week_to,
        ..Default::default()
    };
    let report =
        compute_weekly_indicators(&request.flock, &request.records, &request.guide_rows, &filter)
            .map_err(|e| status_for(&e))?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
struct GuideLookupQuery {
    breed: String,
    year: String,
    age: u32,
}

async fn guide_lookup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<GuideLookupQuery>,
) -> Result<Json<GuideReference>, StatusCode> {
    let ctx = tenant_from_headers(&headers)?;
    let service = state.guides.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let reference = service
        .lookup(&ctx, &params.breed, &params.year, params.age)
        .await
        .map_err(|e| status_for(&e))?;
    Ok(Json(reference))
}

#[derive(Debug, Deserialize)]
struct GuideRangeQuery {
    breed: String,
    year: String,
    age_from: u32,
    age_to: u32,
    #[serde(default)]
    production_only: bool,
}

async fn guide_range(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<GuideRangeQuery>,
) -> Result<Json<Vec<GuideReference>>, StatusCode> {
    let ctx = tenant_from_headers(&headers)?;
    let service = state.guides.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let references = service
        .range(
            &ctx,
            &params.breed,
            &params.year,
            params.age_from,
            params.age_to,
            params.production_only,
        )
        .await
        .map_err(|e| status_for(&e))?;
    Ok(Json(references))
}

async fn create_guide_row(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut row): Json<GuideRow>,
) -> Result<Json<GuideRow>, StatusCode> {
    let ctx = tenant_from_headers(&headers)?;
    let service = state.guides.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    row.id = None;
    let saved = service.save(&ctx, row).await.map_err(|e| {
        error!(error = %e, "Failed to save guide row");
        status_for(&e)
    })?;
    Ok(Json(saved))
}

async fn update_guide_row(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(mut row): Json<GuideRow>,
) -> Result<Json<GuideRow>, StatusCode> {
    let ctx = tenant_from_headers(&headers)?;
    let service = state.guides.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    row.id = Some(id);
    let saved = service.save(&ctx, row).await.map_err(|e| {
        error!(error = %e, guide_row_id = id, "Failed to update guide row");
        status_for(&e)
    })?;
    Ok(Json(saved))
}

async fn get_guide_row(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<GuideRow>, StatusCode> {
    let ctx = tenant_from_headers(&headers)?;
    let service = state.guides.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let row = service.get(&ctx, id).await.map_err(|e| status_for(&e))?;
    Ok(Json(row))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/flocks", post(create_flock))
        .route("/api/flocks/{id}", get(get_flock))
        .route(
            "/api/flocks/{id}/records",
            get(list_records).post(create_record),
        )
        .route("/api/flocks/{id}/indicators/weekly", get(weekly_indicators))
        .route(
            "/api/indicators/weekly/preview",
            post(preview_weekly_indicators),
        )
        .route("/api/guides/lookup", get(guide_lookup))
        .route("/api/guides/range", get(guide_range))
        .route("/api/guides", post(create_guide_row))
        .route(
            "/api/guides/{id}",
            get(get_guide_row).put(update_guide_row),
        )
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let start_time = Arc::new(Instant::now());

    // Database is optional at startup: health and preview endpoints work
    // without it, everything else answers 503
    let state = match PgDatabase::new().await {
        Ok(db) => {
            info!("PostgreSQL connected for API server");
            let db = Arc::new(db);
            let flocks: Arc<dyn FlockRepository> = db.clone();
            let records: Arc<dyn DailyRecordRepository> = db.clone();
            let indicators = Arc::new(ProductionIndicatorService::new(
                flocks.clone(),
                records.clone(),
                db.clone(),
                Some(metrics.clone()),
            ));
            let guides = Arc::new(GuideService::new(db.clone(), Some(metrics.clone())));
            AppState {
                health: Arc::new(RwLock::new(HealthStatus::default())),
                metrics: metrics.clone(),
                start_time: start_time.clone(),
                indicators: Some(indicators),
                guides: Some(guides),
                flocks: Some(flocks),
                records: Some(records),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to connect to PostgreSQL - data endpoints will be unavailable");
            AppState {
                health: Arc::new(RwLock::new(HealthStatus::default())),
                metrics: metrics.clone(),
                start_time: start_time.clone(),
                indicators: None,
                guides: None,
                flocks: None,
                records: None,
            }
        }
    };

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
