//! HTTP endpoint server using Axum

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::config::Config;
use crate::db::{Storage, StorageBackend};
use crate::forecasting::{ForecastError, ForecastOrchestrator, ForecastPersister, OrchestratorConfig};
use crate::metrics::Metrics;
use crate::models::{NewSalesRecord, SalesReport, Weather};
use crate::services::OpenAiPredictionStrategy;

const DEFAULT_SALES_LIMIT: usize = 100;
const DEFAULT_FORECAST_LIMIT: usize = 50;
const REPORT_SALES_LIMIT: usize = 1000;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub storage: Storage,
    pub orchestrator: Arc<ForecastOrchestrator>,
    pub persister: Arc<ForecastPersister>,
    pub sales_history_limit: usize,
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

impl AppState {
    pub fn new(
        storage: Storage,
        orchestrator: ForecastOrchestrator,
        persister: ForecastPersister,
        metrics: Arc<Metrics>,
        sales_history_limit: usize,
    ) -> Self {
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            storage,
            orchestrator: Arc::new(orchestrator),
            persister: Arc::new(persister),
            sales_history_limit,
        }
    }

    /// Wire storage, forecasting strategies and metrics from configuration
    pub async fn from_config(config: &Config) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let metrics = Arc::new(
            Metrics::new().map_err(|e| format!("Failed to initialize metrics: {}", e))?,
        );
        let storage = Storage::from_config(config).await?;
        if storage.backend == StorageBackend::Postgres {
            metrics.database_connected.set(1.0);
        }

        let mut orchestrator =
            ForecastOrchestrator::new(OrchestratorConfig::from(config)).with_metrics(metrics.clone());
        match &config.openai {
            Some(openai) => {
                let strategy = OpenAiPredictionStrategy::new(openai, config.prediction_timeout)?;
                orchestrator = orchestrator.with_primary(Arc::new(strategy));
                info!(model = %openai.model, "AI forecasting enabled");
            }
            None => warn!("OPENAI_API_KEY not set; forecasts will use the statistical method only"),
        }

        let persister = ForecastPersister::new(storage.forecasts.clone(), config.confidence_mode);

        Ok(Self::new(
            storage,
            orchestrator,
            persister,
            metrics,
            config.sales_history_limit,
        ))
    }
}

type ApiError = (StatusCode, Json<Value>);
type ApiResult = Result<Json<Value>, ApiError>;

fn api_error(status: StatusCode, error: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(json!({ "error": error, "message": message.into() })),
    )
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "stockcast-forecaster",
        "storage": state.storage.backend.as_str(),
        "ai_enabled": state.orchestrator.has_primary(),
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
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateRangeQuery {
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    weather: Weather,
}

/// Append validated sales records
async fn import_sales(
    State(state): State<AppState>,
    payload: Result<Json<Vec<NewSalesRecord>>, JsonRejection>,
) -> ApiResult {
    let Json(records) = payload.map_err(|rejection| {
        api_error(StatusCode::BAD_REQUEST, "Invalid sales record", rejection.body_text())
    })?;
    if let Err(e) = records.iter().try_for_each(NewSalesRecord::validate) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid sales record", e.to_string()));
    }

    let inserted = state.storage.sales.insert_sales(records).await.map_err(|e| {
        error!(error = %e, "Failed to store sales records");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store sales data", e.to_string())
    })?;

    info!(count = inserted.len(), "Imported {} sales records", inserted.len());
    Ok(Json(json!({
        "success": true,
        "inserted": inserted.len(),
        "records": inserted,
    })))
}

async fn list_sales(State(state): State<AppState>, Query(params): Query<LimitQuery>) -> ApiResult {
    let limit = params.limit.unwrap_or(DEFAULT_SALES_LIMIT);
    let records = state.storage.sales.get_recent_sales(limit).await.map_err(|e| {
        error!(error = %e, "Failed to load sales data");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to retrieve sales data", e.to_string())
    })?;

    Ok(Json(json!({
        "success": true,
        "count": records.len(),
        "records": records,
    })))
}

async fn sales_in_range(
    State(state): State<AppState>,
    Query(params): Query<DateRangeQuery>,
) -> ApiResult {
    if params.start_date > params.end_date {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Invalid date range",
            "startDate must not be after endDate",
        ));
    }

    let records = state
        .storage
        .sales
        .get_sales_by_date_range(params.start_date, params.end_date)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load sales data by range");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to retrieve sales data", e.to_string())
        })?;

    Ok(Json(json!({
        "success": true,
        "count": records.len(),
        "records": records,
    })))
}

/// Totals and top items/suppliers by value over the newest sales
async fn sales_summary(State(state): State<AppState>) -> ApiResult {
    let records = state
        .storage
        .sales
        .get_recent_sales(REPORT_SALES_LIMIT)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load sales data for summary");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate sales summary",
                e.to_string(),
            )
        })?;

    let report = SalesReport::from_records(&records);
    serde_json::to_value(report).map(Json).map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate sales summary",
            e.to_string(),
        )
    })
}

/// Forecast tomorrow's demand for every item and store the forecasts
async fn generate_forecasts(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let request: GenerateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        GenerateRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            api_error(StatusCode::BAD_REQUEST, "Invalid request parameters", e.to_string())
        })?
    };
    let weather = request.weather;

    let sales = state
        .storage
        .sales
        .get_recent_sales(state.sales_history_limit)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load sales data for forecasting");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate forecasts", e.to_string())
        })?;

    let results = state
        .orchestrator
        .generate_forecasts(&sales, weather)
        .await
        .map_err(|e| match e {
            ForecastError::NoSalesData => api_error(
                StatusCode::BAD_REQUEST,
                "No sales data available for forecasting",
                "Please upload sales data first before generating forecasts",
            ),
        })?;

    let forecasts = state
        .persister
        .persist(&results, &sales, weather)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to store forecasts");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate forecasts", e.to_string())
        })?;

    info!(
        count = forecasts.len(),
        weather = %weather,
        data_points = sales.len(),
        "Generated {} next-day forecasts",
        forecasts.len()
    );

    Ok(Json(json!({
        "success": true,
        "message": format!("Generated {} next-day forecasts", forecasts.len()),
        "forecasts": forecasts,
        "forecastPeriod": 1,
        "forecastType": "daily",
        "weather": weather,
        "dataPointsUsed": sales.len(),
    })))
}

async fn list_forecasts(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> ApiResult {
    let limit = params.limit.unwrap_or(DEFAULT_FORECAST_LIMIT);
    let forecasts = state
        .storage
        .forecasts
        .get_recent_forecasts(limit)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load forecasts");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to retrieve forecasts", e.to_string())
        })?;

    let weather = forecasts
        .first()
        .map(|f| f.based_on_data.weather)
        .unwrap_or_default();

    Ok(Json(json!({
        "success": true,
        "forecasts": forecasts,
        "weather": weather,
        "count": forecasts.len(),
    })))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/sales-data", get(list_sales).post(import_sales))
        .route("/api/sales-data/range", get(sales_in_range))
        .route("/api/sales-data/summary", get(sales_summary))
        .route("/api/forecasts", get(list_forecasts))
        .route("/api/forecasts/generate", post(generate_forecasts))
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

pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = AppState::from_config(&config).await?;
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "HTTP server listening on port {}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
