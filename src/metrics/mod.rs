//! Prometheus metrics for the HTTP surface and the forecasting pipeline

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: Gauge,
    pub forecasts_generated_total: IntCounterVec,
    pub prediction_fallbacks_total: IntCounterVec,
    pub database_connected: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight =
            Gauge::new("http_requests_in_flight", "HTTP requests currently being served")?;
        let forecasts_generated_total = IntCounterVec::new(
            Opts::new(
                "forecasts_generated_total",
                "Item forecasts produced, by forecasting method",
            ),
            &["method"],
        )?;
        let prediction_fallbacks_total = IntCounterVec::new(
            Opts::new(
                "prediction_fallbacks_total",
                "AI prediction attempts that fell back to statistics, by reason",
            ),
            &["reason"],
        )?;
        let database_connected =
            Gauge::new("database_connected", "1 when the Postgres backend is in use")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(forecasts_generated_total.clone()))?;
        registry.register(Box::new(prediction_fallbacks_total.clone()))?;
        registry.register(Box::new(database_connected.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            forecasts_generated_total,
            prediction_fallbacks_total,
            database_connected,
        })
    }

    /// Render all metrics in the Prometheus text format
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
