//! External prediction strategy interface.

use async_trait::async_trait;
use serde_json::Value;

use crate::forecasting::SalesSummary;
use crate::models::Weather;

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("prediction service rejected credentials (status {0})")]
    Unauthorized(u16),
    #[error("prediction service rate limited the request")]
    RateLimited,
    #[error("prediction service failed with status {0}")]
    Server(u16),
    #[error("prediction request timed out")]
    Timeout,
    #[error("prediction transport error: {0}")]
    Transport(String),
    #[error("prediction response was malformed: {0}")]
    MalformedResponse(String),
    #[error("unexpected prediction response status {0}")]
    Unexpected(u16),
}

impl PredictionError {
    /// Coarse failure class used in logs and metrics
    pub fn class(&self) -> &'static str {
        match self {
            PredictionError::Unauthorized(_) => "auth",
            PredictionError::RateLimited => "rate_limit",
            PredictionError::Server(_) => "server_error",
            PredictionError::Timeout => "timeout",
            PredictionError::Transport(_)
            | PredictionError::MalformedResponse(_)
            | PredictionError::Unexpected(_) => "unknown",
        }
    }

    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => PredictionError::Unauthorized(status),
            429 => PredictionError::RateLimited,
            500..=599 => PredictionError::Server(status),
            other => PredictionError::Unexpected(other),
        }
    }
}

/// A higher-priority forecasting strategy backed by an external service.
///
/// Returns the raw prediction payload; shape checking happens in the orchestrator.
#[async_trait]
pub trait PredictionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn predict(&self, summary: &SalesSummary, weather: Weather)
        -> Result<Value, PredictionError>;
}
