//! OpenAI chat-completions backed prediction strategy

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::prediction::{PredictionError, PredictionStrategy};
use crate::config::OpenAiConfig;
use crate::forecasting::SalesSummary;
use crate::models::Weather;

const SYSTEM_PROMPT: &str = "You are a procurement assistant for a restaurant. \
Given daily sales rows (date,item,quantity) and tomorrow's weather, predict how many \
units of each item will sell tomorrow. Respond with JSON in exactly this format: \
{\"forecasts\": [{\"item\": \"string\", \"predictedQuantity\": number}]}";

pub struct OpenAiPredictionStrategy {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiPredictionStrategy {
    pub fn new(config: &OpenAiConfig, timeout: Duration) -> Result<Self, PredictionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PredictionError::Transport(e.to_string()))?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: &OpenAiConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    fn request_body(&self, summary: &SalesSummary, weather: Weather) -> Value {
        let user_prompt = format!(
            "Tomorrow's weather: {}\nSales rows ({} of {} records):\n{}",
            weather,
            summary.rows.len(),
            summary.total_records,
            summary.to_table()
        );

        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt }
            ],
            "response_format": { "type": "json_object" }
        })
    }
}

#[async_trait]
impl PredictionStrategy for OpenAiPredictionStrategy {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn predict(
        &self,
        summary: &SalesSummary,
        weather: Weather,
    ) -> Result<Value, PredictionError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(rows = summary.rows.len(), weather = %weather, "Requesting AI prediction");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(summary, weather))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PredictionError::Timeout
                } else {
                    PredictionError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictionError::from_status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PredictionError::MalformedResponse(e.to_string()))?;

        extract_forecasts(&body)
    }
}

/// Pull the `forecasts` field out of the first choice's JSON message content
fn extract_forecasts(body: &Value) -> Result<Value, PredictionError> {
    let content = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            PredictionError::MalformedResponse("missing choices[0].message.content".to_string())
        })?;

    let parsed: Value = serde_json::from_str(content)
        .map_err(|e| PredictionError::MalformedResponse(format!("content is not JSON: {}", e)))?;

    Ok(parsed.get("forecasts").cloned().unwrap_or(Value::Null))
}
