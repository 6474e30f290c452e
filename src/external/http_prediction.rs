use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::WidgetConfig;
use crate::external::prediction_source::{PredictionSource, PredictionSourceError};

/// Pulls the daily prediction from the stock API over HTTP.
pub struct HttpPredictionSource {
    client: Client,
    url: String,
}

impl HttpPredictionSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PredictionSourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PredictionSourceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &WidgetConfig) -> Result<Self, PredictionSourceError> {
        Self::new(config.prediction_api_url.clone(), config.request_timeout)
    }
}

#[async_trait]
impl PredictionSource for HttpPredictionSource {
    async fn get_prediction(&self) -> Result<Value, PredictionSourceError> {
        debug!("Requesting prediction from {}", self.url);

        let resp = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| PredictionSourceError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PredictionSourceError::BadResponse(format!(
                "prediction API returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| PredictionSourceError::Parse(e.to_string()))?;

        Ok(body)
    }
}
