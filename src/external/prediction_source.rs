use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictionSourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Remote service producing the daily prediction.
///
/// The payload comes back untyped; shape validation happens in
/// [`crate::models::PredictionResult::from_payload`] so that a malformed body
/// is reported as a validation failure rather than a transport one.
#[async_trait]
pub trait PredictionSource: Send + Sync {
    async fn get_prediction(&self) -> Result<Value, PredictionSourceError>;
}
