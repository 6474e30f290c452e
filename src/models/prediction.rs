use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::AppError;

/// A single AI-generated price forecast as returned by the stock API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub current_price: f64,
    pub predicted_price: f64,
    pub confidence: f64, // 0-100
    pub analysis: String,
    pub technical_indicators: Option<TechnicalIndicators>,
    pub timestamp: Option<PredictionTimestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TechnicalIndicators {
    pub rsi: f64,
    pub macd: f64,
    pub sma20: f64,
    pub sma50: f64,
}

/// Generation time as sent by the API: epoch milliseconds or a date string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionTimestamp {
    EpochMillis(f64),
    Text(String),
}

impl PredictionResult {
    /// Validate a raw API payload and convert it into a typed prediction.
    ///
    /// Both prices must be finite numbers. `confidence`, `analysis`,
    /// `technicalIndicators` and `timestamp` may be absent or null, but when
    /// present they must have the right type.
    pub fn from_payload(payload: Value) -> Result<Self, AppError> {
        let obj = payload
            .as_object()
            .ok_or_else(|| invalid("payload is not an object"))?;

        let current_price = required_number(obj, "currentPrice")?;
        let predicted_price = required_number(obj, "predictedPrice")?;
        let confidence = optional_number(obj, "confidence")?.unwrap_or(0.0);

        let analysis = match obj.get("analysis") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(invalid("analysis is not a string")),
        };

        let technical_indicators = match obj.get("technicalIndicators") {
            None | Some(Value::Null) => None,
            Some(Value::Object(ind)) => Some(TechnicalIndicators {
                rsi: required_number(ind, "rsi")?,
                macd: required_number(ind, "macd")?,
                sma20: required_number(ind, "sma20")?,
                sma50: required_number(ind, "sma50")?,
            }),
            Some(_) => return Err(invalid("technicalIndicators is not an object")),
        };

        let timestamp = match obj.get("timestamp") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64().map(PredictionTimestamp::EpochMillis),
            Some(Value::String(s)) => Some(PredictionTimestamp::Text(s.clone())),
            Some(_) => return Err(invalid("timestamp is neither a number nor a string")),
        };

        Ok(Self {
            current_price,
            predicted_price,
            confidence,
            analysis,
            technical_indicators,
            timestamp,
        })
    }

    pub fn price_change(&self) -> f64 {
        self.predicted_price - self.current_price
    }

    /// Percentage move from the current price, or 0 when it cannot be computed.
    pub fn price_change_percent(&self) -> f64 {
        let percent = (self.price_change() / self.current_price) * 100.0;
        if percent.is_finite() {
            percent
        } else {
            0.0
        }
    }

    pub fn is_positive(&self) -> bool {
        self.price_change() >= 0.0
    }

    pub fn indicators(&self) -> TechnicalIndicators {
        self.technical_indicators.unwrap_or_default()
    }

    /// When the prediction was generated. Falls back to `now` if the API
    /// sent nothing (or a zero/empty value); `None` means the value was
    /// present but could not be understood as a date.
    pub fn generated_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match &self.timestamp {
            None => Some(now),
            Some(PredictionTimestamp::EpochMillis(ms)) if *ms == 0.0 => Some(now),
            Some(PredictionTimestamp::EpochMillis(ms)) => {
                if !ms.is_finite() {
                    return None;
                }
                DateTime::from_timestamp_millis(ms.trunc() as i64)
            }
            Some(PredictionTimestamp::Text(text)) if text.is_empty() => Some(now),
            Some(PredictionTimestamp::Text(text)) => parse_date_text(text),
        }
    }
}

fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn invalid(reason: &str) -> AppError {
    AppError::Validation(format!("Invalid prediction data: {}", reason))
}

fn required_number(obj: &Map<String, Value>, field: &str) -> Result<f64, AppError> {
    optional_number(obj, field)?.ok_or_else(|| invalid(&format!("{} is missing", field)))
}

fn optional_number(obj: &Map<String, Value>, field: &str) -> Result<Option<f64>, AppError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(invalid(&format!("{} is not a finite number", field))),
        },
        Some(_) => Err(invalid(&format!("{} is not a number", field))),
    }
}
