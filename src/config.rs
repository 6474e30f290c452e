use std::net::SocketAddr;
use std::time::Duration;

use chrono_tz::Tz;

use crate::errors::AppError;

/// Hourly refresh, matching the cadence the widget was designed for.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub prediction_api_url: String,
    pub request_timeout: Duration,
    pub refresh_interval: Duration,
    pub premium_access: bool,
    pub currency_symbol: String,
    pub display_timezone: Tz,
    pub bind_addr: SocketAddr,
}

impl WidgetConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prediction_api_url = lookup("PREDICTION_API_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::Config("PREDICTION_API_URL is not set".to_string()))?;

        let request_timeout_secs = parse_or(
            &lookup,
            "PREDICTION_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let refresh_interval_secs = parse_or(
            &lookup,
            "PREDICTION_REFRESH_INTERVAL_SECS",
            DEFAULT_REFRESH_INTERVAL_SECS,
        )?;
        if refresh_interval_secs == 0 {
            return Err(AppError::Config(
                "PREDICTION_REFRESH_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        let premium_access = parse_or(&lookup, "PREMIUM_ACCESS", false)?;

        let currency_symbol = lookup("CURRENCY_SYMBOL")
            .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());

        let display_timezone = lookup("DISPLAY_TIMEZONE")
            .unwrap_or_else(|| "UTC".to_string())
            .parse::<Tz>()
            .map_err(|e| AppError::Config(format!("DISPLAY_TIMEZONE is invalid: {}", e)))?;

        let bind_addr = parse_or(
            &lookup,
            "BIND_ADDR",
            SocketAddr::from(([0, 0, 0, 0], 3000)),
        )?;

        Ok(Self {
            prediction_api_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            refresh_interval: Duration::from_secs(refresh_interval_secs),
            premium_access,
            currency_symbol,
            display_timezone,
            bind_addr,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::Config(format!("{} is invalid ({}): {}", key, raw, e))),
        None => Ok(default),
    }
}
