use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::AppError;

/// Stream label that separates widget logs from the rest of the service's in Loki.
pub const COMPONENT_LABEL: &str = "prediction-widget";

/// Applied when `RUST_LOG` is unset. Keeps HTTP client chatter out of the
/// per-tick fetch logs.
const DEFAULT_DIRECTIVES: &str = "info,hyper=warn,reqwest=warn";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            loki_enabled: std::env::var("LOKI_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            loki_url: std::env::var("LOKI_URL").ok(),
            service_name: std::env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "prediction-widget".to_string()),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| DEFAULT_DIRECTIVES.to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !self.loki_enabled {
            return Ok(());
        }
        let loki_url = self
            .loki_url
            .as_deref()
            .ok_or_else(|| AppError::Config("LOKI_ENABLED is true but LOKI_URL is not set".to_string()))?;
        url::Url::parse(loki_url)
            .map_err(|e| AppError::Config(format!("LOKI_URL is invalid ({}): {}", loki_url, e)))?;
        Ok(())
    }

    /// Labels attached to every log stream shipped to Loki.
    pub fn loki_labels(&self) -> Vec<(&'static str, String)> {
        vec![
            ("service", self.service_name.clone()),
            ("environment", self.environment.clone()),
            ("component", COMPONENT_LABEL.to_string()),
        ]
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
    }
}

pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    #[cfg(feature = "loki")]
    {
        if config.loki_enabled {
            if let Some(loki_url) = config.loki_url.clone() {
                return init_with_loki(config, &loki_url);
            }
        }
    }

    init_console_only(config)
}

fn init_console_only(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::info!("📊 Console logging initialized for {}", config.service_name);
    Ok(())
}

#[cfg(feature = "loki")]
fn init_with_loki(config: LoggingConfig, loki_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = url::Url::parse(loki_url)?;

    let mut builder = tracing_loki::builder();
    for (key, value) in config.loki_labels() {
        builder = builder.label(key, value)?;
    }
    let (loki_layer, task) = builder.build_url(url)?;

    // Ships buffered log lines to Loki in the background
    tokio::spawn(task);

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(tracing_subscriber::fmt::layer())
        .with(loki_layer)
        .try_init()?;

    tracing::info!("✅ Loki logging initialized at {}", loki_url);

    Ok(())
}
