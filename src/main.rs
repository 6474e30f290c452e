use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use prediction_widget::app;
use prediction_widget::config::WidgetConfig;
use prediction_widget::external::entitlement::StaticEntitlement;
use prediction_widget::external::http_prediction::HttpPredictionSource;
use prediction_widget::logging::{init_logging, LoggingConfig};
use prediction_widget::services::diagnostics::TracingDiagnostics;
use prediction_widget::services::prediction_controller::PredictionController;
use prediction_widget::services::view_renderer::DisplayOptions;
use prediction_widget::services::widget_scheduler::WidgetScheduler;
use prediction_widget::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let config = WidgetConfig::from_env()?;

    let source = HttpPredictionSource::from_config(&config)
        .context("Failed to create prediction HTTP client")?;
    info!("📊 Using prediction source: {}", config.prediction_api_url);

    let controller = Arc::new(PredictionController::new(
        Arc::new(source),
        Arc::new(StaticEntitlement::new(config.premium_access)),
        Arc::new(TracingDiagnostics),
    ));
    if !config.premium_access {
        info!("🔒 Premium access disabled, widget will stay gated");
    }

    let widget = Arc::new(
        WidgetScheduler::new(config.refresh_interval)
            .mount(controller, DisplayOptions::from_config(&config)),
    );

    let app = app::create_app(AppState {
        widget: widget.clone(),
    });

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🚀 Prediction widget service running at http://{}/", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match Arc::try_unwrap(widget) {
        Ok(widget) => widget.unmount().await,
        Err(widget) => widget.controller().teardown(),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received");
}
