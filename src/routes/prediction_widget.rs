use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::models::WidgetView;
use crate::services::prediction_controller::FetchOutcome;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_widget))
        .route("/refresh", post(refresh_widget))
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub outcome: FetchOutcome,
    pub view: WidgetView,
}

pub async fn get_widget(State(state): State<AppState>) -> Json<WidgetView> {
    info!("GET /api/prediction-widget - Rendering widget");
    let view = state.widget.view();
    debug!("Rendered widget:\n{}", view);
    Json(view)
}

pub async fn refresh_widget(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    info!("POST /api/prediction-widget/refresh - Manual prediction refresh");
    let outcome = state.widget.refresh().await.map_err(|e| {
        warn!("Manual refresh rejected: {}", e);
        e
    })?;

    Ok(Json(RefreshResponse {
        outcome,
        view: state.widget.view(),
    }))
}
