use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{health, prediction_widget};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/prediction-widget", prediction_widget::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
