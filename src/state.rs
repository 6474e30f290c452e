use std::sync::Arc;

use crate::services::widget_scheduler::MountedWidget;

#[derive(Clone)]
pub struct AppState {
    pub widget: Arc<MountedWidget>,
}
