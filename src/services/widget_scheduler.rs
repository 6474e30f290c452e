use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::WidgetView;
use crate::services::prediction_controller::{FetchOutcome, PredictionController, WidgetState};
use crate::services::view_renderer::{render_widget, DisplayOptions};

/// Mounts widgets: fetch once right away, then again on every interval tick.
#[derive(Debug, Clone)]
pub struct WidgetScheduler {
    refresh_interval: Duration,
}

impl WidgetScheduler {
    pub fn new(refresh_interval: Duration) -> Self {
        Self { refresh_interval }
    }

    /// Start the refresh loop for `controller`. Must be called inside a tokio runtime.
    pub fn mount(&self, controller: Arc<PredictionController>, display: DisplayOptions) -> MountedWidget {
        let token = controller.cancellation_token();
        let refresh_interval = self.refresh_interval;
        let widget_id = controller.id();

        info!(
            widget = %widget_id,
            "📅 Mounting prediction widget (refresh every {}s)",
            refresh_interval.as_secs()
        );

        let task = {
            let controller = controller.clone();
            let token = token.clone();
            tokio::spawn(async move {
                // The first tick completes immediately, which gives the on-mount fetch.
                let mut ticker = tokio::time::interval(refresh_interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        _ = ticker.tick() => {
                            // Fetches run detached so a slow one never delays the next tick.
                            let controller = controller.clone();
                            tokio::spawn(async move {
                                let outcome = controller.fetch_prediction().await;
                                debug!(widget = %controller.id(), ?outcome, "Scheduled prediction fetch finished");
                            });
                        }
                    }
                }

                debug!(widget = %widget_id, "Refresh loop stopped");
            })
        };

        MountedWidget {
            controller,
            display,
            token,
            task: Some(task),
        }
    }
}

/// Handle to a mounted widget. Dropping it tears the widget down.
pub struct MountedWidget {
    controller: Arc<PredictionController>,
    display: DisplayOptions,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MountedWidget {
    pub fn controller(&self) -> &Arc<PredictionController> {
        &self.controller
    }

    pub fn state(&self) -> WidgetState {
        self.controller.snapshot()
    }

    pub fn view(&self) -> WidgetView {
        render_widget(
            &self.controller.snapshot(),
            self.controller.has_premium_access(),
            &self.display,
            Utc::now(),
        )
    }

    /// The manual Retry / Generate / Refresh action.
    pub async fn refresh(&self) -> Result<FetchOutcome, AppError> {
        if self.controller.is_torn_down() {
            return Err(AppError::Gone);
        }
        if !self.controller.has_premium_access() {
            return Err(AppError::Forbidden);
        }
        Ok(self.controller.fetch_prediction().await)
    }

    pub fn is_mounted(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Cancel the refresh loop and wait for it to exit. In-flight fetches
    /// are left to finish; their responses are discarded.
    pub async fn unmount(mut self) {
        self.controller.teardown();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!(widget = %self.controller.id(), "🛑 Prediction widget unmounted");
    }
}

impl Drop for MountedWidget {
    fn drop(&mut self) {
        if !self.token.is_cancelled() {
            self.controller.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::entitlement::StaticEntitlement;
    use crate::services::diagnostics::RecordingDiagnostics;
    use crate::services::prediction_controller::RenderState;
    use crate::services::test_support::{ControlledSource, ScriptedSource};

    const HOUR: Duration = Duration::from_secs(3600);

    fn mount_with(
        source: Arc<dyn crate::external::prediction_source::PredictionSource>,
        premium: bool,
    ) -> MountedWidget {
        let controller = Arc::new(PredictionController::new(
            source,
            Arc::new(StaticEntitlement::new(premium)),
            Arc::new(RecordingDiagnostics::new()),
        ));
        WidgetScheduler::new(HOUR).mount(controller, DisplayOptions::default())
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_on_mount_and_every_interval() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let widget = mount_with(source.clone(), true);

        settle().await;
        assert_eq!(source.calls(), 1);
        assert_eq!(widget.state().render_state(), RenderState::Shown);

        tokio::time::advance(HOUR).await;
        settle().await;
        assert_eq!(source.calls(), 2);

        tokio::time::advance(HOUR).await;
        settle().await;
        assert_eq!(source.calls(), 3);

        widget.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fetch_after_unmount() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let widget = mount_with(source.clone(), true);
        settle().await;
        assert_eq!(source.calls(), 1);

        let controller = widget.controller().clone();
        let revision = controller.revision();
        widget.unmount().await;

        tokio::time::advance(HOUR * 3).await;
        settle().await;

        assert_eq!(source.calls(), 1);
        assert_eq!(controller.revision(), revision);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_tears_down() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let widget = mount_with(source.clone(), true);
        settle().await;
        let controller = widget.controller().clone();

        drop(widget);
        assert!(controller.is_torn_down());

        tokio::time::advance(HOUR * 2).await;
        settle().await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_fires_while_previous_fetch_pending() {
        let source = Arc::new(ControlledSource::new());
        let _first = source.push_pending();
        let _second = source.push_pending();
        let widget = mount_with(source.clone(), true);

        source.wait_for_calls(1).await;
        tokio::time::advance(HOUR).await;
        source.wait_for_calls(2).await;

        assert_eq!(source.calls(), 2);
        assert_eq!(widget.state().render_state(), RenderState::Loading);
        widget.unmount().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_premium_access_never_fetches() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let widget = mount_with(source.clone(), false);

        settle().await;
        tokio::time::advance(HOUR).await;
        settle().await;

        assert_eq!(source.calls(), 0);
        assert_eq!(widget.state(), WidgetState::default());
        assert!(matches!(widget.refresh().await, Err(AppError::Forbidden)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let widget = mount_with(source.clone(), true);
        settle().await;
        assert_eq!(source.calls(), 1);

        let outcome = widget.refresh().await.unwrap();
        assert_eq!(outcome, FetchOutcome::Loaded);
        assert_eq!(source.calls(), 2);
        assert!(widget.is_mounted());
        widget.unmount().await;
    }
}
