use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{AppError, ErrorKind, FETCH_FAILED_MESSAGE};
use crate::external::entitlement::EntitlementSource;
use crate::external::prediction_source::PredictionSource;
use crate::models::PredictionResult;
use crate::services::diagnostics::DiagnosticsSink;

/// Component-local state of one widget instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetState {
    pub prediction: Option<PredictionResult>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Which branch the widget renders. Derived from [`WidgetState`], never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderState {
    Loading,
    Error,
    Empty,
    Shown,
}

impl WidgetState {
    pub fn render_state(&self) -> RenderState {
        if self.is_loading {
            RenderState::Loading
        } else if self.error.is_some() {
            RenderState::Error
        } else if self.prediction.is_none() {
            RenderState::Empty
        } else {
            RenderState::Shown
        }
    }
}

/// How a call to [`PredictionController::fetch_prediction`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    /// No premium access; nothing was requested and state is untouched.
    Skipped,
    Loaded,
    Failed(ErrorKind),
    /// A newer fetch was issued while this one was in flight; result dropped.
    Superseded,
    /// The widget was unmounted; nothing was applied.
    TornDown,
}

struct Inner {
    state: WidgetState,
    latest_ticket: u64,
    revision: u64,
}

/// Owns the widget state and the fetch logic for a single widget instance.
///
/// Fetches may overlap. Each one takes a ticket and only the most recently
/// issued ticket is allowed to write its result back. After
/// [`teardown`](Self::teardown) no state mutation happens at all.
pub struct PredictionController {
    id: Uuid,
    source: Arc<dyn PredictionSource>,
    entitlement: Arc<dyn EntitlementSource>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    inner: RwLock<Inner>,
    teardown: CancellationToken,
}

impl PredictionController {
    pub fn new(
        source: Arc<dyn PredictionSource>,
        entitlement: Arc<dyn EntitlementSource>,
        diagnostics: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            entitlement,
            diagnostics,
            inner: RwLock::new(Inner {
                state: WidgetState::default(),
                latest_ticket: 0,
                revision: 0,
            }),
            teardown: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn has_premium_access(&self) -> bool {
        self.entitlement.has_premium_access()
    }

    pub fn snapshot(&self) -> WidgetState {
        self.inner.read().state.clone()
    }

    /// Number of state mutations applied so far.
    pub fn revision(&self) -> u64 {
        self.inner.read().revision
    }

    pub fn is_torn_down(&self) -> bool {
        self.teardown.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.teardown.clone()
    }

    /// Stop accepting fetches and discard any response still in flight.
    pub fn teardown(&self) {
        // Taken under the write lock so no fetch can be between its
        // cancellation check and its state write.
        let _guard = self.inner.write();
        self.teardown.cancel();
    }

    pub async fn fetch_prediction(&self) -> FetchOutcome {
        if !self.entitlement.has_premium_access() {
            debug!(widget = %self.id, "No premium access, skipping prediction fetch");
            return FetchOutcome::Skipped;
        }

        let ticket = {
            let mut inner = self.inner.write();
            if self.teardown.is_cancelled() {
                return FetchOutcome::TornDown;
            }
            inner.latest_ticket += 1;
            inner.revision += 1;
            inner.state.is_loading = true;
            inner.state.error = None;
            inner.latest_ticket
        };

        debug!(widget = %self.id, ticket, "Fetching prediction");

        let result = match self.source.get_prediction().await {
            Ok(payload) => PredictionResult::from_payload(payload),
            Err(e) => Err(AppError::from(e)),
        };

        let (outcome, failure) = {
            let mut inner = self.inner.write();
            if self.teardown.is_cancelled() {
                debug!(widget = %self.id, ticket, "Widget unmounted, discarding prediction response");
                (FetchOutcome::TornDown, result.err())
            } else if inner.latest_ticket != ticket {
                debug!(
                    widget = %self.id,
                    ticket,
                    latest = inner.latest_ticket,
                    "Discarding stale prediction response"
                );
                (FetchOutcome::Superseded, result.err())
            } else {
                inner.revision += 1;
                inner.state.is_loading = false;
                match result {
                    Ok(prediction) => {
                        inner.state.prediction = Some(prediction);
                        (FetchOutcome::Loaded, None)
                    }
                    Err(e) => {
                        inner.state.error = Some(FETCH_FAILED_MESSAGE.to_string());
                        (FetchOutcome::Failed(e.kind()), Some(e))
                    }
                }
            }
        };

        // Causes are reported even when the response itself was discarded.
        if let Some(e) = &failure {
            self.diagnostics.prediction_failed(e);
        } else if outcome == FetchOutcome::Loaded {
            info!(widget = %self.id, "✅ Prediction updated");
        }

        outcome
    }
}
