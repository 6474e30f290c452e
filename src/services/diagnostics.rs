use parking_lot::Mutex;
use tracing::error;

use crate::errors::{AppError, ErrorKind};

/// Receives the underlying cause of a failed fetch. The user only ever sees
/// the generic message; this is where the detail goes.
pub trait DiagnosticsSink: Send + Sync {
    fn prediction_failed(&self, cause: &AppError);
}

/// Forwards failures to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn prediction_failed(&self, cause: &AppError) {
        error!(kind = ?cause.kind(), "Prediction error: {}", cause);
    }
}

/// Keeps failures in memory. Used by tests and by anything that wants to
/// inspect recent causes without a log pipeline.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: Mutex<Vec<(ErrorKind, String)>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(ErrorKind, String)> {
        self.entries.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DiagnosticsSink for RecordingDiagnostics {
    fn prediction_failed(&self, cause: &AppError) {
        self.entries.lock().push((cause.kind(), cause.to_string()));
    }
}
