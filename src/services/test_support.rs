//! Fakes shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::{oneshot, Notify};

use crate::external::prediction_source::{PredictionSource, PredictionSourceError};

pub(crate) type SourceResult = Result<Value, PredictionSourceError>;

pub(crate) fn bullish_payload() -> Value {
    json!({
        "currentPrice": 100,
        "predictedPrice": 110,
        "confidence": 82.5,
        "analysis": "Bullish",
        "technicalIndicators": { "rsi": 65.2, "macd": 1.23, "sma20": 98.5, "sma50": 95.0 }
    })
}

/// Replays queued responses in order, then keeps answering with the bullish payload.
pub(crate) struct ScriptedSource {
    responses: Mutex<VecDeque<SourceResult>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub(crate) fn new(responses: Vec<SourceResult>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionSource for ScriptedSource {
    async fn get_prediction(&self) -> SourceResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().pop_front();
        next.unwrap_or_else(|| Ok(bullish_payload()))
    }
}

/// Each call blocks until the test releases it through the matching sender.
pub(crate) struct ControlledSource {
    pending: Mutex<VecDeque<oneshot::Receiver<SourceResult>>>,
    calls: AtomicUsize,
    called: Notify,
}

impl ControlledSource {
    pub(crate) fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            called: Notify::new(),
        }
    }

    pub(crate) fn push_pending(&self) -> oneshot::Sender<SourceResult> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().push_back(rx);
        tx
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) async fn wait_for_calls(&self, expected: usize) {
        loop {
            let notified = self.called.notified();
            if self.calls() >= expected {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl PredictionSource for ControlledSource {
    async fn get_prediction(&self) -> SourceResult {
        let next = self.pending.lock().pop_front();
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.called.notify_waiters();

        match next {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(PredictionSourceError::Network("response dropped".into()))),
            None => Err(PredictionSourceError::Network("no response scripted".into())),
        }
    }
}
