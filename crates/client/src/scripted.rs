//! A [`PredictionClient`] that answers from queued responses.
//!
//! Each call pops the next scripted response for its operation. Calls are
//! counted and submitted requests are captured, so tests can assert that
//! a guarded submit never reached the client. Optional gates hold a call
//! open until released, which lets tests interleave a second submit or a
//! session teardown with an in-flight request.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use homeval_interchange::{PredictionReceipt, PredictionRecord, PredictionRequest, RecordId};
use tokio::sync::Notify;

use crate::error::{ClientError, FailureReason};
use crate::PredictionClient;

#[derive(Default)]
pub struct ScriptedClient {
    predictions: Mutex<VecDeque<Result<PredictionReceipt, ClientError>>>,
    histories: Mutex<VecDeque<Result<Vec<PredictionRecord>, ClientError>>>,
    requests: Mutex<Vec<PredictionRequest>>,
    submit_calls: AtomicUsize,
    history_calls: AtomicUsize,
    submit_gate: Option<Arc<Notify>>,
    history_gate: Option<Arc<Notify>>,
}

/// Recover the queue even if a panicking test thread poisoned the lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful prediction with the given server fields.
    pub fn with_receipt(self, id: impl Into<RecordId>, price: f64, created_at: &str) -> Self {
        self.push_prediction(Ok(PredictionReceipt {
            id: id.into(),
            predicted_price: price,
            created_at: created_at.to_string(),
        }));
        self
    }

    /// Queue a failed prediction answered with `status`.
    pub fn with_prediction_status(self, status: u16) -> Self {
        self.push_prediction(Err(ClientError::PredictionFailed {
            reason: FailureReason::Status { status },
        }));
        self
    }

    /// Queue a successful history fetch.
    pub fn with_history(self, records: Vec<PredictionRecord>) -> Self {
        self.push_history(Ok(records));
        self
    }

    /// Queue a failed history fetch answered with `status`.
    pub fn with_history_status(self, status: u16) -> Self {
        self.push_history(Err(ClientError::HistoryFetchFailed {
            reason: FailureReason::Status { status },
        }));
        self
    }

    pub fn push_prediction(&self, response: Result<PredictionReceipt, ClientError>) {
        lock(&self.predictions).push_back(response);
    }

    pub fn push_history(&self, response: Result<Vec<PredictionRecord>, ClientError>) {
        lock(&self.histories).push_back(response);
    }

    /// Hold every `submit_prediction` call until the returned handle is
    /// notified (one `notify_one` releases one call).
    pub fn gate_submissions(&mut self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.submit_gate = Some(gate.clone());
        gate
    }

    /// Hold every `fetch_history` call until the returned handle is notified.
    pub fn gate_history(&mut self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.history_gate = Some(gate.clone());
        gate
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    /// Every request passed to `submit_prediction`, in call order.
    pub fn requests(&self) -> Vec<PredictionRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl PredictionClient for ScriptedClient {
    async fn submit_prediction(
        &self,
        square_footage: f64,
        bedrooms: u32,
    ) -> Result<PredictionRecord, ClientError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let request = PredictionRequest {
            square_footage,
            bedrooms,
        };
        lock(&self.requests).push(request);

        if let Some(gate) = &self.submit_gate {
            gate.notified().await;
        }

        let next = lock(&self.predictions).pop_front();
        match next {
            Some(Ok(receipt)) => Ok(receipt.into_record(&request)),
            Some(Err(e)) => Err(e),
            None => Err(ClientError::PredictionFailed {
                reason: FailureReason::Transport {
                    message: "script exhausted".to_string(),
                },
            }),
        }
    }

    async fn fetch_history(&self) -> Result<Vec<PredictionRecord>, ClientError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.history_gate {
            gate.notified().await;
        }

        let next = lock(&self.histories).pop_front();
        next.unwrap_or_else(|| {
            Err(ClientError::HistoryFetchFailed {
                reason: FailureReason::Transport {
                    message: "script exhausted".to_string(),
                },
            })
        })
    }
}
