use std::sync::{Arc, Mutex, MutexGuard};

use homeval_client::{ClientError, PredictionClient};
use homeval_interchange::PredictionRecord;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::controller::{FormController, HistoryStatus, SubmitDecision, SubmitOutcome};
use crate::error::SessionError;
use crate::form::FormState;
use crate::token::CancellationToken;

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Load history before `open` returns. When false the load runs as a
    /// background task and may finish after early submissions.
    pub eager_history: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            eager_history: true,
        }
    }
}

/// Everything a presentation layer needs to render one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub form: FormState,
    /// Most recent first.
    pub history: Vec<PredictionRecord>,
    pub history_status: HistoryStatus,
}

/// One active form and history view.
///
/// `Session` is a handle: clones share the same state, and the session is
/// cancelled when [`close`](Self::close) is called or the last handle is
/// dropped. Requests in flight at that point resolve to
/// [`SubmitOutcome::Discarded`] and leave the state untouched.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    controller: Arc<Mutex<FormController>>,
    client: Arc<dyn PredictionClient>,
    token: CancellationToken,
    history_task: Mutex<Option<JoinHandle<HistoryStatus>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Session {
    /// Open a session and start loading history.
    pub async fn open(client: Arc<dyn PredictionClient>, options: SessionOptions) -> Session {
        let controller = Arc::new(Mutex::new(FormController::new()));
        let token = CancellationToken::new();
        lock(&controller).begin_history_load();

        let history_task = if options.eager_history {
            load_history(controller.clone(), client.clone(), token.clone()).await;
            None
        } else {
            Some(tokio::spawn(load_history(
                controller.clone(),
                client.clone(),
                token.clone(),
            )))
        };

        Session {
            inner: Arc::new(Inner {
                controller,
                client,
                token,
                history_task: Mutex::new(history_task),
            }),
        }
    }

    pub fn set_square_footage(&self, value: f64) {
        lock(&self.inner.controller).set_square_footage(value);
    }

    pub fn set_bedrooms(&self, value: u32) {
        lock(&self.inner.controller).set_bedrooms(value);
    }

    /// Validate the current input and, if valid and idle, request an estimate.
    pub async fn submit(&self) -> SubmitOutcome {
        if self.inner.token.is_cancelled() {
            return SubmitOutcome::Discarded;
        }

        let decision = lock(&self.inner.controller).begin_submit();
        let ticket = match decision {
            SubmitDecision::Dispatch(ticket) => ticket,
            SubmitDecision::Rejected(errors) => return SubmitOutcome::Rejected(errors),
            SubmitDecision::Ignored => return SubmitOutcome::Ignored,
        };

        let mut pending = PendingSubmit {
            controller: &self.inner.controller,
            token: &self.inner.token,
            attempt: ticket.attempt(),
            settled: false,
        };
        let input = ticket.input();
        let result = tokio::select! {
            biased;
            _ = self.inner.token.cancelled() => {
                debug!(attempt = ticket.attempt(), "session closed, submission discarded");
                return SubmitOutcome::Discarded;
            }
            result = self.inner.client.submit_prediction(input.square_footage, input.bedrooms) => result,
        };

        if self.inner.token.is_cancelled() {
            debug!(attempt = ticket.attempt(), "session closed, submission discarded");
            return SubmitOutcome::Discarded;
        }

        pending.settled = true;
        lock(&self.inner.controller).finish_submit(ticket, result)
    }

    /// Wait for a background history load to finish.
    ///
    /// Returns the current status immediately when no load is pending.
    pub async fn wait_for_history(&self) -> HistoryStatus {
        let task = lock(&self.inner.history_task).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "history load task did not complete");
            }
        }
        self.history_status()
    }

    /// Fetch history again after a failed load.
    pub async fn retry_history(&self) -> Result<HistoryStatus, SessionError> {
        if self.inner.token.is_cancelled() {
            return Err(SessionError::Closed);
        }
        let started = {
            let mut controller = lock(&self.inner.controller);
            if controller.history().is_initialized() {
                return Err(SessionError::HistoryAlreadyLoaded);
            }
            controller.begin_history_load()
        };
        if !started {
            return Err(SessionError::HistoryLoadInProgress);
        }
        let status = load_history(
            self.inner.controller.clone(),
            self.inner.client.clone(),
            self.inner.token.clone(),
        )
        .await;
        Ok(status)
    }

    /// Whether a history snapshot has been applied.
    pub fn is_history_loaded(&self) -> bool {
        lock(&self.inner.controller).history().is_initialized()
    }

    pub fn history_status(&self) -> HistoryStatus {
        lock(&self.inner.controller)
            .history_status()
            .cloned()
            .unwrap_or(HistoryStatus::Loading)
    }

    pub fn snapshot(&self) -> SessionView {
        let controller = lock(&self.inner.controller);
        SessionView {
            form: controller.form().clone(),
            history: controller.history().to_vec(),
            history_status: controller
                .history_status()
                .cloned()
                .unwrap_or(HistoryStatus::Loading),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Cancel every request in flight and refuse new ones.
    pub fn close(&self) {
        if !self.inner.token.is_cancelled() {
            debug!("closing session");
        }
        self.inner.token.cancel();
    }
}

/// Releases the form when a `submit` future is dropped before its request
/// resolves. A closed session is left as it was.
struct PendingSubmit<'a> {
    controller: &'a Mutex<FormController>,
    token: &'a CancellationToken,
    attempt: u64,
    settled: bool,
}

impl Drop for PendingSubmit<'_> {
    fn drop(&mut self) {
        if !self.settled && !self.token.is_cancelled() {
            lock(self.controller).abandon_submit(self.attempt);
        }
    }
}

/// Run one history fetch and apply it, unless the session closes first.
async fn load_history(
    controller: Arc<Mutex<FormController>>,
    client: Arc<dyn PredictionClient>,
    token: CancellationToken,
) -> HistoryStatus {
    let result: Result<Vec<PredictionRecord>, ClientError> = tokio::select! {
        biased;
        _ = token.cancelled() => {
            debug!("session closed, history load discarded");
            return HistoryStatus::Loading;
        }
        result = client.fetch_history() => result,
    };

    if token.is_cancelled() {
        debug!("session closed, history load discarded");
        return HistoryStatus::Loading;
    }

    lock(&controller).finish_history_load(result)
}
