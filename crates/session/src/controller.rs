//! The form state machine.
//!
//! ```text
//! Idle --begin_submit (invalid)--> Idle (errors set, no request)
//! Idle --begin_submit (valid)----> Submitting
//! Submitting --begin_submit------> Submitting (ignored)
//! Submitting --finish_submit Ok--> Idle (record prepended, lastPrice set)
//! Submitting --finish_submit Err-> Idle (lastError set, lastPrice kept)
//! ```
//!
//! The controller never performs I/O. A caller takes the [`SubmitTicket`]
//! out of [`SubmitDecision::Dispatch`], runs the request, and hands the
//! ticket back with the result. Keeping the request outside the
//! controller means no lock is held while a request is in flight.

use homeval_client::ClientError;
use homeval_core::{validate, FieldErrors, PropertyInput};
use homeval_interchange::PredictionRecord;
use homeval_storage::HistoryStore;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::form::FormState;

/// Load state of the initial history fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "camelCase")]
pub enum HistoryStatus {
    Loading,
    /// Loaded; the store holds this many records.
    Loaded(usize),
    /// The fetch failed. The form stays usable.
    Failed(String),
}

/// Permission to run one prediction request.
///
/// Only [`FormController::begin_submit`] creates tickets.
#[derive(Debug)]
pub struct SubmitTicket {
    attempt: u64,
    input: PropertyInput,
}

impl SubmitTicket {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// The inputs validated for this attempt.
    pub fn input(&self) -> PropertyInput {
        self.input
    }
}

#[derive(Debug)]
pub enum SubmitDecision {
    /// Valid and idle: run the request, then call `finish_submit`.
    Dispatch(SubmitTicket),
    /// Invalid: nothing to send.
    Rejected(FieldErrors),
    /// A request is already in flight.
    Ignored,
}

/// How a call to `submit` ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Rejected(FieldErrors),
    Ignored,
    Succeeded(PredictionRecord),
    Failed(ClientError),
    /// The session was closed while the request was in flight, or the
    /// resolution no longer matched the in-flight attempt. No state changed.
    Discarded,
}

#[derive(Debug, Default)]
pub struct FormController {
    form: FormState,
    history: HistoryStore,
    history_status: Option<HistoryStatus>,
    history_in_flight: bool,
    in_flight: Option<u64>,
    attempts: u64,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// `None` until a history load has been started.
    pub fn history_status(&self) -> Option<&HistoryStatus> {
        self.history_status.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.form.is_submitting
    }

    pub fn set_square_footage(&mut self, value: f64) {
        self.form.input.square_footage = value;
        self.input_changed();
    }

    pub fn set_bedrooms(&mut self, value: u32) {
        self.form.input.bedrooms = value;
        self.input_changed();
    }

    // Field errors stay until the next validation pass.
    fn input_changed(&mut self) {
        if self.form.last_price.take().is_some() {
            debug!("input changed, cleared last estimate");
        }
    }

    pub fn begin_submit(&mut self) -> SubmitDecision {
        if self.form.is_submitting {
            debug!(attempt = ?self.in_flight, "submit ignored, request already in flight");
            return SubmitDecision::Ignored;
        }

        let input = self.form.input;
        let validation = validate(&input);
        self.form.errors = validation.errors.clone();
        if !validation.is_valid() {
            info!(
                errors = validation.errors.len(),
                square_footage = input.square_footage,
                bedrooms = input.bedrooms,
                "submission rejected by validation"
            );
            return SubmitDecision::Rejected(validation.errors);
        }

        self.attempts += 1;
        let attempt = self.attempts;
        self.in_flight = Some(attempt);
        self.form.is_submitting = true;
        self.form.last_error = None;
        debug!(
            attempt,
            square_footage = input.square_footage,
            bedrooms = input.bedrooms,
            "submission dispatched"
        );
        SubmitDecision::Dispatch(SubmitTicket { attempt, input })
    }

    /// Apply the result of the request started by `ticket`.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<PredictionRecord, ClientError>,
    ) -> SubmitOutcome {
        if self.in_flight != Some(ticket.attempt) {
            warn!(
                attempt = ticket.attempt,
                in_flight = ?self.in_flight,
                "discarding resolution of a stale submission"
            );
            return SubmitOutcome::Discarded;
        }
        self.in_flight = None;
        self.form.is_submitting = false;

        match result {
            Ok(record) => {
                // An estimate is only shown against the inputs that produced it.
                if self.form.input == ticket.input {
                    self.form.last_price = Some(record.predicted_price);
                }
                self.history.prepend(record.clone());
                info!(
                    attempt = ticket.attempt,
                    id = %record.id,
                    predicted_price = record.predicted_price,
                    "prediction succeeded"
                );
                SubmitOutcome::Succeeded(record)
            }
            Err(err) => {
                warn!(attempt = ticket.attempt, error = %err, "prediction failed");
                self.form.last_error = Some(err.clone());
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Return to idle without a result when the request for `attempt` was
    /// given up before it resolved.
    ///
    /// Returns `false` when `attempt` is no longer the one in flight.
    pub fn abandon_submit(&mut self, attempt: u64) -> bool {
        if self.in_flight != Some(attempt) {
            return false;
        }
        self.in_flight = None;
        self.form.is_submitting = false;
        debug!(attempt, "submission abandoned before it resolved");
        true
    }

    /// Mark a history load as started.
    ///
    /// Returns `false` when the store is already initialized or another
    /// load is running.
    pub fn begin_history_load(&mut self) -> bool {
        if self.history.is_initialized() || self.history_in_flight {
            return false;
        }
        self.history_in_flight = true;
        self.history_status = Some(HistoryStatus::Loading);
        true
    }

    pub fn finish_history_load(
        &mut self,
        result: Result<Vec<PredictionRecord>, ClientError>,
    ) -> HistoryStatus {
        self.history_in_flight = false;
        let status = match result {
            Ok(records) => match self.history.initialize(records) {
                Ok(merge) => {
                    info!(
                        fetched = merge.fetched,
                        inserted = merge.inserted,
                        kept_local = merge.kept_local,
                        "history loaded"
                    );
                    HistoryStatus::Loaded(self.history.len())
                }
                Err(e) => {
                    warn!(error = %e, "history snapshot ignored");
                    HistoryStatus::Loaded(self.history.len())
                }
            },
            Err(err) => {
                warn!(error = %err, "history load failed");
                HistoryStatus::Failed(err.to_string())
            }
        };
        self.history_status = Some(status.clone());
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeval_client::FailureReason;
    use homeval_core::Field;
    use homeval_interchange::RecordId;

    fn record(id: i64, price: f64, input: PropertyInput) -> PredictionRecord {
        PredictionRecord {
            id: RecordId::Int(id),
            square_footage: input.square_footage,
            bedrooms: input.bedrooms,
            predicted_price: price,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn failure() -> ClientError {
        ClientError::PredictionFailed {
            reason: FailureReason::Status { status: 500 },
        }
    }

    fn filled(square_footage: f64, bedrooms: u32) -> FormController {
        let mut controller = FormController::new();
        controller.set_square_footage(square_footage);
        controller.set_bedrooms(bedrooms);
        controller
    }

    fn dispatch(controller: &mut FormController) -> SubmitTicket {
        match controller.begin_submit() {
            SubmitDecision::Dispatch(ticket) => ticket,
            other => panic!("expected dispatch, got {:?}", other),
        }
    }

    #[test]
    fn invalid_input_stays_idle_with_errors() {
        let mut controller = filled(50.0, 3);
        match controller.begin_submit() {
            SubmitDecision::Rejected(errors) => {
                assert_eq!(
                    errors.get(Field::SquareFootage),
                    Some("Square footage must be at least 100")
                );
                assert!(!errors.contains(Field::Bedrooms));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(!controller.is_submitting());
        assert!(controller.history().is_empty());
        assert_eq!(controller.form().errors.len(), 1);
    }

    #[test]
    fn successful_submission_sets_price_and_prepends() {
        let mut controller = filled(1500.0, 3);
        let ticket = dispatch(&mut controller);
        assert!(controller.is_submitting());
        assert_eq!(ticket.input(), PropertyInput::new(1500.0, 3));

        let rec = record(1, 350000.0, ticket.input());
        let outcome = controller.finish_submit(ticket, Ok(rec.clone()));

        assert_eq!(outcome, SubmitOutcome::Succeeded(rec.clone()));
        assert!(!controller.is_submitting());
        assert_eq!(controller.form().last_price, Some(350000.0));
        assert_eq!(controller.history().head(), Some(&rec));
    }

    #[test]
    fn submit_while_submitting_is_ignored() {
        let mut controller = filled(1500.0, 3);
        let _ticket = dispatch(&mut controller);
        assert!(matches!(controller.begin_submit(), SubmitDecision::Ignored));
        assert!(controller.is_submitting());
    }

    #[test]
    fn failure_keeps_previous_price_and_records_error() {
        let mut controller = filled(1500.0, 3);
        let ticket = dispatch(&mut controller);
        let input = ticket.input();
        controller.finish_submit(ticket, Ok(record(1, 350000.0, input)));

        let ticket = dispatch(&mut controller);
        let outcome = controller.finish_submit(ticket, Err(failure()));

        assert_eq!(outcome, SubmitOutcome::Failed(failure()));
        assert_eq!(controller.form().last_price, Some(350000.0));
        assert_eq!(controller.form().last_error, Some(failure()));
        assert_eq!(controller.history().len(), 1);
    }

    #[test]
    fn next_submit_clears_last_error() {
        let mut controller = filled(1500.0, 3);
        let ticket = dispatch(&mut controller);
        controller.finish_submit(ticket, Err(failure()));
        assert!(controller.form().last_error.is_some());

        let _ticket = dispatch(&mut controller);
        assert_eq!(controller.form().last_error, None);
    }

    #[test]
    fn input_change_clears_price_but_not_errors() {
        let mut controller = filled(1500.0, 3);
        let ticket = dispatch(&mut controller);
        let input = ticket.input();
        controller.finish_submit(ticket, Ok(record(1, 350000.0, input)));

        controller.set_bedrooms(4);
        assert_eq!(controller.form().last_price, None);

        controller.set_square_footage(10.0);
        let _ = controller.begin_submit();
        assert!(controller.form().errors.contains(Field::SquareFootage));

        controller.set_square_footage(1500.0);
        assert!(controller.form().errors.contains(Field::SquareFootage));
    }

    #[test]
    fn valid_pass_replaces_error_map() {
        let mut controller = filled(0.0, 0);
        let _ = controller.begin_submit();
        assert_eq!(controller.form().errors.len(), 2);

        controller.set_square_footage(800.0);
        controller.set_bedrooms(2);
        let _ticket = dispatch(&mut controller);
        assert!(controller.form().errors.is_empty());
    }

    #[test]
    fn edit_during_flight_prepends_without_showing_stale_price() {
        let mut controller = filled(1500.0, 3);
        let ticket = dispatch(&mut controller);
        let input = ticket.input();

        controller.set_bedrooms(5);
        let outcome = controller.finish_submit(ticket, Ok(record(1, 350000.0, input)));

        assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));
        assert_eq!(controller.form().last_price, None);
        assert_eq!(controller.history().len(), 1);
        assert_eq!(controller.history().head().map(|r| r.bedrooms), Some(3));
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let mut controller = filled(1500.0, 3);
        let first = dispatch(&mut controller);
        let input = first.input();
        controller.finish_submit(first, Err(failure()));

        let forged = SubmitTicket { attempt: 1, input };
        let _second = dispatch(&mut controller);
        let outcome = controller.finish_submit(forged, Ok(record(9, 1.0, input)));

        assert_eq!(outcome, SubmitOutcome::Discarded);
        assert!(controller.is_submitting());
        assert!(controller.history().is_empty());
    }

    #[test]
    fn abandoned_submission_returns_to_idle() {
        let mut controller = filled(1500.0, 3);
        let first = dispatch(&mut controller);
        let attempt = first.attempt();

        assert!(controller.abandon_submit(attempt));
        assert!(!controller.is_submitting());
        assert!(!controller.abandon_submit(attempt));

        let second = dispatch(&mut controller);
        assert!(!controller.abandon_submit(attempt));
        assert!(controller.is_submitting());

        let outcome = controller.finish_submit(first, Ok(record(1, 1.0, PropertyInput::new(1500.0, 3))));
        assert_eq!(outcome, SubmitOutcome::Discarded);

        let rec = record(2, 350000.0, second.input());
        assert_eq!(
            controller.finish_submit(second, Ok(rec.clone())),
            SubmitOutcome::Succeeded(rec)
        );
        assert_eq!(controller.history().len(), 1);
    }

    #[test]
    fn history_load_is_single_shot() {
        let mut controller = FormController::new();
        assert_eq!(controller.history_status(), None);
        assert!(controller.begin_history_load());
        assert!(!controller.begin_history_load());
        assert_eq!(controller.history_status(), Some(&HistoryStatus::Loading));

        let input = PropertyInput::new(900.0, 2);
        let status = controller.finish_history_load(Ok(vec![record(1, 1.0, input)]));
        assert_eq!(status, HistoryStatus::Loaded(1));
        assert!(!controller.begin_history_load());
    }

    #[test]
    fn failed_history_load_can_be_retried() {
        let mut controller = FormController::new();
        assert!(controller.begin_history_load());
        let status = controller.finish_history_load(Err(ClientError::HistoryFetchFailed {
            reason: FailureReason::Status { status: 503 },
        }));
        assert!(matches!(status, HistoryStatus::Failed(ref msg) if msg.contains("503")));
        assert!(controller.begin_history_load());
    }

    #[test]
    fn late_snapshot_stays_behind_local_records() {
        let mut controller = filled(1500.0, 3);
        assert!(controller.begin_history_load());

        let ticket = dispatch(&mut controller);
        let input = ticket.input();
        controller.finish_submit(ticket, Ok(record(3, 350000.0, input)));

        let old = PropertyInput::new(900.0, 2);
        let status = controller.finish_history_load(Ok(vec![
            record(3, 350000.0, input),
            record(2, 200000.0, old),
            record(1, 100000.0, old),
        ]));

        assert_eq!(status, HistoryStatus::Loaded(3));
        let ids: Vec<RecordId> = controller.history().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![RecordId::Int(3), RecordId::Int(2), RecordId::Int(1)]);
    }
}
