//! homeval-session: the form state machine and the session that drives it.
//!
//! # Public API
//!
//! - [`FormController`] -- pure state machine over [`FormState`] and the
//!   session's history store; never performs I/O
//! - [`Session`] -- owns a controller and a [`PredictionClient`](homeval_client::PredictionClient),
//!   runs requests, and discards their results once closed
//! - [`CancellationToken`] -- the session lifetime signal
//!
//! Submission is serialized by the controller's `Submitting` guard: a
//! second `submit` while one is in flight returns
//! [`SubmitOutcome::Ignored`] without touching the network.

mod controller;
mod error;
mod form;
mod session;
mod token;

pub use controller::{FormController, HistoryStatus, SubmitDecision, SubmitOutcome, SubmitTicket};
pub use error::SessionError;
pub use form::FormState;
pub use session::{Session, SessionOptions, SessionView};
pub use token::CancellationToken;
