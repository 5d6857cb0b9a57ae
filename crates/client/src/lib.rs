//! Estimation service client.
//!
//! Two levels of abstraction:
//! - [`PredictionClient`] -- the two operations the session needs
//!   (`submit_prediction`, `fetch_history`), object safe so sessions can
//!   hold an `Arc<dyn PredictionClient>`
//! - [`HttpPredictionClient`] -- the production implementation over HTTP
//!
//! [`ScriptedClient`] answers from queued responses and counts calls, for
//! driving sessions in tests without a network.

pub mod config;
pub mod error;
pub mod http;
pub mod order;
pub mod scripted;

use async_trait::async_trait;
use homeval_interchange::PredictionRecord;

pub use config::{ClientConfig, ConfigError, HistoryOrder, DEFAULT_BASE_URL};
pub use error::{ClientError, FailureReason};
pub use http::HttpPredictionClient;
pub use scripted::ScriptedClient;

/// The estimation service, as seen by a session.
///
/// ## Retry Semantics
///
/// `fetch_history` is read-only and safe to call again after a failure.
/// `submit_prediction` creates a record server-side on every call, so
/// implementations never retry it on their own and callers only re-issue
/// it on an explicit user action.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    /// Request an estimate for the given inputs.
    ///
    /// The returned record carries the server's `id`, `predicted_price`
    /// and `created_at`, and the caller's `square_footage` and `bedrooms`.
    /// Any failure, including a non-2xx status with a well-formed body, is
    /// `ClientError::PredictionFailed`.
    async fn submit_prediction(
        &self,
        square_footage: f64,
        bedrooms: u32,
    ) -> Result<PredictionRecord, ClientError>;

    /// Fetch past predictions, most recent first as served.
    ///
    /// Any failure is `ClientError::HistoryFetchFailed`.
    async fn fetch_history(&self) -> Result<Vec<PredictionRecord>, ClientError>;
}
