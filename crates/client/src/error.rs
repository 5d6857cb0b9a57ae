use serde::Serialize;

/// Failure of one client operation.
///
/// There is one variant per operation so callers get a clear
/// success/failure boundary; the underlying cause is in `reason`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClientError {
    /// `POST /predict` did not produce a record.
    #[error("prediction failed: {reason}")]
    PredictionFailed { reason: FailureReason },

    /// `GET /history` did not produce a record list.
    #[error("failed to load prediction history: {reason}")]
    HistoryFetchFailed { reason: FailureReason },
}

impl ClientError {
    pub fn reason(&self) -> &FailureReason {
        match self {
            ClientError::PredictionFailed { reason } => reason,
            ClientError::HistoryFetchFailed { reason } => reason,
        }
    }
}

/// Why a client operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "cause", rename_all = "camelCase")]
pub enum FailureReason {
    /// Connection refused, DNS failure, timeout, and similar.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The service answered with a non-2xx status.
    #[error("service returned HTTP {status}")]
    Status { status: u16 },

    /// The service answered 2xx but the body did not decode.
    #[error("malformed response: {message}")]
    Decode { message: String },

    /// The blocking request task panicked or was cancelled by the runtime.
    #[error("task join error: {message}")]
    Join { message: String },
}
