/// Errors returned by [`Session`](crate::Session) operations that are not
/// themselves submissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session is closed")]
    Closed,

    #[error("history is already loaded")]
    HistoryAlreadyLoaded,

    #[error("a history load is already running")]
    HistoryLoadInProgress,
}
