/// All errors that can be returned by a [`HistoryStore`](crate::HistoryStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The store was already seeded from a server snapshot. A second
    /// snapshot would discard records prepended since the first one.
    #[error("history already initialized ({held} records held)")]
    AlreadyInitialized { held: usize },
}
