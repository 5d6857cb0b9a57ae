mod error;
mod history;

pub use error::StorageError;
pub use history::{HistoryStore, Merge};
