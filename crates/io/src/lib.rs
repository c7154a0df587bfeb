// History persistence and export

pub mod csv;
pub mod error;
pub mod history;

pub use error::HistoryError;
pub use history::{History, HistoryEntry, HISTORY_KEY, HISTORY_LIMIT};

/// File name suggested for `history export` when none is given.
pub const DEFAULT_EXPORT_NAME: &str = "tiny-number-bot-history.csv";
