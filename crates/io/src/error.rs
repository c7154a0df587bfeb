use std::fmt;

use numbot_config::ConfigError;

#[derive(Debug)]
pub enum HistoryError {
    /// Reading or writing the backing store failed.
    Store(ConfigError),
    /// Nothing to export.
    Empty,
    /// CSV writer error.
    Csv(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "{e}"),
            Self::Empty => write!(f, "No history"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
        }
    }
}

impl std::error::Error for HistoryError {}

impl From<ConfigError> for HistoryError {
    fn from(e: ConfigError) -> Self {
        Self::Store(e)
    }
}

impl From<::csv::Error> for HistoryError {
    fn from(e: ::csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}
