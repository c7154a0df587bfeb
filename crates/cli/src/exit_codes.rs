//! CLI Exit Code Registry
//!
//! Single source of truth for `numbot` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad arguments, unknown setting)         |
//! | 3    | I/O error (settings/history store, export file)      |
//! | 4    | Parse failure (query text is not a number)           |
//! | 5    | Invalid input (no references, non-finite value)      |
//! | 6    | Nothing to export (empty history)                    |

use numbot_config::ConfigError;
use numbot_engine::EvalError;
use numbot_io::HistoryError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown setting key or value.
pub const EXIT_USAGE: u8 = 2;

/// Store or file I/O failed.
pub const EXIT_IO: u8 = 3;

/// Query text could not be parsed as a number.
pub const EXIT_PARSE: u8 = 4;

/// Evaluation rejected its input (empty reference set, non-finite value).
pub const EXIT_INVALID_INPUT: u8 = 5;

/// `history export` with no history.
pub const EXIT_EMPTY_HISTORY: u8 = 6;

pub fn eval_exit_code(err: &EvalError) -> u8 {
    match err {
        EvalError::ParseFailure(_) => EXIT_PARSE,
        EvalError::InvalidInput(_) => EXIT_INVALID_INPUT,
    }
}

pub fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::Io(_) | ConfigError::Serde { .. } => EXIT_IO,
        ConfigError::EmptyRefs => EXIT_INVALID_INPUT,
        ConfigError::UnknownKey(_) | ConfigError::InvalidValue { .. } => EXIT_USAGE,
    }
}

pub fn history_exit_code(err: &HistoryError) -> u8 {
    match err {
        HistoryError::Store(e) => config_exit_code(e),
        HistoryError::Empty => EXIT_EMPTY_HISTORY,
        HistoryError::Csv(_) => EXIT_IO,
    }
}
