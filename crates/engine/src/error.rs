use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Empty reference set, or a non-finite query/reference value.
    InvalidInput(String),
    /// Caller-supplied text is not a number.
    ParseFailure(String),
}

impl EvalError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::ParseFailure(msg) => write!(f, "parse failure: {msg}"),
        }
    }
}

impl std::error::Error for EvalError {}
