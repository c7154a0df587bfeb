use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// File read/write failure in a store.
    Io(String),
    /// Stored value could not be encoded/decoded.
    Serde { key: String, message: String },
    /// A reference list with no usable numbers.
    EmptyRefs,
    /// `config set` with a key we don't know.
    UnknownKey(String),
    /// Known key, unusable value.
    InvalidValue { key: String, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Serde { key, message } => write!(f, "stored value '{key}' is malformed: {message}"),
            Self::EmptyRefs => write!(f, "Provide at least one reference number."),
            Self::UnknownKey(key) => write!(f, "unknown setting: {key}"),
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value '{value}' for {key}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
