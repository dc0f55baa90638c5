use std::fmt::{Display, Formatter};
use std::sync::PoisonError;

use config::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors are `Clone` so a failed lazy service build can be handed to
/// every caller that observes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Internal(String),
    Value(String),
    /// A required configuration key is missing or holds an invalid value.
    Config(String),
    /// The requested operation or resource kind is not supported.
    Unsupported(String),
}

impl Error {
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    pub fn value(msg: impl Into<String>) -> Self {
        Error::Value(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }
}

#[macro_export]
macro_rules! internal_err {
    ($($arg:tt)*) => {
        $crate::error::Error::internal(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! value_err {
    ($($arg:tt)*) => {
        $crate::error::Error::value(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! config_err {
    ($($arg:tt)*) => {
        $crate::error::Error::config(format!($($arg)*))
    };
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Internal(s) | Error::Value(s) => {
                write!(f, "{}", s)
            }
            Error::Config(s) => write!(f, "configuration error: {}", s),
            Error::Unsupported(s) => write!(f, "unsupported: {}", s),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Value(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Error::Internal(err.to_string())
    }
}
