//! Crate-wide error type.
//!
//! Only the recoverable failures live here: text that does not parse, a broken
//! configuration file, logger setup. Contract violations (forcing an impossible sign,
//! using an undefined cursor) are assertions and never show up as `CalcError`.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalcError>;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("logger error: {0}")]
    Logger(String),
}

impl From<toml::de::Error> for CalcError {
    fn from(err: toml::de::Error) -> Self {
        CalcError::Config(err.to_string())
    }
}

impl From<log::SetLoggerError> for CalcError {
    fn from(err: log::SetLoggerError) -> Self {
        CalcError::Logger(err.to_string())
    }
}
