use std::fmt::{self, Display};

/// Errors produced while decoding inbound payloads or remote wire values.
#[derive(Debug)]
pub enum ModelError {
    /// The outer invocation envelope was not valid JSON for its shape.
    Envelope(serde_json::Error),
    /// The `invokingEvent` string did not decode into a configuration item.
    InvokingEvent(serde_json::Error),
    /// The remote service reported a status spelling we do not model.
    UnknownStatus(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Envelope(err) => {
                write!(f, "invalid invocation envelope: {err}")
            }
            ModelError::InvokingEvent(err) => {
                write!(f, "invalid invoking event: {err}")
            }
            ModelError::UnknownStatus(raw) => {
                write!(f, "unknown execution status: {raw:?}")
            }
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Envelope(err) | ModelError::InvokingEvent(err) => {
                Some(err)
            }
            ModelError::UnknownStatus(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
