use thiserror::Error;

use crate::preferences::PreferenceAxis;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceError {
    #[error("invalid value {value:?} for {axis} (expected one of: {expected})")]
    InvalidValue {
        axis: PreferenceAxis,
        value: String,
        expected: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("message is empty")]
    EmptyInput,
    #[error("no async runtime available to run the turn")]
    NoRuntime,
}

/// Failure of a single call across the assistant boundary.
///
/// Never escapes a turn: reply failures become the fallback entry, classification
/// failures are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server error (status={status:?}): {message}")]
    Server {
        status: Option<u16>,
        message: String,
    },
}

impl GatewayError {
    pub fn network(message: impl Into<String>) -> Self {
        GatewayError::Network(message.into())
    }

    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        GatewayError::Server {
            status,
            message: message.into(),
        }
    }
}
