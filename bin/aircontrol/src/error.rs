use std::fmt;

use crate::SyncState;

#[derive(Debug)]
pub enum Error {
    Configuration(String),
    Communication(philips::Error),
    Rejected(String),
    UnknownField(String),
    InvalidState(SyncState),
    Mqtt(paho_mqtt::Error),
    Json(serde_json::Error),
    Join(tokio::task::JoinError),
}

impl From<philips::Error> for Error {
    fn from(err: philips::Error) -> Self {
        match err {
            philips::Error::Rejected(reason) => Self::Rejected(reason),
            err => Self::Communication(err),
        }
    }
}

impl From<paho_mqtt::Error> for Error {
    fn from(err: paho_mqtt::Error) -> Self {
        Self::Mqtt(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Join(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(reason) => write!(f, "configuration error: {reason}"),
            Self::Communication(err) => write!(f, "communication error: {err}"),
            Self::Rejected(reason) => write!(f, "device rejected value: {reason}"),
            Self::UnknownField(key) => write!(f, "unknown field {key}"),
            Self::InvalidState(state) => write!(f, "operation not allowed while {state}"),
            Self::Mqtt(err) => write!(f, "mqtt error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Join(err) => write!(f, "join error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_is_split_from_communication() {
        let err = Error::from(philips::Error::Rejected("failed".to_string()));
        assert!(matches!(err, Error::Rejected(reason) if reason == "failed"));

        let err = Error::from(philips::Error::Decrypt);
        assert!(matches!(err, Error::Communication(philips::Error::Decrypt)));
    }
}
