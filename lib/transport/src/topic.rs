use std::fmt;
use std::str::FromStr;

use serde::de::{value, Error};

/// Per-field topic, relative to the gateway prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Topic {
    Config(String),
    State(String),
    Set(String),
}

impl Topic {
    pub fn with_prefix(&self, prefix: &str) -> String {
        format!("{prefix}/{self}")
    }

    /// Wildcard filter matching every command topic under `prefix`.
    pub fn set_filter(prefix: &str) -> String {
        format!("{prefix}/+/set")
    }

    pub fn strip_prefix(prefix: &str, topic: &str) -> Result<Topic, value::Error> {
        let relative = topic
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| value::Error::custom(format!("topic {topic} is outside {prefix}")))?;

        Topic::from_str(relative)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Topic::Config(key) => write!(f, "{key}/config"),
            Topic::State(key) => write!(f, "{key}/state"),
            Topic::Set(key) => write!(f, "{key}/set"),
        }
    }
}

impl FromStr for Topic {
    type Err = value::Error;

    fn from_str(s: &str) -> std::result::Result<Topic, Self::Err> {
        const ERROR_MSG: &str = "supported topics are <key>/config, <key>/state and <key>/set";

        let (key, suffix) = s
            .split_once('/')
            .ok_or_else(|| value::Error::custom(ERROR_MSG))?;

        if key.is_empty() {
            return Err(value::Error::custom(ERROR_MSG));
        }

        match suffix {
            "config" => Ok(Topic::Config(key.to_string())),
            "state" => Ok(Topic::State(key.to_string())),
            "set" => Ok(Topic::Set(key.to_string())),
            _ => Err(value::Error::custom(ERROR_MSG)),
        }
    }
}
