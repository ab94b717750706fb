use std::str::FromStr;
use std::time::Duration;

use philips::Protocol;

use crate::{Error, Result};

const DEFAULT_POLL_INTERVAL: u64 = 10;
const DEFAULT_PREFIX: &str = "aircontrol";

#[derive(Debug, PartialEq)]
pub struct Config {
    pub address: String,
    pub protocol: Protocol,
    pub poll_interval: Duration,
    pub mqtt: MqttConfig,
}

#[derive(Debug, PartialEq)]
pub struct MqttConfig {
    pub address: String,
    pub username: String,
    pub password: String,
    pub prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| Error::Configuration(format!("set ENV variable {name}")))
        };

        let address: String = required("AIRCTRL_ADDRESS")?
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if address.is_empty() {
            return Err(Error::Configuration("AIRCTRL_ADDRESS is empty".to_string()));
        }

        let protocol = required("AIRCTRL_PROTOCOL")?;
        let protocol = Protocol::from_str(protocol.trim()).map_err(|err| {
            Error::Configuration(format!("unsupported protocol {protocol:?}: {err}"))
        })?;

        let poll_interval = match lookup("POLL_INTERVAL") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(Error::Configuration(format!(
                        "POLL_INTERVAL must be a positive number of seconds, got {value:?}"
                    )))
                }
            },
            None => DEFAULT_POLL_INTERVAL,
        };

        let mqtt = MqttConfig {
            address: required("MQTT_ADDRESS")?,
            username: required("MQTT_USER")?,
            password: required("MQTT_PASS")?,
            prefix: lookup("MQTT_PREFIX")
                .map(|prefix| prefix.trim_matches('/').to_string())
                .filter(|prefix| !prefix.is_empty())
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
        };

        Ok(Config {
            address,
            protocol,
            poll_interval: Duration::from_secs(poll_interval),
            mqtt,
        })
    }
}
