use std::fmt;
use std::str::FromStr;

use serde::{
    de::{value, IntoDeserializer},
    Deserialize, Serialize,
};

/// Transport generation spoken by the purifier firmware.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Legacy firmware, HTTP with a Diffie-Hellman session key.
    Http,
    /// CoAP with the encrypted payload envelope.
    Coap,
    /// CoAP with plain JSON payloads.
    PlainCoap,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.serialize(f)
    }
}

impl FromStr for Protocol {
    type Err = value::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialize(s.into_deserializer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Protocol::from_str("http").unwrap(), Protocol::Http);
        assert_eq!(Protocol::from_str("coap").unwrap(), Protocol::Coap);
        assert_eq!(
            Protocol::from_str("plain_coap").unwrap(),
            Protocol::PlainCoap
        );
    }

    #[test]
    fn test_unknown_protocol() {
        let err = Protocol::from_str("xenon").unwrap_err();
        assert!(err.to_string().contains("xenon"));

        assert!(Protocol::from_str("HTTP").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Protocol::PlainCoap.to_string(), "plain_coap");
        assert_eq!(Protocol::Http.to_string(), "http");
    }
}
