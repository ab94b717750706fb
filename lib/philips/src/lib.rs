mod client;
mod coap;
mod http;
mod protocol;

mod error;
pub use error::Error;

pub use client::{Client, DeviceClient};
pub use coap::{CoapClient, PlainCoapClient};
pub use http::HttpClient;
pub use protocol::Protocol;

/// Device state as reported by the purifier, keyed by field name.
pub type Status = serde_json::Map<String, serde_json::Value>;

/// Field changes pushed to the purifier, keyed by field name.
pub type Values = serde_json::Map<String, serde_json::Value>;

pub type Result<T> = std::result::Result<T, Error>;
