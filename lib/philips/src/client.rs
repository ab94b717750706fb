use async_trait::async_trait;
use log::info;

use crate::coap::{CoapClient, PlainCoapClient};
use crate::http::HttpClient;
use crate::{Protocol, Result, Status, Values};

/// Capability set shared by every purifier transport.
#[async_trait]
pub trait DeviceClient: Send + Sync {
    async fn get_status(&self) -> Result<Status>;
    async fn set_values(&self, values: Values) -> Result<()>;
}

pub enum Client {
    Http(HttpClient),
    Coap(CoapClient),
    PlainCoap(PlainCoapClient),
}

impl Client {
    /// Builds the transport for `protocol`, running its handshake if it has one.
    pub async fn connect(address: &str, protocol: Protocol) -> Result<Self> {
        let client = match protocol {
            Protocol::Http => Self::Http(HttpClient::connect(address).await?),
            Protocol::Coap => Self::Coap(CoapClient::connect(address).await?),
            Protocol::PlainCoap => Self::PlainCoap(PlainCoapClient::connect(address).await?),
        };

        info!("connected to {address} over {protocol}");

        Ok(client)
    }
}

#[async_trait]
impl DeviceClient for Client {
    async fn get_status(&self) -> Result<Status> {
        match self {
            Self::Http(client) => client.get_status().await,
            Self::Coap(client) => client.get_status().await,
            Self::PlainCoap(client) => client.get_status().await,
        }
    }

    async fn set_values(&self, values: Values) -> Result<()> {
        match self {
            Self::Http(client) => client.set_values(values).await,
            Self::Coap(client) => client.set_values(values).await,
            Self::PlainCoap(client) => client.set_values(values).await,
        }
    }
}
