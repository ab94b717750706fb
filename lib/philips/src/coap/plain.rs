use async_trait::async_trait;
use serde_json::json;

use super::transport::Transport;
use super::{check_control, expect_success, reported, CONTROL_PATH, STATUS_PATH};
use crate::{DeviceClient, Result, Status, Values};

/// Client for CoAP firmware that exchanges plain JSON.
pub struct PlainCoapClient {
    transport: Transport,
}

impl PlainCoapClient {
    pub async fn connect(address: &str) -> Result<Self> {
        let transport = Transport::resolve(address).await?;
        Ok(Self { transport })
    }
}

#[async_trait]
impl DeviceClient for PlainCoapClient {
    async fn get_status(&self) -> Result<Status> {
        let response = self.transport.get(STATUS_PATH, true).await?;
        expect_success(&response)?;

        reported(&response.payload)
    }

    async fn set_values(&self, values: Values) -> Result<()> {
        let payload = json!({ "state": { "desired": values } });

        let response = self
            .transport
            .post(CONTROL_PATH, serde_json::to_vec(&payload)?)
            .await?;
        check_control(&response)
    }
}
