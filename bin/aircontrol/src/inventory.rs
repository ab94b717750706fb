use std::collections::HashSet;

use async_trait::async_trait;
use log::trace;
use paho_mqtt::{AsyncClient, MessageBuilder, QOS_1};
use tokio::sync::Mutex;
use transport::Topic;

use crate::field::Field;
use crate::{Inventory, Result};

/// Slots published as retained MQTT topics under a common prefix.
pub struct MqttInventory {
    client: AsyncClient,
    prefix: String,
    created: Mutex<HashSet<u8>>,
}

impl MqttInventory {
    pub fn new(client: AsyncClient, prefix: String) -> Self {
        Self {
            client,
            prefix,
            created: Mutex::new(HashSet::new()),
        }
    }

    async fn publish(&self, topic: Topic, payload: Vec<u8>) -> Result<()> {
        let topic = topic.with_prefix(&self.prefix);
        trace!("publishing to {topic}");

        let message = MessageBuilder::new()
            .topic(topic)
            .payload(payload)
            .qos(QOS_1)
            .retained(true)
            .finalize();

        self.client.publish(message).await?;
        Ok(())
    }
}

#[async_trait]
impl Inventory for MqttInventory {
    async fn contains(&self, field: &Field) -> bool {
        self.created.lock().await.contains(&field.unit)
    }

    async fn create(&self, field: &Field) -> Result<()> {
        let payload = serde_json::to_vec(&field.config())?;
        self.publish(Topic::Config(field.key.to_string()), payload)
            .await?;

        self.created.lock().await.insert(field.unit);
        Ok(())
    }

    async fn update(&self, field: &Field, value: &str) -> Result<()> {
        self.publish(Topic::State(field.key.to_string()), value.into())
            .await
    }
}
