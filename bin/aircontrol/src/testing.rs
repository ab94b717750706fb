use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockall::mock;
use philips::{DeviceClient, Status, Values};

use crate::field::Field;
use crate::{Error, Inventory, Result};

mock! {
    pub Device {}

    #[async_trait]
    impl DeviceClient for Device {
        async fn get_status(&self) -> philips::Result<Status>;
        async fn set_values(&self, values: Values) -> philips::Result<()>;
    }
}

/// Inventory double that remembers every create and update.
#[derive(Clone, Default)]
pub struct RecordingInventory {
    existing: Arc<Mutex<HashSet<u8>>>,
    created: Arc<Mutex<Vec<u8>>>,
    updates: Arc<Mutex<Vec<(String, String)>>>,
    fail_updates: bool,
}

impl RecordingInventory {
    pub fn with_existing(units: &[u8]) -> Self {
        let inventory = Self::default();
        inventory
            .existing
            .lock()
            .unwrap()
            .extend(units.iter().copied());
        inventory
    }

    pub fn failing_updates() -> Self {
        Self {
            fail_updates: true,
            ..Self::default()
        }
    }

    pub fn created(&self) -> Vec<u8> {
        self.created.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(String, String)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl Inventory for RecordingInventory {
    async fn contains(&self, field: &Field) -> bool {
        self.existing.lock().unwrap().contains(&field.unit)
    }

    async fn create(&self, field: &Field) -> Result<()> {
        self.existing.lock().unwrap().insert(field.unit);
        self.created.lock().unwrap().push(field.unit);
        Ok(())
    }

    async fn update(&self, field: &Field, value: &str) -> Result<()> {
        if self.fail_updates {
            return Err(Error::Mqtt(paho_mqtt::Error::General("broker unavailable")));
        }

        self.updates
            .lock()
            .unwrap()
            .push((field.key.to_string(), value.to_string()));
        Ok(())
    }
}
