use std::collections::BTreeMap;

use async_trait::async_trait;
use log::{debug, info, trace};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::field::{self, Field, Kind};
use crate::Result;

/// Host-side store of slots, addressed by field.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn contains(&self, field: &Field) -> bool;
    async fn create(&self, field: &Field) -> Result<()>;
    async fn update(&self, field: &Field, value: &str) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceSlot {
    pub key: &'static str,
    pub last_value: Option<String>,
    pub present: bool,
}

pub struct Registry<I> {
    inventory: I,
    slots: Mutex<BTreeMap<u8, DeviceSlot>>,
}

impl<I: Inventory> Registry<I> {
    pub fn new(inventory: I) -> Self {
        Self {
            inventory,
            slots: Mutex::new(BTreeMap::new()),
        }
    }

    /// Creates a host slot for every enabled field that has none yet.
    /// Returns how many slots were created.
    pub async fn ensure_slots<'a>(
        &self,
        fields: impl IntoIterator<Item = &'a Field>,
    ) -> Result<usize> {
        let mut created = 0;

        for field in fields.into_iter().filter(|field| field.enabled) {
            if !self.inventory.contains(field).await {
                self.inventory.create(field).await?;
                info!("created slot {} for {}", field.unit, field.key);
                created += 1;
            }

            self.slots
                .lock()
                .await
                .entry(field.unit)
                .or_insert_with(|| DeviceSlot {
                    key: field.key,
                    last_value: None,
                    present: true,
                });
        }

        Ok(created)
    }

    /// Writes `value` to the slot of `key`. Returns `false` when no slot is
    /// registered for it.
    pub async fn update_slot(&self, key: &str, value: &Value) -> Result<bool> {
        let Some(field) = field::lookup(key) else {
            trace!("no field for {key}");
            return Ok(false);
        };

        let mut slots = self.slots.lock().await;
        let Some(slot) = slots.get_mut(&field.unit) else {
            trace!("no slot registered for {key}");
            return Ok(false);
        };

        let formatted = format_value(field.kind, value);
        if slot.last_value.as_deref() == Some(formatted.as_str()) {
            trace!("{key} unchanged: {formatted}");
        } else {
            debug!("{key}: {formatted}");
        }

        self.inventory.update(field, &formatted).await?;
        slot.last_value = Some(formatted);

        Ok(true)
    }

    pub async fn slots(&self) -> Vec<DeviceSlot> {
        self.slots.lock().await.values().cloned().collect()
    }
}

pub fn format_value(kind: Kind, value: &Value) -> String {
    match kind {
        Kind::Switch => {
            let on = match value {
                Value::String(s) => s == "1",
                Value::Number(n) => n.as_u64() == Some(1),
                Value::Bool(b) => *b,
                _ => false,
            };

            String::from(if on { "on" } else { "off" })
        }
        Kind::Numeric | Kind::Text => match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}
