use std::fmt;
use std::sync::Mutex;

use log::{debug, error, info, warn};
use philips::{DeviceClient, Values};
use serde_json::Value;

use crate::field;
use crate::{Error, Inventory, Registry, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SyncState {
    Disconnected,
    Active,
    Stopped,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Active => write!(f, "active"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Refresh {
    /// Number of slots written from the fetched status.
    Updated(usize),
    /// Another refresh was still in flight.
    Skipped,
}

/// Keeps the gateway slots in step with one purifier.
pub struct DeviceSync<C, I> {
    client: C,
    registry: Registry<I>,
    state: Mutex<SyncState>,
    in_flight: tokio::sync::Mutex<()>,
}

impl<C: DeviceClient, I: Inventory> DeviceSync<C, I> {
    pub fn new(client: C, registry: Registry<I>) -> Self {
        Self {
            client,
            registry,
            state: Mutex::new(SyncState::Disconnected),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> SyncState {
        *self.lock_state()
    }

    pub fn registry(&self) -> &Registry<I> {
        &self.registry
    }

    /// Registers the slots and moves to [`SyncState::Active`].
    pub async fn start(&self) -> Result<()> {
        self.expect_state(SyncState::Disconnected)?;

        let created = self.registry.ensure_slots(field::enabled()).await?;
        info!("slots ready, {created} created");

        self.transition(SyncState::Disconnected, SyncState::Active)
    }

    pub fn stop(&self) -> Result<()> {
        self.transition(SyncState::Active, SyncState::Stopped)?;
        info!("device sync stopped");

        Ok(())
    }

    /// Pulls a status snapshot and writes every mapped field to its slot.
    ///
    /// A failed fetch leaves all slots untouched. Unknown and disabled keys
    /// are ignored.
    pub async fn refresh(&self) -> Result<Refresh> {
        self.expect_state(SyncState::Active)?;

        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("refresh already in flight, skipping");
            return Ok(Refresh::Skipped);
        };

        let status = match self.client.get_status().await {
            Ok(status) => status,
            Err(err) => {
                error!("refresh: unable to fetch status: {err}");
                return Err(err.into());
            }
        };

        let mut updated = 0;

        for (key, value) in &status {
            match field::lookup(key) {
                Some(field) if field.enabled => {
                    match self.registry.update_slot(field.key, value).await {
                        Ok(true) => updated += 1,
                        Ok(false) => (),
                        Err(err) => error!("refresh: unable to update {key}: {err}"),
                    }
                }
                _ => debug!("refresh: ignoring {key}"),
            }
        }

        Ok(Refresh::Updated(updated))
    }

    /// Sends `{key: value}` to the device. Slots only change on the next
    /// refresh.
    pub async fn apply_command(&self, key: &str, value: Value) -> Result<()> {
        if let Err(err) = self.expect_state(SyncState::Active) {
            warn!("command: ignoring {key}: {err}");
            return Err(err);
        }

        let Some(field) = field::lookup(key) else {
            warn!("command: dropping unknown field {key}");
            return Err(Error::UnknownField(key.to_string()));
        };

        let mut values = Values::new();
        values.insert(field.key.to_string(), field.device_value(value));

        match self.client.set_values(values).await {
            Ok(()) => {
                info!("command: set {key}");
                Ok(())
            }
            Err(err) => {
                let err = Error::from(err);
                error!("command: unable to set {key}: {err}");
                Err(err)
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SyncState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn expect_state(&self, expected: SyncState) -> Result<()> {
        let state = self.state();
        if state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState(state))
        }
    }

    fn transition(&self, from: SyncState, to: SyncState) -> Result<()> {
        let mut state = self.lock_state();
        if *state != from {
            return Err(Error::InvalidState(*state));
        }

        *state = to;
        Ok(())
    }
}
