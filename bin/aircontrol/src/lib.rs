mod command;
pub use command::handle_command;

mod config;
pub use config::{Config, MqttConfig};

mod error;
pub use error::Error;

pub mod field;

mod inventory;
pub use inventory::MqttInventory;

mod poller;
pub use poller::Poller;

mod registry;
pub use registry::{format_value, DeviceSlot, Inventory, Registry};

mod sync;
pub use sync::{DeviceSync, Refresh, SyncState};

#[cfg(test)]
mod testing;

pub type Result<T> = std::result::Result<T, Error>;
