mod mqtt;
pub use mqtt::connect_mqtt;

mod slot;
pub use slot::{SlotConfig, SlotKind};

mod topic;
pub use topic::Topic;
