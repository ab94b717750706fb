use log::{debug, warn};
use philips::DeviceClient;
use serde_json::Value;
use transport::Topic;

use crate::{DeviceSync, Inventory, Result};

/// Command payloads are JSON values; anything that does not parse is taken
/// as a bare string, so `on` and `"on"` are equivalent.
pub fn parse_payload(payload: &[u8]) -> Value {
    match serde_json::from_slice(payload) {
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8_lossy(payload).trim().to_string()),
    }
}

/// Routes one MQTT message to [`DeviceSync::apply_command`]. Messages on
/// topics other than `<prefix>/<key>/set` are ignored.
pub async fn handle_command<C, I>(
    sync: &DeviceSync<C, I>,
    prefix: &str,
    topic: &str,
    payload: &[u8],
) -> Result<()>
where
    C: DeviceClient,
    I: Inventory,
{
    let key = match Topic::strip_prefix(prefix, topic) {
        Ok(Topic::Set(key)) => key,
        Ok(other) => {
            debug!("ignoring message on {other}");
            return Ok(());
        }
        Err(err) => {
            warn!("ignoring message on {topic}: {err}");
            return Ok(());
        }
    };

    let value = parse_payload(payload);
    debug!("command {key} = {value}");

    sync.apply_command(&key, value).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockDevice, RecordingInventory};
    use crate::{Error, Registry};
    use serde_json::json;

    #[test]
    fn test_parse_payload() {
        assert_eq!(parse_payload(b"60"), json!(60));
        assert_eq!(parse_payload(b"\"on\""), json!("on"));
        assert_eq!(parse_payload(b"on\n"), json!("on"));
        assert_eq!(parse_payload(b"true"), json!(true));
    }

    async fn sync_expecting(
        values: serde_json::Value,
    ) -> DeviceSync<MockDevice, RecordingInventory> {
        let mut client = MockDevice::new();
        client
            .expect_set_values()
            .withf(move |sent| serde_json::Value::Object(sent.clone()) == values)
            .times(1)
            .returning(|_| Ok(()));

        let sync = DeviceSync::new(client, Registry::new(RecordingInventory::default()));
        sync.start().await.unwrap();
        sync
    }

    #[tokio::test]
    async fn test_handle_command() {
        let sync = sync_expecting(json!({ "rhset": 50 })).await;

        handle_command(&sync, "home/purifier", "home/purifier/rhset/set", b"50")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_handle_switch_command() {
        let sync = sync_expecting(json!({ "uil": "1" })).await;

        handle_command(&sync, "aircontrol", "aircontrol/uil/set", b"on")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ignores_other_topics() {
        let mut client = MockDevice::new();
        client.expect_set_values().never();

        let sync = DeviceSync::new(client, Registry::new(RecordingInventory::default()));
        sync.start().await.unwrap();

        handle_command(&sync, "aircontrol", "aircontrol/pwr/state", b"on")
            .await
            .unwrap();
        handle_command(&sync, "aircontrol", "elsewhere/pwr/set", b"on")
            .await
            .unwrap();

        let err = handle_command(&sync, "aircontrol", "aircontrol/boost/set", b"1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownField(_)));
    }
}
