use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use log::debug;
use rand::RngCore;
use serde_json::{json, Value};

use super::transport::Transport;
use super::{check_control, envelope, expect_success, reported};
use super::{CONTROL_PATH, STATUS_PATH, SYNC_PATH};
use crate::{DeviceClient, Error, Result, Status, Values};

/// Client for CoAP firmware that wraps every payload in the AES envelope.
pub struct CoapClient {
    transport: Transport,
    counter: AtomicU32,
}

impl CoapClient {
    pub async fn connect(address: &str) -> Result<Self> {
        let transport = Transport::resolve(address).await?;
        let counter = Self::sync(&transport).await?;

        debug!(
            "synced with {address}, counter {}",
            envelope::format_counter(counter)
        );

        Ok(Self {
            transport,
            counter: AtomicU32::new(counter),
        })
    }

    async fn sync(transport: &Transport) -> Result<u32> {
        let mut client_key = [0u8; 4];
        rand::rng().fill_bytes(&mut client_key);

        let response = transport
            .post(SYNC_PATH, hex::encode_upper(client_key).into_bytes())
            .await?;
        expect_success(&response)?;

        let counter = std::str::from_utf8(&response.payload)
            .map_err(|_| Error::KeyExchange("sync reply is not utf-8"))?;

        envelope::parse_counter(counter)
    }

    fn next_counter(&self) -> u32 {
        advance(&self.counter)
    }
}

// every control message carries a fresh counter
fn advance(counter: &AtomicU32) -> u32 {
    counter.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
}

fn desired_state(values: Values) -> Value {
    let mut desired = Values::new();
    desired.insert("CommandType".to_string(), json!("app"));
    desired.insert("DeviceId".to_string(), json!(""));
    desired.insert("EnduserId".to_string(), json!(""));
    desired.extend(values);

    json!({ "state": { "desired": desired } })
}

#[async_trait]
impl DeviceClient for CoapClient {
    async fn get_status(&self) -> Result<Status> {
        let response = self.transport.get(STATUS_PATH, true).await?;
        expect_success(&response)?;

        let sealed = std::str::from_utf8(&response.payload).map_err(|_| Error::Decrypt)?;
        reported(&envelope::open(sealed)?)
    }

    async fn set_values(&self, values: Values) -> Result<()> {
        let payload = serde_json::to_vec(&desired_state(values))?;
        let sealed = envelope::seal(self.next_counter(), &payload);

        let response = self.transport.post(CONTROL_PATH, sealed.into_bytes()).await?;
        check_control(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::super::message::{options, Code, Message, MessageType};
    use super::*;
    use std::net::SocketAddr;
    use tokio::net::UdpSocket;

    #[test]
    fn test_desired_state() {
        let mut values = Values::new();
        values.insert("pwr".to_string(), json!("0"));

        assert_eq!(
            desired_state(values),
            json!({
                "state": {
                    "desired": {
                        "CommandType": "app",
                        "DeviceId": "",
                        "EnduserId": "",
                        "pwr": "0"
                    }
                }
            })
        );
    }

    #[test]
    fn test_advance() {
        let counter = AtomicU32::new(0x0a);
        assert_eq!(advance(&counter), 0x0b);
        assert_eq!(advance(&counter), 0x0c);

        let counter = AtomicU32::new(u32::MAX);
        assert_eq!(advance(&counter), 0);
    }

    fn path(message: &Message) -> String {
        message
            .options
            .iter()
            .filter(|(number, _)| *number == options::URI_PATH)
            .map(|(_, segment)| format!("/{}", String::from_utf8_lossy(segment)))
            .collect()
    }

    async fn exchange(
        device: &UdpSocket,
        code: Code,
        payload: Vec<u8>,
    ) -> (Message, SocketAddr) {
        let mut buffer = [0u8; 1024];
        let (size, peer) = device.recv_from(&mut buffer).await.unwrap();
        let request = Message::decode(&buffer[..size]).unwrap();

        let response = Message {
            message_type: MessageType::Acknowledgement,
            code,
            message_id: request.message_id,
            token: request.token.clone(),
            options: vec![],
            payload,
        };
        device.send_to(&response.encode(), peer).await.unwrap();

        (request, peer)
    }

    fn opened_control(request: &Message) -> (String, Value) {
        let sealed = std::str::from_utf8(&request.payload).unwrap();
        let plain = envelope::open(sealed).unwrap();
        (sealed[..8].to_string(), serde_json::from_slice(&plain).unwrap())
    }

    #[tokio::test]
    async fn test_sync_status_and_control() {
        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let address = device.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (sync, _) = exchange(&device, Code::CHANGED, b"0000000A".to_vec()).await;
            assert_eq!(sync.code, Code::POST);
            assert_eq!(path(&sync), SYNC_PATH);
            assert_eq!(sync.payload.len(), 8);
            assert!(sync
                .payload
                .iter()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(b)));

            let status = envelope::seal(0x0b, br#"{"state":{"reported":{"pwr":"1","pm25":4}}}"#);
            let (get, _) = exchange(&device, Code::CONTENT, status.into_bytes()).await;
            assert_eq!(get.code, Code::GET);
            assert_eq!(path(&get), STATUS_PATH);

            let success = br#"{"status":"success"}"#.to_vec();

            let (first, _) = exchange(&device, Code::CHANGED, success.clone()).await;
            assert_eq!(path(&first), CONTROL_PATH);
            let (counter, body) = opened_control(&first);
            assert_eq!(counter, "0000000B");
            assert_eq!(body["state"]["desired"]["pwr"], json!("0"));
            assert_eq!(body["state"]["desired"]["CommandType"], json!("app"));

            let (second, _) = exchange(&device, Code::CHANGED, success).await;
            let (counter, body) = opened_control(&second);
            assert_eq!(counter, "0000000C");
            assert_eq!(body["state"]["desired"]["rhset"], json!(60));
        });

        let client = CoapClient::connect(&address).await.unwrap();

        let status = client.get_status().await.unwrap();
        assert_eq!(status["pwr"], json!("1"));
        assert_eq!(status["pm25"], json!(4));

        let mut values = Values::new();
        values.insert("pwr".to_string(), json!("0"));
        client.set_values(values).await.unwrap();

        let mut values = Values::new();
        values.insert("rhset".to_string(), json!(60));
        client.set_values(values).await.unwrap();

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_sync_with_garbage_counter() {
        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let address = device.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            exchange(&device, Code::CHANGED, b"not a counter".to_vec()).await;
        });

        let result = CoapClient::connect(&address).await;
        assert!(matches!(result, Err(Error::KeyExchange(_))));

        server.await.unwrap();
    }
}
