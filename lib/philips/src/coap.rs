mod encrypted;
mod envelope;
mod message;
mod plain;
mod transport;

pub use encrypted::CoapClient;
pub use message::Code;
pub use plain::PlainCoapClient;

use serde::Deserialize;

use crate::{Error, Result, Status};
use message::Message;

const STATUS_PATH: &str = "/sys/dev/status";
const CONTROL_PATH: &str = "/sys/dev/control";
const SYNC_PATH: &str = "/sys/dev/sync";

#[derive(Deserialize)]
struct StatusEnvelope {
    state: ReportedState,
}

#[derive(Deserialize)]
struct ReportedState {
    reported: Status,
}

#[derive(Deserialize)]
struct ControlReply {
    status: String,
}

fn reported(payload: &[u8]) -> Result<Status> {
    let envelope: StatusEnvelope = serde_json::from_slice(payload)?;
    Ok(envelope.state.reported)
}

fn expect_success(response: &Message) -> Result<()> {
    if response.code.is_success() {
        Ok(())
    } else {
        Err(Error::UnexpectedCode(response.code))
    }
}

fn check_control(response: &Message) -> Result<()> {
    if response.code.is_client_error() {
        return Err(Error::Rejected(format!("coap {}", response.code)));
    }

    expect_success(response)?;

    let reply: ControlReply = serde_json::from_slice(&response.payload)?;
    if reply.status == "success" {
        Ok(())
    } else {
        Err(Error::Rejected(reply.status))
    }
}

#[cfg(test)]
mod tests {
    use super::message::MessageType;
    use super::*;
    use serde_json::json;

    fn response(code: Code, payload: &[u8]) -> Message {
        Message {
            message_type: MessageType::Acknowledgement,
            code,
            message_id: 1,
            token: vec![],
            options: vec![],
            payload: payload.to_vec(),
        }
    }

    #[test]
    fn test_reported() {
        let status = reported(br#"{"state":{"reported":{"pwr":"1","pm25":12}}}"#).unwrap();

        assert_eq!(status["pwr"], json!("1"));
        assert_eq!(status["pm25"], json!(12));
    }

    #[test]
    fn test_reported_without_state() {
        assert!(matches!(reported(br#"{"pwr":"1"}"#), Err(Error::Json(_))));
    }

    #[test]
    fn test_check_control() {
        let ok = response(Code::CHANGED, br#"{"status":"success"}"#);
        assert!(check_control(&ok).is_ok());

        let refused = response(Code::CHANGED, br#"{"status":"failed"}"#);
        assert!(matches!(check_control(&refused), Err(Error::Rejected(status)) if status == "failed"));

        let bad_request = response(Code(0x80), b"");
        assert!(matches!(check_control(&bad_request), Err(Error::Rejected(_))));

        let server_error = response(Code(0xa0), b"");
        assert!(matches!(
            check_control(&server_error),
            Err(Error::UnexpectedCode(Code(0xa0)))
        ));
    }
}
