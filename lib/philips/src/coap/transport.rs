use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use log::{debug, trace};
use rand::RngCore;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;

use super::message::{encode_uint, options, Block, Code, Message, MessageType};
use crate::{Error, Result};

const DEFAULT_PORT: u16 = 5683;
const ACK_TIMEOUT: Duration = Duration::from_secs(2);
const MAX_ATTEMPTS: usize = 3;
const SEPARATE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_BLOCKS: u32 = 256;
const BUFFER_SIZE: usize = 4096;

/// Request/response exchange with one CoAP endpoint.
///
/// Every exchange runs on its own ephemeral socket, so notifications left
/// over from an observe request never leak into the next one.
pub struct Transport {
    addr: SocketAddr,
    message_id: AtomicU16,
}

impl Transport {
    pub async fn resolve(address: &str) -> Result<Self> {
        let addr = match address.parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(_) => lookup_host((address, DEFAULT_PORT))
                .await?
                .next()
                .ok_or_else(|| {
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("unable to resolve {address}"),
                    )
                })?,
        };

        debug!("coap endpoint {addr}");

        Ok(Self::new(addr))
    }

    fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            message_id: AtomicU16::new(rand::rng().next_u32() as u16),
        }
    }

    /// Fetches `path`, following Block2 continuations until the whole
    /// representation is assembled.
    pub async fn get(&self, path: &str, observe: bool) -> Result<Message> {
        let socket = self.bind().await?;

        let mut request = Message::request(Code::GET, self.next_id(), generate_token(), path);
        if observe {
            request = request.with_option(options::OBSERVE, encode_uint(0));
        }

        let mut response = self.exchange(&socket, request).await?;
        let mut payload = std::mem::take(&mut response.payload);
        let mut blocks = 1;

        while let Some(block) = response.option(options::BLOCK2).map(Block::decode) {
            if !block.more {
                break;
            }

            if blocks == MAX_BLOCKS {
                return Err(Error::Malformed("too many blocks in response"));
            }
            blocks += 1;

            trace!(
                "fetching block {} ({} bytes) of {path}",
                block.num + 1,
                block.size()
            );

            let request = Message::request(Code::GET, self.next_id(), generate_token(), path)
                .with_option(options::BLOCK2, block.next().encode());

            response = self.exchange(&socket, request).await?;
            if !response.code.is_success() {
                return Ok(response);
            }

            payload.append(&mut response.payload);
        }

        response.payload = payload;
        Ok(response)
    }

    pub async fn post(&self, path: &str, payload: Vec<u8>) -> Result<Message> {
        let socket = self.bind().await?;
        let request = Message::request(Code::POST, self.next_id(), generate_token(), path)
            .with_payload(payload);

        self.exchange(&socket, request).await
    }

    fn next_id(&self) -> u16 {
        self.message_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn bind(&self) -> Result<UdpSocket> {
        let local = match self.addr {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(self.addr).await?;

        Ok(socket)
    }

    async fn exchange(&self, socket: &UdpSocket, request: Message) -> Result<Message> {
        let bytes = request.encode();
        let mut attempt = 1;

        loop {
            trace!(
                "coap send: code={}, id={}, attempt={attempt}",
                request.code,
                request.message_id
            );
            socket.send(&bytes).await?;

            match timeout(ACK_TIMEOUT, await_response(socket, &request)).await {
                Ok(Ok(Reply::Response(response))) => return Ok(response),
                Ok(Ok(Reply::Acknowledged)) => {
                    trace!("empty ack for id={}, awaiting response", request.message_id);
                    return timeout(SEPARATE_TIMEOUT, await_separate(socket, &request)).await?;
                }
                Ok(Err(err)) => return Err(err),
                Err(elapsed) => {
                    if attempt == MAX_ATTEMPTS {
                        return Err(elapsed.into());
                    }

                    debug!("no response to id={}, retransmitting", request.message_id);
                    attempt += 1;
                }
            }
        }
    }
}

enum Reply {
    Response(Message),
    /// The request was acknowledged, the response follows separately.
    Acknowledged,
}

async fn receive(socket: &UdpSocket) -> Result<Message> {
    let mut buffer = [0u8; BUFFER_SIZE];

    loop {
        let size = socket.recv(&mut buffer).await?;

        match Message::decode(&buffer[..size]) {
            Ok(message) => return Ok(message),
            Err(err) => trace!("skipping datagram: {err}"),
        }
    }
}

async fn await_response(socket: &UdpSocket, request: &Message) -> Result<Reply> {
    loop {
        let message = receive(socket).await?;

        match message.message_type {
            MessageType::Reset if message.message_id == request.message_id => {
                return Err(Error::Reset);
            }
            MessageType::Acknowledgement if message.message_id == request.message_id => {
                if message.code == Code::EMPTY {
                    return Ok(Reply::Acknowledged);
                }

                if message.token == request.token {
                    return Ok(Reply::Response(message));
                }
            }
            _ => {
                if let Some(response) = separate_response(socket, request, message).await? {
                    return Ok(Reply::Response(response));
                }
            }
        }
    }
}

async fn await_separate(socket: &UdpSocket, request: &Message) -> Result<Message> {
    loop {
        let message = receive(socket).await?;

        if let Some(response) = separate_response(socket, request, message).await? {
            return Ok(response);
        }
    }
}

/// Accepts a CON/NON message carrying the request token, acknowledging it
/// when confirmable.
async fn separate_response(
    socket: &UdpSocket,
    request: &Message,
    message: Message,
) -> Result<Option<Message>> {
    match message.message_type {
        MessageType::Confirmable | MessageType::NonConfirmable
            if message.token == request.token =>
        {
            if message.message_type == MessageType::Confirmable {
                socket
                    .send(&Message::acknowledge(message.message_id).encode())
                    .await?;
            }

            Ok(Some(message))
        }
        _ => {
            trace!("ignoring unrelated message id={}", message.message_id);
            Ok(None)
        }
    }
}

fn generate_token() -> Vec<u8> {
    let mut token = vec![0u8; 4];
    rand::rng().fill_bytes(&mut token);
    token
}
