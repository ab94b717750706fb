use std::fmt;

use crate::{Error, Result};

const VERSION: u8 = 1;
const PAYLOAD_MARKER: u8 = 0xff;
const MAX_TOKEN_LEN: usize = 8;

pub mod options {
    pub const OBSERVE: u16 = 6;
    pub const URI_PATH: u16 = 11;
    pub const BLOCK2: u16 = 23;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageType {
    Confirmable,
    NonConfirmable,
    Acknowledgement,
    Reset,
}

impl MessageType {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Confirmable,
            1 => Self::NonConfirmable,
            2 => Self::Acknowledgement,
            _ => Self::Reset,
        }
    }

    fn bits(self) -> u8 {
        match self {
            Self::Confirmable => 0,
            Self::NonConfirmable => 1,
            Self::Acknowledgement => 2,
            Self::Reset => 3,
        }
    }
}

/// Request method or response code, `class.detail` packed into one byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Code(pub u8);

impl Code {
    pub const EMPTY: Code = Code(0x00);
    pub const GET: Code = Code(0x01);
    pub const POST: Code = Code(0x02);
    pub const CHANGED: Code = Code(0x44);
    pub const CONTENT: Code = Code(0x45);

    pub fn class(self) -> u8 {
        self.0 >> 5
    }

    pub fn detail(self) -> u8 {
        self.0 & 0x1f
    }

    pub fn is_success(self) -> bool {
        self.class() == 2
    }

    pub fn is_client_error(self) -> bool {
        self.class() == 4
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.class(), self.detail())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub message_type: MessageType,
    pub code: Code,
    pub message_id: u16,
    pub token: Vec<u8>,
    pub options: Vec<(u16, Vec<u8>)>,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn request(code: Code, message_id: u16, token: Vec<u8>, path: &str) -> Self {
        let options = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| (options::URI_PATH, segment.as_bytes().to_vec()))
            .collect();

        Self {
            message_type: MessageType::Confirmable,
            code,
            message_id,
            token,
            options,
            payload: vec![],
        }
    }

    pub fn acknowledge(message_id: u16) -> Self {
        Self {
            message_type: MessageType::Acknowledgement,
            code: Code::EMPTY,
            message_id,
            token: vec![],
            options: vec![],
            payload: vec![],
        }
    }

    pub fn with_option(mut self, number: u16, value: Vec<u8>) -> Self {
        self.options.push((number, value));
        self
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn option(&self, number: u16) -> Option<&[u8]> {
        self.options
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, value)| value.as_slice())
    }

    pub fn encode(&self) -> Vec<u8> {
        let token_len = self.token.len().min(MAX_TOKEN_LEN);

        let mut bytes = Vec::with_capacity(4 + token_len + self.payload.len() + 32);
        bytes.push(VERSION << 6 | self.message_type.bits() << 4 | token_len as u8);
        bytes.push(self.code.0);
        bytes.extend_from_slice(&self.message_id.to_be_bytes());
        bytes.extend_from_slice(&self.token[..token_len]);

        // stable sort, repeated options keep their order
        let mut options: Vec<_> = self.options.iter().collect();
        options.sort_by_key(|(number, _)| *number);

        let mut previous = 0;
        for (number, value) in options {
            let (delta, delta_ext) = split_nibble(number - previous);
            let (length, length_ext) = split_nibble(value.len() as u16);

            bytes.push(delta << 4 | length);
            bytes.extend_from_slice(&delta_ext);
            bytes.extend_from_slice(&length_ext);
            bytes.extend_from_slice(value);

            previous = *number;
        }

        if !self.payload.is_empty() {
            bytes.push(PAYLOAD_MARKER);
            bytes.extend_from_slice(&self.payload);
        }

        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::Malformed("header too short"));
        }

        if bytes[0] >> 6 != VERSION {
            return Err(Error::Malformed("unsupported version"));
        }

        let message_type = MessageType::from_bits(bytes[0] >> 4);
        let token_len = (bytes[0] & 0x0f) as usize;
        if token_len > MAX_TOKEN_LEN {
            return Err(Error::Malformed("token too long"));
        }

        let code = Code(bytes[1]);
        let message_id = u16::from_be_bytes([bytes[2], bytes[3]]);
        let token = bytes
            .get(4..4 + token_len)
            .ok_or(Error::Malformed("truncated token"))?
            .to_vec();

        let mut rest = &bytes[4 + token_len..];
        let mut options = vec![];
        let mut payload = vec![];
        let mut number = 0u16;

        while let Some((&first, tail)) = rest.split_first() {
            if first == PAYLOAD_MARKER {
                if tail.is_empty() {
                    return Err(Error::Malformed("payload marker without payload"));
                }

                payload = tail.to_vec();
                break;
            }

            let (delta, tail) = join_nibble(first >> 4, tail)?;
            let (length, tail) = join_nibble(first & 0x0f, tail)?;
            let length = length as usize;

            number = number
                .checked_add(delta)
                .ok_or(Error::Malformed("option number overflow"))?;

            let value = tail
                .get(..length)
                .ok_or(Error::Malformed("truncated option"))?;
            options.push((number, value.to_vec()));

            rest = &tail[length..];
        }

        Ok(Self {
            message_type,
            code,
            message_id,
            token,
            options,
            payload,
        })
    }
}

fn split_nibble(value: u16) -> (u8, Vec<u8>) {
    match value {
        0..=12 => (value as u8, vec![]),
        13..=268 => (13, vec![(value - 13) as u8]),
        _ => (14, (value - 269).to_be_bytes().to_vec()),
    }
}

fn join_nibble(nibble: u8, bytes: &[u8]) -> Result<(u16, &[u8])> {
    match nibble {
        0..=12 => Ok((nibble as u16, bytes)),
        13 => {
            let (&extended, tail) = bytes
                .split_first()
                .ok_or(Error::Malformed("truncated option header"))?;
            Ok((extended as u16 + 13, tail))
        }
        14 => {
            let extended = bytes
                .get(..2)
                .ok_or(Error::Malformed("truncated option header"))?;
            let value = u16::from_be_bytes([extended[0], extended[1]])
                .checked_add(269)
                .ok_or(Error::Malformed("option value overflow"))?;
            Ok((value, &bytes[2..]))
        }
        _ => Err(Error::Malformed("reserved option nibble")),
    }
}

pub fn encode_uint(value: u32) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let zeroes = bytes.iter().take_while(|byte| **byte == 0).count();
    bytes[zeroes..].to_vec()
}

pub fn decode_uint(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(4)
        .fold(0, |value, byte| value << 8 | *byte as u32)
}

/// Block-wise transfer descriptor carried by the Block2 option.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub num: u32,
    pub more: bool,
    pub size_exponent: u8,
}

impl Block {
    pub fn decode(bytes: &[u8]) -> Self {
        let value = decode_uint(bytes);

        Self {
            num: value >> 4,
            more: value & 0x08 != 0,
            size_exponent: (value & 0x07) as u8,
        }
    }

    pub fn encode(self) -> Vec<u8> {
        let more = if self.more { 0x08 } else { 0 };
        encode_uint(self.num << 4 | more | (self.size_exponent & 0x07) as u32)
    }

    pub fn size(self) -> usize {
        1 << (self.size_exponent + 4)
    }

    pub fn next(self) -> Self {
        Self {
            num: self.num + 1,
            more: false,
            size_exponent: self.size_exponent,
        }
    }
}
