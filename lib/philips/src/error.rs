use std::fmt;

use crate::coap::Code;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Timeout(tokio::time::error::Elapsed),
    UrlParse(chipp_http::UrlParseError),
    Http(chipp_http::Error),
    Base64(base64::DecodeError),
    Hex(hex::FromHexError),
    Decrypt,
    InvalidDigest,
    KeyExchange(&'static str),
    Malformed(&'static str),
    UnexpectedCode(Code),
    Reset,
    Rejected(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        Self::Timeout(err)
    }
}

impl From<chipp_http::UrlParseError> for Error {
    fn from(err: chipp_http::UrlParseError) -> Self {
        Self::UrlParse(err)
    }
}

impl From<chipp_http::Error> for Error {
    fn from(err: chipp_http::Error) -> Self {
        Self::Http(err)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64(err)
    }
}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Self::Hex(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Timeout(err) => write!(f, "timeout error: {err}"),
            Self::UrlParse(err) => write!(f, "url parse error: {err}"),
            Self::Http(err) => write!(f, "http error: {err}"),
            Self::Base64(err) => write!(f, "base64 error: {err}"),
            Self::Hex(err) => write!(f, "hex error: {err}"),
            Self::Decrypt => write!(f, "unable to decrypt payload"),
            Self::InvalidDigest => write!(f, "payload digest mismatch"),
            Self::KeyExchange(reason) => write!(f, "key exchange failed: {reason}"),
            Self::Malformed(reason) => write!(f, "malformed coap message: {reason}"),
            Self::UnexpectedCode(code) => write!(f, "unexpected coap response code {code}"),
            Self::Reset => write!(f, "request reset by device"),
            Self::Rejected(reason) => write!(f, "device rejected values: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
