use base64::prelude::*;
use crypto::Token;

use crate::{Error, Result, Status, Values};

const IV: Token<16> = [0; 16];

// the device discards the first two bytes of every decrypted payload
const PREFIX: &[u8; 2] = b"AA";

pub fn seal(values: &Values, key: Token<16>) -> Result<String> {
    let mut data = PREFIX.to_vec();
    serde_json::to_writer(&mut data, values)?;

    let encrypted = crypto::cbc::encrypt(&data, key, IV);
    Ok(BASE64_STANDARD.encode(encrypted))
}

pub fn open(body: &[u8], key: Token<16>) -> Result<Status> {
    let encrypted = BASE64_STANDARD.decode(body.trim_ascii())?;
    let decrypted = crypto::cbc::decrypt(&encrypted, key, IV).map_err(|_| Error::Decrypt)?;

    let json = decrypted.get(PREFIX.len()..).unwrap_or_default();
    Ok(serde_json::from_slice(json)?)
}
