use crypto::{md5_hex_upper, Token};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

const SECRET: &str = "JiangPan";
const COUNTER_LEN: usize = 8;
const DIGEST_LEN: usize = 64;

// key and iv are the two ascii halves of md5(SECRET + counter)
fn key_and_iv(counter: &str) -> (Token<16>, Token<16>) {
    let hash = md5_hex_upper(format!("{SECRET}{counter}").as_bytes());
    let hash = hash.as_bytes();

    let mut key = [0u8; 16];
    let mut iv = [0u8; 16];
    key.copy_from_slice(&hash[..16]);
    iv.copy_from_slice(&hash[16..32]);

    (key, iv)
}

fn digest(counter: &str, ciphertext: &str) -> String {
    hex::encode_upper(Sha256::digest(format!("{counter}{ciphertext}").as_bytes()))
}

pub fn format_counter(counter: u32) -> String {
    format!("{counter:08X}")
}

pub fn parse_counter(counter: &str) -> Result<u32> {
    u32::from_str_radix(counter.trim(), 16)
        .map_err(|_| Error::KeyExchange("sync counter is not a hex number"))
}

/// `counter || hex(aes_cbc(plain)) || hex(sha256(counter || ciphertext))`
pub fn seal(counter: u32, plain: &[u8]) -> String {
    let counter = format_counter(counter);
    let (key, iv) = key_and_iv(&counter);

    let ciphertext = hex::encode_upper(crypto::cbc::encrypt(plain, key, iv));
    let digest = digest(&counter, &ciphertext);

    format!("{counter}{ciphertext}{digest}")
}

pub fn open(payload: &str) -> Result<Vec<u8>> {
    let payload = payload.trim();
    if !payload.is_ascii() || payload.len() < COUNTER_LEN + DIGEST_LEN {
        return Err(Error::Decrypt);
    }

    let (counter, rest) = payload.split_at(COUNTER_LEN);
    let (ciphertext, expected) = rest.split_at(rest.len() - DIGEST_LEN);

    if digest(counter, ciphertext) != expected {
        return Err(Error::InvalidDigest);
    }

    let (key, iv) = key_and_iv(counter);
    let encrypted = hex::decode(ciphertext)?;

    crypto::cbc::decrypt(&encrypted, key, iv).map_err(|_| Error::Decrypt)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &[u8] = br#"{"state":{"reported":{"pwr":"1","pm25":4}}}"#;
    const SEALED: &str = "0000000A\
        57E0EC84822A268234225A62C0B5F3CFA7E5A1453F3A64AF392F3C3F493581DF\
        33143F5D5E1D9DD8CEE9F731BA60C9EB\
        FAA879064725528BF1B3DADC42AE1CB127AD05274EF2B25D58F08872ED9B00DF";

    #[test]
    fn test_seal() {
        assert_eq!(seal(0x0a, PLAIN), SEALED);
    }

    #[test]
    fn test_open() {
        assert_eq!(open(SEALED).unwrap(), PLAIN);
    }

    #[test]
    fn test_open_tampered() {
        let mut tampered = SEALED.to_string();
        tampered.replace_range(8..9, "6");

        assert!(matches!(open(&tampered), Err(Error::InvalidDigest)));
    }

    #[test]
    fn test_open_too_short() {
        assert!(matches!(open("0000000A"), Err(Error::Decrypt)));
    }

    #[test]
    fn test_counter() {
        assert_eq!(format_counter(0x0a), "0000000A");
        assert_eq!(parse_counter("1A2B3C4D\n").unwrap(), 0x1a2b3c4d);
        assert!(parse_counter("sync").is_err());
    }
}
