use crypto::Token;
use num_bigint::BigUint;
use rand::RngCore;

use crate::{Error, Result};

// RFC 5114 1024-bit MODP group with 160-bit prime order subgroup.
const PRIME: &str = "\
    B10B8F96A080E01DDE92DE5EAE5D54EC52C99FBCFB06A3C69A6A9DCA52D23B61\
    6073E28675A23D189838EF1E2EE652C013ECB4AEA906112324975C3CD49B83BF\
    ACCBDD7D90C4BD7098488E9C219A73724EFFD6FAE5644738FAA31A4FF55BCCC0\
    A151AF5F0DC8B4BD45BF37DF365C1A65E68CFDA76D4DA708DF1FB2BC2E4A4371";

const GENERATOR: &str = "\
    A4D1CBD5C3FD34126765A442EFB99905F8104DD258AC507FD6406CFF14266D31\
    266FEA1E5C41564B777E690F5504F213160217B4B01B886A5E91547F9E2749F4\
    D7FBD7D3B9A92EE1909D0D2263F80A76A6A24C087A091F531DBF0A0169B6A28A\
    D662A4D18E73AFA32D779D5918D08BC8858F4DCEF97C2A24855E6EEB22B3B2E5";

const MODULUS_LEN: usize = 128;

fn parse_constant(hex: &str) -> BigUint {
    BigUint::parse_bytes(hex.as_bytes(), 16).unwrap_or_default()
}

pub struct KeyPair {
    secret: BigUint,
    public: BigUint,
}

impl KeyPair {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);

        Self::from_secret(BigUint::from_bytes_be(&bytes))
    }

    fn from_secret(secret: BigUint) -> Self {
        let public = parse_constant(GENERATOR).modpow(&secret, &parse_constant(PRIME));
        Self { secret, public }
    }

    pub fn public_hex(&self) -> String {
        self.public.to_str_radix(16)
    }

    /// First 16 bytes of the shared secret, left padded to the modulus size.
    pub fn shared_secret(&self, hellman: &str) -> Result<Token<16>> {
        let other = BigUint::parse_bytes(hellman.trim().as_bytes(), 16)
            .ok_or(Error::KeyExchange("hellman is not a hex number"))?;

        let shared = other.modpow(&self.secret, &parse_constant(PRIME)).to_bytes_be();
        if shared.len() > MODULUS_LEN {
            return Err(Error::KeyExchange("shared secret exceeds modulus"));
        }

        let mut padded = [0u8; MODULUS_LEN];
        padded[MODULUS_LEN - shared.len()..].copy_from_slice(&shared);

        let mut token = [0u8; 16];
        token.copy_from_slice(&padded[..16]);
        Ok(token)
    }
}

/// Unwraps the session key the device sent encrypted with the shared secret.
pub fn session_key(key: &str, shared: Token<16>) -> Result<Token<16>> {
    let mut encrypted = hex::decode(key.trim())?;
    let decrypted =
        crypto::ecb::decrypt_blocks(&mut encrypted, shared).map_err(|_| Error::Decrypt)?;

    if decrypted.len() < 16 {
        return Err(Error::KeyExchange("session key is too short"));
    }

    let mut token = [0u8; 16];
    token.copy_from_slice(&decrypted[..16]);
    Ok(token)
}
