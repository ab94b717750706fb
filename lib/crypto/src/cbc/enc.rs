use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};

use crate::Token;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

pub fn encrypt(data: &[u8], key: Token<16>, iv: Token<16>) -> Vec<u8> {
    Aes128CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const KEY: Token<16> = hex!("6e8311168ee16d6aa1aa48c64145003c");
    const IV: Token<16> = hex!("6f434fa9acd75da73e5fb999f641cda2");
    const ENCRYPTED: [u8; 32] =
        hex!("46bda2a12fea42be3c0614f34bd2832f 3a8d9f1788591602a42c5c7e6d045250");

    #[test]
    fn test_encrypt() {
        let encrypted = encrypt(br#"{"pwr":"1","pm25":4}"#, KEY, IV);
        assert_eq!(encrypted, ENCRYPTED);
    }

    #[test]
    fn test_encrypt_pads_full_block() {
        let encrypted = encrypt(&[0u8; 16], KEY, IV);
        assert_eq!(encrypted.len(), 32);
    }
}
