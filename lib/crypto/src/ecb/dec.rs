use cipher::{
    block_padding::{NoPadding, UnpadError},
    BlockDecryptMut, KeyInit,
};

use crate::Token;

type Aes128EcbDec = ecb::Decryptor<aes::Aes128>;

/// Decrypts whole blocks in place. Fails when `data` is not block aligned.
pub fn decrypt_blocks(data: &mut [u8], key: Token<16>) -> Result<&[u8], UnpadError> {
    Aes128EcbDec::new(&key.into()).decrypt_padded_mut::<NoPadding>(data)
}
