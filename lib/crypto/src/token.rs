use md5::{Digest, Md5};

pub type Token<const N: usize> = [u8; N];

/// Uppercase hex form of the md5 digest, the shape key material takes on
/// the wire.
pub fn md5_hex_upper(input: &[u8]) -> String {
    Md5::digest(input)
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect()
}
