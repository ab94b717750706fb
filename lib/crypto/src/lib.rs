pub mod cbc {
    mod dec;
    pub use dec::decrypt;

    mod enc;
    pub use enc::encrypt;
}

pub mod ecb {
    mod dec;
    pub use dec::decrypt_blocks;
}

mod token;
pub use token::{md5_hex_upper, Token};
