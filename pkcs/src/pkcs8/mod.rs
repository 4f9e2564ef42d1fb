//! PKCS#8: Private-Key Information Syntax (RFC 5208 / RFC 5958), restricted
//! to unencrypted RSA keys.

mod types;

pub use types::{PrivateKeyInfo, Version, write_pkcs8_private_key};
