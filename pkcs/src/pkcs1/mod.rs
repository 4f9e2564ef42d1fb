//! PKCS#1 (RFC 8017) RSA key structures.

mod types;

pub use types::{RsaPrivateComponents, RsaPublicKey};
