//! Byte/text codec: standard-alphabet base64 with `=` padding.
//!
//! Decoding only accepts correctly padded input. Every base64 string that
//! crosses the keychain boundary (salts, IVs, wrapped keys) goes through
//! these two functions.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::Error;

pub fn to_base64(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

pub fn from_base64(text: &str) -> Result<Vec<u8>, Error> {
    STANDARD.decode(text).map_err(Error::Base64Decode)
}
