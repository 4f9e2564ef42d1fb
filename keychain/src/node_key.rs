use std::fmt;

use sesame_pem::{from_base64, to_base64};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::envelope::{self, BLOCK_SIZE};
use crate::error::{Error, Result};

pub const NODE_KEY_LEN: usize = 32;

/// Symmetric key protecting user payloads.
///
/// The first half is the AES-128 key and the second half the CBC IV.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct NodeKey([u8; NODE_KEY_LEN]);

impl NodeKey {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; NODE_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| Error::NodeKeyLengthMismatch(bytes.len()))?;
        Ok(Self(key))
    }

    pub fn random() -> Self {
        let mut key = [0u8; NODE_KEY_LEN];
        key.copy_from_slice(&envelope::random_bytes(NODE_KEY_LEN));
        Self(key)
    }

    /// A key made of 32 base64 characters, the shape older clients generate.
    pub fn random_printable() -> Self {
        let text = to_base64(envelope::random_bytes(NODE_KEY_LEN));
        let mut key = [0u8; NODE_KEY_LEN];
        key.copy_from_slice(&text.as_bytes()[..NODE_KEY_LEN]);
        Self(key)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        to_base64(self.0)
    }

    /// AES-CBC of `data` under this key, base64 encoded.
    pub fn encrypt(&self, data: &[u8]) -> Result<String> {
        let (key, iv) = self.0.split_at(BLOCK_SIZE);
        let sealed = envelope::encrypt(data, key, Some(iv))?;
        Ok(to_base64(sealed.ciphertext))
    }

    pub fn decrypt(&self, data: &str) -> Result<Vec<u8>> {
        let (key, iv) = self.0.split_at(BLOCK_SIZE);
        envelope::decrypt(&from_base64(data)?, key, iv)
    }
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeKey(..)")
    }
}
