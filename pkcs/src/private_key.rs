//! Private key with its container format detected from the bytes.
//!
//! PKCS#8 is tried first and PKCS#1 second; the PEM label is not trusted,
//! so a PKCS#1 body under a `PRIVATE KEY` header still loads.

use sesame::decoder::{DecodableFrom, Decoder};
use sesame_pem::Pem;

use crate::error::{Error, Result};
use crate::pkcs1::RsaPrivateComponents;
use crate::pkcs8::{PrivateKeyInfo, write_pkcs8_private_key};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivateKey {
    Pkcs1(RsaPrivateComponents),
    Pkcs8(PrivateKeyInfo),
}

impl PrivateKey {
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        if let Ok(info) = PrivateKeyInfo::from_der(bytes) {
            return Ok(PrivateKey::Pkcs8(info));
        }
        if let Ok(components) = RsaPrivateComponents::from_der(bytes) {
            return Ok(PrivateKey::Pkcs1(components));
        }
        Err(Error::UnsupportedKeyFormat)
    }

    /// Accepts PEM text of either label or bare base64 DER.
    pub fn from_text(text: &str) -> Result<Self> {
        let (_, bytes) = sesame_pem::decode_text(text)?;
        Self::from_der(&bytes)
    }

    pub fn to_pkcs1(&self) -> Result<RsaPrivateComponents> {
        match self {
            PrivateKey::Pkcs1(components) => Ok(components.clone()),
            PrivateKey::Pkcs8(info) => info.decode(),
        }
    }

    /// DER of the PKCS#8 form, translating PKCS#1 input on the way.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        match self {
            PrivateKey::Pkcs1(components) => write_pkcs8_private_key(components),
            PrivateKey::Pkcs8(info) => info.to_der(),
        }
    }
}

impl DecodableFrom<Pem> for PrivateKey {}

impl Decoder<Pem, PrivateKey> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<PrivateKey> {
        let bytes: Vec<u8> = self.decode()?;
        PrivateKey::from_der(&bytes)
    }
}
