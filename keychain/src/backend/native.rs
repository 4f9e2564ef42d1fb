//! RSA-OAEP (SHA-256) with PKCS#8 private keys, encoded by the `rsa` crate.

use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use sesame_pem::{Label, decode_text, from_base64, to_base64};
use sesame_pkcs::PrivateKey;
use sha2::Sha256;

use super::RsaBackend;
use crate::error::{Error, Result};
use crate::node_key::NodeKey;

const WRAPPED_TEXT_LEN: usize = 44;

#[derive(Debug, Default)]
pub struct NativeBackend {
    private_key: Option<RsaPrivateKey>,
    public_key: Option<RsaPublicKey>,
}

impl NativeBackend {
    fn private_key(&self) -> Result<&RsaPrivateKey> {
        self.private_key.as_ref().ok_or(Error::KeyNotInitialized)
    }

    fn public_key(&self) -> Result<&RsaPublicKey> {
        self.public_key.as_ref().ok_or(Error::KeyNotInitialized)
    }
}

impl RsaBackend for NativeBackend {
    const PROFILE_SALT_LEN: usize = 96;
    const USES_CHALLENGE: bool = false;

    fn generate(&mut self, bits: usize, exponent: u64) -> Result<()> {
        let private_key = RsaPrivateKey::new_with_exp(&mut OsRng, bits, &BigUint::from(exponent))?;
        self.public_key = Some(private_key.to_public_key());
        self.private_key = Some(private_key);
        Ok(())
    }

    /// PKCS#1 input is rewritten as PKCS#8 before it reaches the `rsa` crate.
    fn import_private_key(&mut self, text: &str) -> Result<()> {
        let der = PrivateKey::from_text(text)
            .map_err(|e| match e {
                sesame_pkcs::Error::UnsupportedKeyFormat => Error::UnsupportedKeyFormat,
                other => other.into(),
            })?
            .to_pkcs8_der()?;
        let private_key =
            RsaPrivateKey::from_pkcs8_der(&der).map_err(|e| Error::KeyEncoding(e.to_string()))?;
        self.public_key = Some(private_key.to_public_key());
        self.private_key = Some(private_key);
        Ok(())
    }

    fn export_private_key(&self) -> Result<String> {
        let der = self
            .private_key()?
            .to_pkcs8_der()
            .map_err(|e| Error::KeyEncoding(e.to_string()))?;
        Ok(to_base64(der.as_bytes()))
    }

    fn import_public_key(&mut self, text: &str) -> Result<()> {
        let (label, der) = decode_text(text)?;
        let public_key = match label {
            Some(Label::RSAPublicKey) => RsaPublicKey::from_pkcs1_der(&der)
                .map_err(|e| Error::KeyEncoding(e.to_string()))?,
            _ => RsaPublicKey::from_public_key_der(&der)
                .map_err(|e| Error::KeyEncoding(e.to_string()))?,
        };
        self.public_key = Some(public_key);
        Ok(())
    }

    fn export_public_key(&self) -> Result<String> {
        let der = self
            .public_key()?
            .to_public_key_der()
            .map_err(|e| Error::KeyEncoding(e.to_string()))?;
        Ok(to_base64(der.as_bytes()))
    }

    fn wrap_node_key(&self, node_key: &NodeKey) -> Result<String> {
        let sealed = self.public_key()?.encrypt(
            &mut OsRng,
            Oaep::new::<Sha256>(),
            node_key.as_bytes(),
        )?;
        Ok(to_base64(sealed))
    }

    fn unwrap_node_key(&self, wrapped: &str) -> Result<NodeKey> {
        let sealed = from_base64(wrapped)?;
        let mut plain = self
            .private_key()?
            .decrypt(Oaep::new::<Sha256>(), &sealed)
            .map_err(|_| Error::DecryptionFailed)?;
        if plain.len() > WRAPPED_TEXT_LEN {
            let text = std::str::from_utf8(&plain).map_err(|_| Error::DecryptionFailed)?;
            plain = from_base64(text)?;
        }
        NodeKey::from_slice(&plain)
    }
}
