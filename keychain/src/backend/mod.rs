//! RSA providers behind one interface.
//!
//! [`LegacyBackend`] reproduces the key formats and padding of existing
//! keychains. [`NativeBackend`] uses OAEP and PKCS#8 and is meant for new
//! profiles only; the two are not interchangeable on the same data.

mod legacy;
mod native;

pub use legacy::LegacyBackend;
pub use native::NativeBackend;

use crate::error::Result;
use crate::node_key::NodeKey;

pub trait RsaBackend: Default {
    /// Length of the random profile salt for keychains of this flavour.
    const PROFILE_SALT_LEN: usize;
    /// Whether exports carry an encrypted challenge checked on import.
    const USES_CHALLENGE: bool;

    fn generate(&mut self, bits: usize, exponent: u64) -> Result<()>;

    /// Load a private key from PEM or bare base64 DER, PKCS#1 or PKCS#8.
    fn import_private_key(&mut self, text: &str) -> Result<()>;
    fn export_private_key(&self) -> Result<String>;

    fn import_public_key(&mut self, text: &str) -> Result<()>;
    fn export_public_key(&self) -> Result<String>;

    /// Encrypt the node key for storage, base64 output.
    fn wrap_node_key(&self, node_key: &NodeKey) -> Result<String>;
    fn unwrap_node_key(&self, wrapped: &str) -> Result<NodeKey>;

    fn generate_node_key(&self) -> NodeKey {
        NodeKey::random()
    }
}
