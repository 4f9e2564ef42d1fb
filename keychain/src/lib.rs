//! Password-protected RSA keychain.
//!
//! A [`Keychain`] holds an RSA keypair and a 32-byte node key. The private
//! key is stored AES-encrypted under a key derived from the user's password,
//! and the node key is stored RSA-encrypted under the keypair. Two RSA
//! flavours exist, see [`backend`].
//!
//! ```no_run
//! use sesame_keychain::{LegacyKeychain, LockedKeychain};
//!
//! let mut keychain = LegacyKeychain::new();
//! keychain.generate("correct horse").unwrap();
//! let json = keychain.export(false).unwrap().to_json().unwrap();
//!
//! let locked = LockedKeychain::from_json(&json).unwrap();
//! let mut unlocked = LegacyKeychain::new();
//! unlocked.import(&locked, Some("correct horse")).unwrap();
//! let sealed = unlocked.encrypt_with_node_key(b"payload").unwrap();
//! ```

pub mod backend;
pub mod config;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod keychain;
pub mod locked;
pub mod node_key;
pub mod storage;

pub use backend::{LegacyBackend, NativeBackend, RsaBackend};
pub use config::KeychainConfig;
pub use error::{Error, Result};
pub use kdf::{FileId, FileKey};
pub use keychain::{CHALLENGE, Keychain, LegacyKeychain, NativeKeychain};
pub use locked::{DekInfo, LockedKeychain, RsaKeys};
pub use node_key::NodeKey;
pub use storage::{FileStore, KeyValueStore, MemoryStore, SessionBlob};
