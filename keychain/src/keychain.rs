//! The keychain: an RSA keypair and a node key, locked by a password.
//!
//! ```text
//! password + salt ──pbkdf2──▶ master key ──pbkdf2──▶ wrap key
//!                                                      │ AES-CBC
//!                                                      ▼
//!                                        private key ──RSA──▶ node key
//! ```
//!
//! A keychain starts [`Uninitialized`](Keychain::default) and becomes ready
//! through [`Keychain::generate`], [`Keychain::import`] or [`Keychain::load`].
//! Each of these builds the new state completely before replacing the old one,
//! so a failed call leaves the keychain as it was.

use std::fmt;

use sesame_pem::{from_base64, to_base64};
use zeroize::Zeroizing;

use crate::backend::{LegacyBackend, NativeBackend, RsaBackend};
use crate::config::KeychainConfig;
use crate::envelope::{self, BLOCK_SIZE};
use crate::error::{Error, Result};
use crate::kdf;
use crate::locked::{DekInfo, LockedKeychain, RsaKeys};
use crate::node_key::NodeKey;
use crate::storage::{KeyValueStore, SessionBlob};

/// Known plaintext sealed with the node key to detect tampered exports.
pub const CHALLENGE: &str = "dE9yL9kF6nU1zJ0fC4tQ6zY5lO2mN4hE";

const DEK_IV_LEN: usize = BLOCK_SIZE;
const DEK_SALT_LEN: usize = 8;
const SESSION_SALT_LEN: usize = 96;

pub type LegacyKeychain = Keychain<LegacyBackend>;
pub type NativeKeychain = Keychain<NativeBackend>;

pub struct Keychain<B: RsaBackend> {
    password: Option<Zeroizing<String>>,
    state: State<B>,
}

enum State<B> {
    Uninitialized,
    Ready(Box<Ready<B>>),
}

struct Ready<B> {
    salt: Vec<u8>,
    master_key: Zeroizing<Vec<u8>>,
    dek_iv: Vec<u8>,
    dek_salt: Vec<u8>,
    backend: B,
    node_key: NodeKey,
}

impl<B: RsaBackend> Default for Keychain<B> {
    fn default() -> Self {
        Self {
            password: None,
            state: State::Uninitialized,
        }
    }
}

impl<B: RsaBackend> fmt::Debug for Keychain<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keychain")
            .field("ready", &self.is_ready())
            .field("has_password", &self.password.is_some())
            .finish()
    }
}

impl<B: RsaBackend> Keychain<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    fn ready(&self) -> Result<&Ready<B>> {
        match &self.state {
            State::Ready(ready) => Ok(ready),
            State::Uninitialized => Err(Error::NotInitialized),
        }
    }

    fn password(&self) -> Result<&str> {
        self.password
            .as_deref()
            .map(String::as_str)
            .ok_or(Error::MissingPassword)
    }

    /// Create a fresh keychain with default RSA parameters.
    pub fn generate(&mut self, password: &str) -> Result<()> {
        self.generate_with(password, &KeychainConfig::default())
    }

    pub fn generate_with(&mut self, password: &str, config: &KeychainConfig) -> Result<()> {
        if password.is_empty() {
            return Err(Error::InvalidPassword);
        }

        let salt = envelope::random_bytes(B::PROFILE_SALT_LEN);
        let master_key = kdf::master_key(password, &salt)?;
        let mut backend = B::default();
        backend.generate(config.rsa_bits, config.rsa_exponent)?;
        let node_key = backend.generate_node_key();

        self.password = Some(Zeroizing::new(password.to_string()));
        self.state = State::Ready(Box::new(Ready {
            salt,
            master_key,
            dek_iv: envelope::random_bytes(DEK_IV_LEN),
            dek_salt: envelope::random_bytes(DEK_SALT_LEN),
            backend,
            node_key,
        }));
        tracing::debug!("Generated keychain with a {}-bit RSA key", config.rsa_bits);
        Ok(())
    }

    /// Unlock `locked`. `password` takes precedence over a password embedded
    /// by a weak export, and an embedded master key is used as is.
    pub fn import(&mut self, locked: &LockedKeychain, password: Option<&str>) -> Result<()> {
        let password = password
            .map(str::to_string)
            .or_else(|| locked.password.clone())
            .map(Zeroizing::new);

        let salt = from_base64(&locked.salt)?;
        let master_key = match (&locked.master_key, &password) {
            (Some(embedded), _) => Zeroizing::new(from_base64(embedded)?),
            (None, Some(password)) => kdf::master_key(password, &salt)?,
            (None, None) => return Err(Error::MissingPassword),
        };

        let dek_info = &locked.rsa_keys.dek_info;
        let dek_iv = from_base64(&dek_info.iv)?;
        let dek_salt = from_base64(&dek_info.salt)?;

        let wrap_key = kdf::wrap_key(&master_key, &dek_salt)?;
        let sealed = from_base64(&locked.rsa_keys.private_key)?;
        let plain = Zeroizing::new(envelope::decrypt(&sealed, &wrap_key, &dek_iv).map_err(
            |e| match e {
                Error::DecryptionFailed => Error::InvalidPassword,
                other => other,
            },
        )?);
        let private_key = std::str::from_utf8(&plain).map_err(|_| Error::InvalidPassword)?;

        let mut backend = B::default();
        backend.import_private_key(private_key).map_err(|e| {
            tracing::debug!("Unwrapped private key is unreadable: {}", e);
            Error::InvalidPassword
        })?;
        backend.import_public_key(&locked.rsa_keys.public_key)?;
        let node_key = backend.unwrap_node_key(&locked.node_key)?;

        if let Some(challenge) = locked.challenge.as_ref().filter(|_| B::USES_CHALLENGE) {
            match node_key.decrypt(challenge) {
                Ok(plain) if plain == CHALLENGE.as_bytes() => {}
                _ => return Err(Error::ChallengeMismatch),
            }
        }

        self.password = password;
        self.state = State::Ready(Box::new(Ready {
            salt,
            master_key,
            dek_iv,
            dek_salt,
            backend,
            node_key,
        }));
        tracing::debug!("Imported keychain");
        Ok(())
    }

    /// Lock the keychain for storage. A weak export also carries the master
    /// key and the password in clear.
    pub fn export(&self, weak: bool) -> Result<LockedKeychain> {
        let ready = self.ready()?;

        let wrap_key = kdf::wrap_key(&ready.master_key, &ready.dek_salt)?;
        let private_key = Zeroizing::new(ready.backend.export_private_key()?);
        let sealed = envelope::encrypt(private_key.as_bytes(), &wrap_key, Some(ready.dek_iv.as_slice()))?;

        let challenge = if B::USES_CHALLENGE {
            Some(ready.node_key.encrypt(CHALLENGE.as_bytes())?)
        } else {
            None
        };

        let (master_key, password) = if weak {
            (
                Some(to_base64(ready.master_key.as_slice())),
                self.password.as_ref().map(|p| p.as_str().to_owned()),
            )
        } else {
            (None, None)
        };

        tracing::debug!("Exported keychain (weak: {})", weak);
        Ok(LockedKeychain {
            salt: to_base64(&ready.salt),
            rsa_keys: RsaKeys {
                private_key: to_base64(sealed.ciphertext),
                public_key: ready.backend.export_public_key()?,
                dek_info: DekInfo::new(to_base64(&ready.dek_iv), to_base64(&ready.dek_salt)),
            },
            node_key: ready.backend.wrap_node_key(&ready.node_key)?,
            master_key,
            password,
            challenge,
        })
    }

    /// Replace the password. The private key is re-wrapped on the next export.
    pub fn change_password(&mut self, old_password: &str, new_password: &str) -> Result<()> {
        if new_password.is_empty() {
            return Err(Error::InvalidPassword);
        }
        if let Some(current) = self.password.as_deref() {
            if !current.is_empty() && current.as_str() != old_password {
                return Err(Error::InvalidPassword);
            }
        }
        let State::Ready(ready) = &mut self.state else {
            return Err(Error::NotInitialized);
        };

        ready.master_key = kdf::master_key(new_password, &ready.salt)?;
        self.password = Some(Zeroizing::new(new_password.to_string()));
        tracing::debug!("Keychain password changed");
        Ok(())
    }

    /// `login` is case sensitive.
    pub fn calculate_login_password_compat(&self, login: &str) -> Result<String> {
        kdf::login_password_compat(self.password()?, login)
    }

    pub fn calculate_login_password(&self) -> Result<String> {
        kdf::login_password(self.password()?)
    }

    fn node_key(&self) -> Result<&NodeKey> {
        match &self.state {
            State::Ready(ready) => Ok(&ready.node_key),
            State::Uninitialized => Err(Error::NodeKeyNotInitialized),
        }
    }

    pub fn encrypt_with_node_key(&self, data: &[u8]) -> Result<String> {
        self.node_key()?.encrypt(data)
    }

    pub fn decrypt_with_node_key(&self, data: &str) -> Result<Vec<u8>> {
        self.node_key()?.decrypt(data)
    }

    pub fn unencrypted_node_key(&self) -> Result<String> {
        Ok(self.node_key()?.to_base64())
    }

    pub fn public_key(&self) -> Result<String> {
        self.ready()?.backend.export_public_key()
    }

    pub fn salt(&self) -> Result<String> {
        Ok(to_base64(&self.ready()?.salt))
    }

    pub fn dek_info(&self) -> Result<DekInfo> {
        let ready = self.ready()?;
        Ok(DekInfo::new(to_base64(&ready.dek_iv), to_base64(&ready.dek_salt)))
    }

    /// Persist a weak export under `item_key`, sealed with `password`.
    pub fn store(&self, store: &mut dyn KeyValueStore, item_key: &str, password: &str) -> Result<()> {
        let json = Zeroizing::new(self.export(true)?.to_json()?);
        let salt = envelope::random_bytes(SESSION_SALT_LEN);
        let key = kdf::session_key(password, &salt)?;
        let sealed = envelope::encrypt(json.as_bytes(), &key, None)?;

        let blob = SessionBlob {
            iv: to_base64(sealed.iv),
            encrypted: to_base64(sealed.ciphertext),
            salt: to_base64(salt),
        };
        store.set_item(item_key, &serde_json::to_string(&blob)?)?;
        tracing::debug!("Stored keychain session under {}", item_key);
        Ok(())
    }

    /// Read back a session written by [`Keychain::store`].
    ///
    /// `Ok(None)` means there is no session under `item_key`.
    pub fn load(store: &dyn KeyValueStore, item_key: &str, password: &str) -> Result<Option<Self>> {
        let Some(item) = store.get_item(item_key)? else {
            return Ok(None);
        };
        let Ok(blob) = serde_json::from_str::<SessionBlob>(&item) else {
            tracing::debug!("Item {} is not a keychain session", item_key);
            return Ok(None);
        };

        let salt = from_base64(&blob.salt)?;
        let key = kdf::session_key(password, &salt)?;
        let json = envelope::decrypt(&from_base64(&blob.encrypted)?, &key, &from_base64(&blob.iv)?)
            .map(Zeroizing::new)
            .map_err(|e| match e {
                Error::DecryptionFailed => Error::InvalidPassword,
                other => other,
            })?;
        let locked: LockedKeychain = serde_json::from_slice(&json).map_err(|_| Error::InvalidPassword)?;

        let mut keychain = Self::default();
        keychain.import(&locked, None)?;
        tracing::debug!("Loaded keychain session from {}", item_key);
        Ok(Some(keychain))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::storage::MemoryStore;

    fn legacy(password: &str) -> LegacyKeychain {
        let mut keychain = LegacyKeychain::new();
        keychain
            .generate_with(
                password,
                &KeychainConfig {
                    rsa_bits: 512,
                    ..KeychainConfig::default()
                },
            )
            .unwrap();
        keychain
    }

    #[test]
    fn test_uninitialized() {
        let keychain = LegacyKeychain::new();
        assert!(!keychain.is_ready());
        assert!(matches!(keychain.export(false), Err(Error::NotInitialized)));
        assert!(matches!(
            keychain.encrypt_with_node_key(b"data"),
            Err(Error::NodeKeyNotInitialized)
        ));
        assert!(matches!(
            keychain.unencrypted_node_key(),
            Err(Error::NodeKeyNotInitialized)
        ));
        assert!(matches!(
            keychain.calculate_login_password(),
            Err(Error::MissingPassword)
        ));
    }

    #[test]
    fn test_generate_rejects_empty_password() {
        let mut keychain = LegacyKeychain::new();
        assert!(matches!(keychain.generate(""), Err(Error::InvalidPassword)));
        assert!(!keychain.is_ready());
    }

    #[test]
    fn test_generated_shape() {
        let keychain = legacy("gigatribe");
        let locked = keychain.export(true).unwrap();
        assert_eq!(44, locked.salt.len());
        assert_eq!(24, locked.master_key.as_ref().unwrap().len());
        assert_eq!(Some("gigatribe".to_string()), locked.password);
        assert_eq!(24, locked.rsa_keys.dek_info.iv.len());
        assert_eq!(12, locked.rsa_keys.dek_info.salt.len());
        assert!(locked.challenge.is_some());

        // legacy node keys are made of base64 characters
        let node_key = from_base64(&keychain.unencrypted_node_key().unwrap()).unwrap();
        assert!(node_key.iter().all(|b| b.is_ascii_graphic()));
    }

    #[rstest]
    #[case::explicit(Some("gigatribe"), false)]
    #[case::embedded(None, true)]
    fn test_import_password_sources(#[case] password: Option<&str>, #[case] weak: bool) {
        let keychain = legacy("gigatribe");
        let locked = keychain.export(weak).unwrap();

        let mut imported = LegacyKeychain::new();
        imported.import(&locked, password).unwrap();
        assert_eq!(
            keychain.unencrypted_node_key().unwrap(),
            imported.unencrypted_node_key().unwrap()
        );
        assert_eq!(keychain.public_key().unwrap(), imported.public_key().unwrap());
    }

    #[test]
    fn test_import_without_password() {
        let locked = legacy("gigatribe").export(false).unwrap();
        let mut imported = LegacyKeychain::new();
        assert!(matches!(imported.import(&locked, None), Err(Error::MissingPassword)));
        assert!(!imported.is_ready());
    }

    #[test]
    fn test_failed_import_keeps_state() {
        let other = legacy("second").export(false).unwrap();

        let mut target = legacy("first");
        let before = target.unencrypted_node_key().unwrap();
        assert!(target.import(&other, Some("wrong")).is_err());
        assert_eq!(before, target.unencrypted_node_key().unwrap());
        assert_eq!(
            "first",
            target.export(true).unwrap().password.unwrap()
        );
    }

    #[test]
    fn test_tampered_challenge() {
        let keychain = legacy("gigatribe");
        let mut locked = keychain.export(false).unwrap();
        locked.challenge = Some(keychain.encrypt_with_node_key(b"something else").unwrap());

        let mut imported = LegacyKeychain::new();
        assert!(matches!(
            imported.import(&locked, Some("gigatribe")),
            Err(Error::ChallengeMismatch)
        ));
    }

    #[test]
    fn test_change_password() {
        let mut keychain = legacy("old");
        assert!(matches!(
            keychain.change_password("not old", "new"),
            Err(Error::InvalidPassword)
        ));
        keychain.change_password("old", "new").unwrap();

        let locked = keychain.export(false).unwrap();
        let mut imported = LegacyKeychain::new();
        imported.import(&locked, Some("new")).unwrap();
        assert!(LegacyKeychain::new().import(&locked, Some("old")).is_err());
    }

    #[test]
    fn test_change_password_uninitialized() {
        let mut keychain = LegacyKeychain::new();
        assert!(matches!(
            keychain.change_password("", "new"),
            Err(Error::NotInitialized)
        ));
    }

    #[test]
    fn test_node_key_round_trip() {
        let keychain = legacy("gigatribe");
        let sealed = keychain.encrypt_with_node_key(b"file key material").unwrap();
        assert_eq!(
            b"file key material".to_vec(),
            keychain.decrypt_with_node_key(&sealed).unwrap()
        );
    }

    #[test]
    fn test_store_and_load() {
        let keychain = legacy("gigatribe");
        let mut store = MemoryStore::new();
        keychain.store(&mut store, "session", "local secret").unwrap();

        let loaded = LegacyKeychain::load(&store, "session", "local secret")
            .unwrap()
            .unwrap();
        assert_eq!(
            keychain.unencrypted_node_key().unwrap(),
            loaded.unencrypted_node_key().unwrap()
        );
        assert_eq!(keychain.salt().unwrap(), loaded.salt().unwrap());
        assert_eq!(
            keychain.calculate_login_password().unwrap(),
            loaded.calculate_login_password().unwrap()
        );
    }

    #[rstest]
    #[case::absent(None)]
    #[case::not_json(Some("plain text"))]
    #[case::other_json(Some(r#"{"theme":"dark"}"#))]
    fn test_load_nothing(#[case] item: Option<&str>) {
        let mut store = MemoryStore::new();
        if let Some(item) = item {
            store.set_item("session", item).unwrap();
        }
        assert!(
            LegacyKeychain::load(&store, "session", "local secret")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_load_wrong_password() {
        let keychain = legacy("gigatribe");
        let mut store = MemoryStore::new();
        keychain.store(&mut store, "session", "local secret").unwrap();
        assert!(LegacyKeychain::load(&store, "session", "guess").is_err());
    }
}
