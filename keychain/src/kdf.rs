//! PBKDF2-HMAC-SHA256 derivations used across the keychain.
//!
//! All derivations take the password as UTF-8 and produce `ceil(bits / 8)`
//! bytes. Several salts are built from text rather than raw bytes to stay
//! compatible with keychains created by other clients.

use pbkdf2::pbkdf2_hmac;
use sesame_pem::{from_base64, to_base64};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

pub const MASTER_KEY_ITERATIONS: u32 = 1024;
pub const MASTER_KEY_BITS: usize = 128;

const LOGIN_COMPAT_SALT_SUFFIX: &str = "\"D<?4'V%Fh(U,9SjdO4v)|1mJV31]#;W";
const LOGIN_SALT: &str = "uh7rPXycB9uxLtRHoLFo1OwOyyHr+UTg";
const LOGIN_ITERATIONS: u32 = 512;
const LOGIN_BITS: usize = 192;

const FILE_KEY_SALT: &str = "={w|>6L:{Xn;HAKf^w=,fgSX}sfw)`hxopaqk.6Hg';w23\"sd+b07`LSOGqz#-)[";
const FILE_ID_SALT: &str = "5%;[yw\"XG2&Om#i*T$v.B2'Ae/VST4t#u$@pxsauO,H){`hUd7Xu@4q4WCc<>'ie";
const FILE_ITERATIONS: u32 = 32;
const FILE_BITS: usize = 144;

/// PBKDF2-HMAC-SHA256 of `password` truncated to `bits`.
///
/// When `bits` is not a multiple of eight the unused low bits of the last
/// byte are cleared.
pub fn derive_key(password: &[u8], salt: &[u8], iterations: u32, bits: usize) -> Result<Vec<u8>> {
    if salt.is_empty() {
        return Err(Error::InvalidParameters("salt must not be empty"));
    }
    if iterations == 0 {
        return Err(Error::InvalidParameters("iteration count must be positive"));
    }
    if bits == 0 {
        return Err(Error::InvalidParameters("output length must be positive"));
    }

    let mut out = vec![0u8; bits.div_ceil(8)];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
    let spare = out.len() * 8 - bits;
    if spare > 0 {
        if let Some(last) = out.last_mut() {
            *last &= 0xffu8 << spare;
        }
    }
    Ok(out)
}

/// Master key for a profile. The salt enters PBKDF2 as its base64 text.
pub fn master_key(password: &str, profile_salt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let salt = to_base64(profile_salt);
    derive_key(
        password.as_bytes(),
        salt.as_bytes(),
        MASTER_KEY_ITERATIONS,
        MASTER_KEY_BITS,
    )
    .map(Zeroizing::new)
}

/// AES key wrapping the serialized private key.
pub fn wrap_key(master_key: &[u8], dek_salt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let password = Zeroizing::new(to_base64(master_key));
    derive_key(
        password.as_bytes(),
        dek_salt,
        MASTER_KEY_ITERATIONS,
        MASTER_KEY_BITS,
    )
    .map(Zeroizing::new)
}

/// Login password understood by existing servers. `login` is case sensitive.
pub fn login_password_compat(password: &str, login: &str) -> Result<String> {
    let salt = format!("{login}{LOGIN_COMPAT_SALT_SUFFIX}");
    let key = derive_key(
        password.as_bytes(),
        salt.as_bytes(),
        MASTER_KEY_ITERATIONS,
        MASTER_KEY_BITS,
    )?;
    Ok(to_base64(key))
}

/// Login password with a fixed salt, independent of the login name.
pub fn login_password(password: &str) -> Result<String> {
    let salt = from_base64(LOGIN_SALT)?;
    let key = derive_key(password.as_bytes(), &salt, LOGIN_ITERATIONS, LOGIN_BITS)?;
    Ok(to_base64(key))
}

/// Per-file encryption key derived from the file's SHA-1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileKey(String);

/// Per-file identifier derived from the file's SHA-1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileId(String);

impl FileKey {
    pub fn from_sha1_hex(sha1: &str) -> Result<Self> {
        file_derivation(sha1, FILE_KEY_SALT).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FileId {
    pub fn from_sha1_hex(sha1: &str) -> Result<Self> {
        file_derivation(sha1, FILE_ID_SALT).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn file_derivation(sha1: &str, salt: &str) -> Result<String> {
    let sha1 = sha1.to_lowercase();
    let key = derive_key(sha1.as_bytes(), salt.as_bytes(), FILE_ITERATIONS, FILE_BITS)?;
    Ok(to_base64(key))
}

/// Key sealing a persisted session blob.
pub fn session_key(password: &str, session_salt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    derive_key(
        password.as_bytes(),
        session_salt,
        MASTER_KEY_ITERATIONS,
        MASTER_KEY_BITS,
    )
    .map(Zeroizing::new)
}
