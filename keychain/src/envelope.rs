//! AES-CBC with PKCS#7 padding. The AES variant follows the key length.

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

pub const BLOCK_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
}

/// Encrypt `plaintext`; a fresh random IV is used when `iv` is `None`.
pub fn encrypt(plaintext: &[u8], key: &[u8], iv: Option<&[u8]>) -> Result<Envelope> {
    let iv = match iv {
        Some(iv) => iv.to_vec(),
        None => random_bytes(BLOCK_SIZE),
    };
    check_iv(&iv)?;

    let ciphertext = match key.len() {
        16 => cbc::Encryptor::<Aes128>::new_from_slices(key, &iv)
            .map_err(|_| Error::InvalidParameters("AES key"))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        24 => cbc::Encryptor::<Aes192>::new_from_slices(key, &iv)
            .map_err(|_| Error::InvalidParameters("AES key"))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        32 => cbc::Encryptor::<Aes256>::new_from_slices(key, &iv)
            .map_err(|_| Error::InvalidParameters("AES key"))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        _ => return Err(Error::InvalidParameters("AES key must be 16, 24 or 32 bytes")),
    };
    Ok(Envelope { ciphertext, iv })
}

pub fn decrypt(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_iv(iv)?;
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::DecryptionFailed);
    }

    let plaintext = match key.len() {
        16 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| Error::InvalidParameters("AES key"))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        24 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| Error::InvalidParameters("AES key"))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        32 => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| Error::InvalidParameters("AES key"))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        _ => return Err(Error::InvalidParameters("AES key must be 16, 24 or 32 bytes")),
    };
    plaintext.map_err(|_| Error::DecryptionFailed)
}

fn check_iv(iv: &[u8]) -> Result<()> {
    if iv.len() != BLOCK_SIZE {
        return Err(Error::InvalidParameters("IV must be 16 bytes"));
    }
    Ok(())
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    buf
}
