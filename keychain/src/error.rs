use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid password")]
    InvalidPassword,

    #[error("a password is required for this operation")]
    MissingPassword,

    #[error("missing key material: {0}")]
    MissingKeyMaterial(&'static str),

    #[error("the keychain is not initialized")]
    NotInitialized,

    #[error("the node key is not initialized")]
    NodeKeyNotInitialized,

    #[error("no RSA key has been generated or imported")]
    KeyNotInitialized,

    #[error("challenge verification failed")]
    ChallengeMismatch,

    #[error("node key must be 32 bytes, got {0}")]
    NodeKeyLengthMismatch(usize),

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("invalid parameters: {0}")]
    InvalidParameters(&'static str),

    #[error("unsupported private key format")]
    UnsupportedKeyFormat,

    #[error("RSA: {0}")]
    Rsa(#[from] rsa::Error),

    #[error("key encoding: {0}")]
    KeyEncoding(String),

    #[error("PKCS: {0}")]
    Pkcs(#[from] sesame_pkcs::Error),

    #[error("PEM/base64: {0}")]
    Pem(#[from] sesame_pem::error::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
