use sesame_pem::Label;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("DER: {0}")]
    Der(#[from] sesame_der::Error),

    #[error("PEM: {0}")]
    Pem(#[from] sesame_pem::error::Error),

    #[error("unsupported key format: neither PKCS#8 nor PKCS#1")]
    UnsupportedKeyFormat,

    #[error("unexpected algorithm: {0}")]
    UnexpectedAlgorithm(String),

    #[error("invalid version: {0:02x?}")]
    InvalidVersion(Vec<u8>),

    #[error("unexpected PEM label: expected {expected}, got {actual}")]
    UnexpectedLabel { expected: Label, actual: Label },
}

pub type Result<T> = std::result::Result<T, Error>;
