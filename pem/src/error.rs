use base64::DecodeError;
use thiserror::Error;

/// Errors that can occur when parsing PEM text or decoding base64.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Missing the opening boundary marker (e.g., `-----BEGIN PUBLIC KEY-----`)
    #[error("missing a pre encapsulation boundary")]
    MissingPreEncapsulationBoundary,

    /// Missing the closing boundary marker (e.g., `-----END PUBLIC KEY-----`)
    #[error("missing a post encapsulation boundary")]
    MissingPostEncapsulationBoundary,

    /// No data found between boundary markers
    #[error("missing PEM data")]
    MissingData,

    /// The label in the boundary marker is not one of the key labels we handle
    #[error("invalid label")]
    InvalidLabel,

    /// The BEGIN and END labels do not match
    #[error("label doesn't match")]
    LabelMissMatch,

    /// Malformed or misplaced boundary marker
    #[error("invalid encapsulation boundary")]
    InvalidEncapsulationBoundary,

    /// A line between the boundaries contains non-base64 characters
    #[error("invalid base64 line")]
    InvalidBase64Line,

    #[error("base64 decode: {0}")]
    Base64Decode(DecodeError),
}
