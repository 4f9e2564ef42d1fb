//! # sesame
//!
//! Conversion traits shared by the sesame keychain crates.
//!
//! Every layer of the keychain is a chain of typed conversions. Unlocking
//! a private key walks down the chain, exporting one walks back up:
//!
//! ```text
//! &str → Pem → Vec<u8> → Der → RsaPrivateComponents → PrivateKeyInfo
//! ```
//!
//! Each step implements [`decoder::Decoder`] in the forward direction and
//! [`encoder::Encoder`] in the reverse direction. The marker traits
//! [`decoder::DecodableFrom`] and [`encoder::EncodableTo`] restrict the
//! pairs that may be converted, so an invalid conversion is a compile
//! error rather than a runtime one.
//!
//! ```ignore
//! use sesame::decoder::Decoder;
//! use sesame_der::Der;
//!
//! let bytes: &[u8] = &[0x30, 0x00];
//! let der: Der = bytes.decode().unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;
