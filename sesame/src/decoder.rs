//! Decoder trait for type-safe conversions.
//!
//! `Decoder<T, D>` converts a source `T` into a destination `D`. The
//! destination has to opt in through `DecodableFrom<T>`:
//!
//! ```no_run
//! use sesame::decoder::{DecodableFrom, Decoder};
//!
//! struct Armored(String);
//! struct Raw(Vec<u8>);
//!
//! #[derive(Debug)]
//! struct ArmorError;
//!
//! impl DecodableFrom<Armored> for Raw {}
//!
//! impl Decoder<Armored, Raw> for Armored {
//!     type Error = ArmorError;
//!
//!     fn decode(&self) -> Result<Raw, Self::Error> {
//!         Ok(Raw(self.0.as_bytes().to_vec()))
//!     }
//! }
//! ```

/// Converts `self` (of type `T`) into `D`.
///
/// A source type may implement several decoders; the destination is then
/// picked by type annotation:
///
/// ```ignore
/// let bytes: Vec<u8> = pem.decode()?;
/// let key: RsaPrivateComponents = pem.decode()?;
/// ```
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into `D`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is not a valid encoding of `D`.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait: `Self` can be decoded from `T`.
pub trait DecodableFrom<T> {}
