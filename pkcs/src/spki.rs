//! Subject Public Key Info
//!
//! RFC 5280 Section 4.1.2.7
//!
//! ```asn1
//! SubjectPublicKeyInfo  ::=  SEQUENCE  {
//!     algorithm            AlgorithmIdentifier,
//!     subjectPublicKey     BIT STRING
//! }
//! ```
//!
//! For RSA the BIT STRING holds a DER `RSAPublicKey`.

use sesame::decoder::{DecodableFrom, Decoder};
use sesame::encoder::{EncodableTo, Encoder};
use sesame_der::{Der, DerWriter};
use sesame_pem::{FromPem, Label, Pem, ToPem};

use crate::algorithm::AlgorithmIdentifier;
use crate::error::{Error, Result};
use crate::pkcs1::RsaPublicKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPublicKeyInfo {
    pub algorithm: AlgorithmIdentifier,
    pub subject_public_key: Vec<u8>,
}

impl SubjectPublicKeyInfo {
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let der = Der::parse(bytes)?;
        let elements = der.root().children("SubjectPublicKeyInfo")?;
        if elements.len() != 2 {
            return Err(sesame_der::Error::InvalidElementCount {
                field: "SubjectPublicKeyInfo",
                expected: 2,
                actual: elements.len(),
            }
            .into());
        }
        Ok(SubjectPublicKeyInfo {
            algorithm: AlgorithmIdentifier::from_tlv(&elements[0])?,
            subject_public_key: elements[1].bit_string("subjectPublicKey")?.to_vec(),
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        let mut w = DerWriter::new();
        w.start_sequence();
        self.algorithm.write(&mut w)?;
        w.start_bit_string();
        w.write_raw(&self.subject_public_key);
        w.end()?;
        w.end()?;
        Ok(w.finish()?)
    }
}

impl EncodableTo<RsaPublicKey> for SubjectPublicKeyInfo {}

impl Encoder<RsaPublicKey, SubjectPublicKeyInfo> for RsaPublicKey {
    type Error = Error;

    fn encode(&self) -> Result<SubjectPublicKeyInfo> {
        Ok(SubjectPublicKeyInfo {
            algorithm: AlgorithmIdentifier::rsa_encryption(),
            subject_public_key: self.to_der()?,
        })
    }
}

impl DecodableFrom<SubjectPublicKeyInfo> for RsaPublicKey {}

impl Decoder<SubjectPublicKeyInfo, RsaPublicKey> for SubjectPublicKeyInfo {
    type Error = Error;

    fn decode(&self) -> Result<RsaPublicKey> {
        self.algorithm.expect_rsa()?;
        RsaPublicKey::from_der(&self.subject_public_key)
    }
}

impl ToPem for SubjectPublicKeyInfo {
    type Error = Error;

    fn pem_label(&self) -> Label {
        Label::PublicKey
    }

    fn to_pem(&self) -> Result<Pem> {
        Ok(Pem::from_bytes(self.pem_label(), &self.to_der()?))
    }
}

impl FromPem for SubjectPublicKeyInfo {
    type Error = Error;

    fn expected_label() -> Label {
        Label::PublicKey
    }

    fn from_pem(pem: &Pem) -> Result<Self> {
        if pem.label() != Self::expected_label() {
            return Err(Error::UnexpectedLabel {
                expected: Self::expected_label(),
                actual: pem.label(),
            });
        }
        let bytes: Vec<u8> = pem.decode()?;
        SubjectPublicKeyInfo::from_der(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use sesame::decoder::Decoder;
    use sesame::encoder::Encoder;
    use sesame_pem::{FromPem, Label, Pem, ToPem};

    use super::SubjectPublicKeyInfo;
    use crate::Error;
    use crate::pkcs1::RsaPublicKey;
    use crate::test_keys::{RSA512_PKCS1_PUBLIC_PEM, RSA512_SPKI_PEM, rsa512_components};

    #[test]
    fn test_spki_read_write() {
        let pem = Pem::from_str(RSA512_SPKI_PEM).unwrap();
        let spki = SubjectPublicKeyInfo::from_pem(&pem).unwrap();
        assert!(spki.algorithm.expect_rsa().is_ok());

        let public: RsaPublicKey = spki.decode().unwrap();
        assert_eq!(rsa512_components().public_key(), public);

        let reencoded: SubjectPublicKeyInfo = public.encode().unwrap();
        assert_eq!(pem.data(), reencoded.to_pem().unwrap().data());
    }

    #[test]
    fn test_spki_inner_key_matches_pkcs1_public() {
        let spki = SubjectPublicKeyInfo::from_pem(&Pem::from_str(RSA512_SPKI_PEM).unwrap()).unwrap();
        let pkcs1: Vec<u8> = Pem::from_str(RSA512_PKCS1_PUBLIC_PEM).unwrap().decode().unwrap();
        assert_eq!(pkcs1, spki.subject_public_key);
    }

    #[test]
    fn test_spki_wrong_label() {
        let pem = Pem::from_str(RSA512_PKCS1_PUBLIC_PEM).unwrap();
        assert_eq!(
            Err(Error::UnexpectedLabel {
                expected: Label::PublicKey,
                actual: Label::RSAPublicKey,
            }),
            SubjectPublicKeyInfo::from_pem(&pem)
        );
    }
}
