use sesame::decoder::{DecodableFrom, Decoder};
use sesame_der::{Der, DerWriter, Tlv};
use sesame_pem::{FromPem, Label, Pem, ToPem};

use crate::error::{Error, Result};
use crate::integer::Integer;

/*
RFC 8017 - PKCS #1: RSA Cryptography Specifications

RSAPrivateKey ::= SEQUENCE {
    version           Version,
    modulus           INTEGER,  -- n
    publicExponent    INTEGER,  -- e
    privateExponent   INTEGER,  -- d
    prime1            INTEGER,  -- p
    prime2            INTEGER,  -- q
    exponent1         INTEGER,  -- d mod (p-1)
    exponent2         INTEGER,  -- d mod (q-1)
    coefficient       INTEGER,  -- (inverse of q) mod p
    otherPrimeInfos   OtherPrimeInfos OPTIONAL
}

RSAPublicKey ::= SEQUENCE {
    modulus           INTEGER,  -- n
    publicExponent    INTEGER   -- e
}
*/

const RSA_PRIVATE_KEY_FIELDS: usize = 9;

/// PKCS#1 RSAPrivateKey with every field kept as raw INTEGER content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPrivateComponents {
    pub version: Integer,
    pub modulus: Integer,          // n
    pub public_exponent: Integer,  // e
    pub private_exponent: Integer, // d
    pub prime1: Integer,           // p
    pub prime2: Integer,           // q
    pub exponent1: Integer,        // d mod (p-1)
    pub exponent2: Integer,        // d mod (q-1)
    pub coefficient: Integer,      // (inverse of q) mod p
                                   // otherPrimeInfos is ignored
}

impl RsaPrivateComponents {
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let der = Der::parse(bytes)?;
        Self::from_tlv(der.root())
    }

    pub(crate) fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let elements = tlv.children("RSAPrivateKey")?;
        if elements.len() < RSA_PRIVATE_KEY_FIELDS {
            return Err(sesame_der::Error::InvalidElementCount {
                field: "RSAPrivateKey",
                expected: RSA_PRIVATE_KEY_FIELDS,
                actual: elements.len(),
            }
            .into());
        }

        let get_integer =
            |idx: usize, field: &'static str| -> Result<Integer> {
                Ok(Integer::from(elements[idx].integer(field)?))
            };

        Ok(RsaPrivateComponents {
            version: get_integer(0, "version")?,
            modulus: get_integer(1, "modulus")?,
            public_exponent: get_integer(2, "publicExponent")?,
            private_exponent: get_integer(3, "privateExponent")?,
            prime1: get_integer(4, "prime1")?,
            prime2: get_integer(5, "prime2")?,
            exponent1: get_integer(6, "exponent1")?,
            exponent2: get_integer(7, "exponent2")?,
            coefficient: get_integer(8, "coefficient")?,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        let mut w = DerWriter::new();
        self.write(&mut w)?;
        Ok(w.finish()?)
    }

    pub(crate) fn write(&self, w: &mut DerWriter) -> Result<()> {
        w.start_sequence();
        for field in [
            &self.version,
            &self.modulus,
            &self.public_exponent,
            &self.private_exponent,
            &self.prime1,
            &self.prime2,
            &self.exponent1,
            &self.exponent2,
            &self.coefficient,
        ] {
            w.write_integer(field.as_bytes())?;
        }
        w.end()?;
        Ok(())
    }

    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey {
            modulus: self.modulus.clone(),
            public_exponent: self.public_exponent.clone(),
        }
    }
}

impl DecodableFrom<Der> for RsaPrivateComponents {}

impl Decoder<Der, RsaPrivateComponents> for Der {
    type Error = Error;

    fn decode(&self) -> Result<RsaPrivateComponents> {
        RsaPrivateComponents::from_tlv(self.root())
    }
}

impl DecodableFrom<Pem> for RsaPrivateComponents {}

impl Decoder<Pem, RsaPrivateComponents> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<RsaPrivateComponents> {
        RsaPrivateComponents::from_pem(self)
    }
}

impl ToPem for RsaPrivateComponents {
    type Error = Error;

    fn pem_label(&self) -> Label {
        Label::RSAPrivateKey
    }

    fn to_pem(&self) -> Result<Pem> {
        Ok(Pem::from_bytes(self.pem_label(), &self.to_der()?))
    }
}

impl FromPem for RsaPrivateComponents {
    type Error = Error;

    fn expected_label() -> Label {
        Label::RSAPrivateKey
    }

    fn from_pem(pem: &Pem) -> Result<Self> {
        if pem.label() != Self::expected_label() {
            return Err(Error::UnexpectedLabel {
                expected: Self::expected_label(),
                actual: pem.label(),
            });
        }
        let der: Der = pem.decode()?;
        der.decode()
    }
}

/// PKCS#1 RSAPublicKey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub modulus: Integer,
    pub public_exponent: Integer,
}

impl RsaPublicKey {
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let der = Der::parse(bytes)?;
        let elements = der.root().children("RSAPublicKey")?;
        if elements.len() != 2 {
            return Err(sesame_der::Error::InvalidElementCount {
                field: "RSAPublicKey",
                expected: 2,
                actual: elements.len(),
            }
            .into());
        }
        Ok(RsaPublicKey {
            modulus: Integer::from(elements[0].integer("modulus")?),
            public_exponent: Integer::from(elements[1].integer("publicExponent")?),
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        let mut w = DerWriter::new();
        w.start_sequence();
        w.write_integer(self.modulus.as_bytes())?;
        w.write_integer(self.public_exponent.as_bytes())?;
        w.end()?;
        Ok(w.finish()?)
    }
}

impl ToPem for RsaPublicKey {
    type Error = Error;

    fn pem_label(&self) -> Label {
        Label::RSAPublicKey
    }

    fn to_pem(&self) -> Result<Pem> {
        Ok(Pem::from_bytes(self.pem_label(), &self.to_der()?))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use sesame::decoder::Decoder;
    use sesame_der::Tag;
    use sesame_pem::{Label, Pem, ToPem};

    use super::{RsaPrivateComponents, RsaPublicKey};
    use crate::Error;
    use crate::test_keys::{RSA512_PKCS1_PEM, rsa512_components};

    #[test]
    fn test_decode_pkcs1_pem() {
        let pem = Pem::from_str(RSA512_PKCS1_PEM).unwrap();
        let key: RsaPrivateComponents = pem.decode().unwrap();
        assert_eq!(rsa512_components(), key);
        assert_eq!(&[0x01, 0x00, 0x01], key.public_exponent.as_bytes());
        // leading sign byte kept as read
        assert_eq!(0x00, key.modulus.as_bytes()[0]);
        assert_eq!(65, key.modulus.as_bytes().len());
    }

    #[test]
    fn test_pkcs1_write_read() {
        let components = rsa512_components();
        let der = components.to_der().unwrap();
        assert_eq!(components, RsaPrivateComponents::from_der(&der).unwrap());

        let pem = components.to_pem().unwrap();
        assert_eq!(Label::RSAPrivateKey, pem.label());
        assert_eq!(
            Pem::from_str(RSA512_PKCS1_PEM).unwrap().data(),
            pem.data()
        );
    }

    #[rstest]
    #[case::too_few_fields(
        vec![0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x05],
        Error::Der(sesame_der::Error::InvalidElementCount { field: "RSAPrivateKey", expected: 9, actual: 2 })
    )]
    #[case::not_a_sequence(
        vec![0x02, 0x01, 0x00],
        Error::Der(sesame_der::Error::UnexpectedTag { field: "RSAPrivateKey", expected: Tag::Sequence, actual: Tag::Integer })
    )]
    #[case::indefinite_length(
        vec![0x30, 0x80, 0x02, 0x01, 0x00, 0x00, 0x00],
        Error::Der(sesame_der::Error::MalformedAsn1("indefinite length is not allowed in DER"))
    )]
    #[case::truncated(
        vec![0x30, 0x82, 0x01, 0x00, 0x02, 0x01, 0x00],
        Error::Der(sesame_der::Error::MalformedAsn1("truncated input"))
    )]
    fn test_pkcs1_from_der_error(#[case] input: Vec<u8>, #[case] expected: Error) {
        assert_eq!(Err(expected), RsaPrivateComponents::from_der(&input));
    }

    #[test]
    fn test_pkcs1_wrong_field_tag() {
        let mut der = rsa512_components().to_der().unwrap();
        // first INTEGER (version) becomes an OCTET STRING
        let version_at = der.iter().position(|&b| b == 0x02).unwrap();
        der[version_at] = 0x04;
        assert_eq!(
            Err(Error::Der(sesame_der::Error::UnexpectedTag {
                field: "version",
                expected: Tag::Integer,
                actual: Tag::OctetString,
            })),
            RsaPrivateComponents::from_der(&der)
        );
    }

    #[test]
    fn test_pkcs1_pem_wrong_label() {
        let pem = Pem::new(
            Label::PrivateKey,
            Pem::from_str(RSA512_PKCS1_PEM).unwrap().data().to_string(),
        );
        let res: Result<RsaPrivateComponents, Error> = pem.decode();
        assert_eq!(
            Err(Error::UnexpectedLabel {
                expected: Label::RSAPrivateKey,
                actual: Label::PrivateKey,
            }),
            res
        );
    }

    #[test]
    fn test_public_key_roundtrip() {
        let public = rsa512_components().public_key();
        let der = public.to_der().unwrap();
        assert_eq!(public, RsaPublicKey::from_der(&der).unwrap());
        assert_eq!(Label::RSAPublicKey, public.to_pem().unwrap().label());
    }
}
