use sesame::decoder::{DecodableFrom, Decoder};
use sesame::encoder::{EncodableTo, Encoder};
use sesame_der::{Der, DerWriter, Tag};
use sesame_pem::{FromPem, Label, Pem, ToPem};

use crate::algorithm::AlgorithmIdentifier;
use crate::error::{Error, Result};
use crate::pkcs1::RsaPrivateComponents;

/*
RFC 5958 - Asymmetric Key Packages

OneAsymmetricKey ::= SEQUENCE {
    version                   Version,
    privateKeyAlgorithm       PrivateKeyAlgorithmIdentifier,
    privateKey                PrivateKey,
    attributes            [0] Attributes OPTIONAL,
    ...,
    [[2: publicKey        [1] PublicKey OPTIONAL ]],
    ...
}

PrivateKeyInfo ::= OneAsymmetricKey

Version ::= INTEGER { v1(0), v2(1) } (v1, ..., v2)

PrivateKey ::= OCTET STRING
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    V1 = 0,
    V2 = 1,
}

impl TryFrom<&[u8]> for Version {
    type Error = Error;

    fn try_from(content: &[u8]) -> Result<Self> {
        match content {
            [0x00] => Ok(Version::V1),
            [0x01] => Ok(Version::V2),
            _ => Err(Error::InvalidVersion(content.to_vec())),
        }
    }
}

/// Unencrypted PKCS#8 key. Attributes and the optional public key of v2
/// documents are accepted on read and not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKeyInfo {
    pub version: Version,
    pub algorithm: AlgorithmIdentifier,
    /// Content of the privateKey OCTET STRING, a DER RSAPrivateKey for RSA.
    pub private_key: Vec<u8>,
}

impl PrivateKeyInfo {
    /// Parses the document and checks the algorithm is rsaEncryption.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let der = Der::parse(bytes)?;
        let elements = der.root().children("PrivateKeyInfo")?;
        if elements.len() < 3 {
            return Err(sesame_der::Error::InvalidElementCount {
                field: "PrivateKeyInfo",
                expected: 3,
                actual: elements.len(),
            }
            .into());
        }

        let version = Version::try_from(elements[0].integer("version")?)?;
        let algorithm = AlgorithmIdentifier::from_tlv(&elements[1])?;
        algorithm.expect_rsa()?;
        let private_key = elements[2].data(Tag::OctetString, "privateKey")?.to_vec();

        Ok(PrivateKeyInfo {
            version,
            algorithm,
            private_key,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        let mut w = DerWriter::new();
        w.start_sequence();
        w.write_integer(&[self.version as u8])?;
        self.algorithm.write(&mut w)?;
        w.write_primitive(Tag::OctetString, &self.private_key)?;
        w.end()?;
        Ok(w.finish()?)
    }
}

/// Writes PKCS#1 components straight into a PKCS#8 document in one pass.
pub fn write_pkcs8_private_key(components: &RsaPrivateComponents) -> Result<Vec<u8>> {
    let mut w = DerWriter::new();
    w.start_sequence();
    w.write_integer(&[Version::V1 as u8])?;
    AlgorithmIdentifier::rsa_encryption().write(&mut w)?;
    w.start_octet_string();
    components.write(&mut w)?;
    w.end()?;
    w.end()?;
    Ok(w.finish()?)
}

impl EncodableTo<RsaPrivateComponents> for PrivateKeyInfo {}

impl Encoder<RsaPrivateComponents, PrivateKeyInfo> for RsaPrivateComponents {
    type Error = Error;

    fn encode(&self) -> Result<PrivateKeyInfo> {
        Ok(PrivateKeyInfo {
            version: Version::V1,
            algorithm: AlgorithmIdentifier::rsa_encryption(),
            private_key: self.to_der()?,
        })
    }
}

impl DecodableFrom<PrivateKeyInfo> for RsaPrivateComponents {}

impl Decoder<PrivateKeyInfo, RsaPrivateComponents> for PrivateKeyInfo {
    type Error = Error;

    fn decode(&self) -> Result<RsaPrivateComponents> {
        self.algorithm.expect_rsa()?;
        RsaPrivateComponents::from_der(&self.private_key)
    }
}

impl ToPem for PrivateKeyInfo {
    type Error = Error;

    fn pem_label(&self) -> Label {
        Label::PrivateKey
    }

    fn to_pem(&self) -> Result<Pem> {
        Ok(Pem::from_bytes(self.pem_label(), &self.to_der()?))
    }
}

impl FromPem for PrivateKeyInfo {
    type Error = Error;

    fn expected_label() -> Label {
        Label::PrivateKey
    }

    fn from_pem(pem: &Pem) -> Result<Self> {
        if pem.label() != Self::expected_label() {
            return Err(Error::UnexpectedLabel {
                expected: Self::expected_label(),
                actual: pem.label(),
            });
        }
        let bytes: Vec<u8> = pem.decode()?;
        PrivateKeyInfo::from_der(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use sesame::decoder::Decoder;
    use sesame::encoder::Encoder;
    use sesame_pem::{FromPem, Pem, ToPem, from_base64};

    use super::{PrivateKeyInfo, Version, write_pkcs8_private_key};
    use crate::Error;
    use crate::pkcs1::RsaPrivateComponents;
    use crate::test_keys::{RSA512_PKCS1_PEM, RSA512_PKCS8_PEM, rsa512_components};

    #[test]
    fn test_write_pkcs8_matches_reference_encoding() {
        let expected = from_base64(Pem::from_str(RSA512_PKCS8_PEM).unwrap().data()).unwrap();
        let written = write_pkcs8_private_key(&rsa512_components()).unwrap();
        assert_eq!(expected, written);
        // 0x82 long form on both the outer SEQUENCE and the OCTET STRING
        assert_eq!(&[0x30, 0x82, 0x01, 0x55], &written[..4]);
    }

    #[test]
    fn test_pkcs8_read_write() {
        let pem = Pem::from_str(RSA512_PKCS8_PEM).unwrap();
        let info = PrivateKeyInfo::from_pem(&pem).unwrap();
        assert_eq!(Version::V1, info.version);

        let components: RsaPrivateComponents = info.decode().unwrap();
        assert_eq!(rsa512_components(), components);

        let reencoded: PrivateKeyInfo = components.encode().unwrap();
        assert_eq!(info, reencoded);
        assert_eq!(pem.data(), reencoded.to_pem().unwrap().data());
    }

    #[test]
    fn test_pkcs1_to_pkcs8_transcode() {
        let pkcs1: RsaPrivateComponents = Pem::from_str(RSA512_PKCS1_PEM).unwrap().decode().unwrap();
        let pkcs8 = write_pkcs8_private_key(&pkcs1).unwrap();
        let back: RsaPrivateComponents = PrivateKeyInfo::from_der(&pkcs8).unwrap().decode().unwrap();
        assert_eq!(pkcs1, back);
    }

    #[rstest]
    #[case::version_two(vec![0x02], Error::InvalidVersion(vec![0x02]))]
    #[case::long_version(vec![0x00, 0x00], Error::InvalidVersion(vec![0x00, 0x00]))]
    fn test_pkcs8_invalid_version(#[case] version: Vec<u8>, #[case] expected: Error) {
        let mut der = write_pkcs8_private_key(&rsa512_components()).unwrap();
        // outer header 30 82 01 55, then 02 01 00
        assert_eq!(&[0x02, 0x01, 0x00], &der[4..7]);
        if version.len() == 1 {
            der[6] = version[0];
        } else {
            let info = PrivateKeyInfo::from_der(&der).unwrap();
            let mut w = sesame_der::DerWriter::new();
            w.start_sequence();
            w.write_integer(&version).unwrap();
            info.algorithm.write(&mut w).unwrap();
            w.write_primitive(sesame_der::Tag::OctetString, &info.private_key)
                .unwrap();
            w.end().unwrap();
            der = w.finish().unwrap();
        }
        assert_eq!(Err(expected), PrivateKeyInfo::from_der(&der));
    }

    #[test]
    fn test_pkcs8_non_rsa_algorithm() {
        let info = PrivateKeyInfo {
            version: Version::V1,
            algorithm: crate::AlgorithmIdentifier {
                algorithm: "1.3.101.112".parse().unwrap(),
                null_parameters: false,
            },
            private_key: vec![0x04, 0x00],
        };
        let der = info.to_der().unwrap();
        assert_eq!(
            Err(Error::UnexpectedAlgorithm("1.3.101.112".to_string())),
            PrivateKeyInfo::from_der(&der)
        );
    }

    #[test]
    fn test_pkcs1_der_is_not_pkcs8() {
        let pkcs1 = rsa512_components().to_der().unwrap();
        assert!(PrivateKeyInfo::from_der(&pkcs1).is_err());
    }
}
