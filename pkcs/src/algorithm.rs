use sesame_der::{DerWriter, ObjectIdentifier, Tag, Tlv};

use crate::error::{Error, Result};

/*
RFC 5280 Section 4.1.1.2

AlgorithmIdentifier  ::=  SEQUENCE  {
    algorithm               OBJECT IDENTIFIER,
    parameters              ANY DEFINED BY algorithm OPTIONAL
}

For rsaEncryption the parameters field is NULL (RFC 8017 Appendix C).
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifier,
    pub null_parameters: bool,
}

impl AlgorithmIdentifier {
    pub fn rsa_encryption() -> Self {
        AlgorithmIdentifier {
            algorithm: ObjectIdentifier::rsa_encryption(),
            null_parameters: true,
        }
    }

    /// Fails with [`Error::UnexpectedAlgorithm`] for anything but rsaEncryption.
    pub fn expect_rsa(&self) -> Result<()> {
        if self.algorithm != ObjectIdentifier::rsa_encryption() {
            return Err(Error::UnexpectedAlgorithm(self.algorithm.to_string()));
        }
        Ok(())
    }

    pub(crate) fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let children = tlv.children("AlgorithmIdentifier")?;
        let algorithm = children
            .first()
            .ok_or(sesame_der::Error::InvalidElementCount {
                field: "AlgorithmIdentifier",
                expected: 1,
                actual: 0,
            })?
            .object_identifier("algorithm")?;
        let null_parameters = match children.get(1) {
            None => false,
            Some(params) => {
                params.expect(Tag::Null, "parameters")?;
                true
            }
        };
        Ok(AlgorithmIdentifier {
            algorithm,
            null_parameters,
        })
    }

    pub(crate) fn write(&self, w: &mut DerWriter) -> Result<()> {
        w.start_sequence();
        w.write_oid(&self.algorithm)?;
        if self.null_parameters {
            w.write_null()?;
        }
        w.end()?;
        Ok(())
    }
}
