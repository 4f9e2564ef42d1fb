use std::{fmt::Display, str::FromStr};

use crate::error::{Error, Result};

/// rsaEncryption
pub const RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    arcs: Vec<u64>,
}

impl ObjectIdentifier {
    /// 1.2.840.113549.1.1.1
    pub fn rsa_encryption() -> Self {
        ObjectIdentifier {
            arcs: vec![1, 2, 840, 113549, 1, 1, 1],
        }
    }

    /// Decodes the content octets of an OBJECT IDENTIFIER.
    pub fn from_der_content(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidObjectIdentifier("empty".to_string()));
        }
        if data.last().is_some_and(|b| b & 0x80 != 0) {
            return Err(Error::InvalidObjectIdentifier(
                "unterminated subidentifier".to_string(),
            ));
        }

        let mut subidentifiers = Vec::new();
        let mut current: u64 = 0;
        for &b in data {
            if current == 0 && b == 0x80 {
                return Err(Error::InvalidObjectIdentifier(
                    "non-minimal subidentifier".to_string(),
                ));
            }
            current = current
                .checked_mul(128)
                .map(|c| c | (b & 0x7f) as u64)
                .ok_or_else(|| Error::InvalidObjectIdentifier("arc overflow".to_string()))?;
            if b & 0x80 == 0 {
                subidentifiers.push(current);
                current = 0;
            }
        }

        // The first subidentifier packs the first two arcs.
        let first = subidentifiers[0];
        let (a, b) = match first {
            0..40 => (0, first),
            40..80 => (1, first - 40),
            _ => (2, first - 80),
        };
        let mut arcs = vec![a, b];
        arcs.extend_from_slice(&subidentifiers[1..]);
        Ok(ObjectIdentifier { arcs })
    }

    /// Encodes the content octets (without tag and length).
    pub fn to_der_content(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let first = self.arcs[0] * 40 + self.arcs[1];
        encode_base128(first, &mut out);
        for &arc in &self.arcs[2..] {
            encode_base128(arc, &mut out);
        }
        out
    }
}

fn encode_base128(mut value: u64, out: &mut Vec<u8>) {
    let mut buf = vec![(value & 0x7f) as u8];
    value >>= 7;
    while value > 0 {
        buf.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    buf.reverse();
    out.extend_from_slice(&buf);
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let arcs = s
            .split('.')
            .map(|arc| arc.parse::<u64>())
            .collect::<std::result::Result<Vec<u64>, _>>()
            .map_err(|_| Error::InvalidObjectIdentifier(s.to_string()))?;
        if arcs.len() < 2
            || arcs[0] > 2
            || (arcs[0] < 2 && arcs[1] >= 40)
            || arcs[1] > u64::MAX - 80
        {
            return Err(Error::InvalidObjectIdentifier(s.to_string()));
        }
        Ok(ObjectIdentifier { arcs })
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arcs: Vec<String> = self.arcs.iter().map(u64::to_string).collect();
        write!(f, "{}", arcs.join("."))
    }
}
