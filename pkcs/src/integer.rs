/// Content octets of a DER INTEGER, kept exactly as they were read.
///
/// The reader never strips or pads, so a value read from a key and written
/// back produces the same bytes. Use [`Integer::from_unsigned_be`] when the
/// value comes from a big-number library instead of a DER document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integer(Vec<u8>);

impl Integer {
    /// Minimal two's-complement form of a non-negative magnitude.
    pub fn from_unsigned_be(magnitude: &[u8]) -> Self {
        let start = magnitude
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(magnitude.len());
        let trimmed = &magnitude[start..];
        match trimmed.first() {
            None => Integer(vec![0x00]),
            Some(&b) if b & 0x80 != 0 => {
                let mut content = Vec::with_capacity(trimmed.len() + 1);
                content.push(0x00);
                content.extend_from_slice(trimmed);
                Integer(content)
            }
            Some(_) => Integer(trimmed.to_vec()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Magnitude without sign padding.
    pub fn to_unsigned_be(&self) -> &[u8] {
        let start = self.0.iter().position(|&b| b != 0).unwrap_or(self.0.len());
        &self.0[start..]
    }
}

impl From<Vec<u8>> for Integer {
    fn from(content: Vec<u8>) -> Self {
        Integer(content)
    }
}

impl From<&[u8]> for Integer {
    fn from(content: &[u8]) -> Self {
        Integer(content.to_vec())
    }
}
