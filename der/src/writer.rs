use crate::{
    Tag,
    error::{Error, Result},
    oid::ObjectIdentifier,
};

/// Largest content length the writer emits (three length octets).
const MAX_CONTENT_LENGTH: usize = 0xFF_FFFF;

/// Streaming DER writer.
///
/// Constructed elements are opened with one of the `start_*` methods and
/// closed with [`DerWriter::end`]. Content is appended to one flat buffer;
/// closing an element splices its minimal-length header in front of the
/// content, so nesting never needs a second pass.
///
/// ```
/// use sesame_der::DerWriter;
///
/// let mut w = DerWriter::new();
/// w.start_sequence();
/// w.write_integer(&[0x00]).unwrap();
/// w.write_null().unwrap();
/// w.end().unwrap();
/// assert_eq!(vec![0x30, 0x05, 0x02, 0x01, 0x00, 0x05, 0x00], w.finish().unwrap());
/// ```
#[derive(Debug, Default)]
pub struct DerWriter {
    data: Vec<u8>,
    open: Vec<usize>,
}

impl DerWriter {
    pub fn new() -> Self {
        DerWriter::default()
    }

    pub fn start_sequence(&mut self) -> &mut Self {
        self.begin(Tag::Sequence)
    }

    pub fn start_octet_string(&mut self) -> &mut Self {
        self.begin(Tag::OctetString)
    }

    /// Opens a BIT STRING with zero unused bits.
    pub fn start_bit_string(&mut self) -> &mut Self {
        self.begin(Tag::BitString);
        self.data.push(0x00);
        self
    }

    pub fn begin(&mut self, tag: Tag) -> &mut Self {
        self.data.push(tag.into());
        self.open.push(self.data.len());
        self
    }

    /// Closes the innermost open element.
    pub fn end(&mut self) -> Result<&mut Self> {
        let start = self.open.pop().ok_or(Error::NoOpenSequence)?;
        let header = encode_length(self.data.len() - start)?;
        self.data.splice(start..start, header);
        Ok(self)
    }

    /// Writes an INTEGER whose content octets are already in DER form.
    pub fn write_integer(&mut self, content: &[u8]) -> Result<&mut Self> {
        self.write_primitive(Tag::Integer, content)
    }

    pub fn write_null(&mut self) -> Result<&mut Self> {
        self.write_primitive(Tag::Null, &[])
    }

    pub fn write_oid(&mut self, oid: &ObjectIdentifier) -> Result<&mut Self> {
        self.write_primitive(Tag::ObjectIdentifier, &oid.to_der_content())
    }

    pub fn write_primitive(&mut self, tag: Tag, content: &[u8]) -> Result<&mut Self> {
        let header = encode_length(content.len())?;
        self.data.push(tag.into());
        self.data.extend_from_slice(&header);
        self.data.extend_from_slice(content);
        Ok(self)
    }

    /// Appends bytes that are already DER (or BIT STRING payload).
    pub fn write_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        if !self.open.is_empty() {
            return Err(Error::UnclosedSequence(self.open.len()));
        }
        Ok(self.data)
    }
}

fn encode_length(len: usize) -> Result<Vec<u8>> {
    match len {
        0..=0x7f => Ok(vec![len as u8]),
        0x80..=0xff => Ok(vec![0x81, len as u8]),
        0x100..=0xffff => Ok(vec![0x82, (len >> 8) as u8, len as u8]),
        0x1_0000..=MAX_CONTENT_LENGTH => Ok(vec![
            0x83,
            (len >> 16) as u8,
            (len >> 8) as u8,
            len as u8,
        ]),
        _ => Err(Error::SequenceTooLong(len)),
    }
}
