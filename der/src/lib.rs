//! DER reader (TLV tree built with nom) and a [`DerWriter`] for the
//! reverse direction. Only the universal tags that appear in RSA key
//! structures are named; anything else is kept as raw bytes.

use nom::{IResult, Parser};
use sesame::decoder::{DecodableFrom, Decoder};
use sesame_pem::Pem;

pub mod error;
pub mod oid;
pub mod writer;

pub use error::{Error, Result};
pub use oid::ObjectIdentifier;
pub use writer::DerWriter;

type ParseResult<'a, T> = IResult<&'a [u8], T, Error>;

// Lengths beyond four bytes are never produced for key material.
const MAX_LENGTH_OCTETS: u8 = 4;

/// Deepest SEQUENCE/SET nesting accepted by the reader.
pub const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tag {
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    Sequence,
    Set,
    Unimplemented(u8),
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        match value {
            0x02 => Self::Integer,
            0x03 => Self::BitString,
            0x04 => Self::OctetString,
            0x05 => Self::Null,
            0x06 => Self::ObjectIdentifier,
            0x30 => Self::Sequence,
            0x31 => Self::Set,
            _ => Tag::Unimplemented(value),
        }
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::Integer => 0x02,
            Tag::BitString => 0x03,
            Tag::OctetString => 0x04,
            Tag::Null => 0x05,
            Tag::ObjectIdentifier => 0x06,
            Tag::Sequence => 0x30,
            Tag::Set => 0x31,
            Tag::Unimplemented(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Tlv(Vec<Tlv>),
    Data(Vec<u8>),
}

impl Tlv {
    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    fn parse(input: &[u8]) -> ParseResult<'_, Tlv> {
        Self::parse_nested(input, 0)
    }

    fn parse_nested(input: &[u8], depth: usize) -> ParseResult<'_, Tlv> {
        let (input, tag) = parse_tag(input)?;
        let (input, length) = parse_length(input)?;
        let (input, data) = nom::bytes::complete::take(length).parse(input)?;

        if tag.eq(&Tag::Sequence) || tag.eq(&Tag::Set) {
            if depth >= MAX_DEPTH {
                return Err(nom::Err::Failure(Error::MalformedAsn1(
                    "constructed elements nested too deeply",
                )));
            }
            // parse TLV recursively.
            let mut tlvs = Vec::new();
            let mut data = data;
            while !data.is_empty() {
                let (rest, v) = Self::parse_nested(data, depth + 1)?;
                data = rest;
                tlvs.push(v);
            }

            return Ok((
                input,
                Tlv {
                    tag,
                    value: Value::Tlv(tlvs),
                },
            ));
        }

        Ok((
            input,
            Tlv {
                tag,
                value: Value::Data(data.to_vec()),
            },
        ))
    }

    /// Fails with [`Error::UnexpectedTag`] unless this element carries `tag`.
    pub fn expect(&self, tag: Tag, field: &'static str) -> Result<&Tlv> {
        if self.tag != tag {
            return Err(Error::UnexpectedTag {
                field,
                expected: tag,
                actual: self.tag,
            });
        }
        Ok(self)
    }

    /// Content octets of a primitive element with the given tag.
    pub fn data(&self, tag: Tag, field: &'static str) -> Result<&[u8]> {
        match &self.expect(tag, field)?.value {
            Value::Data(data) => Ok(data),
            Value::Tlv(_) => Err(Error::MalformedAsn1("expected a primitive element")),
        }
    }

    /// Children of a SEQUENCE.
    pub fn children(&self, field: &'static str) -> Result<&[Tlv]> {
        match &self.expect(Tag::Sequence, field)?.value {
            Value::Tlv(children) => Ok(children),
            Value::Data(_) => Err(Error::MalformedAsn1("expected a constructed element")),
        }
    }

    /// Two's-complement content octets of an INTEGER.
    pub fn integer(&self, field: &'static str) -> Result<&[u8]> {
        let data = self.data(Tag::Integer, field)?;
        if data.is_empty() {
            return Err(Error::MalformedAsn1("empty INTEGER"));
        }
        Ok(data)
    }

    pub fn object_identifier(&self, field: &'static str) -> Result<ObjectIdentifier> {
        ObjectIdentifier::from_der_content(self.data(Tag::ObjectIdentifier, field)?)
    }

    /// Payload of a BIT STRING; only whole-octet strings are accepted.
    pub fn bit_string(&self, field: &'static str) -> Result<&[u8]> {
        match self.data(Tag::BitString, field)? {
            [0x00, rest @ ..] => Ok(rest),
            [] => Err(Error::MalformedAsn1("empty BIT STRING")),
            _ => Err(Error::MalformedAsn1("BIT STRING with unused bits")),
        }
    }
}

fn parse_tag(input: &[u8]) -> ParseResult<'_, Tag> {
    let (input, n) = nom::number::complete::be_u8(input)?;
    Ok((input, Tag::from(n)))
}

fn parse_length(input: &[u8]) -> ParseResult<'_, usize> {
    let (input, n) = nom::number::complete::be_u8(input)?;
    if n & 0x80 == 0x80 {
        // long form
        // First 1 bit is a marker for long form.
        // Other bits represent bytes length of the length field.
        let octets = n & 0x7f;
        if octets == 0 {
            return Err(nom::Err::Failure(Error::MalformedAsn1(
                "indefinite length is not allowed in DER",
            )));
        }
        if octets > MAX_LENGTH_OCTETS {
            return Err(nom::Err::Failure(Error::MalformedAsn1(
                "length field longer than 4 bytes",
            )));
        }
        let (input, bs) = nom::bytes::complete::take(octets).parse(input)?;
        let n = bs.iter().fold(0usize, |n, &b| (n << 8) | b as usize);
        return Ok((input, n));
    }
    // short form: 0-127
    Ok((input, n as usize))
}

/// A single DER element and everything nested in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    root: Tlv,
}

impl Der {
    /// Parses exactly one top-level element; bytes left over are an error.
    pub fn parse(input: &[u8]) -> Result<Der> {
        let (rest, root) = Tlv::parse(input)?;
        if !rest.is_empty() {
            return Err(Error::TrailingData(rest.len()));
        }
        Ok(Der { root })
    }

    pub fn root(&self) -> &Tlv {
        &self.root
    }
}

impl DecodableFrom<&[u8]> for Der {}

impl Decoder<&[u8], Der> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<Der> {
        Der::parse(self)
    }
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der> {
        Der::parse(self)
    }
}

impl DecodableFrom<Pem> for Der {}

impl Decoder<Pem, Der> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Der> {
        let bytes: Vec<u8> = self.decode()?;
        Der::parse(&bytes)
    }
}
