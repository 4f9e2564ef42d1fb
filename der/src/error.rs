use nom::error::{ErrorKind, ParseError};
use thiserror::Error;

use crate::Tag;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("malformed ASN.1: {0}")]
    MalformedAsn1(&'static str),
    #[error("unexpected tag for {field}: expected {expected:?}, got {actual:?}")]
    UnexpectedTag {
        field: &'static str,
        expected: Tag,
        actual: Tag,
    },
    #[error("expected {expected} elements in {field}, got {actual}")]
    InvalidElementCount {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("trailing data after DER element: {0} bytes")]
    TrailingData(usize),
    #[error("invalid object identifier: {0}")]
    InvalidObjectIdentifier(String),
    #[error("sequence content too long: {0} bytes")]
    SequenceTooLong(usize),
    #[error("writer finished with {0} unclosed sequence(s)")]
    UnclosedSequence(usize),
    #[error("no open sequence to close")]
    NoOpenSequence,
    #[error("parser error {0:?}")]
    Parser(ErrorKind),
    #[error("parser incomplete: {0:?}")]
    ParserIncomplete(nom::Needed),
    #[error("pem: {0}")]
    Pem(#[from] sesame_pem::error::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl<'a> ParseError<&'a [u8]> for Error {
    fn from_error_kind(_input: &'a [u8], kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Eof => Error::MalformedAsn1("truncated input"),
            kind => Error::Parser(kind),
        }
    }

    fn append(_input: &'a [u8], _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<Error>> for Error {
    fn from(err: nom::Err<Error>) -> Self {
        match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            nom::Err::Incomplete(needed) => Error::ParserIncomplete(needed),
        }
    }
}
