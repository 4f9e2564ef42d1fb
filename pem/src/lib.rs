pub mod codec;
pub mod error;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

pub use codec::{from_base64, to_base64};
use error::Error;
use regex::Regex;
use sesame::decoder::{DecodableFrom, Decoder};

const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
const RSA_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";
const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";
const RSA_PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";

const BOUNDARY_PATTERN: &str = r"-----(BEGIN|END) ([A-Z0-9 ]+)-----";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// PKCS#8 private key (non-encrypted)
    PrivateKey,
    /// PKCS#1 RSA private key
    RSAPrivateKey,
    /// X.509 SubjectPublicKeyInfo
    PublicKey,
    /// PKCS#1 RSA public key
    RSAPublicKey,
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::PrivateKey => write!(f, "{}", PRIVATE_KEY_LABEL),
            Label::RSAPrivateKey => write!(f, "{}", RSA_PRIVATE_KEY_LABEL),
            Label::PublicKey => write!(f, "{}", PUBLIC_KEY_LABEL),
            Label::RSAPublicKey => write!(f, "{}", RSA_PUBLIC_KEY_LABEL),
        }
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PRIVATE_KEY_LABEL => Ok(Label::PrivateKey),
            RSA_PRIVATE_KEY_LABEL => Ok(Label::RSAPrivateKey),
            PUBLIC_KEY_LABEL => Ok(Label::PublicKey),
            RSA_PUBLIC_KEY_LABEL => Ok(Label::RSAPublicKey),
            _ => Err(Error::InvalidLabel),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Begin(Label),
    End(Label),
}

impl Boundary {
    /// Returns `Ok(None)` when the line is not a boundary at all.
    fn parse(re: &Regex, line: &str) -> Result<Option<Boundary>, Error> {
        let Some(captured) = re.captures(line) else {
            if line.starts_with("-----") {
                return Err(Error::InvalidEncapsulationBoundary);
            }
            return Ok(None);
        };
        if captured.get(0).map(|m| m.as_str()) != Some(line) {
            return Err(Error::InvalidEncapsulationBoundary);
        }
        let kind = captured
            .get(1)
            .ok_or(Error::InvalidEncapsulationBoundary)?;
        let label = captured
            .get(2)
            .ok_or(Error::InvalidEncapsulationBoundary)
            .and_then(|c| Label::from_str(c.as_str()))?;
        match kind.as_str() {
            "BEGIN" => Ok(Some(Boundary::Begin(label))),
            _ => Ok(Some(Boundary::End(label))),
        }
    }
}

/*
ref: https://www.rfc-editor.org/rfc/rfc7468.html#section-3
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pem {
    label: Label,
    base64_data: String,
}

impl Pem {
    pub fn new(label: Label, base64_data: String) -> Self {
        Pem { label, base64_data }
    }

    pub fn from_bytes(label: Label, data: &[u8]) -> Self {
        Pem {
            label,
            base64_data: to_base64(data),
        }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn data(&self) -> &str {
        &self.base64_data
    }
}

impl Display for Pem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "-----BEGIN {}-----", self.label)?;
        for chunk in self.base64_data.as_bytes().chunks(64) {
            let line = std::str::from_utf8(chunk).map_err(|_| std::fmt::Error)?;
            writeln!(f, "{}", line)?;
        }
        write!(f, "-----END {}-----", self.label)
    }
}

/// Trait for types that can be converted to PEM format
pub trait ToPem {
    type Error;

    fn pem_label(&self) -> Label;

    fn to_pem(&self) -> Result<Pem, Self::Error>;
}

/// Trait for types that can be constructed from PEM format
pub trait FromPem: Sized {
    type Error;

    fn expected_label() -> Label;

    fn from_pem(pem: &Pem) -> Result<Self, Self::Error>;
}

/// Cheap check used to route key text: armored text versus bare base64.
pub fn is_pem(text: &str) -> bool {
    text.contains("-----BEGIN ")
}

/// Binary content of key text that is either PEM armored or bare base64
/// (line breaks allowed). Returns the label when there was one.
pub fn decode_text(text: &str) -> Result<(Option<Label>, Vec<u8>), Error> {
    if is_pem(text) {
        let pem = Pem::from_str(text)?;
        let bytes: Vec<u8> = pem.decode()?;
        return Ok((Some(pem.label()), bytes));
    }
    let compact: String = text.split_whitespace().collect();
    Ok((None, from_base64(&compact)?))
}

impl DecodableFrom<Pem> for Vec<u8> {}

impl Decoder<Pem, Vec<u8>> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Vec<u8>, Self::Error> {
        // the label is dropped here
        from_base64(self.data())
    }
}

impl DecodableFrom<String> for Pem {}

impl Decoder<String, Pem> for String {
    type Error = Error;

    fn decode(&self) -> Result<Pem, Self::Error> {
        Pem::from_str(self)
    }
}

impl DecodableFrom<&str> for Pem {}

impl Decoder<&str, Pem> for &str {
    type Error = Error;

    fn decode(&self) -> Result<Pem, Self::Error> {
        Pem::from_str(self)
    }
}

/// Puts every boundary marker on its own line, so armor that was glued
/// onto a single line (or had its newlines replaced by spaces) parses
/// the same as well-formed input.
fn normalize(s: &str, re: &Regex) -> String {
    re.replace_all(s, "\n$0\n").into_owned()
}

fn is_base64_line(line: &str) -> bool {
    line.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
}

impl FromStr for Pem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let re = Regex::new(BOUNDARY_PATTERN).map_err(|_| Error::InvalidEncapsulationBoundary)?;
        let normalized = normalize(s, &re);

        let mut state = PemParsingState::default();
        let mut label = None;
        let mut base64_lines: Vec<&str> = vec![];

        for line in normalized.lines().map(str::trim) {
            match state {
                PemParsingState::Init => match Boundary::parse(&re, line)? {
                    Some(Boundary::Begin(l)) => {
                        label = Some(l);
                        state = PemParsingState::Base64Lines;
                    }
                    Some(Boundary::End(_)) => return Err(Error::MissingPreEncapsulationBoundary),
                    // explanatory text before the armor is ignored
                    None => {}
                },
                PemParsingState::Base64Lines => {
                    if line.is_empty() {
                        continue;
                    }
                    match Boundary::parse(&re, line)? {
                        Some(Boundary::Begin(_)) => return Err(Error::InvalidEncapsulationBoundary),
                        Some(Boundary::End(l)) => {
                            if Some(l) != label {
                                return Err(Error::LabelMissMatch);
                            }
                            state = PemParsingState::PostEncapsulationBoundary;
                        }
                        None => {
                            for chunk in line.split_whitespace() {
                                if !is_base64_line(chunk) {
                                    return Err(Error::InvalidBase64Line);
                                }
                                base64_lines.push(chunk);
                            }
                        }
                    }
                }
                PemParsingState::PostEncapsulationBoundary => break,
            }
        }

        match (state, label) {
            (PemParsingState::Init, _) | (_, None) => Err(Error::MissingPreEncapsulationBoundary),
            (PemParsingState::Base64Lines, _) => Err(Error::MissingPostEncapsulationBoundary),
            (PemParsingState::PostEncapsulationBoundary, Some(label)) => {
                if base64_lines.is_empty() {
                    return Err(Error::MissingData);
                }
                Ok(Pem {
                    label,
                    base64_data: base64_lines.concat(),
                })
            }
        }
    }
}

/*
* pre-eb -> base64lines -> post-eb
*            |_|
 */
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
enum PemParsingState {
    #[default]
    Init,
    Base64Lines,
    PostEncapsulationBoundary,
}
