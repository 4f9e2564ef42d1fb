//! Keychain generation settings.

use std::env;

pub const DEFAULT_RSA_BITS: usize = 1024;
pub const DEFAULT_RSA_EXPONENT: u64 = 0x10001;

/// Parameters used when a new keychain is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeychainConfig {
    /// RSA modulus size in bits.
    pub rsa_bits: usize,
    /// RSA public exponent.
    pub rsa_exponent: u64,
}

impl Default for KeychainConfig {
    fn default() -> Self {
        Self {
            rsa_bits: DEFAULT_RSA_BITS,
            rsa_exponent: DEFAULT_RSA_EXPONENT,
        }
    }
}

impl KeychainConfig {
    /// Load configuration from `SESAME_RSA_BITS` and `SESAME_RSA_EXPONENT`,
    /// keeping the default for unset or unparsable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            rsa_bits: parse_var(&lookup, "SESAME_RSA_BITS").unwrap_or(defaults.rsa_bits),
            rsa_exponent: parse_var(&lookup, "SESAME_RSA_EXPONENT")
                .unwrap_or(defaults.rsa_exponent),
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = lookup(name)?;
    let trimmed = raw.trim();
    // exponents are usually written in hex
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16)
            .ok()
            .and_then(|v| v.to_string().parse().ok()),
        None => trimmed.parse().ok(),
    };
    if parsed.is_none() {
        tracing::warn!("Ignoring invalid value for {}: {:?}", name, raw);
    }
    parsed
}
