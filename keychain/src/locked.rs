//! Serialized, password-protected form of a keychain.
//!
//! ```json
//! {
//!   "salt": "<base64 profile salt>",
//!   "rsaKeys": {
//!     "privateKey": "<base64 AES-CBC of the private key text>",
//!     "publicKey": "<base64 SPKI DER>",
//!     "dekInfo": { "type": "AES-128-CBC:1024", "iv": "<base64>", "salt": "<base64>" }
//!   },
//!   "nodeKey": "<base64 RSA ciphertext>",
//!   "masterKey": "<weak exports only>",
//!   "password": "<weak exports only>",
//!   "challenge": "<optional>"
//! }
//! ```

use serde::{Deserialize, Serialize};

pub const DEK_INFO_TYPE: &str = "AES-128-CBC:1024";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedKeychain {
    pub salt: String,
    pub rsa_keys: RsaKeys,
    pub node_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsaKeys {
    pub private_key: String,
    pub public_key: String,
    pub dek_info: DekInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DekInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub iv: String,
    pub salt: String,
}

impl DekInfo {
    pub fn new(iv: String, salt: String) -> Self {
        Self {
            kind: DEK_INFO_TYPE.to_string(),
            iv,
            salt,
        }
    }
}

impl LockedKeychain {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
