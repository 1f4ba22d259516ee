use serde::{Deserialize, Serialize};

/// Serializable JWS JSON Serialization (JWS-JS) container.
///
/// One shared payload signed by several signers. `headers[i]` and `signatures[i]` belong to
/// the same signer. All values are base64url encoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Jwsjs {
    /// Encoded JWS headers, one per signer
    pub headers: Vec<String>,
    /// The encoded payload shared by every signer
    pub payload: String,
    /// Encoded signature values, one per signer
    pub signatures: Vec<String>,
}
