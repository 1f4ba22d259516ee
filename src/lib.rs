//! JSON Web Signature envelopes over RSA.
//!
//! This crate provides compact JWS generation, parsing and verification, and JWS-JS
//! containers carrying several independent signatures over one payload.

/// Algorithm allow-list and resolution (RS256, RS512, PS256, PS512)
pub mod algorithm;

/// Base64url and hex conversions
pub mod base64url;

/// Public key extraction from PEM X.509 certificates
#[cfg(feature = "x509")]
pub mod certificate;

/// Error types
pub mod error;

/// Safe JSON object parsing
pub mod json;

/// Compact serialized JWS
pub mod jws;

/// JWS JSON Serialization container with multiple signers
pub mod jwsjs;

/// Serializable JWS-JS model
pub mod models;

/// Signing primitives
pub mod signer;

/// Verification key material
pub mod verifier;

pub use algorithm::{Algorithm, AlgorithmRegistry};
pub use error::{Error, Result};
pub use jws::{Jws, ParsedJws, SignatureMode};
pub use jwsjs::{Jwsjs, VerificationReport};
pub use signer::{RsaSigner, Signer};
pub use verifier::Verifier;
