use std::str::FromStr;

use serde_json::Value;
use sha2::{Digest, Sha256, Sha512};

use crate::{
    error::{Error, Result},
    json::JsonObject,
};

/// Signature algorithms that may appear in a JWS header `alg` field.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    strum::EnumString,
    strum::Display,
    strum::VariantNames,
    strum::EnumIter,
)]
pub enum Algorithm {
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
    /// RSASSA-PSS using SHA-256
    PS256,
    /// RSASSA-PSS using SHA-512
    PS512,
}

/// Hash function applied to the signing input.
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::Display)]
pub enum HashAlg {
    /// SHA-256
    #[strum(serialize = "sha256")]
    Sha256,
    /// SHA-512
    #[strum(serialize = "sha512")]
    Sha512,
}

impl HashAlg {
    /// Hashes `data` with this function.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlg::Sha256 => Sha256::digest(data).to_vec(),
            HashAlg::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

/// RSA signature padding scheme.
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::Display)]
pub enum Padding {
    /// RSASSA-PKCS1-v1_5, deterministic
    #[strum(serialize = "PKCS#1 v1.5")]
    Pkcs1v15,
    /// RSASSA-PSS with a salt as long as the digest
    #[strum(serialize = "PSS")]
    Pss,
}

/// Everything needed to invoke a signing or verification primitive for one algorithm.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AlgorithmSpec {
    /// Identifier from the header `alg`
    pub algorithm: Algorithm,
    /// Digest applied to the signing input
    pub hash: HashAlg,
    /// Signature padding
    pub padding: Padding,
}

impl From<Algorithm> for AlgorithmSpec {
    fn from(algorithm: Algorithm) -> Self {
        let (hash, padding) = match algorithm {
            Algorithm::RS256 => (HashAlg::Sha256, Padding::Pkcs1v15),
            Algorithm::RS512 => (HashAlg::Sha512, Padding::Pkcs1v15),
            Algorithm::PS256 => (HashAlg::Sha256, Padding::Pss),
            Algorithm::PS512 => (HashAlg::Sha512, Padding::Pss),
        };

        Self {
            algorithm,
            hash,
            padding,
        }
    }
}

/// Allow-list of signature algorithms.
///
/// Signing and verification both resolve the header through the same registry, so the
/// hash and padding used to check a signature are always the ones the header declares.
/// An identifier outside the allow-list is never mapped to a fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgorithmRegistry {
    allowed: Vec<Algorithm>,
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        use strum::IntoEnumIterator;

        Self {
            allowed: Algorithm::iter().collect(),
        }
    }
}

impl AlgorithmRegistry {
    /// Creates a registry that accepts only the given algorithms.
    pub fn new(allowed: &[Algorithm]) -> Self {
        let mut deduped = Vec::with_capacity(allowed.len());
        for algorithm in allowed {
            if !deduped.contains(algorithm) {
                deduped.push(*algorithm);
            }
        }

        Self { allowed: deduped }
    }

    /// Algorithms accepted by this registry.
    pub fn allowed(&self) -> &[Algorithm] {
        &self.allowed
    }

    /// Resolves an algorithm identifier such as `"RS256"`.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedAlgorithm`] if the identifier is unknown or not allowed.
    pub fn resolve(&self, identifier: &str) -> Result<AlgorithmSpec> {
        let algorithm = Algorithm::from_str(identifier)
            .map_err(|_| Error::UnsupportedAlgorithm(identifier.to_owned()))?;

        if !self.allowed.contains(&algorithm) {
            return Err(Error::UnsupportedAlgorithm(identifier.to_owned()));
        }

        log::trace!("Resolved JWS algorithm {algorithm}");

        Ok(AlgorithmSpec::from(algorithm))
    }

    /// Resolves the `alg` field of a parsed header.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedAlgorithm`] if `alg` is missing, is not a string, or does
    /// not resolve.
    pub fn resolve_header(&self, header: &JsonObject) -> Result<AlgorithmSpec> {
        match header.get("alg") {
            Some(Value::String(identifier)) => self.resolve(identifier),
            Some(other) => Err(Error::UnsupportedAlgorithm(other.to_string())),
            None => Err(Error::UnsupportedAlgorithm("missing 'alg'".to_owned())),
        }
    }
}
