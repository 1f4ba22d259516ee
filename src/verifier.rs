use std::{fmt, sync::Arc};

use anyhow::anyhow;
use rsa::{
    pkcs1::DecodeRsaPublicKey, pkcs8::DecodePublicKey, BigUint, Pkcs1v15Sign, Pss, RsaPublicKey,
};
use sha2::{Sha256, Sha512};

use crate::{
    algorithm::{AlgorithmSpec, HashAlg, Padding},
    base64url,
    error::{Error, Result},
};

/// A public key object that can hash and verify on its own.
///
/// Returns `Ok(false)` for a signature that does not match and `Err` only when the
/// primitive itself fails.
pub trait KeyHandle {
    /// Hashes `data` with the hash of `alg` and checks `signature` using the padding of `alg`.
    fn hash_and_verify(
        &self,
        alg: &AlgorithmSpec,
        data: &[u8],
        signature: &[u8],
    ) -> anyhow::Result<bool>;
}

impl KeyHandle for RsaPublicKey {
    fn hash_and_verify(
        &self,
        alg: &AlgorithmSpec,
        data: &[u8],
        signature: &[u8],
    ) -> anyhow::Result<bool> {
        verify_rsa(self, alg, data, signature)
    }
}

/// RSA signature verification primitive.
pub fn verify_rsa(
    key: &RsaPublicKey,
    alg: &AlgorithmSpec,
    data: &[u8],
    signature: &[u8],
) -> anyhow::Result<bool> {
    let hashed = alg.hash.digest(data);

    let result = match (alg.padding, alg.hash) {
        (Padding::Pkcs1v15, HashAlg::Sha256) => {
            key.verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
        }
        (Padding::Pkcs1v15, HashAlg::Sha512) => {
            key.verify(Pkcs1v15Sign::new::<Sha512>(), &hashed, signature)
        }
        (Padding::Pss, HashAlg::Sha256) => key.verify(Pss::new::<Sha256>(), &hashed, signature),
        (Padding::Pss, HashAlg::Sha512) => key.verify(Pss::new::<Sha512>(), &hashed, signature),
    };

    match result {
        Ok(()) => Ok(true),
        Err(rsa::Error::Verification) => Ok(false),
        Err(e) => Err(anyhow!("RSA verification failed: {e}")),
    }
}

/// Public key material a JWS can be verified against.
#[derive(Clone)]
pub enum Verifier {
    /// Naked RSA public key as big-endian modulus and public exponent.
    RawModulusExponent { n: Vec<u8>, e: Vec<u8> },
    /// A key object exposing hash-and-verify.
    Key(Arc<dyn KeyHandle + Send + Sync>),
    /// PEM formatted X.509 certificate carrying an RSA public key.
    #[cfg(feature = "x509")]
    Certificate(String),
}

impl Verifier {
    /// Builds a verifier from hexadecimal modulus and public exponent.
    pub fn from_hex_components(n_hex: &str, e_hex: &str) -> Result<Self> {
        let n = base64url::from_hex(n_hex)?;
        let e = base64url::from_hex(e_hex)?;

        Ok(Verifier::RawModulusExponent { n, e })
    }

    /// Builds a verifier from a PEM encoded public key.
    ///
    /// Both SubjectPublicKeyInfo (`BEGIN PUBLIC KEY`) and PKCS#1 (`BEGIN RSA PUBLIC KEY`)
    /// encodings are accepted.
    pub fn from_public_key_pem(pem: &str) -> Result<Self> {
        let pem = pem.trim();

        let key = if pem.starts_with("-----BEGIN RSA PUBLIC KEY-----") {
            RsaPublicKey::from_pkcs1_pem(pem)
                .map_err(|e| Error::Decode(format!("invalid PKCS#1 RSA public key: {e}")))?
        } else {
            RsaPublicKey::from_public_key_pem(pem)
                .map_err(|e| Error::Decode(format!("invalid RSA public key: {e}")))?
        };

        Ok(Self::key(key))
    }

    /// Wraps a key object.
    pub fn key(key: impl KeyHandle + Send + Sync + 'static) -> Self {
        Verifier::Key(Arc::new(key))
    }

    /// Wraps a PEM formatted X.509 certificate.
    #[cfg(feature = "x509")]
    pub fn certificate(pem: impl Into<String>) -> Self {
        Verifier::Certificate(pem.into())
    }

    /// Checks `signature` over `data` using the hash and padding of `alg`.
    ///
    /// # Returns
    /// * `Ok(true)` if the signature is valid, `Ok(false)` if it does not match.
    ///
    /// # Errors
    /// * [`Error::Crypto`] if the key material is unusable or the primitive fails.
    /// * [`Error::CertificateParse`] if a certificate cannot be read.
    pub fn verify(&self, alg: &AlgorithmSpec, data: &[u8], signature: &[u8]) -> Result<bool> {
        match self {
            Verifier::RawModulusExponent { n, e } => {
                let key = RsaPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))
                    .map_err(|e| Error::Crypto(anyhow!("Invalid RSA public key: {e}")))?;

                verify_rsa(&key, alg, data, signature).map_err(Error::Crypto)
            }
            Verifier::Key(key) => key
                .hash_and_verify(alg, data, signature)
                .map_err(Error::Crypto),
            #[cfg(feature = "x509")]
            Verifier::Certificate(pem) => {
                let key = crate::certificate::public_key_from_pem(pem)?;

                verify_rsa(&key, alg, data, signature).map_err(Error::Crypto)
            }
        }
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verifier::RawModulusExponent { n, e } => f
                .debug_struct("RawModulusExponent")
                .field("n", &hex::encode(n))
                .field("e", &hex::encode(e))
                .finish(),
            Verifier::Key(_) => f.write_str("Key(..)"),
            #[cfg(feature = "x509")]
            Verifier::Certificate(_) => f.write_str("Certificate(..)"),
        }
    }
}

impl From<RsaPublicKey> for Verifier {
    fn from(key: RsaPublicKey) -> Self {
        Self::key(key)
    }
}
