/// RSA private-key signer
pub mod rsa_signer;

use anyhow::Result;

pub use rsa_signer::*;

use crate::algorithm::AlgorithmSpec;

/// Trait for the signing primitive consumed by JWS generation.
///
/// Implementations receive the exact signing input bytes; hashing and padding are chosen
/// from the resolved algorithm, never by the implementation itself.
pub trait Signer {
    /// Signs `data` with the hash and padding of `alg` and returns the raw signature bytes.
    ///
    /// # Arguments
    ///
    /// * `alg` - Algorithm resolved from the JWS header.
    /// * `data` - The signing input.
    fn sign(&self, alg: &AlgorithmSpec, data: &[u8]) -> Result<Vec<u8>>;
}

impl<S: Signer + ?Sized> Signer for &S {
    fn sign(&self, alg: &AlgorithmSpec, data: &[u8]) -> Result<Vec<u8>> {
        (**self).sign(alg, data)
    }
}

impl<S: Signer + ?Sized> Signer for std::sync::Arc<S> {
    fn sign(&self, alg: &AlgorithmSpec, data: &[u8]) -> Result<Vec<u8>> {
        (**self).sign(alg, data)
    }
}
