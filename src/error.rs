use thiserror::Error;

use crate::jwsjs::VerificationReport;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Faults raised while building, parsing or verifying signatures.
///
/// A signature that does not match is not a fault; verification returns `Ok(false)` for it.
#[derive(Error, Debug)]
pub enum Error {
    /// Token is not of the form `Header.Payload.Signature` with three non-empty segments.
    #[error("JWS is not a form of 'Header.Payload.Signature': {0}")]
    MalformedToken(String),

    /// Header is not JSON, or is JSON but not an object.
    #[error("malformed JSON string for JWS header: {0}")]
    InvalidHeader(String),

    /// Header `alg` is missing or outside the configured allow-list.
    #[error("JWS signature algorithm not supported: {0}")]
    UnsupportedAlgorithm(String),

    /// Base64url, hex or UTF-8 decoding failed.
    #[error("decode error: {0}")]
    Decode(String),

    /// Container arrays or verifier list have inconsistent lengths.
    #[error("count mismatch: {0}")]
    CountMismatch(String),

    /// The signing or verification primitive failed internally.
    #[error("crypto error: {0}")]
    Crypto(#[source] anyhow::Error),

    /// The PEM X.509 certificate could not be read.
    #[error("certificate parse error: {0}")]
    CertificateParse(String),

    /// Persisted container JSON does not have the expected shape.
    #[error("malformed JWS-JS container: {0}")]
    MalformedContainer(String),

    /// A signature was appended to a container that has no payload yet.
    #[error("JWS-JS container has no payload")]
    MissingPayload,

    /// A first signature was appended to a container that already has a payload.
    #[error("JWS-JS container already has a payload")]
    PayloadAlreadySet,

    /// A populated envelope was asked to take different content.
    #[error("JWS envelope is already populated")]
    AlreadyPopulated,

    /// One or more container positions failed verification.
    #[error("{0}")]
    Verification(VerificationReport),
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Decode(err.to_string())
    }
}
