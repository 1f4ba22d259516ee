use std::{convert::TryFrom, fmt};

use crate::{
    algorithm::AlgorithmRegistry,
    base64url,
    error::{Error, Result},
    json,
    jws::{self, ParsedJws, SignatureMode},
    models,
    signer::Signer,
    verifier::Verifier,
};

/// JWS JSON Serialization (JWS-JS): one payload signed independently by several signers.
///
/// Headers and signature values are kept in two index-aligned lists. The container only grows
/// by appending a new (header, signature) pair; existing entries are never changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Jwsjs {
    registry: AlgorithmRegistry,
    headers: Vec<String>,
    payload: Option<String>,
    signatures: Vec<String>,
}

impl Jwsjs {
    /// Creates an empty container accepting every supported algorithm.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty container that resolves algorithms through `registry`.
    pub fn with_registry(registry: AlgorithmRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    /// Creates a container holding the single signature of a compact JWS.
    pub fn from_compact(token: &str) -> Result<Self> {
        let parsed = ParsedJws::parse(token, SignatureMode::Required)?;

        let mut jwsjs = Self::new();
        jwsjs.seed(&parsed)?;

        Ok(jwsjs)
    }

    /// Restores a container from its persisted form, resolving algorithms through `registry`.
    ///
    /// # Errors
    /// * [`Error::CountMismatch`] if there are not as many headers as signatures.
    /// * [`Error::MalformedContainer`] if signatures are present without a payload.
    /// * [`Error::Decode`] if any value is not base64url.
    pub fn from_persistable(model: models::Jwsjs, registry: AlgorithmRegistry) -> Result<Self> {
        let models::Jwsjs {
            headers,
            payload,
            signatures,
        } = model;

        if headers.len() != signatures.len() {
            return Err(Error::CountMismatch(format!(
                "{} headers but {} signatures",
                headers.len(),
                signatures.len()
            )));
        }

        if payload.is_empty() && !signatures.is_empty() {
            return Err(Error::MalformedContainer(
                "signatures present without a payload".to_owned(),
            ));
        }

        let payload = (!payload.is_empty()).then_some(payload);

        for value in headers
            .iter()
            .chain(signatures.iter())
            .chain(payload.iter())
        {
            if !base64url::is_b64u(value) {
                return Err(Error::Decode(format!("'{value}' is not base64url")));
            }
        }

        Ok(Self {
            registry,
            headers,
            payload,
            signatures,
        })
    }

    /// Persistable form `{headers, payload, signatures}`.
    pub fn to_persistable(&self) -> models::Jwsjs {
        models::Jwsjs::from(self.clone())
    }

    /// Converts the container into a JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(&self.to_persistable())
            .map_err(|e| Error::MalformedContainer(e.to_string()))
    }

    /// Reads a container from a JSON string.
    ///
    /// # Errors
    /// * [`Error::MalformedContainer`] if `s` is not JSON, not an object, has missing or extra
    ///   fields, or fields of the wrong type.
    /// * Any fault of [`Jwsjs::from_persistable`].
    pub fn try_from_json_string(s: &str) -> Result<Self> {
        let value =
            json::try_parse_any(s).map_err(|e| Error::MalformedContainer(e.to_string()))?;

        Self::try_from_json_value(value)
    }

    /// Reads a container from a parsed JSON value.
    pub fn try_from_json_value(value: serde_json::Value) -> Result<Self> {
        let model: models::Jwsjs =
            serde_json::from_value(value).map_err(|e| Error::MalformedContainer(e.to_string()))?;

        Self::try_from(model)
    }

    /// Seeds an empty container with the header, payload and signature of one JWS.
    ///
    /// # Errors
    /// Returns [`Error::PayloadAlreadySet`] if the container already has a payload.
    pub fn seed(&mut self, jws: &ParsedJws) -> Result<()> {
        if self.payload.is_some() {
            return Err(Error::PayloadAlreadySet);
        }

        self.payload = Some(jws.payload_b64u().to_owned());
        self.headers.push(jws.header_b64u().to_owned());
        self.signatures.push(jws.signature_b64u().to_owned());

        Ok(())
    }

    /// Signs the container's payload under `header` and appends the new signature.
    ///
    /// # Errors
    /// * [`Error::MissingPayload`] if the container has no payload yet; use
    ///   [`Jwsjs::append_first_signature`] instead.
    /// * Any fault of [`jws::generate`].
    pub fn append_signature<S: Signer + ?Sized>(&mut self, header: &str, signer: &S) -> Result<()> {
        let payload = self.payload.as_deref().ok_or(Error::MissingPayload)?;
        let payload = base64url::decode_to_string(payload)?;

        let (_, jws) = jws::generate(&self.registry, header, &payload, signer)?;

        log::debug!("Appending signature #{} to JWS-JS", self.headers.len() + 1);

        self.headers.push(jws.header_b64u().to_owned());
        self.signatures.push(jws.signature_b64u().to_owned());

        Ok(())
    }

    /// Signs `payload` under `header` and makes it the container's payload.
    ///
    /// # Errors
    /// * [`Error::PayloadAlreadySet`] if the container already has a payload.
    /// * Any fault of [`jws::generate`].
    pub fn append_first_signature<S: Signer + ?Sized>(
        &mut self,
        header: &str,
        payload: &str,
        signer: &S,
    ) -> Result<()> {
        if self.payload.is_some() {
            return Err(Error::PayloadAlreadySet);
        }

        let (_, jws) = jws::generate(&self.registry, header, payload, signer)?;

        log::debug!("Appending first signature to JWS-JS");

        self.seed(&jws)
    }

    /// Verifies every signature against the verifier at the same position.
    ///
    /// The list lengths are checked before any signature is. Every position is then verified
    /// even after a failure, and all failures are reported together. A container without
    /// signatures verifies against an empty list.
    ///
    /// # Errors
    /// * [`Error::CountMismatch`] if `verifiers` does not have one entry per signature.
    /// * [`Error::Verification`] listing every position that did not verify.
    pub fn verify_all(&self, verifiers: &[Verifier]) -> Result<()> {
        if self.headers.len() != verifiers.len() {
            return Err(Error::CountMismatch(format!(
                "{} headers but {} verifiers",
                self.headers.len(),
                verifiers.len()
            )));
        }
        if self.signatures.len() != verifiers.len() {
            return Err(Error::CountMismatch(format!(
                "{} signatures but {} verifiers",
                self.signatures.len(),
                verifiers.len()
            )));
        }

        if self.signatures.is_empty() {
            return Ok(());
        }

        let payload = self.payload.as_deref().ok_or(Error::MissingPayload)?;

        log::debug!("Verifying {} JWS-JS signatures", verifiers.len());

        let failures = self
            .headers
            .iter()
            .zip(&self.signatures)
            .zip(verifiers)
            .enumerate()
            .filter_map(|(i, ((header, signature), verifier))| {
                let position = i + 1;
                let token = format!("{header}.{payload}.{signature}");

                let reason = match jws::verify(&token, &self.registry, verifier) {
                    Ok(true) => return None,
                    Ok(false) => FailureReason::Mismatch,
                    Err(e) => FailureReason::Fault(e),
                };

                log::warn!("JWS-JS signature #{position} failed: {reason}");

                Some(PositionFailure { position, reason })
            })
            .collect::<Vec<_>>();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Verification(VerificationReport {
                total: verifiers.len(),
                failures,
            }))
        }
    }

    /// Verifies every signature against the PEM X.509 certificate at the same position.
    #[cfg(feature = "x509")]
    pub fn verify_with_certs(&self, certs: &[&str]) -> Result<()> {
        let verifiers = certs
            .iter()
            .map(|cert| Verifier::certificate(*cert))
            .collect::<Vec<_>>();

        self.verify_all(&verifiers)
    }

    /// Returns `true` if the container holds no signatures.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Number of signatures.
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Encoded headers, one per signature.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Encoded payload shared by every signature, if set.
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Encoded signature values.
    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }

    /// Allow-list used for appending and verifying.
    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Compact JWS of the signer at zero-based `index`.
    pub fn compact(&self, index: usize) -> Option<String> {
        let header = self.headers.get(index)?;
        let signature = self.signatures.get(index)?;
        let payload = self.payload.as_deref()?;

        Some(format!("{header}.{payload}.{signature}"))
    }
}

impl TryFrom<models::Jwsjs> for Jwsjs {
    type Error = Error;

    fn try_from(model: models::Jwsjs) -> Result<Self> {
        Self::from_persistable(model, AlgorithmRegistry::default())
    }
}

impl From<Jwsjs> for models::Jwsjs {
    fn from(jwsjs: Jwsjs) -> Self {
        let Jwsjs {
            headers,
            payload,
            signatures,
            ..
        } = jwsjs;

        Self {
            headers,
            payload: payload.unwrap_or_default(),
            signatures,
        }
    }
}

/// Why a container position failed verification.
#[derive(Debug)]
pub enum FailureReason {
    /// The signature is well formed but does not match.
    Mismatch,
    /// The position could not be evaluated.
    Fault(Error),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Mismatch => write!(f, "signature does not match"),
            FailureReason::Fault(e) => write!(f, "{e}"),
        }
    }
}

/// A failed container position.
#[derive(Debug)]
pub struct PositionFailure {
    /// One-based position of the signer.
    pub position: usize,
    /// What went wrong at this position.
    pub reason: FailureReason,
}

/// Every failure found by [`Jwsjs::verify_all`].
#[derive(Debug)]
pub struct VerificationReport {
    /// Number of signatures checked.
    pub total: usize,
    /// Failed positions in ascending order.
    pub failures: Vec<PositionFailure>,
}

impl VerificationReport {
    /// One-based positions that failed.
    pub fn positions(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.position).collect()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} JWS-JS signatures failed:",
            self.failures.len(),
            self.total
        )?;
        for failure in &self.failures {
            write!(f, " #{} {};", failure.position, failure.reason)?;
        }

        Ok(())
    }
}
