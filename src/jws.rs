use std::borrow::Cow;

use serde_json::Value;

use crate::{
    algorithm::{AlgorithmRegistry, AlgorithmSpec},
    base64url,
    error::{Error, Result},
    json::{self, JsonObject},
    signer::Signer,
    verifier::Verifier,
};

/// Whether [`ParsedJws::parse`] decodes the signature segment.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SignatureMode {
    /// Decode the signature value.
    Required,
    /// Leave the signature value encoded, e.g. to select a key from header claims first.
    Skipped,
}

/// Decoded content of a compact serialized JWS (`Header.Payload.Signature`).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedJws {
    header_b64u: String,
    payload_b64u: String,
    signature_b64u: String,
    header_text: String,
    header: JsonObject,
    payload: String,
    signature: Option<Vec<u8>>,
}

impl ParsedJws {
    /// Parses a compact JWS.
    ///
    /// # Arguments
    /// * `token` - JWS of the form `Header.Payload.Signature`
    /// * `mode` - whether to decode the signature value
    ///
    /// # Errors
    /// * [`Error::MalformedToken`] unless `token` has exactly three non-empty segments.
    /// * [`Error::Decode`] if a segment is not base64url or the header/payload is not UTF-8.
    /// * [`Error::InvalidHeader`] if the header is not a JSON object.
    pub fn parse(token: &str, mode: SignatureMode) -> Result<Self> {
        let (header_b64u, payload_b64u, signature_b64u) = split_compact(token)?;

        let header_text = base64url::decode_to_string(header_b64u)?;
        let header = json::try_parse_object(&header_text)?;

        let payload = base64url::decode_to_string(payload_b64u)?;

        let signature = match mode {
            SignatureMode::Required => Some(base64url::decode(signature_b64u)?),
            SignatureMode::Skipped => None,
        };

        Ok(Self {
            header_b64u: header_b64u.to_owned(),
            payload_b64u: payload_b64u.to_owned(),
            signature_b64u: signature_b64u.to_owned(),
            header_text,
            header,
            payload,
            signature,
        })
    }

    /// Encoded header segment.
    pub fn header_b64u(&self) -> &str {
        &self.header_b64u
    }

    /// Encoded payload segment.
    pub fn payload_b64u(&self) -> &str {
        &self.payload_b64u
    }

    /// Encoded signature segment.
    pub fn signature_b64u(&self) -> &str {
        &self.signature_b64u
    }

    /// Decoded header JSON text, exactly as signed.
    pub fn header_text(&self) -> &str {
        &self.header_text
    }

    /// Parsed header object.
    pub fn header(&self) -> &JsonObject {
        &self.header
    }

    /// Looks up a single header field.
    pub fn header_claim(&self, name: &str) -> Option<&Value> {
        self.header.get(name)
    }

    /// Decoded payload text.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decoded signature value, if it was decoded.
    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    /// The signing input `encodedHeader.encodedPayload`.
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header_b64u, self.payload_b64u)
    }

    /// Re-assembles the compact serialization.
    pub fn to_compact(&self) -> String {
        format!(
            "{}.{}.{}",
            self.header_b64u, self.payload_b64u, self.signature_b64u
        )
    }

    /// Resolves the header `alg` against `registry`.
    pub fn algorithm(&self, registry: &AlgorithmRegistry) -> Result<AlgorithmSpec> {
        registry.resolve_header(&self.header)
    }

    /// Verifies the signature against `verifier`.
    ///
    /// Hash and padding are taken from the header `alg`, resolved through `registry`.
    ///
    /// # Returns
    /// * `Ok(true)` if the signature is valid over the signing input, `Ok(false)` otherwise.
    ///
    /// # Errors
    /// * [`Error::UnsupportedAlgorithm`] if the header `alg` does not resolve.
    /// * [`Error::Decode`] if the signature segment is not base64url.
    /// * [`Error::Crypto`] / [`Error::CertificateParse`] from the verifier.
    pub fn verify(&self, registry: &AlgorithmRegistry, verifier: &Verifier) -> Result<bool> {
        let alg = self.algorithm(registry)?;

        let signature = match &self.signature {
            Some(signature) => Cow::Borrowed(signature.as_slice()),
            None => Cow::Owned(base64url::decode(&self.signature_b64u)?),
        };

        let valid = verifier.verify(&alg, self.signing_input().as_bytes(), &signature)?;

        if valid {
            log::debug!("JWS signature verified with {}", alg.algorithm);
        } else {
            log::debug!("JWS signature rejected with {}", alg.algorithm);
        }

        Ok(valid)
    }
}

/// Signs `payload` under `header` and returns the compact JWS with its parsed form.
///
/// # Arguments
/// * `registry` - allow-list the header `alg` is resolved against
/// * `header` - JWS header JSON text; must be an object with a supported `alg`
/// * `payload` - payload text
/// * `signer` - signing primitive
///
/// # Errors
/// * [`Error::InvalidHeader`] if `header` is not a JSON object.
/// * [`Error::UnsupportedAlgorithm`] if `alg` does not resolve.
/// * [`Error::MalformedToken`] if `payload` is empty.
/// * [`Error::Crypto`] if the signer fails.
pub fn generate<S: Signer + ?Sized>(
    registry: &AlgorithmRegistry,
    header: &str,
    payload: &str,
    signer: &S,
) -> Result<(String, ParsedJws)> {
    let header_object = json::try_parse_object(header)?;
    let alg = registry.resolve_header(&header_object)?;

    if payload.is_empty() {
        return Err(Error::MalformedToken("JWS payload is empty".to_owned()));
    }

    let header_b64u = base64url::encode_str(header);
    let payload_b64u = base64url::encode_str(payload);
    let signing_input = format!("{header_b64u}.{payload_b64u}");

    log::debug!(
        "Generating {} JWS over {} byte signing input",
        alg.algorithm,
        signing_input.len()
    );

    let signature = signer
        .sign(&alg, signing_input.as_bytes())
        .map_err(Error::Crypto)?;

    if signature.is_empty() {
        return Err(Error::Crypto(anyhow::anyhow!(
            "Signer returned an empty signature"
        )));
    }

    let signature_b64u = base64url::encode(&signature);
    let token = format!("{signing_input}.{signature_b64u}");

    let parsed = ParsedJws {
        header_b64u,
        payload_b64u,
        signature_b64u,
        header_text: header.to_owned(),
        header: header_object,
        payload: payload.to_owned(),
        signature: Some(signature),
    };

    Ok((token, parsed))
}

/// Parses and verifies a compact JWS in one step.
pub fn verify(token: &str, registry: &AlgorithmRegistry, verifier: &Verifier) -> Result<bool> {
    ParsedJws::parse(token, SignatureMode::Required)?.verify(registry, verifier)
}

/// Returns the encoded signature value of a compact JWS without decoding anything.
pub fn encoded_signature_value(token: &str) -> Result<&str> {
    let (_, _, signature_b64u) = split_compact(token)?;

    Ok(signature_b64u)
}

fn split_compact(token: &str) -> Result<(&str, &str, &str)> {
    let mut segments = token.split('.');

    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(header), Some(payload), Some(signature), None)
            if !header.is_empty() && !payload.is_empty() && !signature.is_empty() =>
        {
            Ok((header, payload, signature))
        }
        (Some(_), Some(_), Some(_), None) => Err(Error::MalformedToken(
            "a segment of the token is empty".to_owned(),
        )),
        _ => Err(Error::MalformedToken(format!(
            "expected 3 segments, found {}",
            token.split('.').count()
        ))),
    }
}

#[derive(Debug, Clone)]
enum Populated {
    Parsed(ParsedJws),
    Generated(ParsedJws),
}

impl Populated {
    fn jws(&self) -> &ParsedJws {
        match self {
            Populated::Parsed(jws) | Populated::Generated(jws) => jws,
        }
    }
}

/// A JSON Web Signature in compact serialization.
///
/// Starts empty and is populated exactly once, either by [`Jws::parse`] (verification path)
/// or by [`Jws::generate`] (signing path). Parsing the same token again returns the cached
/// result.
#[derive(Debug, Clone, Default)]
pub struct Jws {
    registry: AlgorithmRegistry,
    populated: Option<Populated>,
}

impl Jws {
    /// Creates an empty JWS accepting every supported algorithm.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty JWS that resolves algorithms through `registry`.
    pub fn with_registry(registry: AlgorithmRegistry) -> Self {
        Self {
            registry,
            populated: None,
        }
    }

    /// Allow-list header `alg` values are resolved against.
    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Returns `true` until the JWS is parsed or generated.
    pub fn is_empty(&self) -> bool {
        self.populated.is_none()
    }

    /// Returns `true` if the JWS was populated by [`Jws::generate`].
    pub fn is_generated(&self) -> bool {
        matches!(self.populated, Some(Populated::Generated(_)))
    }

    /// Decoded content, once populated.
    pub fn parsed(&self) -> Option<&ParsedJws> {
        self.populated.as_ref().map(Populated::jws)
    }

    /// Parses `token` into this JWS.
    ///
    /// Calling this again with the same token is a no-op returning the cached content, unless
    /// the signature was skipped before and is now required, in which case the token is parsed
    /// afresh.
    ///
    /// # Errors
    /// * [`Error::AlreadyPopulated`] if this JWS already holds a different token.
    /// * Any fault of [`ParsedJws::parse`].
    pub fn parse(&mut self, token: &str, mode: SignatureMode) -> Result<&ParsedJws> {
        populate(&mut self.populated, token, mode)
    }

    /// Signs `payload` under `header` and populates this JWS with the result.
    ///
    /// # Returns
    /// The compact serialization. The decoded content is available through [`Jws::parsed`]
    /// exactly as if the token had been parsed.
    pub fn generate<S: Signer + ?Sized>(
        &mut self,
        header: &str,
        payload: &str,
        signer: &S,
    ) -> Result<String> {
        if self.populated.is_some() {
            return Err(Error::AlreadyPopulated);
        }

        let (token, parsed) = generate(&self.registry, header, payload, signer)?;
        self.populated = Some(Populated::Generated(parsed));

        Ok(token)
    }

    /// Parses `token` (if not already parsed) and verifies it against `verifier`.
    pub fn verify(&mut self, token: &str, verifier: &Verifier) -> Result<bool> {
        let parsed = populate(&mut self.populated, token, SignatureMode::Required)?;

        parsed.verify(&self.registry, verifier)
    }
}

fn populate<'a>(
    slot: &'a mut Option<Populated>,
    token: &str,
    mode: SignatureMode,
) -> Result<&'a ParsedJws> {
    let populated = match slot.take() {
        None => Populated::Parsed(parse_logged(token, mode)?),
        Some(populated) => {
            let jws = populated.jws();

            if jws.to_compact() != token {
                *slot = Some(populated);
                return Err(Error::AlreadyPopulated);
            }

            if mode == SignatureMode::Skipped || jws.signature.is_some() {
                populated
            } else {
                match parse_logged(token, mode) {
                    Ok(parsed) => Populated::Parsed(parsed),
                    Err(e) => {
                        *slot = Some(populated);
                        return Err(e);
                    }
                }
            }
        }
    };

    Ok(slot.insert(populated).jws())
}

fn parse_logged(token: &str, mode: SignatureMode) -> Result<ParsedJws> {
    let parsed = ParsedJws::parse(token, mode)?;
    log::trace!("Parsed JWS with header {}", parsed.header_text);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{algorithm::Algorithm, signer::RsaSigner};

    const SIGNER1_KEY: &str = include_str!("../fixtures/signer1.key.pem");
    const SIGNER1_PUB: &str = include_str!("../fixtures/signer1.pub.pem");
    const SIGNER2_PUB: &str = include_str!("../fixtures/signer2.pub.pem");
    const RS256_HELLO: &str = include_str!("../fixtures/rs256-hello.jws");

    fn signer1() -> RsaSigner {
        RsaSigner::import_pem(SIGNER1_KEY).unwrap()
    }

    fn verifier1() -> Verifier {
        Verifier::from_public_key_pem(SIGNER1_PUB).unwrap()
    }

    fn flip_bit(segment_b64u: &str, index: usize) -> String {
        let mut bytes = base64url::decode(segment_b64u).unwrap();
        bytes[index] ^= 0x01;
        base64url::encode(bytes)
    }

    #[test]
    fn generates_known_rs256_token() {
        let _ = env_logger::builder().is_test(true).try_init();

        let registry = AlgorithmRegistry::default();
        let (token, parsed) =
            generate(&registry, r#"{"alg":"RS256"}"#, "hello", &signer1()).unwrap();

        assert!(token.starts_with("eyJhbGciOiJSUzI1NiJ9.aGVsbG8."));
        assert_eq!(token, RS256_HELLO.trim());
        assert_eq!(parsed, ParsedJws::parse(&token, SignatureMode::Required).unwrap());
    }

    #[test]
    fn parses_known_rs256_token() {
        let parsed = ParsedJws::parse(RS256_HELLO.trim(), SignatureMode::Required).unwrap();

        assert_eq!(parsed.header_claim("alg").unwrap(), "RS256");
        assert_eq!(parsed.header_text(), r#"{"alg":"RS256"}"#);
        assert_eq!(parsed.payload(), "hello");
        assert_eq!(parsed.signing_input(), "eyJhbGciOiJSUzI1NiJ9.aGVsbG8");
        assert_eq!(parsed.signature().unwrap().len(), 256);
        assert_eq!(parsed.to_compact(), RS256_HELLO.trim());

        let registry = AlgorithmRegistry::default();
        assert!(parsed.verify(&registry, &verifier1()).unwrap());
    }

    #[test]
    fn sign_then_verify_for_every_algorithm() {
        let registry = AlgorithmRegistry::default();
        let signer = signer1();

        for algorithm in [
            Algorithm::RS256,
            Algorithm::RS512,
            Algorithm::PS256,
            Algorithm::PS512,
        ] {
            let header = format!(r#"{{"alg":"{algorithm}","kid":"signer1"}}"#);
            let payload = r#"{"iss":"joe","exp":1300819380}"#;

            let (token, _) = generate(&registry, &header, payload, &signer).unwrap();

            assert!(verify(&token, &registry, &verifier1()).unwrap(), "{algorithm}");
            assert!(
                !verify(&token, &registry, &Verifier::from_public_key_pem(SIGNER2_PUB).unwrap())
                    .unwrap(),
                "{algorithm}"
            );
        }
    }

    #[test]
    fn payload_is_opaque_text() {
        let registry = AlgorithmRegistry::default();
        let (token, parsed) =
            generate(&registry, r#"{"alg":"PS256"}"#, "não é JSON ✓", &signer1()).unwrap();

        assert_eq!(parsed.payload(), "não é JSON ✓");
        assert!(verify(&token, &registry, &verifier1()).unwrap());
    }

    #[test]
    fn tampering_with_any_segment_is_rejected_not_faulted() {
        let registry = AlgorithmRegistry::default();
        let (token, parsed) = generate(
            &registry,
            r#"{"alg":"RS256","kid":"a"}"#,
            "hello world",
            &signer1(),
        )
        .unwrap();

        // flips 'a' to '`' inside the kid value
        let header = flip_bit(parsed.header_b64u(), 22);
        let payload = flip_bit(parsed.payload_b64u(), 0);
        let signature = flip_bit(parsed.signature_b64u(), 100);

        let tampered = [
            format!("{header}.{}.{}", parsed.payload_b64u(), parsed.signature_b64u()),
            format!("{}.{payload}.{}", parsed.header_b64u(), parsed.signature_b64u()),
            format!("{}.{}.{signature}", parsed.header_b64u(), parsed.payload_b64u()),
        ];

        assert!(verify(&token, &registry, &verifier1()).unwrap());
        for token in tampered {
            assert!(!verify(&token, &registry, &verifier1()).unwrap(), "{token}");
        }
    }

    #[test]
    fn malformed_tokens() {
        for token in ["", "a.b", "a.b.c.d", ".b.c", "a..c", "a.b.", "abc", ".."] {
            assert!(
                matches!(
                    ParsedJws::parse(token, SignatureMode::Required),
                    Err(Error::MalformedToken(_))
                ),
                "{token}"
            );
            assert!(matches!(
                encoded_signature_value(token),
                Err(Error::MalformedToken(_))
            ));
        }

        assert_eq!(encoded_signature_value("a.b.c").unwrap(), "c");
    }

    #[test]
    fn malformed_token_messages_count_every_segment() {
        let message = |token: &str| match ParsedJws::parse(token, SignatureMode::Skipped) {
            Err(e @ Error::MalformedToken(_)) => e.to_string(),
            other => panic!("expected a malformed token error, got {other:?}"),
        };

        assert!(message("a..c").contains("segment of the token is empty"));
        assert!(message("..").contains("segment of the token is empty"));
        assert!(message("a.b.c.d").contains("found 4"));
        assert!(message("a.b").contains("found 2"));
        assert!(message("").contains("found 1"));
        assert!(message("a.b.c.").contains("found 4"));
    }

    #[test]
    fn header_must_be_a_json_object() {
        let payload = base64url::encode_str("hello");

        let array = format!("{}.{payload}.AAAA", base64url::encode_str("[1,2]"));
        let err = ParsedJws::parse(&array, SignatureMode::Required).unwrap_err();
        assert!(
            matches!(err, Error::InvalidHeader(ref msg) if msg.contains("an array")),
            "{err:?}"
        );

        let not_json = format!("{}.{payload}.AAAA", base64url::encode_str("alg=RS256"));
        let err = ParsedJws::parse(&not_json, SignatureMode::Required).unwrap_err();
        assert!(
            matches!(err, Error::InvalidHeader(ref msg) if !msg.contains("an array")),
            "{err:?}"
        );

        let registry = AlgorithmRegistry::default();
        assert!(matches!(
            generate(&registry, r#"["alg","RS256"]"#, "hello", &signer1()),
            Err(Error::InvalidHeader(_))
        ));
    }

    #[test]
    fn undecodable_segments() {
        let header = base64url::encode_str(r#"{"alg":"RS256"}"#);

        for token in [
            format!("{header}.aGVsb.AAAA"),
            format!("{header}.aGVsbG8.A+AA"),
            format!("{header}.{}.AAAA", base64url::encode([0xffu8, 0xfe])),
            "e30=.aGVsbG8.AAAA".to_owned(),
        ] {
            assert!(
                matches!(
                    ParsedJws::parse(&token, SignatureMode::Required),
                    Err(Error::Decode(_))
                ),
                "{token}"
            );
        }
    }

    #[test]
    fn skipped_signature_is_decoded_at_verification() {
        let registry = AlgorithmRegistry::default();

        let parsed = ParsedJws::parse(RS256_HELLO.trim(), SignatureMode::Skipped).unwrap();
        assert!(parsed.signature().is_none());
        assert_eq!(parsed.header_claim("alg").unwrap(), "RS256");
        assert!(parsed.verify(&registry, &verifier1()).unwrap());

        let bad_signature = format!("{}.A+AA", parsed.signing_input());
        let parsed = ParsedJws::parse(&bad_signature, SignatureMode::Skipped).unwrap();
        assert!(matches!(
            parsed.verify(&registry, &verifier1()),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn unsupported_algorithm_never_verifies() {
        let registry = AlgorithmRegistry::default();

        for alg in ["none", "HS256"] {
            let header = format!(r#"{{"alg":"{alg}"}}"#);
            assert!(matches!(
                generate(&registry, &header, "hello", &signer1()),
                Err(Error::UnsupportedAlgorithm(_))
            ));

            // a valid RS256 signature presented under a forged header
            let forged = format!(
                "{}.aGVsbG8.{}",
                base64url::encode_str(&header),
                encoded_signature_value(RS256_HELLO.trim()).unwrap()
            );
            assert!(matches!(
                verify(&forged, &registry, &verifier1()),
                Err(Error::UnsupportedAlgorithm(_))
            ));
        }

        let header = base64url::encode_str(r#"{"typ":"JWT"}"#);
        let token = format!("{header}.aGVsbG8.AAAA");
        assert!(matches!(
            verify(&token, &registry, &verifier1()),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn restricted_registry_applies_to_sign_and_verify() {
        let pss_only = AlgorithmRegistry::new(&[Algorithm::PS256]);

        assert!(matches!(
            generate(&pss_only, r#"{"alg":"RS256"}"#, "hello", &signer1()),
            Err(Error::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            verify(RS256_HELLO.trim(), &pss_only, &verifier1()),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn rejects_empty_payload() {
        let registry = AlgorithmRegistry::default();
        assert!(matches!(
            generate(&registry, r#"{"alg":"RS256"}"#, "", &signer1()),
            Err(Error::MalformedToken(_))
        ));
    }

    #[test]
    fn parse_is_idempotent() {
        let token = RS256_HELLO.trim();
        let mut jws = Jws::new();
        assert!(jws.is_empty());

        let first = jws.parse(token, SignatureMode::Required).unwrap().clone();
        let second = jws.parse(token, SignatureMode::Required).unwrap().clone();
        let third = jws.parse(token, SignatureMode::Skipped).unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(first, third);
        assert!(first.signature().is_some());
        assert!(!jws.is_generated());
    }

    #[test]
    fn parse_upgrades_skipped_signature() {
        let token = RS256_HELLO.trim();
        let mut jws = Jws::new();

        assert!(jws
            .parse(token, SignatureMode::Skipped)
            .unwrap()
            .signature()
            .is_none());
        assert!(jws
            .parse(token, SignatureMode::Required)
            .unwrap()
            .signature()
            .is_some());

        assert!(jws.verify(token, &verifier1()).unwrap());
    }

    #[test]
    fn populated_jws_is_read_only() {
        let registry = AlgorithmRegistry::default();
        let (other, _) = generate(&registry, r#"{"alg":"RS512"}"#, "other", &signer1()).unwrap();

        let mut jws = Jws::new();
        jws.parse(RS256_HELLO.trim(), SignatureMode::Required)
            .unwrap();

        assert!(matches!(
            jws.parse(&other, SignatureMode::Required),
            Err(Error::AlreadyPopulated)
        ));
        assert!(matches!(
            jws.generate(r#"{"alg":"RS256"}"#, "hello", &signer1()),
            Err(Error::AlreadyPopulated)
        ));
        assert_eq!(jws.parsed().unwrap().payload(), "hello");
    }

    #[test]
    fn generate_populates_like_parse() {
        let mut jws = Jws::new();
        let token = jws
            .generate(r#"{"alg":"PS512","kid":"k1"}"#, "payload", &signer1())
            .unwrap();

        assert!(jws.is_generated());
        let parsed = jws.parsed().unwrap();
        assert_eq!(
            parsed,
            &ParsedJws::parse(&token, SignatureMode::Required).unwrap()
        );
        assert_eq!(parsed.header_claim("kid").unwrap(), "k1");

        // generated state already holds the token, so verification does not re-parse
        assert!(jws.verify(&token, &verifier1()).unwrap());
        assert!(jws.is_generated());
    }

    #[cfg(feature = "x509")]
    #[test]
    fn verifies_with_certificate() {
        let registry = AlgorithmRegistry::default();
        let cert = Verifier::certificate(include_str!("../fixtures/signer1.cert.pem"));
        let other = Verifier::certificate(include_str!("../fixtures/signer2.cert.pem"));

        assert!(verify(RS256_HELLO.trim(), &registry, &cert).unwrap());
        assert!(!verify(RS256_HELLO.trim(), &registry, &other).unwrap());
        assert!(matches!(
            verify(RS256_HELLO.trim(), &registry, &Verifier::certificate("bogus")),
            Err(Error::CertificateParse(_))
        ));
    }

    fn header_with_extra_fields(
        algorithm: Algorithm,
        extra: std::collections::BTreeMap<String, String>,
    ) -> JsonObject {
        let mut header: JsonObject = extra
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect();
        header.insert("alg".to_owned(), Value::String(algorithm.to_string()));

        header
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn signed_tokens_verify_for_any_header_and_payload(
            algorithm in prop::sample::select(vec![
                Algorithm::RS256,
                Algorithm::RS512,
                Algorithm::PS256,
                Algorithm::PS512,
            ]),
            extra in prop::collection::btree_map("[a-z]{1,8}", "\\PC{0,16}", 0..4),
            payload in "\\PC{1,64}",
        ) {
            let registry = AlgorithmRegistry::default();
            let header = header_with_extra_fields(algorithm, extra);
            let header_text = Value::Object(header.clone()).to_string();

            let (token, _) = generate(&registry, &header_text, &payload, &signer1()).unwrap();
            let parsed = ParsedJws::parse(&token, SignatureMode::Required).unwrap();

            prop_assert_eq!(parsed.header(), &header);
            prop_assert_eq!(parsed.payload(), payload.as_str());
            prop_assert!(parsed.verify(&registry, &verifier1()).unwrap());
            prop_assert!(!parsed
                .verify(&registry, &Verifier::from_public_key_pem(SIGNER2_PUB).unwrap())
                .unwrap());
        }
    }
}
