use rsa::{pkcs8::DecodePublicKey, RsaPublicKey};
use x509_cert::{
    der::{DecodePem, Encode},
    Certificate,
};

use crate::error::{Error, Result};

/// Extracts the RSA subject public key from a PEM formatted X.509 certificate.
///
/// Only the certificate encoding is checked. Validity period, issuer and chain are not.
///
/// # Errors
/// Returns [`Error::CertificateParse`] if the PEM text is not a certificate or its subject
/// public key is not an RSA key.
pub fn public_key_from_pem(pem: &str) -> Result<RsaPublicKey> {
    let cert = Certificate::from_pem(pem.trim().as_bytes())
        .map_err(|e| Error::CertificateParse(e.to_string()))?;

    let spki_der = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| Error::CertificateParse(e.to_string()))?;

    let key = RsaPublicKey::from_public_key_der(&spki_der).map_err(|e| {
        Error::CertificateParse(format!("certificate does not carry an RSA public key: {e}"))
    })?;

    log::debug!(
        "Extracted RSA public key from certificate '{}'",
        cert.tbs_certificate.subject
    );

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::RsaSigner;

    const SIGNER1_KEY: &str = include_str!("../fixtures/signer1.key.pem");
    const SIGNER1_CERT: &str = include_str!("../fixtures/signer1.cert.pem");
    const SIGNER2_CERT: &str = include_str!("../fixtures/signer2.cert.pem");

    #[test]
    fn extracts_subject_public_key() {
        let _ = env_logger::builder().is_test(true).try_init();

        let expected = RsaSigner::import_pem(SIGNER1_KEY).unwrap().public_key();

        assert_eq!(public_key_from_pem(SIGNER1_CERT).unwrap(), expected);
        assert_ne!(public_key_from_pem(SIGNER2_CERT).unwrap(), expected);

        let padded = format!("\n  {SIGNER1_CERT}\n\n");
        assert_eq!(public_key_from_pem(&padded).unwrap(), expected);
    }

    #[test]
    fn rejects_non_certificates() {
        for pem in [
            "",
            "not a certificate",
            include_str!("../fixtures/signer1.pub.pem"),
        ] {
            assert!(
                matches!(public_key_from_pem(pem), Err(Error::CertificateParse(_))),
                "{pem}"
            );
        }
    }
}
