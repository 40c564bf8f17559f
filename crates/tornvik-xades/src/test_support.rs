//! Fixtures shared by the unit tests.

use chrono::{DateTime, TimeZone, Utc};
use rsa::RsaPublicKey;
use tornvik_keys::CredentialBundle;

pub const SIGNER_KEY_PEM: &[u8] = include_bytes!("../../../test-data/keys/signer-key.pem");
pub const SIGNER_CERT_DER: &[u8] = include_bytes!("../../../test-data/keys/signer-cert.der");
pub const CA_CERT_PEM: &[u8] = include_bytes!("../../../test-data/keys/ca-cert.pem");

/// base64 SHA-1 of `SIGNER_CERT_DER`.
pub const SIGNER_CERT_SHA1: &str = "dOi7achww46WKcGvZZCwhNgTJU4=";
pub const SIGNER_ISSUER: &str = "CN=Tornvik Test Root CA,O=Tornvik Test,C=SE";
pub const SIGNER_SERIAL: &str = "1234567890123456789";

pub fn test_credentials() -> CredentialBundle {
    let key = tornvik_keys::loader::load_rsa_private_key(SIGNER_KEY_PEM).unwrap();
    CredentialBundle::new(Some(key), SIGNER_CERT_DER.to_vec()).unwrap()
}

pub fn test_credentials_with_chain() -> CredentialBundle {
    let chain = tornvik_keys::loader::load_certificate_chain(CA_CERT_PEM).unwrap();
    test_credentials().with_chain(chain)
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap()
}

/// Public key taken from the signer certificate, for verifying
/// signatures independently of the signing code.
pub fn certificate_public_key() -> RsaPublicKey {
    use der::Encode;
    use rsa::pkcs8::DecodePublicKey;
    let cert = tornvik_keys::loader::load_x509_cert_der(SIGNER_CERT_DER).unwrap();
    let spki = cert.tbs_certificate.subject_public_key_info.to_der().unwrap();
    RsaPublicKey::from_public_key_der(&spki).unwrap()
}
