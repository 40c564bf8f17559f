#![forbid(unsafe_code)]

//! Key and certificate loading from PEM and DER.

use der::{Decode, Encode};
use rsa::RsaPrivateKey;
use std::path::Path;
use tornvik_core::Error;
use x509_cert::Certificate;

fn is_pem(data: &[u8]) -> bool {
    data.iter()
        .position(|b| !b.is_ascii_whitespace())
        .is_some_and(|start| data[start..].starts_with(b"-----BEGIN"))
}

/// Load an RSA private key from PEM data (PKCS#8 or PKCS#1).
pub fn load_rsa_private_pem(pem_data: &[u8]) -> Result<RsaPrivateKey, Error> {
    use pkcs8::DecodePrivateKey;
    let pem_str = std::str::from_utf8(pem_data)
        .map_err(|e| Error::Key(format!("invalid PEM encoding: {e}")))?;

    // Try PKCS#8 first
    if let Ok(pk) = RsaPrivateKey::from_pkcs8_pem(pem_str) {
        return Ok(pk);
    }

    // Try PKCS#1
    use pkcs1::DecodeRsaPrivateKey;
    RsaPrivateKey::from_pkcs1_pem(pem_str)
        .map_err(|e| Error::Key(format!("failed to parse RSA private key PEM: {e}")))
}

/// Load an RSA private key from DER data (PKCS#8 or PKCS#1).
pub fn load_rsa_private_der(der_data: &[u8]) -> Result<RsaPrivateKey, Error> {
    use pkcs8::DecodePrivateKey;
    if let Ok(pk) = RsaPrivateKey::from_pkcs8_der(der_data) {
        return Ok(pk);
    }

    use pkcs1::DecodeRsaPrivateKey;
    RsaPrivateKey::from_pkcs1_der(der_data)
        .map_err(|e| Error::Key(format!("failed to parse RSA private key DER: {e}")))
}

/// Load an RSA private key, detecting PEM or DER.
pub fn load_rsa_private_key(data: &[u8]) -> Result<RsaPrivateKey, Error> {
    if is_pem(data) {
        load_rsa_private_pem(data)
    } else {
        load_rsa_private_der(data)
    }
}

/// Parse a DER-encoded X.509 certificate.
pub fn load_x509_cert_der(data: &[u8]) -> Result<Certificate, Error> {
    Certificate::from_der(data)
        .map_err(|e| Error::Certificate(format!("failed to parse X.509 certificate: {e}")))
}

/// Decode a PEM-encoded X.509 certificate to DER.
pub fn load_x509_cert_pem(pem_data: &[u8]) -> Result<Vec<u8>, Error> {
    let pem_str = std::str::from_utf8(pem_data)
        .map_err(|e| Error::Certificate(format!("invalid PEM encoding: {e}")))?;

    let (label, der_bytes) = pem_rfc7468::decode_vec(pem_str.trim().as_bytes())
        .map_err(|e| Error::Certificate(format!("failed to decode certificate PEM: {e}")))?;

    if label != "CERTIFICATE" {
        return Err(Error::Certificate(format!(
            "expected CERTIFICATE PEM label, got: {label}"
        )));
    }
    Ok(der_bytes)
}

/// Load a certificate from PEM or DER. Returns the parsed certificate
/// and its DER encoding.
pub fn load_certificate(data: &[u8]) -> Result<(Certificate, Vec<u8>), Error> {
    let der_bytes = if is_pem(data) {
        load_x509_cert_pem(data)?
    } else {
        data.to_vec()
    };
    let cert = load_x509_cert_der(&der_bytes)?;
    Ok((cert, der_bytes))
}

/// Load an ordered certificate chain: one or more concatenated PEM
/// `CERTIFICATE` blocks, or a single DER certificate. Returns the DER
/// encoding of each certificate in file order.
pub fn load_certificate_chain(data: &[u8]) -> Result<Vec<Vec<u8>>, Error> {
    if !is_pem(data) {
        let (_, der_bytes) = load_certificate(data)?;
        return Ok(vec![der_bytes]);
    }

    let certs = Certificate::load_pem_chain(data)
        .map_err(|e| Error::Certificate(format!("failed to parse certificate chain: {e}")))?;
    certs
        .iter()
        .map(|cert| {
            cert.to_der()
                .map_err(|e| Error::Certificate(format!("failed to encode certificate: {e}")))
        })
        .collect()
}

/// Load an RSA private key file.
pub fn load_key_file(path: &Path) -> Result<RsaPrivateKey, Error> {
    let data = std::fs::read(path)?;
    load_rsa_private_key(&data)
}

/// Load a certificate file (PEM or DER).
pub fn load_certificate_file(path: &Path) -> Result<(Certificate, Vec<u8>), Error> {
    let data = std::fs::read(path)?;
    load_certificate(&data)
}

/// Load a certificate chain file.
pub fn load_certificate_chain_file(path: &Path) -> Result<Vec<Vec<u8>>, Error> {
    let data = std::fs::read(path)?;
    load_certificate_chain(&data)
}
