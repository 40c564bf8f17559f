#![forbid(unsafe_code)]

//! Certificate fields referenced by XAdES `IssuerSerial`.

use rsa::BigUint;
use x509_cert::Certificate;

/// Issuer distinguished name as an RFC 4514 string (most specific RDN
/// first, e.g. `CN=Example CA,O=Example,C=SE`).
pub fn issuer_name(cert: &Certificate) -> String {
    cert.tbs_certificate.issuer.to_string()
}

/// Serial number in decimal.
pub fn serial_number(cert: &Certificate) -> String {
    BigUint::from_bytes_be(cert.tbs_certificate.serial_number.as_bytes()).to_string()
}
