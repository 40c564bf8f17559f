#![forbid(unsafe_code)]

//! XAdES `SignedProperties`.

use crate::id::IdPrefix;
use chrono::{DateTime, Utc};
use tornvik_core::ns::{self, attr, node};
use tornvik_core::HashAlgorithm;
use tornvik_keys::CredentialBundle;
use tornvik_xml::{Element, Namespace};

/// `SigningTime` format: UTC, second precision, literal `Z`.
pub const SIGNING_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Build the `SignedProperties` subtree.
///
/// ```text
/// xades:SignedProperties Id="<prefix>SignedProperties"
///   xades:SignedSignatureProperties
///     xades:SigningTime
///     xades:SigningCertificate
///       xades:Cert
///         xades:CertDigest
///           ds:DigestMethod (SHA-1)
///           ds:DigestValue
///         xades:IssuerSerial
///           ds:X509IssuerName
///           ds:X509SerialNumber
/// ```
///
/// No namespaces are declared; see [`qualified`] for the copy that is
/// digested.
pub fn build_signed_properties(
    credentials: &CredentialBundle,
    signing_time: DateTime<Utc>,
    dsig_prefix: &str,
    id: &IdPrefix,
) -> Element {
    let xades = ns::XADES_PREFIX;
    let cert_hash = HashAlgorithm::Sha1;

    let cert_digest = Element::new(xades, node::CERT_DIGEST)
        .with_child(
            Element::new(dsig_prefix, node::DIGEST_METHOD)
                .with_attribute(attr::ALGORITHM, cert_hash.digest_uri()),
        )
        .with_child(Element::new(dsig_prefix, node::DIGEST_VALUE).with_text(
            tornvik_crypto::digest_base64(cert_hash, &credentials.certificate_der),
        ));

    let issuer_serial = Element::new(xades, node::ISSUER_SERIAL)
        .with_child(
            Element::new(dsig_prefix, node::X509_ISSUER_NAME).with_text(credentials.issuer_name()),
        )
        .with_child(
            Element::new(dsig_prefix, node::X509_SERIAL_NUMBER)
                .with_text(credentials.serial_number()),
        );

    let signing_certificate = Element::new(xades, node::SIGNING_CERTIFICATE).with_child(
        Element::new(xades, node::CERT)
            .with_child(cert_digest)
            .with_child(issuer_serial),
    );

    Element::new(xades, node::SIGNED_PROPERTIES)
        .with_attribute(attr::ID, id.signed_properties_id())
        .with_child(
            Element::new(xades, node::SIGNED_SIGNATURE_PROPERTIES)
                .with_child(
                    Element::new(xades, node::SIGNING_TIME)
                        .with_text(signing_time.format(SIGNING_TIME_FORMAT).to_string()),
                )
                .with_child(signing_certificate),
        )
}

/// Copy of `signed_properties` declaring the XML-DSig and XAdES
/// namespaces, as needed to canonicalize it outside the signature. The
/// `host` bindings in scope where the `Signature` is placed come first.
pub fn qualified(signed_properties: &Element, dsig_prefix: &str, host: &[Namespace]) -> Element {
    let mut bindings = host.to_vec();
    bindings.push(Namespace::new(dsig_prefix, ns::DSIG));
    bindings.push(Namespace::new(ns::XADES_PREFIX, ns::XADES));
    tornvik_xml::qualify(signed_properties, &bindings)
}
