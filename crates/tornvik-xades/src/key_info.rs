#![forbid(unsafe_code)]

//! `KeyInfo` carrying the signing certificate and its chain.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tornvik_core::ns::node;
use tornvik_keys::CredentialBundle;
use tornvik_xml::Element;

/// Build `KeyInfo/X509Data` with the leaf certificate first and one
/// `X509Certificate` per chain entry after it.
pub fn build_key_info(credentials: &CredentialBundle, dsig_prefix: &str) -> Element {
    let certificates = std::iter::once(&credentials.certificate_der)
        .chain(&credentials.chain)
        .map(|der| Element::new(dsig_prefix, node::X509_CERTIFICATE).with_text(STANDARD.encode(der)));

    Element::new(dsig_prefix, node::KEY_INFO)
        .with_child(Element::new(dsig_prefix, node::X509_DATA).with_children(certificates))
}
