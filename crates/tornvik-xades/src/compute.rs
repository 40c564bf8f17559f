#![forbid(unsafe_code)]

//! Digest and signature values over canonicalized elements.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tornvik_c14n::Canonicalizer;
use tornvik_core::{Error, HashAlgorithm};
use tornvik_crypto::{KeyStore, Signer};
use tornvik_xml::{Attribute, Document, Element};

/// Canonicalize `element`, hash it, and return the base64 digest.
pub fn digest_value(
    element: &Element,
    c14n: &dyn Canonicalizer,
    hash: HashAlgorithm,
) -> Result<String, Error> {
    digest_subset(element, &[], c14n, hash)
}

/// Like [`digest_value`], for an element whose omitted ancestors carry the
/// `xml:*` attributes `inherited`.
pub fn digest_subset(
    element: &Element,
    inherited: &[Attribute],
    c14n: &dyn Canonicalizer,
    hash: HashAlgorithm,
) -> Result<String, Error> {
    let canonical = c14n.canonicalize_subset(element, inherited)?;
    Ok(digest_canonical(&element.qualified_name(), &canonical, c14n, hash))
}

/// Canonicalize a whole document, hash it, and return the base64 digest.
pub fn digest_document(
    document: &Document,
    c14n: &dyn Canonicalizer,
    hash: HashAlgorithm,
) -> Result<String, Error> {
    let canonical = c14n.canonicalize_document(document)?;
    Ok(digest_canonical("#document", &canonical, c14n, hash))
}

fn digest_canonical(
    what: &str,
    canonical: &[u8],
    c14n: &dyn Canonicalizer,
    hash: HashAlgorithm,
) -> String {
    tracing::trace!(
        element = what,
        c14n = c14n.algorithm(),
        hash = %hash,
        "pre-digest data:\n{}",
        String::from_utf8_lossy(canonical)
    );
    tornvik_crypto::digest_base64(hash, canonical)
}

/// Canonicalize `element` (whose omitted ancestors carry the `xml:*`
/// attributes `inherited`), sign it, and return the base64 signature value.
pub fn signature_value(
    element: &Element,
    inherited: &[Attribute],
    c14n: &dyn Canonicalizer,
    hash: HashAlgorithm,
    signer: &dyn Signer,
    keys: &dyn KeyStore,
) -> Result<String, Error> {
    let canonical = c14n.canonicalize_subset(element, inherited)?;
    tracing::trace!(
        element = %element.qualified_name(),
        c14n = c14n.algorithm(),
        hash = %hash,
        "pre-signature data:\n{}",
        String::from_utf8_lossy(&canonical)
    );
    let signature = signer.sign(&canonical, hash, keys)?;
    Ok(STANDARD.encode(signature))
}
