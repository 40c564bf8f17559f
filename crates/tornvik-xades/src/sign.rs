#![forbid(unsafe_code)]

//! XAdES-BES signature assembly.
//!
//! The data is digested first, then SignedProperties, then SignedInfo is
//! signed. SignedProperties and SignedInfo are canonicalized as copies
//! that declare every namespace they will inherit once placed, so the
//! values match what a verifier computes in place.

use crate::compute::{digest_document, digest_subset, signature_value};
use crate::context::SigningContext;
use crate::id::IdPrefix;
use crate::{key_info, object, properties, signed_info};
use chrono::Utc;
use tornvik_c14n::Canonicalizer;
use tornvik_core::ns::{self, attr, node};
use tornvik_core::{Error, HashAlgorithm};
use tornvik_crypto::{RsaPkcs1v15Signer, Signer};
use tornvik_xml::{Attribute, Document, Element, Scope};

/// What a same-document reference selects. Comments are never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dereferenced {
    /// `""`: the whole document.
    Document(Document),
    /// `#id`: a copy of the element declaring the namespaces it inherits,
    /// and the `xml:*` attributes its ancestors carry.
    Element {
        element: Element,
        inherited: Vec<Attribute>,
    },
}

impl Dereferenced {
    fn digest(&self, c14n: &dyn Canonicalizer, hash: HashAlgorithm) -> Result<String, Error> {
        match self {
            Self::Document(document) => digest_document(document, c14n, hash),
            Self::Element { element, inherited } => digest_subset(element, inherited, c14n, hash),
        }
    }
}

/// Create a XAdES-BES `Signature` over `data` with RSA PKCS#1 v1.5.
///
/// `data` is the element the data reference points at. The returned
/// element is not attached anywhere; see [`sign_document`] for enveloped
/// signing of a document.
pub fn create_signature(data: &Element, ctx: &SigningContext) -> Result<Element, Error> {
    create_signature_with(data, ctx, &RsaPkcs1v15Signer)
}

/// Create a XAdES-BES `Signature` over `data`, signing with `signer`.
pub fn create_signature_with(
    data: &Element,
    ctx: &SigningContext,
    signer: &dyn Signer,
) -> Result<Element, Error> {
    let mut element = data.clone();
    if is_same_document(&ctx.data.reference_uri) {
        element.remove_comments();
    }
    let data = Dereferenced::Element {
        element,
        inherited: Vec::new(),
    };
    assemble(&data, &Scope::default(), ctx, signer)
}

/// Create a XAdES-BES `Signature` over a resolved reference, for placing
/// outside the document it came from.
pub fn sign_reference(data: &Dereferenced, ctx: &SigningContext) -> Result<Element, Error> {
    assemble(data, &Scope::default(), ctx, &RsaPkcs1v15Signer)
}

/// Sign `document` and append the `Signature` as the last child of its
/// root element.
///
/// The data reference URI of `ctx` selects what is signed; see
/// [`resolve_reference`]. A reference that covers the root also covers
/// the signature, so it needs the enveloped-signature transform.
pub fn sign_document(mut document: Document, ctx: &SigningContext) -> Result<Document, Error> {
    let uri = ctx.data.reference_uri.as_str();
    let data = resolve_reference(&document, uri)?;
    let covers_root = match &data {
        Dereferenced::Document(_) => true,
        Dereferenced::Element { .. } => uri
            .strip_prefix('#')
            .is_some_and(|id| document.root.has_id(id)),
    };
    if covers_root && !ctx.data.enveloped {
        return Err(Error::Configuration(format!(
            "reference {uri:?} contains the signature and needs the enveloped-signature transform"
        )));
    }

    let host = Scope::default().enter(&document.root);
    let signature = assemble(&data, &host, ctx, &RsaPkcs1v15Signer)?;
    document.root.add_child(signature);
    Ok(document)
}

/// Resolve a same-document reference URI.
///
/// `""` is the whole document and `#id` the element whose `Id`, `ID` or
/// `id` attribute matches. Comments are removed from the result.
pub fn resolve_reference(document: &Document, uri: &str) -> Result<Dereferenced, Error> {
    if uri.is_empty() {
        let mut whole = document.clone();
        whole.remove_comments();
        return Ok(Dereferenced::Document(whole));
    }
    match uri.strip_prefix('#').filter(|id| !id.is_empty()) {
        Some(id) => {
            let (found, scope) = document
                .root
                .find_by_id(id)
                .ok_or_else(|| Error::InvalidUri(format!("no element with Id {id:?}")))?;
            let mut element = scope.detach(found);
            element.remove_comments();
            Ok(Dereferenced::Element {
                element,
                inherited: scope.xml_attributes,
            })
        }
        None => Err(Error::InvalidUri(format!(
            "unsupported reference URI {uri:?}: only \"\" and \"#id\" are supported"
        ))),
    }
}

fn is_same_document(uri: &str) -> bool {
    uri.is_empty() || uri.starts_with('#')
}

/// Build the `Signature`. `host` is the scope of the element the signature
/// will be appended to, or empty when it stands alone.
fn assemble(
    data: &Dereferenced,
    host: &Scope,
    ctx: &SigningContext,
    signer: &dyn Signer,
) -> Result<Element, Error> {
    ctx.validate()?;
    let id = IdPrefix::allocate(ctx)?;
    let p = ctx.dsig_prefix.as_str();
    tracing::debug!(id_prefix = %id, dsig_prefix = p, "creating XAdES signature");

    let data_digest = data.digest(&*ctx.data.c14n, ctx.data.hash)?;
    tracing::debug!(
        uri = %ctx.data.reference_uri,
        c14n = ctx.data.c14n.algorithm(),
        digest = ctx.data.hash.digest_uri(),
        "data digest computed"
    );

    let host_bindings = host.declarations();
    let inherited = host.xml_attributes.as_slice();

    let signing_time = ctx.properties.signing_time.unwrap_or_else(Utc::now);
    let signed_properties =
        properties::build_signed_properties(&ctx.credentials, signing_time, p, &id);
    let properties_digest = digest_subset(
        &properties::qualified(&signed_properties, p, &host_bindings),
        inherited,
        &*ctx.properties.c14n,
        ctx.properties.hash,
    )?;
    tracing::debug!(
        uri = %id.signed_properties_uri(),
        c14n = ctx.properties.c14n.algorithm(),
        digest = ctx.properties.hash.digest_uri(),
        signing_time = %signing_time,
        "signed properties digest computed"
    );

    let signed_info = signed_info::build_signed_info(ctx, &id, &data_digest, &properties_digest);
    let value = signature_value(
        &signed_info::qualified(&signed_info, p, &host_bindings),
        inherited,
        &*ctx.c14n,
        ctx.hash,
        signer,
        &ctx.credentials,
    )?;
    tracing::debug!(
        c14n = ctx.c14n.algorithm(),
        method = ctx.hash.signature_uri(),
        "signed info signed"
    );

    let signature = Element::new(p, node::SIGNATURE)
        .with_namespace(p, ns::DSIG)
        .with_attribute(attr::ID, id.signature_id())
        .with_child(signed_info)
        .with_child(Element::new(p, node::SIGNATURE_VALUE).with_text(value))
        .with_child(key_info::build_key_info(&ctx.credentials, p))
        .with_child(object::build_object(signed_properties, &id, p));

    tracing::info!(
        id = %id.signature_id(),
        chain_len = ctx.credentials.chain.len(),
        "XAdES signature assembled"
    );
    Ok(signature)
}
