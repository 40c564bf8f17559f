#![forbid(unsafe_code)]

//! `SignedInfo` with the data and SignedProperties references.

use crate::context::SigningContext;
use crate::id::IdPrefix;
use tornvik_c14n::Canonicalizer;
use tornvik_core::ns::{self, attr, node};
use tornvik_core::{algorithm, HashAlgorithm};
use tornvik_xml::{Element, Namespace};

/// Build `SignedInfo`: CanonicalizationMethod, SignatureMethod, the data
/// Reference and the SignedProperties Reference, in that order.
pub fn build_signed_info(
    ctx: &SigningContext,
    id: &IdPrefix,
    data_digest: &str,
    properties_digest: &str,
) -> Element {
    let p = ctx.dsig_prefix.as_str();

    let mut data_transforms = Element::new(p, node::TRANSFORMS);
    if ctx.data.enveloped {
        data_transforms.add_child(
            Element::new(p, node::TRANSFORM)
                .with_attribute(attr::ALGORITHM, algorithm::ENVELOPED_SIGNATURE),
        );
    }
    data_transforms.add_child(transform(p, &*ctx.data.c14n));

    let data_reference = Element::new(p, node::REFERENCE)
        .with_attribute(attr::URI, ctx.data.reference_uri.as_str())
        .with_child(data_transforms)
        .with_children(digest(p, ctx.data.hash, data_digest));

    let properties_reference = Element::new(p, node::REFERENCE)
        .with_attribute(attr::URI, id.signed_properties_uri())
        .with_attribute(attr::TYPE, algorithm::SIGNED_PROPERTIES_TYPE)
        .with_child(
            Element::new(p, node::TRANSFORMS).with_child(transform(p, &*ctx.properties.c14n)),
        )
        .with_children(digest(p, ctx.properties.hash, properties_digest));

    Element::new(p, node::SIGNED_INFO)
        .with_child(c14n_element(p, node::CANONICALIZATION_METHOD, &*ctx.c14n))
        .with_child(
            Element::new(p, node::SIGNATURE_METHOD)
                .with_attribute(attr::ALGORITHM, ctx.hash.signature_uri()),
        )
        .with_child(data_reference)
        .with_child(properties_reference)
}

/// Copy of `signed_info` declaring the XML-DSig namespace, on top of the
/// `host` bindings in scope where the `Signature` is placed.
pub fn qualified(signed_info: &Element, dsig_prefix: &str, host: &[Namespace]) -> Element {
    let mut bindings = host.to_vec();
    bindings.push(Namespace::new(dsig_prefix, ns::DSIG));
    tornvik_xml::qualify(signed_info, &bindings)
}

fn transform(p: &str, c14n: &dyn Canonicalizer) -> Element {
    c14n_element(p, node::TRANSFORM, c14n)
}

/// A `Transform` or `CanonicalizationMethod` naming `c14n`, with its
/// InclusiveNamespaces prefix list when it has one.
fn c14n_element(p: &str, name: &str, c14n: &dyn Canonicalizer) -> Element {
    let mut el = Element::new(p, name).with_attribute(attr::ALGORITHM, c14n.algorithm());
    let prefixes = c14n.inclusive_prefixes();
    if !prefixes.is_empty() {
        el.add_child(
            Element::new(ns::EXC_C14N_PREFIX, node::INCLUSIVE_NAMESPACES)
                .with_namespace(ns::EXC_C14N_PREFIX, ns::EXC_C14N)
                .with_attribute(attr::PREFIX_LIST, prefixes.join(" ")),
        );
    }
    el
}

fn digest(p: &str, hash: HashAlgorithm, value: &str) -> [Element; 2] {
    [
        Element::new(p, node::DIGEST_METHOD).with_attribute(attr::ALGORITHM, hash.digest_uri()),
        Element::new(p, node::DIGEST_VALUE).with_text(value),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_credentials;
    use std::sync::Arc;
    use tornvik_c14n::{C14nMode, ExclusiveCanonicalizer};

    fn child_names(el: &Element) -> Vec<String> {
        el.child_elements().map(|e| e.qualified_name()).collect()
    }

    fn transform_algorithms(reference: &Element) -> Vec<&str> {
        reference
            .find_child("Transforms")
            .unwrap()
            .find_children("Transform")
            .filter_map(|t| t.attribute("Algorithm"))
            .collect()
    }

    #[test]
    fn test_order_and_algorithms() {
        let mut ctx = SigningContext::new(test_credentials()).with_hash(HashAlgorithm::Sha512);
        ctx.hash = HashAlgorithm::Sha1;
        let si = build_signed_info(&ctx, &IdPrefix::default(), "DATA", "PROPS");

        assert_eq!(
            child_names(&si),
            ["ds:CanonicalizationMethod", "ds:SignatureMethod", "ds:Reference", "ds:Reference"]
        );
        assert_eq!(
            si.find_child("CanonicalizationMethod").unwrap().attribute("Algorithm"),
            Some(algorithm::EXC_C14N)
        );
        assert_eq!(
            si.find_child("SignatureMethod").unwrap().attribute("Algorithm"),
            Some(algorithm::RSA_SHA1)
        );

        let refs: Vec<_> = si.find_children("Reference").collect();
        assert_eq!(refs[0].attribute("URI"), Some(""));
        assert_eq!(refs[0].attribute("Type"), None);
        assert_eq!(child_names(refs[0]), ["ds:Transforms", "ds:DigestMethod", "ds:DigestValue"]);
        assert_eq!(
            refs[0].find_child("DigestMethod").unwrap().attribute("Algorithm"),
            Some(algorithm::SHA512)
        );
        assert_eq!(refs[0].find_child("DigestValue").unwrap().text(), "DATA");

        assert_eq!(refs[1].attribute("URI"), Some("#SignedProperties"));
        assert_eq!(refs[1].attribute("Type"), Some(algorithm::SIGNED_PROPERTIES_TYPE));
        assert_eq!(refs[1].find_child("DigestValue").unwrap().text(), "PROPS");
        assert_eq!(transform_algorithms(refs[1]), [algorithm::EXC_C14N]);
    }

    #[test]
    fn test_enveloped_transforms() {
        let ctx = SigningContext::new(test_credentials());
        let si = build_signed_info(&ctx, &IdPrefix::default(), "d", "p");
        let data_ref = si.find_child("Reference").unwrap();
        assert_eq!(
            transform_algorithms(data_ref),
            [algorithm::ENVELOPED_SIGNATURE, algorithm::EXC_C14N]
        );
    }

    #[test]
    fn test_detached_transforms() {
        let mut ctx = SigningContext::new(test_credentials());
        ctx.data.enveloped = false;
        ctx.data.reference_uri = "#payload".into();
        ctx.data.c14n = Arc::new(C14nMode::Inclusive);
        let si = build_signed_info(&ctx, &IdPrefix::default(), "d", "p");
        let data_ref = si.find_child("Reference").unwrap();
        assert_eq!(data_ref.attribute("URI"), Some("#payload"));
        assert_eq!(transform_algorithms(data_ref), [algorithm::C14N]);
    }

    #[test]
    fn test_inclusive_namespaces_prefix_list() {
        let mut ctx = SigningContext::new(test_credentials());
        ctx.data.c14n = Arc::new(ExclusiveCanonicalizer::new(vec!["soap".into(), "#default".into()]));
        let si = build_signed_info(&ctx, &IdPrefix::default(), "d", "p");
        let inc = si.find_descendant("InclusiveNamespaces").unwrap();
        assert_eq!(inc.qualified_name(), "ec:InclusiveNamespaces");
        assert_eq!(inc.declared_namespace("ec"), Some(ns::EXC_C14N));
        assert_eq!(inc.attribute("PrefixList"), Some("soap #default"));
    }

    #[test]
    fn test_canonicalization_method_prefix_list() {
        let ctx = SigningContext::new(test_credentials())
            .with_c14n(Arc::new(ExclusiveCanonicalizer::new(vec!["x".into()])));
        let si = build_signed_info(&ctx, &IdPrefix::default(), "d", "p");
        let method = si.find_child("CanonicalizationMethod").unwrap();
        let inc = method.find_child("InclusiveNamespaces").unwrap();
        assert_eq!(inc.attribute("PrefixList"), Some("x"));
    }

    #[test]
    fn test_qualified_copy_canonicalizes() {
        let ctx = SigningContext::new(test_credentials());
        let si = build_signed_info(&ctx, &IdPrefix::default(), "d", "p");
        assert!(ctx.c14n.canonicalize(&si).is_err());
        let q = qualified(&si, "ds", &[]);
        let canonical = String::from_utf8(ctx.c14n.canonicalize(&q).unwrap()).unwrap();
        assert!(canonical.starts_with(
            "<ds:SignedInfo xmlns:ds=\"http://www.w3.org/2000/09/xmldsig#\">\
             <ds:CanonicalizationMethod Algorithm=\"http://www.w3.org/2001/10/xml-exc-c14n#\">\
             </ds:CanonicalizationMethod>"
        ));
    }

    #[test]
    fn test_qualified_copy_keeps_host_bindings_below_dsig() {
        let ctx = SigningContext::new(test_credentials());
        let si = build_signed_info(&ctx, &IdPrefix::default(), "d", "p");
        let host = [Namespace::new("x", "urn:x"), Namespace::new("ds", "urn:not-dsig")];
        let q = qualified(&si, "ds", &host);
        assert_eq!(q.declared_namespace("x"), Some("urn:x"));
        assert_eq!(q.declared_namespace("ds"), Some(ns::DSIG));
        assert_eq!(q.namespaces.len(), 2);
    }
}
