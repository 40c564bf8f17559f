#![forbid(unsafe_code)]

//! Inclusive Canonical XML 1.0 and 1.1.
//!
//! Algorithm URIs: `http://www.w3.org/TR/2001/REC-xml-c14n-20010315`,
//! `http://www.w3.org/2006/12/xml-c14n11` (and their `#WithComments`
//! variants).
//!
//! Every namespace binding in scope is rendered on the apex element;
//! descendants render only bindings that differ from their nearest output
//! ancestor. The two versions differ in which `xml:*` attributes an apex
//! inherits from omitted ancestors; see [`inherit_xml_attributes`].

use crate::render::{self, Bindings, NamespaceSelector, NsDecl};
use tornvik_core::Error;
use tornvik_xml::{Attribute, Element};

/// Canonicalize using inclusive C14N (1.0 or 1.1).
pub fn canonicalize(element: &Element, with_comments: bool) -> Result<Vec<u8>, Error> {
    render::canonicalize_subtree(element, with_comments, &InclusiveSelector)
}

/// Copy of `apex` carrying the `xml:*` attributes it inherits from
/// omitted ancestors.
///
/// C14N 1.0 inherits every `xml:*` attribute the apex does not set itself.
/// C14N 1.1 inherits only `xml:lang` and `xml:space`. Its `xml:base` fixup
/// is not implemented, so an inherited `xml:base` is an error there.
pub fn inherit_xml_attributes(
    apex: &Element,
    inherited: &[Attribute],
    version11: bool,
) -> Result<Element, Error> {
    let mut copy = apex.clone();
    for attr in inherited.iter().filter(|a| a.prefix == "xml") {
        if version11 {
            match attr.name.as_str() {
                "lang" | "space" => {}
                "base" => {
                    return Err(Error::Canonicalization(format!(
                        "C14N 1.1 fixup of inherited xml:base {:?} is not supported",
                        attr.value
                    )))
                }
                _ => continue,
            }
        }
        let own = copy
            .attributes
            .iter()
            .any(|a| a.prefix == "xml" && a.name == attr.name);
        if !own {
            copy.attributes.push(attr.clone());
        }
    }
    Ok(copy)
}

struct InclusiveSelector;

impl NamespaceSelector for InclusiveSelector {
    fn select(&self, _element: &Element, in_scope: &Bindings, rendered: &Bindings) -> Vec<NsDecl> {
        let mut decls: Vec<NsDecl> = in_scope
            .iter()
            .filter(|(prefix, uri)| rendered.get(*prefix) != Some(*uri))
            .map(|(prefix, uri)| NsDecl::new(prefix.clone(), uri.clone()))
            .collect();

        // The default namespace went out of scope below an ancestor that
        // rendered one.
        if !in_scope.contains_key("") && rendered.get("").is_some_and(|uri| !uri.is_empty()) {
            decls.push(NsDecl::new("", ""));
        }
        decls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tornvik_xml::parse;

    fn c14n(xml: &str) -> String {
        String::from_utf8(canonicalize(&parse(xml).unwrap(), false).unwrap()).unwrap()
    }

    #[test]
    fn test_empty_element_expanded() {
        assert_eq!(c14n("<a/>"), "<a></a>");
    }

    #[test]
    fn test_attributes_sorted() {
        assert_eq!(
            c14n(r#"<a xmlns:p="urn:p" z="1" p:b="2" a="3"/>"#),
            r#"<a xmlns:p="urn:p" a="3" z="1" p:b="2"></a>"#
        );
    }

    #[test]
    fn test_unused_namespaces_kept() {
        assert_eq!(
            c14n(r#"<a xmlns:unused="urn:u" xmlns="urn:d"><b/></a>"#),
            r#"<a xmlns="urn:d" xmlns:unused="urn:u"><b></b></a>"#
        );
    }

    #[test]
    fn test_redundant_declarations_dropped() {
        assert_eq!(
            c14n(r#"<a xmlns:p="urn:p"><p:b xmlns:p="urn:p"><p:c xmlns:p="urn:other"/></p:b></a>"#),
            r#"<a xmlns:p="urn:p"><p:b><p:c xmlns:p="urn:other"></p:c></p:b></a>"#
        );
    }

    #[test]
    fn test_default_undeclaration() {
        assert_eq!(
            c14n(r#"<a xmlns="urn:d"><b xmlns=""><c xmlns=""/></b></a>"#),
            r#"<a xmlns="urn:d"><b xmlns=""><c></c></b></a>"#
        );
        // Nothing to undeclare at the apex.
        assert_eq!(c14n(r#"<a xmlns=""/>"#), "<a></a>");
    }

    #[test]
    fn test_comments_and_text() {
        let el = parse("<a>x &amp; y<!-- c --><?pi d?></a>").unwrap();
        assert_eq!(
            String::from_utf8(canonicalize(&el, false).unwrap()).unwrap(),
            "<a>x &amp; y<?pi d?></a>"
        );
        assert_eq!(
            String::from_utf8(canonicalize(&el, true).unwrap()).unwrap(),
            "<a>x &amp; y<!-- c --><?pi d?></a>"
        );
    }

    #[test]
    fn test_inherit_xml_attributes() {
        let xml = |name: &str, value: &str| Attribute {
            prefix: "xml".into(),
            name: name.into(),
            value: value.into(),
        };
        let inherited = [xml("lang", "sv"), xml("id", "outer"), xml("space", "preserve")];
        let mut apex = Element::new("", "b");
        apex.attributes.push(xml("lang", "en"));

        let v10 = inherit_xml_attributes(&apex, &inherited, false).unwrap();
        let names: Vec<_> = v10.attributes.iter().map(|a| (a.name.as_str(), a.value.as_str())).collect();
        assert_eq!(names, [("lang", "en"), ("id", "outer"), ("space", "preserve")]);

        let v11 = inherit_xml_attributes(&apex, &inherited, true).unwrap();
        let names: Vec<_> = v11.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["lang", "space"]);
        assert_eq!(apex.attributes.len(), 1);
    }

    #[test]
    fn test_undeclared_prefix_fails() {
        let el = Element::new("ds", "SignedInfo");
        assert!(matches!(canonicalize(&el, false), Err(Error::Canonicalization(_))));
    }
}
