#![forbid(unsafe_code)]

//! Exclusive Canonical XML 1.0 (exc-C14N).
//!
//! Algorithm URI: `http://www.w3.org/2001/10/xml-exc-c14n#`
//! With comments: `http://www.w3.org/2001/10/xml-exc-c14n#WithComments`
//!
//! Only "visibly utilized" namespace declarations are output. A namespace
//! is visibly utilized by an element if:
//! 1. its prefix is used by the element's tag name, or
//! 2. its prefix is used by one of the element's attributes, or
//! 3. the prefix appears in the InclusiveNamespaces PrefixList
//!    (`#default` standing for the default namespace).

use crate::render::{self, Bindings, NamespaceSelector, NsDecl};
use std::collections::BTreeSet;
use tornvik_core::Error;
use tornvik_xml::Element;

/// Canonicalize using Exclusive C14N 1.0.
pub fn canonicalize(
    element: &Element,
    with_comments: bool,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let selector = ExclusiveSelector {
        inclusive_prefixes: inclusive_prefixes
            .iter()
            .map(|p| if p == "#default" { String::new() } else { p.clone() })
            .collect(),
    };
    render::canonicalize_subtree(element, with_comments, &selector)
}

struct ExclusiveSelector {
    inclusive_prefixes: BTreeSet<String>,
}

impl NamespaceSelector for ExclusiveSelector {
    fn select(&self, element: &Element, in_scope: &Bindings, rendered: &Bindings) -> Vec<NsDecl> {
        let mut utilized: BTreeSet<&str> = BTreeSet::new();
        utilized.insert(&element.prefix);
        for attr in &element.attributes {
            if !attr.prefix.is_empty() {
                utilized.insert(&attr.prefix);
            }
        }
        utilized.extend(self.inclusive_prefixes.iter().map(String::as_str));

        let mut decls = Vec::new();
        for prefix in utilized {
            if prefix == "xml" {
                continue;
            }
            match in_scope.get(prefix) {
                Some(uri) => {
                    if rendered.get(prefix) != Some(uri) {
                        decls.push(NsDecl::new(prefix, uri.clone()));
                    }
                }
                None if prefix.is_empty() => {
                    if rendered.get("").is_some_and(|uri| !uri.is_empty()) {
                        decls.push(NsDecl::new("", ""));
                    }
                }
                None => {}
            }
        }
        decls
    }
}
