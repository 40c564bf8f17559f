#![forbid(unsafe_code)]

//! Namespace qualification of detached subtrees.

use crate::element::{Element, Namespace};

/// Return a deep copy of `element` that declares `bindings` on its root.
///
/// A subtree built for insertion into a larger tree uses prefixes that are
/// only declared by its future ancestors. Canonicalizing it on its own
/// needs those declarations in place; this produces them on a copy and
/// never touches `element`. A binding for a prefix the root already
/// declares replaces that declaration.
pub fn qualify(element: &Element, bindings: &[Namespace]) -> Element {
    let mut qualified = element.clone();
    for binding in bindings {
        qualified.declare_namespace(binding.prefix.clone(), binding.uri.clone());
    }
    qualified
}
