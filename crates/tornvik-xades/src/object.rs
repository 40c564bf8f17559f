#![forbid(unsafe_code)]

//! `Object` wrapping the XAdES `QualifyingProperties`.

use crate::id::IdPrefix;
use tornvik_core::ns::{self, attr, node};
use tornvik_xml::Element;

/// Wrap `signed_properties` in `QualifyingProperties` (declaring the XAdES
/// namespace, targeting the signature) inside a `ds:Object`.
pub fn build_object(signed_properties: Element, id: &IdPrefix, dsig_prefix: &str) -> Element {
    let qualifying_properties = Element::new(ns::XADES_PREFIX, node::QUALIFYING_PROPERTIES)
        .with_namespace(ns::XADES_PREFIX, ns::XADES)
        .with_attribute(attr::TARGET, id.signature_target())
        .with_child(signed_properties);

    Element::new(dsig_prefix, node::OBJECT).with_child(qualifying_properties)
}
