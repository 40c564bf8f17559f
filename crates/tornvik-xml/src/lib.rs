#![forbid(unsafe_code)]

//! XML tree for the Tornvik XAdES library.
//!
//! Signature assembly needs an owned, mutable tree: elements are built
//! bottom-up, deep-copied before namespace qualification, and finally
//! grafted into the signed document. `roxmltree` is used to read input
//! documents into that tree.

pub mod document;
pub mod element;
pub mod parse;
pub mod qualify;
pub mod writer;

pub use document::Document;
pub use element::{Attribute, Element, Namespace, Node, Scope};
pub use parse::{parse, parse_bytes, parse_document, parse_document_bytes};
pub use qualify::qualify;

/// Return roxmltree parsing options that allow DTD.
///
/// roxmltree does not expand external entities, so accepting a DTD only
/// enables the internal entity definitions some documents rely on.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}
