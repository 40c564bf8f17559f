#![forbid(unsafe_code)]

//! Serialization of the owned tree.
//!
//! Output is plain XML, not canonical XML: namespace declarations and
//! attributes are written in the order they are stored, and empty
//! elements are self-closed. Escaping keeps characters a parser would
//! normalize (`\r` anywhere, tab and newline in attributes) so that
//! re-reading the output yields the same tree.

use crate::document::Document;
use crate::element::{Element, Node};
use std::fmt::{self, Write};

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Serialize an element and its subtree.
pub fn to_string(element: &Element) -> String {
    let mut out = String::new();
    write_element(&mut out, element);
    out
}

/// Serialize an element as a standalone document with an XML declaration.
pub fn to_document_string(element: &Element) -> String {
    let mut out = String::from(DECLARATION);
    write_element(&mut out, element);
    out
}

/// Serialize a document with an XML declaration. Top-level comments and
/// processing instructions are written on lines of their own.
pub fn document_to_string(document: &Document) -> String {
    let mut out = String::from(DECLARATION);
    for node in &document.prolog {
        write_node(&mut out, node);
        out.push('\n');
    }
    write_element(&mut out, &document.root);
    for node in &document.epilog {
        out.push('\n');
        write_node(&mut out, node);
    }
    out
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_string(self))
    }
}

fn write_element(out: &mut String, element: &Element) {
    let name = element.qualified_name();
    out.push('<');
    out.push_str(&name);
    for decl in &element.namespaces {
        if decl.prefix.is_empty() {
            out.push_str(" xmlns=\"");
        } else {
            let _ = write!(out, " xmlns:{}=\"", decl.prefix);
        }
        escape_attr(out, &decl.uri);
        out.push('"');
    }
    for attr in &element.attributes {
        let _ = write!(out, " {}=\"", attr.qualified_name());
        escape_attr(out, &attr.value);
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &element.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(e) => write_element(out, e),
        Node::Text(t) => escape_text(out, t),
        Node::Comment(c) => {
            out.push_str("<!--");
            out.push_str(c);
            out.push_str("-->");
        }
        Node::ProcessingInstruction { target, data } => {
            out.push_str("<?");
            out.push_str(target);
            if !data.is_empty() {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>");
        }
    }
}

fn escape_text(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
}
