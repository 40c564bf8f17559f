#![forbid(unsafe_code)]

//! Shared rendering for C14N output.
//!
//! The inclusive and exclusive variants differ only in which namespace
//! declarations they emit on an element start tag; everything else
//! (prefix resolution, attribute ordering, escaping, comment handling)
//! lives here.

use crate::escape;
use std::collections::BTreeMap;
use tornvik_core::{ns, Error};
use tornvik_xml::{Document, Element, Node};

/// Prefix → namespace URI. `""` is the default namespace. Only non-empty
/// bindings are stored.
pub type Bindings = BTreeMap<String, String>;

/// A namespace declaration to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsDecl {
    /// The prefix ("" for default namespace).
    pub prefix: String,
    /// The namespace URI ("" for `xmlns=""`).
    pub uri: String,
}

impl NsDecl {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    pub fn render(&self) -> String {
        if self.prefix.is_empty() {
            format!(" xmlns=\"{}\"", escape::escape_attr(&self.uri))
        } else {
            format!(" xmlns:{}=\"{}\"", self.prefix, escape::escape_attr(&self.uri))
        }
    }
}

impl Ord for NsDecl {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Default namespace first, then by prefix.
        match (self.prefix.is_empty(), other.prefix.is_empty()) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => self.prefix.cmp(&other.prefix),
        }
    }
}

impl PartialOrd for NsDecl {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// An attribute to be rendered, with its namespace resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Namespace URI ("" for no namespace).
    pub ns_uri: String,
    pub local_name: String,
    pub qualified_name: String,
    pub value: String,
}

impl Attr {
    pub fn render(&self) -> String {
        format!(" {}=\"{}\"", self.qualified_name, escape::escape_attr(&self.value))
    }
}

impl Ord for Attr {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Unqualified attributes first, by local name; then by
        // (namespace URI, local name).
        match (self.ns_uri.is_empty(), other.ns_uri.is_empty()) {
            (true, true) => self.local_name.cmp(&other.local_name),
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (false, false) => self
                .ns_uri
                .cmp(&other.ns_uri)
                .then(self.local_name.cmp(&other.local_name)),
        }
    }
}

impl PartialOrd for Attr {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Chooses the namespace declarations emitted on an element.
pub trait NamespaceSelector {
    /// `in_scope` holds the bindings in scope at `element` (its own
    /// declarations applied); `rendered` those already emitted by output
    /// ancestors.
    fn select(&self, element: &Element, in_scope: &Bindings, rendered: &Bindings) -> Vec<NsDecl>;
}

/// Canonicalize `element` and its subtree as an apex with no ancestors.
pub fn canonicalize_subtree(
    element: &Element,
    with_comments: bool,
    selector: &dyn NamespaceSelector,
) -> Result<Vec<u8>, Error> {
    let mut output = Vec::new();
    let ctx = RenderContext {
        with_comments,
        selector,
    };
    ctx.render_element(element, &Bindings::new(), &Bindings::new(), &mut output)?;
    Ok(output)
}

/// Place the canonical `root` among the document's top-level comments and
/// processing instructions. Each is separated from the root by a line
/// feed; comments are dropped unless `with_comments`.
pub fn wrap_document(document: &Document, root: Vec<u8>, with_comments: bool) -> Vec<u8> {
    let mut output = Vec::with_capacity(root.len());
    for node in &document.prolog {
        if render_misc(node, with_comments, &mut output) {
            output.push(b'\n');
        }
    }
    output.extend_from_slice(&root);
    for node in &document.epilog {
        let mut rendered = Vec::new();
        if render_misc(node, with_comments, &mut rendered) {
            output.push(b'\n');
            output.extend_from_slice(&rendered);
        }
    }
    output
}

/// Render a comment or processing instruction. Returns whether anything
/// was written.
fn render_misc(node: &Node, with_comments: bool, output: &mut Vec<u8>) -> bool {
    match node {
        Node::Comment(text) if with_comments => {
            output.extend_from_slice(b"<!--");
            output.extend_from_slice(text.as_bytes());
            output.extend_from_slice(b"-->");
            true
        }
        Node::ProcessingInstruction { target, data } => {
            output.extend_from_slice(b"<?");
            output.extend_from_slice(target.as_bytes());
            if !data.is_empty() {
                output.push(b' ');
                output.extend_from_slice(escape::escape_pi(data).as_bytes());
            }
            output.extend_from_slice(b"?>");
            true
        }
        _ => false,
    }
}

struct RenderContext<'a> {
    with_comments: bool,
    selector: &'a dyn NamespaceSelector,
}

impl RenderContext<'_> {
    fn render_element(
        &self,
        element: &Element,
        parent_scope: &Bindings,
        parent_rendered: &Bindings,
        output: &mut Vec<u8>,
    ) -> Result<(), Error> {
        let mut scope = parent_scope.clone();
        for decl in &element.namespaces {
            if decl.uri.is_empty() {
                scope.remove(&decl.prefix);
            } else {
                scope.insert(decl.prefix.clone(), decl.uri.clone());
            }
        }

        let elem_name = element.qualified_name();
        if !element.prefix.is_empty() {
            resolve_prefix(&scope, &element.prefix, &elem_name)?;
        }

        let mut attrs = Vec::with_capacity(element.attributes.len());
        for attr in &element.attributes {
            let ns_uri = if attr.prefix.is_empty() {
                String::new()
            } else {
                resolve_prefix(&scope, &attr.prefix, &elem_name)?.to_owned()
            };
            attrs.push(Attr {
                ns_uri,
                local_name: attr.name.clone(),
                qualified_name: attr.qualified_name(),
                value: attr.value.clone(),
            });
        }
        attrs.sort();

        let mut ns_decls = self.selector.select(element, &scope, parent_rendered);
        ns_decls.sort();

        output.push(b'<');
        output.extend_from_slice(elem_name.as_bytes());
        for ns_decl in &ns_decls {
            output.extend_from_slice(ns_decl.render().as_bytes());
        }
        for attr in &attrs {
            output.extend_from_slice(attr.render().as_bytes());
        }
        output.push(b'>');

        let mut rendered = parent_rendered.clone();
        for ns_decl in ns_decls {
            rendered.insert(ns_decl.prefix, ns_decl.uri);
        }

        for child in &element.children {
            match child {
                Node::Element(e) => self.render_element(e, &scope, &rendered, output)?,
                Node::Text(text) => {
                    output.extend_from_slice(escape::escape_text(text).as_bytes());
                }
                misc => {
                    render_misc(misc, self.with_comments, output);
                }
            }
        }

        output.extend_from_slice(b"</");
        output.extend_from_slice(elem_name.as_bytes());
        output.push(b'>');
        Ok(())
    }
}

/// Resolve a non-empty prefix. `xml` is always bound.
fn resolve_prefix<'s>(scope: &'s Bindings, prefix: &str, element: &str) -> Result<&'s str, Error> {
    if prefix == "xml" {
        return Ok(ns::XML);
    }
    scope.get(prefix).map(String::as_str).ok_or_else(|| {
        Error::Canonicalization(format!(
            "namespace prefix '{prefix}' is not declared in scope of <{element}>"
        ))
    })
}
