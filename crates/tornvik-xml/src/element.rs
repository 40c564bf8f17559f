#![forbid(unsafe_code)]

//! Owned element tree.
//!
//! Elements carry their prefix and the namespace declarations made on
//! them; prefixes are resolved against the declarations of the element and
//! its ancestors when the tree is canonicalized or serialized. Cloning an
//! element is a deep copy.

use std::collections::BTreeMap;
use tornvik_core::ns;

/// A namespace declaration (`xmlns:prefix="uri"`, or `xmlns="uri"` when
/// `prefix` is empty). An empty `uri` with an empty prefix undeclares the
/// default namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub prefix: String,
    pub uri: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }
}

/// An attribute. `prefix` is empty for unqualified attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub prefix: String,
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prefix: String::new(),
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn qualified_name(&self) -> String {
        qualify_name(&self.prefix, &self.name)
    }
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

/// An XML element and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub prefix: String,
    pub name: String,
    pub namespaces: Vec<Namespace>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element `prefix:name` (or `name` when `prefix` is empty).
    pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// The qualified tag name.
    pub fn qualified_name(&self) -> String {
        qualify_name(&self.prefix, &self.name)
    }

    // ── Builders ─────────────────────────────────────────────────────

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.declare_namespace(prefix, uri);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children.into_iter().map(Node::Element));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Declare `prefix` on this element, replacing an existing declaration
    /// of the same prefix.
    pub fn declare_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        let decl = Namespace::new(prefix, uri);
        match self.namespaces.iter_mut().find(|n| n.prefix == decl.prefix) {
            Some(existing) => existing.uri = decl.uri,
            None => self.namespaces.push(decl),
        }
    }

    /// Set an unqualified attribute, replacing its previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let attr = Attribute::new(name, value);
        match self
            .attributes
            .iter_mut()
            .find(|a| a.prefix.is_empty() && a.name == attr.name)
        {
            Some(existing) => existing.value = attr.value,
            None => self.attributes.push(attr),
        }
    }

    pub fn add_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Replace the element's text content. Child elements are kept; the
    /// text becomes the first child.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|c| !matches!(c, Node::Text(_)));
        self.children.insert(0, Node::Text(text.into()));
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Value of the unqualified attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.prefix.is_empty() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// URI declared for `prefix` on this element itself.
    pub fn declared_namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|n| n.prefix == prefix)
            .map(|n| n.uri.as_str())
    }

    /// Concatenated direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name == name)
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|c| match c {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// All child elements with the given local name, in document order.
    pub fn find_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.child_elements().filter(move |e| e.name == name)
    }

    /// First descendant-or-self element with the given local name
    /// (depth-first, document order).
    pub fn find_descendant(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.child_elements().find_map(|c| c.find_descendant(name))
    }

    /// Whether the element's `Id`, `ID` or `id` attribute equals `id`.
    pub fn has_id(&self, id: &str) -> bool {
        ns::attr::ID_ATTRS
            .iter()
            .any(|name| self.attribute(name) == Some(id))
    }

    /// Find the descendant-or-self element with the given id, together
    /// with the scope it inherits from its ancestors below `self`.
    pub fn find_by_id(&self, id: &str) -> Option<(&Element, Scope)> {
        find_with_scope(self, id, &Scope::default())
    }

    /// Find the descendant-or-self element with the given id and return a
    /// copy of it that declares every namespace binding it inherits from
    /// its ancestors.
    ///
    /// The copy canonicalizes the same way the element does in place,
    /// except for inherited `xml:*` attributes; see [`Element::find_by_id`].
    pub fn find_by_id_in_scope(&self, id: &str) -> Option<Element> {
        self.find_by_id(id).map(|(found, scope)| scope.detach(found))
    }

    /// Remove every comment in the subtree.
    pub fn remove_comments(&mut self) {
        self.children.retain(|c| !matches!(c, Node::Comment(_)));
        for child in &mut self.children {
            if let Node::Element(e) = child {
                e.remove_comments();
            }
        }
    }
}

/// What an element inherits from its ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Namespace bindings by prefix. An empty URI marks an undeclared
    /// default namespace.
    pub namespaces: BTreeMap<String, String>,
    /// `xml:*` attributes; the nearest ancestor's value wins.
    pub xml_attributes: Vec<Attribute>,
}

impl Scope {
    /// The scope seen by the children of `element`, where `self` is the
    /// scope of `element`.
    pub fn enter(&self, element: &Element) -> Scope {
        let mut scope = self.clone();
        for decl in &element.namespaces {
            scope.namespaces.insert(decl.prefix.clone(), decl.uri.clone());
        }
        for attr in element.attributes.iter().filter(|a| a.prefix == "xml") {
            match scope.xml_attributes.iter_mut().find(|a| a.name == attr.name) {
                Some(existing) => existing.value = attr.value.clone(),
                None => scope.xml_attributes.push(attr.clone()),
            }
        }
        scope
    }

    /// The bindings in scope, as declarations. Undeclared defaults are
    /// left out.
    pub fn declarations(&self) -> Vec<Namespace> {
        self.namespaces
            .iter()
            .filter(|(_, uri)| !uri.is_empty())
            .map(|(prefix, uri)| Namespace::new(prefix.clone(), uri.clone()))
            .collect()
    }

    /// Copy `element` out of this scope. The copy declares every binding
    /// it inherits and does not redeclare itself.
    pub fn detach(&self, element: &Element) -> Element {
        let mut copy = element.clone();
        for decl in self.declarations() {
            if copy.declared_namespace(&decl.prefix).is_none() {
                copy.namespaces.push(decl);
            }
        }
        copy
    }
}

fn find_with_scope<'a>(
    element: &'a Element,
    id: &str,
    scope: &Scope,
) -> Option<(&'a Element, Scope)> {
    if element.has_id(id) {
        return Some((element, scope.clone()));
    }
    let inner = scope.enter(element);
    element
        .child_elements()
        .find_map(|child| find_with_scope(child, id, &inner))
}

fn qualify_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}:{name}")
    }
}
