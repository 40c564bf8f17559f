#![forbid(unsafe_code)]

//! Reading documents into the owned tree.

use crate::document::Document;
use crate::element::{Attribute, Element, Namespace, Node};
use tornvik_core::{ns, Error};

/// Parse an XML document, keeping the comments and processing
/// instructions around the root element.
///
/// Entity and character references are expanded and CDATA sections become
/// text.
pub fn parse_document(xml: &str) -> Result<Document, Error> {
    let doc = roxmltree::Document::parse_with_options(xml, crate::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))?;

    let mut document = Document::new(convert_element(doc.root_element()));
    let mut before_root = true;
    for child in doc.root().children() {
        if child.is_element() {
            before_root = false;
        } else if let Some(node) = convert_misc(child) {
            if before_root {
                document.prolog.push(node);
            } else {
                document.epilog.push(node);
            }
        }
    }
    Ok(document)
}

/// Parse an XML document from UTF-8 bytes.
pub fn parse_document_bytes(data: &[u8]) -> Result<Document, Error> {
    parse_document(utf8(data)?)
}

/// Parse an XML document and return its root element. Nodes outside the
/// root are dropped; see [`parse_document`].
pub fn parse(xml: &str) -> Result<Element, Error> {
    parse_document(xml).map(|doc| doc.root)
}

/// Parse an XML document from UTF-8 bytes and return its root element.
pub fn parse_bytes(data: &[u8]) -> Result<Element, Error> {
    parse(utf8(data)?)
}

fn utf8(data: &[u8]) -> Result<&str, Error> {
    std::str::from_utf8(data).map_err(|e| Error::XmlParse(format!("invalid UTF-8: {e}")))
}

/// A comment or processing instruction.
fn convert_misc(node: roxmltree::Node<'_, '_>) -> Option<Node> {
    if node.is_comment() {
        Some(Node::Comment(node.text().unwrap_or_default().to_owned()))
    } else {
        node.pi().map(|pi| Node::ProcessingInstruction {
            target: pi.target.to_owned(),
            data: pi.value.unwrap_or_default().to_owned(),
        })
    }
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let prefix = match tag.namespace() {
        Some(uri) => element_prefix(node, uri),
        None => String::new(),
    };

    let mut element = Element::new(prefix, tag.name());
    element.namespaces = declared_namespaces(node);
    element.attributes = node
        .attributes()
        .map(|a| Attribute {
            prefix: a
                .namespace()
                .map(|uri| attribute_prefix(node, uri))
                .unwrap_or_default(),
            name: a.name().to_owned(),
            value: a.value().to_owned(),
        })
        .collect();

    for child in node.children() {
        if child.is_element() {
            element.children.push(Node::Element(convert_element(child)));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                element.children.push(Node::Text(text.to_owned()));
            }
        } else if let Some(misc) = convert_misc(child) {
            element.children.push(misc);
        }
    }
    element
}

/// Prefix under which an element's namespace URI is in scope. When the
/// URI is bound to several prefixes the first binding roxmltree reports
/// wins.
fn element_prefix(node: roxmltree::Node<'_, '_>, uri: &str) -> String {
    node.namespaces()
        .find(|n| n.uri() == uri)
        .and_then(|n| n.name())
        .unwrap_or_default()
        .to_owned()
}

/// Attributes never use the default namespace, so only named bindings
/// are considered.
fn attribute_prefix(node: roxmltree::Node<'_, '_>, uri: &str) -> String {
    if uri == ns::XML {
        return "xml".to_owned();
    }
    node.namespaces()
        .find(|n| n.uri() == uri && n.name().is_some())
        .and_then(|n| n.name())
        .unwrap_or_default()
        .to_owned()
}

/// roxmltree reports every in-scope binding on each element; the
/// declarations made on `node` itself are those its parent does not
/// already have.
fn declared_namespaces(node: roxmltree::Node<'_, '_>) -> Vec<Namespace> {
    let parent_scope: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|n| (n.name(), n.uri())).collect())
        .unwrap_or_default();

    let mut declared: Vec<Namespace> = node
        .namespaces()
        .filter(|n| n.uri() != ns::XML)
        .filter(|n| !parent_scope.contains(&(n.name(), n.uri())))
        .map(|n| Namespace::new(n.name().unwrap_or_default(), n.uri()))
        .collect();

    // xmlns="" removes the inherited default namespace.
    let parent_has_default = parent_scope.iter().any(|(name, _)| name.is_none());
    let has_default = node.namespaces().any(|n| n.name().is_none());
    if parent_has_default && !has_default {
        declared.push(Namespace::new("", ""));
    }
    declared
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let root = parse(r#"<root a="1"><child>text</child><!--c--><?pi data?></root>"#).unwrap();
        assert_eq!(root.name, "root");
        assert_eq!(root.attribute("a"), Some("1"));
        assert_eq!(root.find_child("child").unwrap().text(), "text");
        assert_eq!(root.children.len(), 3);
        assert!(matches!(&root.children[1], Node::Comment(c) if c == "c"));
        assert!(matches!(
            &root.children[2],
            Node::ProcessingInstruction { target, data } if target == "pi" && data == "data"
        ));
    }

    #[test]
    fn test_parse_prefixes_and_declarations() {
        let root = parse(
            r#"<a:root xmlns:a="urn:a" xmlns="urn:d"><b:item xmlns:b="urn:b" b:attr="v"/><plain/></a:root>"#,
        )
        .unwrap();
        assert_eq!(root.qualified_name(), "a:root");
        assert_eq!(root.declared_namespace("a"), Some("urn:a"));
        assert_eq!(root.declared_namespace(""), Some("urn:d"));

        let item = root.find_child("item").unwrap();
        assert_eq!(item.qualified_name(), "b:item");
        assert_eq!(item.namespaces, vec![Namespace::new("b", "urn:b")]);
        assert_eq!(item.attributes[0].qualified_name(), "b:attr");

        let plain = root.find_child("plain").unwrap();
        assert_eq!(plain.prefix, "");
        assert!(plain.namespaces.is_empty());
    }

    #[test]
    fn test_parse_default_undeclaration() {
        let root = parse(r#"<root xmlns="urn:d"><inner xmlns=""/></root>"#).unwrap();
        let inner = root.find_child("inner").unwrap();
        assert_eq!(inner.namespaces, vec![Namespace::new("", "")]);
    }

    #[test]
    fn test_parse_xml_lang() {
        let root = parse(r#"<root xml:lang="sv"/>"#).unwrap();
        assert!(root.namespaces.is_empty());
        assert_eq!(root.attributes[0].qualified_name(), "xml:lang");
    }

    #[test]
    fn test_parse_entities_expanded() {
        let root = parse("<root>a &amp; b &#x41;<![CDATA[<c>]]></root>").unwrap();
        assert_eq!(root.text(), "a & b A<c>");
    }

    #[test]
    fn test_parse_document_keeps_top_level_nodes() {
        let doc = parse_document(
            "<?xml version=\"1.0\"?>\n<?style a?>\n<!-- head -->\n<root/>\n<!-- tail -->\n<?end?>",
        )
        .unwrap();
        assert_eq!(doc.root.name, "root");
        assert_eq!(
            doc.prolog,
            vec![
                Node::ProcessingInstruction {
                    target: "style".into(),
                    data: "a".into()
                },
                Node::Comment(" head ".into()),
            ]
        );
        assert_eq!(
            doc.epilog,
            vec![
                Node::Comment(" tail ".into()),
                Node::ProcessingInstruction {
                    target: "end".into(),
                    data: String::new()
                },
            ]
        );
        assert_eq!(parse("<?style a?><root/>").unwrap(), doc.root);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("<root>"), Err(Error::XmlParse(_))));
        assert!(matches!(parse_bytes(&[0x3c, 0xff, 0x3e]), Err(Error::XmlParse(_))));
        assert!(matches!(
            parse_document_bytes(&[0x3c, 0xff, 0x3e]),
            Err(Error::XmlParse(_))
        ));
    }
}
