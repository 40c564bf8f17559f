#![forbid(unsafe_code)]

//! A whole XML document: the root element and the comments and processing
//! instructions around it.

use crate::element::{Element, Node};

/// An XML document.
///
/// `prolog` and `epilog` hold the top-level nodes before and after the
/// root element. Only comments and processing instructions appear there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

impl Document {
    /// A document consisting of `root` alone.
    pub fn new(root: Element) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    /// Remove every comment, at top level and inside the root.
    pub fn remove_comments(&mut self) {
        self.prolog.retain(|n| !matches!(n, Node::Comment(_)));
        self.epilog.retain(|n| !matches!(n, Node::Comment(_)));
        self.root.remove_comments();
    }
}

impl From<Element> for Document {
    fn from(root: Element) -> Self {
        Self::new(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_comments_everywhere() {
        let mut doc = Document {
            prolog: vec![
                Node::Comment("c".into()),
                Node::ProcessingInstruction {
                    target: "pi".into(),
                    data: String::new(),
                },
            ],
            root: Element::new("", "r"),
            epilog: vec![Node::Comment("d".into())],
        };
        doc.root.children.push(Node::Comment("e".into()));
        doc.remove_comments();
        assert_eq!(doc.prolog.len(), 1);
        assert!(doc.epilog.is_empty());
        assert!(doc.root.children.is_empty());
    }
}
