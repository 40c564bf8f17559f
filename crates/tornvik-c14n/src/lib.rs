#![forbid(unsafe_code)]

//! XML Canonicalization (C14N) for the Tornvik XAdES library.
//!
//! Canonicalizes an element subtree of the owned [`tornvik_xml::Element`]
//! tree. The subtree is treated as the apex of a document subset: every
//! prefix it uses must be declared on it or on one of its descendants.
//!
//! Variants:
//! - Canonical XML 1.0 (with and without comments)
//! - Canonical XML 1.1 (with and without comments)
//! - Exclusive Canonical XML 1.0 (with and without comments, optionally
//!   with an InclusiveNamespaces prefix list)

pub mod escape;
pub mod exclusive;
pub mod inclusive;
pub mod render;

use std::fmt;
use std::str::FromStr;
use tornvik_core::{algorithm, Error};
use tornvik_xml::{Attribute, Document, Element};

/// A canonicalization algorithm.
pub trait Canonicalizer: fmt::Debug + Send + Sync {
    /// Canonical bytes of `element` and its subtree.
    fn canonicalize(&self, element: &Element) -> Result<Vec<u8>, Error>;

    /// Canonical bytes of `element` as the apex of a document subset whose
    /// omitted ancestors carry the `xml:*` attributes `inherited`.
    ///
    /// Exclusive canonicalization does not inherit them, and neither does
    /// this default.
    fn canonicalize_subset(
        &self,
        element: &Element,
        _inherited: &[Attribute],
    ) -> Result<Vec<u8>, Error> {
        self.canonicalize(element)
    }

    /// Canonical bytes of a whole document, including the comments (when
    /// kept) and processing instructions outside the root element.
    fn canonicalize_document(&self, document: &Document) -> Result<Vec<u8>, Error> {
        let root = self.canonicalize(&document.root)?;
        Ok(render::wrap_document(document, root, self.keeps_comments()))
    }

    /// Whether comments are part of the output.
    fn keeps_comments(&self) -> bool {
        false
    }

    /// Algorithm URI, as written into `CanonicalizationMethod` and
    /// `Transform` elements.
    fn algorithm(&self) -> &'static str;

    /// InclusiveNamespaces prefix list. Only exclusive canonicalization
    /// has one.
    fn inclusive_prefixes(&self) -> &[String] {
        &[]
    }
}

/// The canonicalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum C14nMode {
    /// Canonical XML 1.0
    Inclusive,
    /// Canonical XML 1.0 with comments
    InclusiveWithComments,
    /// Canonical XML 1.1
    Inclusive11,
    /// Canonical XML 1.1 with comments
    Inclusive11WithComments,
    /// Exclusive Canonical XML 1.0
    Exclusive,
    /// Exclusive Canonical XML 1.0 with comments
    ExclusiveWithComments,
}

impl C14nMode {
    pub const ALL: [C14nMode; 6] = [
        Self::Inclusive,
        Self::InclusiveWithComments,
        Self::Inclusive11,
        Self::Inclusive11WithComments,
        Self::Exclusive,
        Self::ExclusiveWithComments,
    ];

    /// Get the algorithm URI for this mode.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Inclusive => algorithm::C14N,
            Self::InclusiveWithComments => algorithm::C14N_WITH_COMMENTS,
            Self::Inclusive11 => algorithm::C14N11,
            Self::Inclusive11WithComments => algorithm::C14N11_WITH_COMMENTS,
            Self::Exclusive => algorithm::EXC_C14N,
            Self::ExclusiveWithComments => algorithm::EXC_C14N_WITH_COMMENTS,
        }
    }

    /// Parse a C14N mode from an algorithm URI.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            algorithm::C14N => Some(Self::Inclusive),
            algorithm::C14N_WITH_COMMENTS => Some(Self::InclusiveWithComments),
            algorithm::C14N11 => Some(Self::Inclusive11),
            algorithm::C14N11_WITH_COMMENTS => Some(Self::Inclusive11WithComments),
            algorithm::EXC_C14N => Some(Self::Exclusive),
            algorithm::EXC_C14N_WITH_COMMENTS => Some(Self::ExclusiveWithComments),
            _ => None,
        }
    }

    /// Short name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inclusive => "c14n",
            Self::InclusiveWithComments => "c14n#WithComments",
            Self::Inclusive11 => "c14n11",
            Self::Inclusive11WithComments => "c14n11#WithComments",
            Self::Exclusive => "exc-c14n",
            Self::ExclusiveWithComments => "exc-c14n#WithComments",
        }
    }

    pub fn with_comments(&self) -> bool {
        matches!(
            self,
            Self::InclusiveWithComments | Self::Inclusive11WithComments | Self::ExclusiveWithComments
        )
    }

    pub fn is_exclusive(&self) -> bool {
        matches!(self, Self::Exclusive | Self::ExclusiveWithComments)
    }
}

impl Canonicalizer for C14nMode {
    fn canonicalize(&self, element: &Element) -> Result<Vec<u8>, Error> {
        canonicalize(element, *self, &[])
    }

    fn canonicalize_subset(
        &self,
        element: &Element,
        inherited: &[Attribute],
    ) -> Result<Vec<u8>, Error> {
        if self.is_exclusive() || inherited.is_empty() {
            return self.canonicalize(element);
        }
        let version11 = matches!(self, Self::Inclusive11 | Self::Inclusive11WithComments);
        let apex = inclusive::inherit_xml_attributes(element, inherited, version11)?;
        self.canonicalize(&apex)
    }

    fn keeps_comments(&self) -> bool {
        self.with_comments()
    }

    fn algorithm(&self) -> &'static str {
        self.uri()
    }
}

impl FromStr for C14nMode {
    type Err = Error;

    /// Accepts the algorithm URIs and the short names `c14n`, `c14n11`,
    /// `exc-c14n`, each optionally followed by `#WithComments`
    /// (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(mode) = Self::from_uri(s) {
            return Ok(mode);
        }
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().to_ascii_lowercase() == lower)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "unsupported canonicalization algorithm: {s} (expected c14n, c14n11 or exc-c14n)"
                ))
            })
    }
}

impl fmt::Display for C14nMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Exclusive C14N with an InclusiveNamespaces prefix list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusiveCanonicalizer {
    pub with_comments: bool,
    /// Prefixes treated inclusively; `#default` names the default namespace.
    pub inclusive_prefixes: Vec<String>,
}

impl ExclusiveCanonicalizer {
    pub fn new(inclusive_prefixes: Vec<String>) -> Self {
        Self {
            with_comments: false,
            inclusive_prefixes,
        }
    }

    fn mode(&self) -> C14nMode {
        if self.with_comments {
            C14nMode::ExclusiveWithComments
        } else {
            C14nMode::Exclusive
        }
    }
}

impl Canonicalizer for ExclusiveCanonicalizer {
    fn canonicalize(&self, element: &Element) -> Result<Vec<u8>, Error> {
        canonicalize(element, self.mode(), &self.inclusive_prefixes)
    }

    fn algorithm(&self) -> &'static str {
        self.mode().uri()
    }

    fn inclusive_prefixes(&self) -> &[String] {
        &self.inclusive_prefixes
    }

    fn keeps_comments(&self) -> bool {
        self.with_comments
    }
}

/// Canonicalize an element subtree.
///
/// - `mode`: which C14N variant to use
/// - `inclusive_prefixes`: for exclusive C14N, the InclusiveNamespaces
///   PrefixList; ignored by the inclusive variants
pub fn canonicalize(
    element: &Element,
    mode: C14nMode,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    match mode {
        C14nMode::Inclusive
        | C14nMode::InclusiveWithComments
        | C14nMode::Inclusive11
        | C14nMode::Inclusive11WithComments => {
            inclusive::canonicalize(element, mode.with_comments())
        }
        C14nMode::Exclusive | C14nMode::ExclusiveWithComments => {
            exclusive::canonicalize(element, mode.with_comments(), inclusive_prefixes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tornvik_xml::parse;

    #[test]
    fn test_uri_round_trip() {
        for mode in C14nMode::ALL {
            assert_eq!(C14nMode::from_uri(mode.uri()), Some(mode));
            assert_eq!(mode.name().parse::<C14nMode>().unwrap(), mode);
            assert_eq!(mode.uri().parse::<C14nMode>().unwrap(), mode);
        }
        assert_eq!(C14nMode::from_uri("urn:unknown"), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("EXC-C14N".parse::<C14nMode>().unwrap(), C14nMode::Exclusive);
        assert_eq!(
            "c14n#withcomments".parse::<C14nMode>().unwrap(),
            C14nMode::InclusiveWithComments
        );
        for bad in ["", "c14n2", "http://www.w3.org/2010/xml-c14n2"] {
            assert!(matches!(bad.parse::<C14nMode>(), Err(Error::Configuration(_))));
        }
    }

    #[test]
    fn test_flags() {
        assert!(C14nMode::ExclusiveWithComments.with_comments());
        assert!(C14nMode::ExclusiveWithComments.is_exclusive());
        assert!(!C14nMode::Inclusive11.with_comments());
        assert!(!C14nMode::Inclusive11.is_exclusive());
    }

    #[test]
    fn test_inclusive_and_exclusive_differ_on_unused_namespace() {
        let el = parse(r#"<a xmlns:u="urn:u"><b/></a>"#).unwrap();
        assert_eq!(
            C14nMode::Inclusive.canonicalize(&el).unwrap(),
            br#"<a xmlns:u="urn:u"><b></b></a>"#
        );
        assert_eq!(C14nMode::Exclusive.canonicalize(&el).unwrap(), b"<a><b></b></a>");
        assert_eq!(
            C14nMode::Inclusive11.canonicalize(&el).unwrap(),
            C14nMode::Inclusive.canonicalize(&el).unwrap()
        );
    }

    #[test]
    fn test_exclusive_canonicalizer() {
        let el = parse(r#"<a xmlns:u="urn:u"><b/></a>"#).unwrap();
        let c = ExclusiveCanonicalizer::new(vec!["u".into()]);
        assert_eq!(c.algorithm(), algorithm::EXC_C14N);
        assert_eq!(c.inclusive_prefixes(), &["u".to_string()][..]);
        assert_eq!(c.canonicalize(&el).unwrap(), br#"<a xmlns:u="urn:u"><b></b></a>"#);
        assert!(C14nMode::Exclusive.inclusive_prefixes().is_empty());
    }

    #[test]
    fn test_document_top_level_nodes() {
        let doc = tornvik_xml::parse_document("<?a x?><!--c--><r/><!--d--><?b?>").unwrap();
        assert_eq!(
            C14nMode::Inclusive.canonicalize_document(&doc).unwrap(),
            b"<?a x?>\n<r></r>\n<?b?>"
        );
        assert_eq!(
            C14nMode::ExclusiveWithComments.canonicalize_document(&doc).unwrap(),
            b"<?a x?>\n<!--c-->\n<r></r>\n<!--d-->\n<?b?>"
        );
        let c = ExclusiveCanonicalizer {
            with_comments: true,
            inclusive_prefixes: Vec::new(),
        };
        assert_eq!(
            c.canonicalize_document(&doc).unwrap(),
            C14nMode::ExclusiveWithComments.canonicalize_document(&doc).unwrap()
        );
    }

    #[test]
    fn test_subset_inherits_xml_attributes_inclusively() {
        let doc = parse(r#"<a xml:lang="sv" xml:base="http://e/"><b Id="x">t</b></a>"#).unwrap();
        let (found, scope) = doc.find_by_id("x").unwrap();
        let inherited = &scope.xml_attributes;

        assert_eq!(
            C14nMode::Inclusive.canonicalize_subset(found, inherited).unwrap(),
            br#"<b Id="x" xml:base="http://e/" xml:lang="sv">t</b>"#
        );
        assert_eq!(
            C14nMode::Exclusive.canonicalize_subset(found, inherited).unwrap(),
            br#"<b Id="x">t</b>"#
        );
        assert!(matches!(
            C14nMode::Inclusive11.canonicalize_subset(found, inherited),
            Err(Error::Canonicalization(_))
        ));

        let doc = parse(r#"<a xml:lang="sv" xml:space="preserve"><b Id="x"/></a>"#).unwrap();
        let (found, scope) = doc.find_by_id("x").unwrap();
        assert_eq!(
            C14nMode::Inclusive11.canonicalize_subset(found, &scope.xml_attributes).unwrap(),
            br#"<b Id="x" xml:lang="sv" xml:space="preserve"></b>"#
        );
    }

    #[test]
    fn test_signed_info_shape() {
        let si = Element::new("ds", "SignedInfo")
            .with_namespace("ds", "http://www.w3.org/2000/09/xmldsig#")
            .with_child(
                Element::new("ds", "CanonicalizationMethod")
                    .with_attribute("Algorithm", algorithm::EXC_C14N),
            );
        assert_eq!(
            String::from_utf8(C14nMode::Exclusive.canonicalize(&si).unwrap()).unwrap(),
            "<ds:SignedInfo xmlns:ds=\"http://www.w3.org/2000/09/xmldsig#\">\
             <ds:CanonicalizationMethod Algorithm=\"http://www.w3.org/2001/10/xml-exc-c14n#\">\
             </ds:CanonicalizationMethod></ds:SignedInfo>"
        );
    }

    proptest! {
        #[test]
        fn prop_canonicalization_is_deterministic(text in "\\PC*", value in "\\PC*") {
            let el = Element::new("", "root")
                .with_attribute("v", value)
                .with_child(Element::new("", "c").with_text(text));
            for mode in C14nMode::ALL {
                prop_assert_eq!(mode.canonicalize(&el).unwrap(), mode.canonicalize(&el).unwrap());
            }
        }
    }
}
