#![forbid(unsafe_code)]

//! Signing context: algorithms, credentials and identifier settings for
//! XAdES signature operations.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tornvik_c14n::{C14nMode, Canonicalizer};
use tornvik_core::{ns, Error, HashAlgorithm};
use tornvik_keys::CredentialBundle;
use uuid::Uuid;

/// How the data element is referenced and digested.
#[derive(Debug, Clone)]
pub struct SignedDataContext {
    pub c14n: Arc<dyn Canonicalizer>,
    pub hash: HashAlgorithm,
    /// `Reference/@URI`. Empty means the whole enclosing document.
    pub reference_uri: String,
    /// Emit the enveloped-signature transform.
    pub enveloped: bool,
}

impl Default for SignedDataContext {
    fn default() -> Self {
        Self {
            c14n: Arc::new(C14nMode::Exclusive),
            hash: HashAlgorithm::Sha256,
            reference_uri: String::new(),
            enveloped: true,
        }
    }
}

/// How SignedProperties is digested, and the signing time it carries.
#[derive(Debug, Clone)]
pub struct SignedPropertiesContext {
    pub c14n: Arc<dyn Canonicalizer>,
    pub hash: HashAlgorithm,
    /// `None` uses the current time when the signature is assembled.
    pub signing_time: Option<DateTime<Utc>>,
}

impl Default for SignedPropertiesContext {
    fn default() -> Self {
        Self {
            c14n: Arc::new(C14nMode::Exclusive),
            hash: HashAlgorithm::Sha256,
            signing_time: None,
        }
    }
}

/// Context for XAdES signing operations.
///
/// Signing only borrows the context; the identifier prefix of one
/// operation is allocated separately (see [`IdPrefix`](crate::IdPrefix)),
/// so a context can be reused and shared between threads.
#[derive(Debug, Clone)]
pub struct SigningContext {
    pub data: SignedDataContext,
    pub properties: SignedPropertiesContext,
    /// `SignedInfo` canonicalization method.
    pub c14n: Arc<dyn Canonicalizer>,
    /// Signature method hash.
    pub hash: HashAlgorithm,
    pub credentials: CredentialBundle,
    /// Prefix bound to the XML-DSig namespace. Empty binds it as the
    /// default namespace.
    pub dsig_prefix: String,
    /// Derive element Ids from a `Signature-<uuid>-` prefix.
    pub use_signature_id: bool,
    /// Identifier used when `use_signature_id` is set. `None` generates a
    /// fresh time-based UUID per operation.
    pub signature_id: Option<Uuid>,
}

impl SigningContext {
    /// Create a context with exclusive C14N and SHA-256 throughout, an
    /// enveloped reference to the whole document and the `ds` prefix.
    pub fn new(credentials: CredentialBundle) -> Self {
        Self {
            data: SignedDataContext::default(),
            properties: SignedPropertiesContext::default(),
            c14n: Arc::new(C14nMode::Exclusive),
            hash: HashAlgorithm::Sha256,
            credentials,
            dsig_prefix: ns::DSIG_PREFIX.to_owned(),
            use_signature_id: false,
            signature_id: None,
        }
    }

    /// Set every canonicalization method (SignedInfo, data, properties).
    pub fn with_c14n(mut self, c14n: Arc<dyn Canonicalizer>) -> Self {
        self.data.c14n = Arc::clone(&c14n);
        self.properties.c14n = Arc::clone(&c14n);
        self.c14n = c14n;
        self
    }

    /// Set every hash algorithm (signature method, data and properties
    /// digests).
    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.data.hash = hash;
        self.properties.hash = hash;
        self.hash = hash;
        self
    }

    /// Check settings that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), Error> {
        let prefix = self.dsig_prefix.as_str();
        if !prefix.is_empty() && !is_ncname(prefix) {
            return Err(Error::Configuration(format!(
                "invalid XML-DSig namespace prefix: {prefix:?}"
            )));
        }
        if prefix == ns::XADES_PREFIX {
            return Err(Error::Configuration(format!(
                "XML-DSig prefix {prefix:?} clashes with the XAdES prefix"
            )));
        }
        if prefix.eq_ignore_ascii_case("xml") || prefix.eq_ignore_ascii_case("xmlns") {
            return Err(Error::Configuration(format!(
                "XML-DSig prefix {prefix:?} is reserved"
            )));
        }
        Ok(())
    }
}

/// Non-colonized XML name, restricted to ASCII.
fn is_ncname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
