#![forbid(unsafe_code)]

/// Errors produced by the Tornvik XAdES library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("invalid XML structure: {0}")]
    XmlStructure(String),

    #[error("canonicalization error: {0}")]
    Canonicalization(String),

    /// Hashing failed. The built-in SHA family hashers cannot fail; the
    /// variant exists for `Canonicalizer`/`Signer` implementations that
    /// hash on their own.
    #[error("digest error: {0}")]
    Digest(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("identifier generation failed: {0}")]
    IdentifierGeneration(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("key error: {0}")]
    Key(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("invalid URI reference: {0}")]
    InvalidUri(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
