#![forbid(unsafe_code)]

//! The closed set of hash algorithms a signature may use.

use crate::{algorithm, Error};
use std::fmt;
use std::str::FromStr;

/// Hash algorithm used for digests and for the RSA signature.
///
/// Every member maps to exactly one digest-method URI and one
/// signature-method URI. Names or URIs outside this set are rejected
/// with [`Error::Configuration`] when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 3] = [Self::Sha1, Self::Sha256, Self::Sha512];

    /// URI for `DigestMethod/@Algorithm`.
    pub fn digest_uri(&self) -> &'static str {
        match self {
            Self::Sha1 => algorithm::SHA1,
            Self::Sha256 => algorithm::SHA256,
            Self::Sha512 => algorithm::SHA512,
        }
    }

    /// URI for `SignatureMethod/@Algorithm` (RSA PKCS#1 v1.5).
    pub fn signature_uri(&self) -> &'static str {
        match self {
            Self::Sha1 => algorithm::RSA_SHA1,
            Self::Sha256 => algorithm::RSA_SHA256,
            Self::Sha512 => algorithm::RSA_SHA512,
        }
    }

    /// Short lowercase name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Digest output length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }

    /// Parse a digest-method URI.
    pub fn from_digest_uri(uri: &str) -> Result<Self, Error> {
        match uri {
            algorithm::SHA1 => Ok(Self::Sha1),
            algorithm::SHA256 => Ok(Self::Sha256),
            algorithm::SHA512 => Ok(Self::Sha512),
            _ => Err(Error::Configuration(format!(
                "unsupported digest algorithm: {uri}"
            ))),
        }
    }

    /// Parse a signature-method URI.
    pub fn from_signature_uri(uri: &str) -> Result<Self, Error> {
        match uri {
            algorithm::RSA_SHA1 => Ok(Self::Sha1),
            algorithm::RSA_SHA256 => Ok(Self::Sha256),
            algorithm::RSA_SHA512 => Ok(Self::Sha512),
            _ => Err(Error::Configuration(format!(
                "unsupported signature algorithm: {uri}"
            ))),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    /// Accepts `sha1`, `sha-1`, `sha256`, `sha-256`, `sha512`, `sha-512`
    /// (case-insensitive) or any digest/signature method URI of the set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains("://") {
            return Self::from_digest_uri(s).or_else(|_| Self::from_signature_uri(s));
        }
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(Error::Configuration(format!(
                "unsupported hash algorithm: {s} (expected sha1, sha256 or sha512)"
            ))),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
