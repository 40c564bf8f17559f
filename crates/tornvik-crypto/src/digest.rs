#![forbid(unsafe_code)]

//! Digest (hash) algorithm implementations.

use ::digest::Digest;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tornvik_core::HashAlgorithm;

/// Trait for digest algorithms.
pub trait DigestAlgorithm: Send {
    /// Feed data into the hash.
    fn update(&mut self, data: &[u8]);
    /// Finalize and return the hash value.
    fn finalize(self: Box<Self>) -> Vec<u8>;
    /// Algorithm URI.
    fn uri(&self) -> &'static str;
}

/// Create a streaming hasher for `hash`.
pub fn hasher(hash: HashAlgorithm) -> Box<dyn DigestAlgorithm> {
    match hash {
        HashAlgorithm::Sha1 => Box::new(Sha1Digest::new()),
        HashAlgorithm::Sha256 => Box::new(Sha256Digest::new()),
        HashAlgorithm::Sha512 => Box::new(Sha512Digest::new()),
    }
}

/// Compute a digest in one shot.
pub fn digest(hash: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    let mut h = hasher(hash);
    h.update(data);
    h.finalize()
}

/// Compute a digest and encode it as standard, padded base64.
pub fn digest_base64(hash: HashAlgorithm, data: &[u8]) -> String {
    STANDARD.encode(digest(hash, data))
}

// ── Concrete implementations ─────────────────────────────────────────

macro_rules! impl_digest {
    ($name:ident, $hasher:ty, $hash:expr) => {
        struct $name {
            inner: $hasher,
        }

        impl $name {
            fn new() -> Self {
                Self {
                    inner: <$hasher>::new(),
                }
            }
        }

        impl DigestAlgorithm for $name {
            fn update(&mut self, data: &[u8]) {
                Digest::update(&mut self.inner, data);
            }

            fn finalize(self: Box<Self>) -> Vec<u8> {
                Digest::finalize(self.inner).to_vec()
            }

            fn uri(&self) -> &'static str {
                $hash.digest_uri()
            }
        }
    };
}

impl_digest!(Sha1Digest, sha1::Sha1, HashAlgorithm::Sha1);
impl_digest!(Sha256Digest, sha2::Sha256, HashAlgorithm::Sha256);
impl_digest!(Sha512Digest, sha2::Sha512, HashAlgorithm::Sha512);
