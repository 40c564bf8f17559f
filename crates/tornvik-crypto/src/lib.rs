#![forbid(unsafe_code)]

//! Cryptographic primitives for the Tornvik XAdES library.
//!
//! Digests over the closed [`HashAlgorithm`](tornvik_core::HashAlgorithm)
//! set and RSA PKCS#1 v1.5 signing behind the [`Signer`] and [`KeyStore`]
//! capability traits.

pub mod digest;
pub mod sign;

pub use digest::{digest, digest_base64, DigestAlgorithm};
pub use sign::{KeyStore, RsaPkcs1v15Signer, Signer};
