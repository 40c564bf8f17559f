#![forbid(unsafe_code)]

//! Signer credentials for the Tornvik XAdES library.
//!
//! Loads RSA private keys (PKCS#8 or PKCS#1, PEM or DER), the signer's
//! X.509 certificate and an optional certificate chain, and bundles them
//! as a [`KeyStore`](tornvik_crypto::KeyStore).

pub mod bundle;
pub mod loader;
pub mod x509;

pub use bundle::CredentialBundle;
