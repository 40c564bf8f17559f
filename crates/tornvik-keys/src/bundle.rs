#![forbid(unsafe_code)]

//! The signer's credentials.

use crate::{loader, x509};
use rsa::RsaPrivateKey;
use std::fmt;
use std::path::Path;
use tornvik_core::Error;
use tornvik_crypto::KeyStore;
use x509_cert::Certificate;

/// Private key, signing certificate and certificate chain of one signer.
///
/// The private key is optional so a bundle can describe a signer whose
/// key is not available; signing with such a bundle fails with
/// [`Error::Signing`].
#[derive(Clone)]
pub struct CredentialBundle {
    pub private_key: Option<RsaPrivateKey>,
    /// The parsed leaf certificate.
    pub certificate: Certificate,
    /// DER encoding of [`Self::certificate`].
    pub certificate_der: Vec<u8>,
    /// DER certificates emitted after the leaf in `KeyInfo`, in order.
    pub chain: Vec<Vec<u8>>,
}

impl CredentialBundle {
    /// Build a bundle from a key and a DER certificate.
    pub fn new(private_key: Option<RsaPrivateKey>, certificate_der: Vec<u8>) -> Result<Self, Error> {
        let certificate = loader::load_x509_cert_der(&certificate_der)?;
        Ok(Self {
            private_key,
            certificate,
            certificate_der,
            chain: Vec::new(),
        })
    }

    pub fn with_chain(mut self, chain: Vec<Vec<u8>>) -> Self {
        self.chain = chain;
        self
    }

    /// Load a key file, a certificate file and an optional chain file.
    pub fn from_files(key: &Path, certificate: &Path, chain: Option<&Path>) -> Result<Self, Error> {
        let private_key = loader::load_key_file(key)?;
        let (certificate, certificate_der) = loader::load_certificate_file(certificate)?;
        let chain = match chain {
            Some(path) => loader::load_certificate_chain_file(path)?,
            None => Vec::new(),
        };
        tracing::debug!(
            key = %key.display(),
            chain_len = chain.len(),
            "loaded signer credentials"
        );
        Ok(Self {
            private_key: Some(private_key),
            certificate,
            certificate_der,
            chain,
        })
    }

    /// RFC 4514 issuer name of the signing certificate.
    pub fn issuer_name(&self) -> String {
        x509::issuer_name(&self.certificate)
    }

    /// Decimal serial number of the signing certificate.
    pub fn serial_number(&self) -> String {
        x509::serial_number(&self.certificate)
    }
}

impl KeyStore for CredentialBundle {
    fn key_pair(&self) -> Result<(&RsaPrivateKey, &[u8]), Error> {
        let key = self
            .private_key
            .as_ref()
            .ok_or_else(|| Error::Signing("no private key in credential bundle".into()))?;
        Ok((key, self.certificate_der.as_slice()))
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer_name())
            .field("serial", &self.serial_number())
            .field("chain_len", &self.chain.len())
            .finish()
    }
}
