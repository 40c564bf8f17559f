#![forbid(unsafe_code)]

//! RSA PKCS#1 v1.5 signing.
//!
//! Signing goes through two narrow capabilities: a [`KeyStore`] hands out
//! the signer's key pair, and a [`Signer`] turns bytes into a raw
//! signature value under one of the supported hashes.

use rsa::RsaPrivateKey;
use signature::SignatureEncoding;
use tornvik_core::{Error, HashAlgorithm};

/// Source of the signing key pair.
pub trait KeyStore {
    /// The RSA private key and the DER encoding of the matching
    /// certificate. Fails with [`Error::Signing`] when no private key is
    /// available.
    fn key_pair(&self) -> Result<(&RsaPrivateKey, &[u8]), Error>;
}

/// Produces raw signature bytes.
pub trait Signer: Send + Sync {
    fn sign(&self, data: &[u8], hash: HashAlgorithm, keys: &dyn KeyStore)
        -> Result<Vec<u8>, Error>;
}

/// RSASSA-PKCS1-v1_5 over SHA-1, SHA-256 or SHA-512.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaPkcs1v15Signer;

impl RsaPkcs1v15Signer {
    /// Sign `data` with `private_key`.
    pub fn sign_with_key(
        &self,
        private_key: &RsaPrivateKey,
        data: &[u8],
        hash: HashAlgorithm,
    ) -> Result<Vec<u8>, Error> {
        macro_rules! do_sign {
            ($hasher:ty) => {{
                let sk = rsa::pkcs1v15::SigningKey::<$hasher>::new(private_key.clone());
                signature::Signer::try_sign(&sk, data)
                    .map(|sig| sig.to_vec())
                    .map_err(|e| Error::Signing(format!("RSA PKCS#1 v1.5 signing failed: {e}")))
            }};
        }
        match hash {
            HashAlgorithm::Sha1 => do_sign!(sha1::Sha1),
            HashAlgorithm::Sha256 => do_sign!(sha2::Sha256),
            HashAlgorithm::Sha512 => do_sign!(sha2::Sha512),
        }
    }
}

impl Signer for RsaPkcs1v15Signer {
    fn sign(
        &self,
        data: &[u8],
        hash: HashAlgorithm,
        keys: &dyn KeyStore,
    ) -> Result<Vec<u8>, Error> {
        let (private_key, _) = keys.key_pair()?;
        self.sign_with_key(private_key, data, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use rsa::pkcs8::DecodePrivateKey;
    use signature::Verifier;

    const KEY_PEM: &str = include_str!("../../../test-data/keys/signer-key.pem");

    struct TestKeys(Option<RsaPrivateKey>);

    impl KeyStore for TestKeys {
        fn key_pair(&self) -> Result<(&RsaPrivateKey, &[u8]), Error> {
            match &self.0 {
                Some(key) => Ok((key, &[][..])),
                None => Err(Error::Signing("no private key".into())),
            }
        }
    }

    fn test_key() -> RsaPrivateKey {
        RsaPrivateKey::from_pkcs8_pem(KEY_PEM).unwrap()
    }

    #[test]
    fn test_known_signature_sha256() {
        let keys = TestKeys(Some(test_key()));
        let sig = RsaPkcs1v15Signer
            .sign(b"signed info bytes", HashAlgorithm::Sha256, &keys)
            .unwrap();
        assert_eq!(
            STANDARD.encode(sig),
            "mycpgD5BLpGOx/EU7NXv3T+BEcLP7rWr/mNAY7RB3CSqFKthI1TaHuXhryGwmQ557z/cLlVTp5/GAw5XUIAqp3sp7EBIiSPbyJGI2LFfECm86iU3IqrLabhcHsNOFxfhTgTzqbJJqIsNpZRvm0dv5mJMi0UyO3+aw+COk12Nu96iBUw86ABcqV7S1crlbamIZiK5bMdPXT8USBclEtNTcOTj2ZIIHKerN64v4LKEVAoZRKZ6/ztFWWDVqFhrL/mBcYsS8+1QnC7PR3ZSqmTy3TwEUFH2OWq4sL8paX7doee2bOSTP6UIPNfNOaOSE/WS1OsKag/A9ESa25AqZ23nTA=="
        );
    }

    #[test]
    fn test_signatures_verify_for_every_hash() {
        let key = test_key();
        let public_key = key.to_public_key();
        let data = b"<ds:SignedInfo/>";
        macro_rules! check {
            ($hasher:ty, $hash:expr) => {{
                let sig = RsaPkcs1v15Signer.sign_with_key(&key, data, $hash).unwrap();
                assert_eq!(sig.len(), 256);
                let vk = rsa::pkcs1v15::VerifyingKey::<$hasher>::new(public_key.clone());
                let sig = rsa::pkcs1v15::Signature::try_from(sig.as_slice()).unwrap();
                assert!(vk.verify(data, &sig).is_ok());
                assert!(vk.verify(b"tampered", &sig).is_err());
            }};
        }
        check!(sha1::Sha1, HashAlgorithm::Sha1);
        check!(sha2::Sha256, HashAlgorithm::Sha256);
        check!(sha2::Sha512, HashAlgorithm::Sha512);
    }

    #[test]
    fn test_missing_key_is_signing_error() {
        let err = RsaPkcs1v15Signer
            .sign(b"data", HashAlgorithm::Sha256, &TestKeys(None))
            .unwrap_err();
        assert!(matches!(err, Error::Signing(_)));
    }
}
