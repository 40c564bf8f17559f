#![forbid(unsafe_code)]

//! Identifier prefix shared by the Ids and references of one signature.

use crate::context::SigningContext;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tornvik_core::Error;
use uuid::{Context, Timestamp, Uuid};

/// Prefix of `Signature/@Id`, `SignedProperties/@Id` and the references
/// to them, allocated once per signing operation.
///
/// Either empty, or `Signature-<uuid>-`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdPrefix(String);

impl IdPrefix {
    /// Allocate the prefix for one operation on `ctx`.
    ///
    /// Without unique ids the prefix is empty. Otherwise the context's
    /// `signature_id` is used, or a version 1 UUID is generated from the
    /// system clock and a random node id.
    pub fn allocate(ctx: &SigningContext) -> Result<Self, Error> {
        if !ctx.use_signature_id {
            return Ok(Self::default());
        }
        let id = match ctx.signature_id {
            Some(id) => id,
            None => generate_v1()?,
        };
        Ok(Self::from_uuid(id))
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(format!("Signature-{}-", id.hyphenated()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Signature/@Id`
    pub fn signature_id(&self) -> String {
        format!("{}Signature", self.0)
    }

    /// `QualifyingProperties/@Target`
    pub fn signature_target(&self) -> String {
        format!("#{}", self.signature_id())
    }

    /// `SignedProperties/@Id`
    pub fn signed_properties_id(&self) -> String {
        format!("{}SignedProperties", self.0)
    }

    /// `Reference/@URI` of the properties reference.
    pub fn signed_properties_uri(&self) -> String {
        format!("#{}", self.signed_properties_id())
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn clock_sequence() -> &'static Context {
    static CONTEXT: OnceLock<Context> = OnceLock::new();
    CONTEXT.get_or_init(|| Context::new(rand::random()))
}

fn generate_v1() -> Result<Uuid, Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::IdentifierGeneration(format!("system clock before Unix epoch: {e}")))?;

    let mut node_id = [0u8; 6];
    OsRng
        .try_fill_bytes(&mut node_id)
        .map_err(|e| Error::IdentifierGeneration(format!("random node id: {e}")))?;
    // Random node ids carry the multicast bit.
    node_id[0] |= 0x01;

    let ts = Timestamp::from_unix(clock_sequence(), now.as_secs(), now.subsec_nanos());
    Ok(Uuid::new_v1(ts, &node_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_credentials;

    #[test]
    fn test_disabled_is_empty() {
        let mut ctx = SigningContext::new(test_credentials());
        ctx.signature_id = Some(Uuid::nil());
        let id = IdPrefix::allocate(&ctx).unwrap();
        assert!(id.is_empty());
        assert_eq!(id.signature_id(), "Signature");
        assert_eq!(id.signature_target(), "#Signature");
        assert_eq!(id.signed_properties_id(), "SignedProperties");
        assert_eq!(id.signed_properties_uri(), "#SignedProperties");
    }

    #[test]
    fn test_preset_identifier() {
        let mut ctx = SigningContext::new(test_credentials());
        ctx.use_signature_id = true;
        ctx.signature_id = Some(Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap());
        let id = IdPrefix::allocate(&ctx).unwrap();
        assert_eq!(id.as_str(), "Signature-6ba7b810-9dad-11d1-80b4-00c04fd430c8-");
        assert_eq!(
            id.signed_properties_uri(),
            "#Signature-6ba7b810-9dad-11d1-80b4-00c04fd430c8-SignedProperties"
        );
        assert_eq!(IdPrefix::allocate(&ctx).unwrap(), id);
    }

    #[test]
    fn test_generated_identifier_is_v1() {
        let mut ctx = SigningContext::new(test_credentials());
        ctx.use_signature_id = true;
        let first = IdPrefix::allocate(&ctx).unwrap();
        let second = IdPrefix::allocate(&ctx).unwrap();
        assert_ne!(first, second);

        let s = first.as_str();
        assert!(s.starts_with("Signature-") && s.ends_with('-'));
        let uuid = Uuid::parse_str(&s["Signature-".len()..s.len() - 1]).unwrap();
        assert_eq!(uuid.get_version_num(), 1);
        // The context is left untouched.
        assert!(ctx.signature_id.is_none());
    }
}
