#![forbid(unsafe_code)]

//! XAdES-BES signature assembly for the Tornvik library.
//!
//! [`create_signature`] turns a data element and a [`SigningContext`] into
//! a `Signature` element carrying SignedInfo, SignatureValue, KeyInfo and
//! an Object with the XAdES QualifyingProperties. [`sign_document`]
//! resolves the data reference inside a document and appends the
//! signature to its root.

pub mod compute;
pub mod context;
pub mod id;
pub mod key_info;
pub mod object;
pub mod properties;
pub mod sign;
pub mod signed_info;

pub use context::{SignedDataContext, SignedPropertiesContext, SigningContext};
pub use id::IdPrefix;
pub use sign::{
    create_signature, create_signature_with, resolve_reference, sign_document, sign_reference,
    Dereferenced,
};

#[cfg(test)]
pub(crate) mod test_support;
