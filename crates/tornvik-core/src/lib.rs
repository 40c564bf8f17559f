#![forbid(unsafe_code)]

//! Core types for the Tornvik XAdES library: errors, XML namespaces,
//! and algorithm identifiers.

pub mod algorithm;
pub mod error;
pub mod hash;
pub mod ns;

pub use error::{Error, Result};
pub use hash::HashAlgorithm;
