#![forbid(unsafe_code)]

pub use tornvik_core as core;
pub use tornvik_xml as xml;
pub use tornvik_c14n as c14n;
pub use tornvik_crypto as crypto;
pub use tornvik_keys as keys;
pub use tornvik_xades as xades;
