//! Control-line and payload recognition, the two halves `Parser` drives.

pub(crate) mod decode;
pub(crate) mod role;
