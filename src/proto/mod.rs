//! Pieces pertaining to the wire protocol: control-line and payload
//! recognition, kept one module per concern — `role` for parsing,
//! `decode` for payload framing.

pub(crate) mod h1;
