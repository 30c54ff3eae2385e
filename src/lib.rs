#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(test, deny(rust_2018_idioms))]

//! # msgproto
//!
//! `msgproto` is an incremental, allocation-conscious parser for a
//! line-delimited, length-prefixed pub-sub wire protocol.
//!
//! ## Design
//!
//! A [`Parser`] owns no socket and does no I/O. The caller reads bytes
//! from wherever they come from — a TCP stream, a test fixture, a
//! replayed capture — and hands them to [`Parser::parse`] in whatever
//! chunks happen to arrive. The parser buffers internally and only
//! emits an [`Event`] once a complete frame is available, so it behaves
//! identically whether the input arrives in one call or one byte at a
//! time.
//!
//! ```
//! use msgproto::{Event, Parser};
//!
//! let mut parser = Parser::new();
//! parser.parse(b"MSG foo.bar 9 5\r\nhello\r\n").unwrap();
//! let events = parser.drain_events();
//! assert!(matches!(events[0], Event::Msg { .. }));
//! ```

pub use crate::error::{ParseResult, ParserClosed, ParserError, ProtocolError};
pub use crate::event::{Event, ServerInfo, Version};
pub use crate::parser::{Parser, DEFAULT_MAX_CONTROL_LINE};

mod buffer;
mod error;
mod event;
mod info;
mod parser;
mod proto;
