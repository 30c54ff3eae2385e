//! The incremental parser: an `InputBuffer` plus a small state machine
//! that alternates between awaiting a control line and awaiting a
//! payload region, driven one `parse` call at a time regardless of how
//! the caller happened to chunk the input.
//!
//! Each call appends what's arrived, then loops trying to make progress
//! against the buffer, stopping as soon as what's needed isn't fully
//! there yet.

use std::collections::VecDeque;

use crate::buffer::InputBuffer;
use crate::error::{ErrorKind, ParseResult, ParserClosed, ParserError, ProtocolError};
use crate::event::Event;
use crate::proto::h1::decode::{decode_hmsg_payload, decode_msg_payload, HmsgPayload, MsgPayload};
use crate::proto::h1::role::{parse_control_line, Recognized};

/// Default cap on a single control line, guarding against an unbounded
/// head-of-line buffer on a peer that never sends a terminating CRLF.
/// Only the control line is bounded; payload `total_size` is
/// caller-declared and never second-guessed here.
pub const DEFAULT_MAX_CONTROL_LINE: usize = 4096;

enum State {
    AwaitingControlLine,
    AwaitingMsgPayload {
        subject: String,
        sid: u64,
        reply_to: String,
        total_size: usize,
    },
    AwaitingHmsgPayload {
        subject: String,
        sid: u64,
        reply_to: String,
        header_size: usize,
        total_size: usize,
    },
}

/// Incrementally parses a stream of protocol frames from arbitrarily
/// chunked input.
///
/// Feed bytes as they arrive via [`Parser::parse`], then collect
/// whatever frames became complete with [`Parser::drain_events`]. A
/// `Parser` is a pure state machine: it does no I/O of its own.
pub struct Parser {
    buffer: InputBuffer,
    state: State,
    events: VecDeque<Event>,
    closed: bool,
    max_control_line: usize,
}

impl Parser {
    /// Creates a parser with the default control-line length cap.
    pub fn new() -> Parser {
        Parser::with_max_control_line(DEFAULT_MAX_CONTROL_LINE)
    }

    /// Creates a parser whose control line may not exceed `max_control_line`
    /// bytes before it is received in full. Does not affect MSG/HMSG
    /// payload sizes, which are never bounded here.
    pub fn with_max_control_line(max_control_line: usize) -> Parser {
        Parser {
            buffer: InputBuffer::new(),
            state: State::AwaitingControlLine,
            events: VecDeque::new(),
            closed: false,
            max_control_line,
        }
    }

    /// Feeds `chunk` into the parser. Any frames it completes are
    /// queued for [`Parser::drain_events`].
    ///
    /// Returns [`ParserError::Closed`] if called after [`Parser::close`]
    /// or after a previous call already returned
    /// [`ParserError::Protocol`] — both latch the parser shut.
    pub fn parse(&mut self, chunk: &[u8]) -> ParseResult<()> {
        if self.closed {
            return Err(ParserError::Closed(ParserClosed));
        }

        self.buffer.append(chunk);
        tracing::trace!(bytes = chunk.len(), buffered = self.buffer.len(), "parse");

        if let Err(e) = self.drive() {
            tracing::debug!(error = %e, "protocol error, latching parser closed");
            self.closed = true;
            return Err(e.into());
        }

        Ok(())
    }

    /// Marks the parser closed. All subsequent `parse` calls fail with
    /// [`ParserError::Closed`]; already-queued events remain drainable.
    pub fn close(&mut self) {
        tracing::trace!("parser closed by caller");
        self.closed = true;
    }

    /// Removes and returns all frames completed so far, in arrival order.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    fn drive(&mut self) -> Result<(), ProtocolError> {
        loop {
            match &self.state {
                State::AwaitingControlLine => {
                    let idx = match self.buffer.find_crlf() {
                        Some(idx) => idx,
                        None => {
                            if self.buffer.len() > self.max_control_line {
                                let offending = self.buffer.first().unwrap_or(0);
                                return Err(ProtocolError::new(
                                    ErrorKind::ControlLineTooLong,
                                    offending,
                                    self.buffer.as_slice(),
                                ));
                            }
                            return Ok(());
                        }
                    };

                    let line = self.buffer.consume(idx);
                    self.buffer.advance(2);

                    if line.is_empty() {
                        continue;
                    }

                    match parse_control_line(&line)? {
                        Recognized::Complete(event) => self.events.push_back(event),
                        Recognized::AwaitMsg {
                            subject,
                            sid,
                            reply_to,
                            total_size,
                        } => {
                            self.state = State::AwaitingMsgPayload {
                                subject,
                                sid,
                                reply_to,
                                total_size,
                            };
                        }
                        Recognized::AwaitHmsg {
                            subject,
                            sid,
                            reply_to,
                            header_size,
                            total_size,
                        } => {
                            self.state = State::AwaitingHmsgPayload {
                                subject,
                                sid,
                                reply_to,
                                header_size,
                                total_size,
                            };
                        }
                    }
                }
                State::AwaitingMsgPayload { total_size, .. } => {
                    let total_size = *total_size;
                    match decode_msg_payload(&mut self.buffer, total_size) {
                        None => return Ok(()),
                        Some(result) => {
                            let MsgPayload { payload } = result?;
                            let (subject, sid, reply_to) = self.take_msg_fields();
                            self.events.push_back(Event::Msg {
                                sid,
                                subject,
                                reply_to,
                                payload,
                            });
                            self.state = State::AwaitingControlLine;
                        }
                    }
                }
                State::AwaitingHmsgPayload {
                    header_size,
                    total_size,
                    ..
                } => {
                    let header_size = *header_size;
                    let total_size = *total_size;
                    match decode_hmsg_payload(&mut self.buffer, header_size, total_size) {
                        None => return Ok(()),
                        Some(result) => {
                            let HmsgPayload { header, payload } = result?;
                            let (subject, sid, reply_to) = self.take_hmsg_fields();
                            self.events.push_back(Event::Hmsg {
                                sid,
                                subject,
                                reply_to,
                                header,
                                payload,
                            });
                            self.state = State::AwaitingControlLine;
                        }
                    }
                }
            }
        }
    }

    fn take_msg_fields(&mut self) -> (String, u64, String) {
        match std::mem::replace(&mut self.state, State::AwaitingControlLine) {
            State::AwaitingMsgPayload {
                subject,
                sid,
                reply_to,
                ..
            } => (subject, sid, reply_to),
            _ => unreachable!("take_msg_fields called outside AwaitingMsgPayload"),
        }
    }

    fn take_hmsg_fields(&mut self) -> (String, u64, String) {
        match std::mem::replace(&mut self.state, State::AwaitingControlLine) {
            State::AwaitingHmsgPayload {
                subject,
                sid,
                reply_to,
                ..
            } => (subject, sid, reply_to),
            _ => unreachable!("take_hmsg_fields called outside AwaitingHmsgPayload"),
        }
    }
}

impl Default for Parser {
    fn default() -> Parser {
        Parser::new()
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("buffered", &self.buffer.len())
            .field("pending_events", &self.events.len())
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_pong_round_trip() {
        let mut p = Parser::new();
        p.parse(b"PING\r\nPONG\r\n").unwrap();
        assert_eq!(p.drain_events(), vec![Event::Ping, Event::Pong]);
    }

    #[test]
    fn msg_three_token_form() {
        let mut p = Parser::new();
        p.parse(b"MSG foo.bar 9 5\r\nhello\r\n").unwrap();
        match &p.drain_events()[..] {
            [Event::Msg {
                sid,
                subject,
                reply_to,
                payload,
            }] => {
                assert_eq!(*sid, 9);
                assert_eq!(subject, "foo.bar");
                assert_eq!(reply_to, "");
                assert_eq!(&payload[..], b"hello");
            }
            other => panic!("unexpected: {:?}", other.len()),
        }
    }

    #[test]
    fn hmsg_splits_header_and_payload() {
        let mut p = Parser::new();
        p.parse(b"HMSG foo 1 12 17\r\nHdr-A: v\r\n\r\nhello\r\n")
            .unwrap();
        match &p.drain_events()[..] {
            [Event::Hmsg { header, payload, .. }] => {
                assert_eq!(&header[..], b"Hdr-A: v");
                assert_eq!(&payload[..], b"hello");
            }
            other => panic!("unexpected: {:?}", other.len()),
        }
    }

    #[test]
    fn chunk_invariant_byte_at_a_time() {
        let input = b"MSG foo 1 5\r\nhello\r\nPING\r\n";
        let mut p = Parser::new();
        for byte in input {
            p.parse(&[*byte]).unwrap();
        }
        let events = p.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Event::Ping));
    }

    #[test]
    fn suspends_mid_control_line_and_resumes() {
        let mut p = Parser::new();
        p.parse(b"PI").unwrap();
        assert!(p.drain_events().is_empty());
        p.parse(b"NG\r\n").unwrap();
        assert_eq!(p.drain_events(), vec![Event::Ping]);
    }

    #[test]
    fn suspends_mid_payload_and_resumes() {
        let mut p = Parser::new();
        p.parse(b"MSG foo 1 5\r\nhel").unwrap();
        assert!(p.drain_events().is_empty());
        p.parse(b"lo\r\n").unwrap();
        assert_eq!(p.drain_events().len(), 1);
    }

    #[test]
    fn protocol_error_latches_parser() {
        let mut p = Parser::new();
        assert!(p.parse(b"GARBAGE\r\n").is_err());
        assert!(matches!(p.parse(b"PING\r\n"), Err(ParserError::Closed(_))));
    }

    #[test]
    fn close_latches_parser() {
        let mut p = Parser::new();
        p.close();
        assert!(matches!(p.parse(b"PING\r\n"), Err(ParserError::Closed(_))));
    }

    #[test]
    fn drain_is_idempotent_when_empty() {
        let mut p = Parser::new();
        p.parse(b"PING\r\n").unwrap();
        assert_eq!(p.drain_events().len(), 1);
        assert!(p.drain_events().is_empty());
    }

    #[test]
    fn overlong_control_line_is_rejected() {
        let mut p = Parser::with_max_control_line(8);
        let long = vec![b'X'; 64];
        assert!(p.parse(&long).is_err());
    }

    #[test]
    fn err_and_info_interleave_with_msg() {
        let mut p = Parser::new();
        p.parse(b"-ERR 'Slow Consumer'\r\nMSG a 1 2\r\nhi\r\n")
            .unwrap();
        let events = p.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Event::Err { message } if message == "'Slow Consumer'"));
    }
}
