//! Control-line recognition: verb dispatch and argument tokenizing.
//!
//! The whole buffered control line is handed over in one shot and
//! tokenized in a single pass rather than stepped through byte by byte —
//! the grammar is small enough that a hand-rolled tokenizer is simpler
//! than a general-purpose one.

use crate::error::{ErrorKind, ProtocolError};
use crate::event::Event;
use crate::info;

/// What a fully-buffered control line (CRLF already found) recognized to.
pub(crate) enum Recognized {
    /// A complete frame with no payload to await.
    Complete(Event),
    /// `MSG` control line parsed; caller must now await `total_size + 2`
    /// payload bytes.
    AwaitMsg {
        subject: String,
        sid: u64,
        reply_to: String,
        total_size: usize,
    },
    /// `HMSG` control line parsed; caller must now await `total_size + 2`
    /// payload bytes, of which the first `header_size` are the header
    /// block.
    AwaitHmsg {
        subject: String,
        sid: u64,
        reply_to: String,
        header_size: usize,
        total_size: usize,
    },
}

/// Parses one CRLF-terminated control line (the CRLF itself is excluded
/// from `line`). `line` must be non-empty.
pub(crate) fn parse_control_line(line: &[u8]) -> Result<Recognized, ProtocolError> {
    debug_assert!(!line.is_empty());

    match line[0] {
        b'+' if is_exact_ci(line, b"+OK") => Ok(Recognized::Complete(Event::Ok)),
        b'-' if starts_with_ci(line, b"-ERR ") => {
            let text = &line[5..];
            if has_bare_cr_or_lf(text) {
                return Err(malformed(line));
            }
            let message = ascii_text(text, line)?;
            Ok(Recognized::Complete(Event::Err { message }))
        }
        b'p' | b'P' if is_exact_ci(line, b"PING") => Ok(Recognized::Complete(Event::Ping)),
        b'p' | b'P' if is_exact_ci(line, b"PONG") => Ok(Recognized::Complete(Event::Pong)),
        b'i' | b'I' if starts_with_ci(line, b"INFO ") => {
            let json = &line[5..];
            if json.first() != Some(&b'{') {
                return Err(malformed(line));
            }
            let info = info::decode_info(json)?;
            Ok(Recognized::Complete(Event::Info(Box::new(info))))
        }
        b'm' | b'M' if starts_with_ci(line, b"MSG ") => parse_msg(&line[4..], line),
        b'h' | b'H' if starts_with_ci(line, b"HMSG ") => parse_hmsg(&line[5..], line),
        other => Err(ProtocolError::new(ErrorKind::UnknownVerb, other, line)),
    }
}

fn parse_msg(args: &[u8], line: &[u8]) -> Result<Recognized, ProtocolError> {
    let tokens: Vec<&[u8]> = args.split(|&b| b == b' ').collect();
    let (subject, sid, reply_to, total_size) = match tokens.as_slice() {
        [subject, sid, total_size] => (*subject, *sid, &b""[..], *total_size),
        [subject, sid, reply_to, total_size] => (*subject, *sid, *reply_to, *total_size),
        _ => return Err(ProtocolError::new(ErrorKind::BadArgCount, line[0], line)),
    };

    Ok(Recognized::AwaitMsg {
        subject: ascii_text(subject, line)?,
        sid: parse_u64(sid, line)?,
        reply_to: ascii_text(reply_to, line)?,
        total_size: parse_size(total_size, line)?,
    })
}

fn parse_hmsg(args: &[u8], line: &[u8]) -> Result<Recognized, ProtocolError> {
    let tokens: Vec<&[u8]> = args.split(|&b| b == b' ').collect();
    let (subject, sid, reply_to, header_size, total_size) = match tokens.as_slice() {
        [subject, sid, header_size, total_size] => {
            (*subject, *sid, &b""[..], *header_size, *total_size)
        }
        [subject, sid, reply_to, header_size, total_size] => {
            (*subject, *sid, *reply_to, *header_size, *total_size)
        }
        _ => return Err(ProtocolError::new(ErrorKind::BadArgCount, line[0], line)),
    };

    let header_size = parse_size(header_size, line)?;
    let total_size = parse_size(total_size, line)?;
    if header_size < 4 || total_size < header_size {
        return Err(ProtocolError::new(ErrorKind::InvalidSize, line[0], line));
    }

    Ok(Recognized::AwaitHmsg {
        subject: ascii_text(subject, line)?,
        sid: parse_u64(sid, line)?,
        reply_to: ascii_text(reply_to, line)?,
        header_size,
        total_size,
    })
}

fn parse_u64(token: &[u8], line: &[u8]) -> Result<u64, ProtocolError> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| {
            ProtocolError::new(ErrorKind::InvalidNumber, token.first().copied().unwrap_or(0), line)
        })
}

fn parse_size(token: &[u8], line: &[u8]) -> Result<usize, ProtocolError> {
    let n = parse_u64(token, line)?;
    usize::try_from(n)
        .map_err(|_| ProtocolError::new(ErrorKind::InvalidNumber, token.first().copied().unwrap_or(0), line))
}

fn ascii_text(token: &[u8], line: &[u8]) -> Result<String, ProtocolError> {
    String::from_utf8(token.to_vec())
        .map_err(|_| ProtocolError::new(ErrorKind::InvalidUtf8, token.first().copied().unwrap_or(0), line))
}

fn malformed(line: &[u8]) -> ProtocolError {
    ProtocolError::new(ErrorKind::MalformedControlLine, line[0], line)
}

/// `find_crlf` only stops at the first true `\r\n`, so a lone `\r` or
/// `\n` earlier in the line is silently skipped over rather than ending
/// it. The `-ERR` message text must reject both, since it's the one
/// field whose content isn't otherwise bounded by token splitting.
fn has_bare_cr_or_lf(text: &[u8]) -> bool {
    text.iter().any(|&b| b == b'\r' || b == b'\n')
}

fn is_exact_ci(line: &[u8], literal: &[u8]) -> bool {
    line.eq_ignore_ascii_case(literal)
}

fn starts_with_ci(line: &[u8], literal: &[u8]) -> bool {
    line.len() >= literal.len() && line[..literal.len()].eq_ignore_ascii_case(literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognize(s: &str) -> Result<Recognized, ProtocolError> {
        parse_control_line(s.as_bytes())
    }

    #[test]
    fn ping_pong_ok_case_insensitive() {
        assert!(matches!(
            recognize("PING").unwrap(),
            Recognized::Complete(Event::Ping)
        ));
        assert!(matches!(
            recognize("pong").unwrap(),
            Recognized::Complete(Event::Pong)
        ));
        assert!(matches!(
            recognize("+ok").unwrap(),
            Recognized::Complete(Event::Ok)
        ));
    }

    #[test]
    fn err_message_kept_verbatim() {
        match recognize("-ERR 'Unknown Protocol'").unwrap() {
            Recognized::Complete(Event::Err { message }) => {
                assert_eq!(message, "'Unknown Protocol'");
            }
            _ => panic!("expected Err event"),
        }
    }

    #[test]
    fn err_message_rejects_embedded_bare_cr_or_lf() {
        assert!(recognize("-ERR foo\rbar").is_err());
        assert!(recognize("-ERR foo\nbar").is_err());
    }

    #[test]
    fn msg_three_and_four_tokens() {
        match recognize("MSG foo.bar 7 11").unwrap() {
            Recognized::AwaitMsg {
                subject,
                sid,
                reply_to,
                total_size,
            } => {
                assert_eq!(subject, "foo.bar");
                assert_eq!(sid, 7);
                assert_eq!(reply_to, "");
                assert_eq!(total_size, 11);
            }
            _ => panic!("expected AwaitMsg"),
        }

        match recognize("MSG foo 1 reply.x 3").unwrap() {
            Recognized::AwaitMsg { reply_to, .. } => assert_eq!(reply_to, "reply.x"),
            _ => panic!("expected AwaitMsg"),
        }
    }

    #[test]
    fn msg_wrong_token_count_is_error() {
        assert!(recognize("MSG foo 7").is_err());
    }

    #[test]
    fn msg_non_numeric_sid_is_error() {
        assert!(recognize("MSG foo x 3").is_err());
    }

    #[test]
    fn hmsg_rejects_header_size_below_minimum() {
        assert!(recognize("HMSG foo 1 3 10").is_err());
    }

    #[test]
    fn hmsg_rejects_total_smaller_than_header() {
        assert!(recognize("HMSG foo 1 10 8").is_err());
    }

    #[test]
    fn unknown_verb_is_error() {
        assert!(recognize("XYZ").is_err());
    }

    #[test]
    fn verb_case_insensitive_but_space_exact() {
        assert!(matches!(
            recognize("MsG foo.bar 7 11").unwrap(),
            Recognized::AwaitMsg { .. }
        ));
    }
}
