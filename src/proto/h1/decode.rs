//! Payload and header-block recognition.
//!
//! Unlike a chunked-transfer body, a length-prefixed region is either
//! fully present in the buffer or it isn't, so there's no byte-at-a-time
//! stepping to do here — just a length check followed by a slice.

use bytes::Bytes;

use crate::buffer::InputBuffer;
use crate::error::{ErrorKind, ProtocolError};

pub(crate) struct MsgPayload {
    pub(crate) payload: Bytes,
}

pub(crate) struct HmsgPayload {
    pub(crate) header: Bytes,
    pub(crate) payload: Bytes,
}

/// Attempts to consume an MSG payload region (`total_size` bytes plus a
/// trailing CRLF) from the front of `buf`. Returns `None` if not enough
/// bytes have arrived yet (the caller should suspend).
pub(crate) fn decode_msg_payload(
    buf: &mut InputBuffer,
    total_size: usize,
) -> Option<Result<MsgPayload, ProtocolError>> {
    let needed = total_size.checked_add(2)?;
    if buf.len() < needed {
        return None;
    }

    let region = buf.consume(needed);
    Some(check_terminator(&region, total_size).map(|()| MsgPayload {
        payload: region.slice(0..total_size),
    }))
}

/// As [`decode_msg_payload`], but also splits the leading `header_size`
/// bytes into a header block, stripping its terminating `\r\n\r\n`.
pub(crate) fn decode_hmsg_payload(
    buf: &mut InputBuffer,
    header_size: usize,
    total_size: usize,
) -> Option<Result<HmsgPayload, ProtocolError>> {
    let needed = total_size.checked_add(2)?;
    if buf.len() < needed {
        return None;
    }

    let region = buf.consume(needed);
    Some(check_terminator(&region, total_size).and_then(|()| {
        let header_block = region.slice(0..header_size);
        if &header_block[header_size - 4..] != &b"\r\n\r\n"[..] {
            return Err(ProtocolError::new(
                ErrorKind::UnterminatedHeaderBlock,
                header_block[0],
                &region,
            ));
        }
        Ok(HmsgPayload {
            header: header_block.slice(0..header_size - 4),
            payload: region.slice(header_size..total_size),
        })
    }))
}

fn check_terminator(region: &Bytes, total_size: usize) -> Result<(), ProtocolError> {
    if &region[total_size..] == &b"\r\n"[..] {
        Ok(())
    } else {
        Err(ProtocolError::new(
            ErrorKind::MissingPayloadTerminator,
            region[total_size],
            region,
        ))
    }
}
