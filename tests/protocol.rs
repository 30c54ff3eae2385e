//! End-to-end frame recognition across realistic chunk boundaries.

use msgproto::{Event, Parser};

#[test]
fn full_session_in_one_shot() {
    let mut parser = Parser::new();
    parser
        .parse(
            b"INFO {\"server_id\":\"s1\",\"server_name\":\"n1\",\"version\":\"2.10.3\",\
\"go\":\"go1.21\",\"host\":\"0.0.0.0\",\"port\":4222,\"headers\":true,\"proto\":1}\r\n\
PING\r\n\
MSG foo.bar 9 reply.to 5\r\nhello\r\n\
HMSG foo.bar 10 12 17\r\nHdr-A: v\r\n\r\nhello\r\n\
+OK\r\n\
-ERR 'Unknown Protocol'\r\n\
PONG\r\n",
        )
        .unwrap();

    let events = parser.drain_events();
    assert_eq!(events.len(), 7);
    assert!(matches!(events[0], Event::Info(_)));
    assert!(matches!(events[1], Event::Ping));
    assert!(matches!(&events[2], Event::Msg { reply_to, .. } if reply_to == "reply.to"));
    assert!(matches!(&events[3], Event::Hmsg { header, .. } if &header[..] == b"Hdr-A: v"));
    assert!(matches!(events[4], Event::Ok));
    assert!(matches!(&events[5], Event::Err { message } if message == "'Unknown Protocol'"));
    assert!(matches!(events[6], Event::Pong));
}

#[test]
fn split_across_arbitrary_chunk_boundaries() {
    let input = b"MSG a.b 1 reply 11\r\nhello world\r\nPING\r\nPONG\r\n";
    let splits = [3, 17, 1, 22, 2, 5];

    let mut parser = Parser::new();
    let mut offset = 0;
    for &len in &splits {
        let end = std::cmp::min(offset + len, input.len());
        parser.parse(&input[offset..end]).unwrap();
        offset = end;
    }
    if offset < input.len() {
        parser.parse(&input[offset..]).unwrap();
    }

    let events = parser.drain_events();
    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], Event::Msg { payload, .. } if &payload[..] == b"hello world"));
    assert!(matches!(events[1], Event::Ping));
    assert!(matches!(events[2], Event::Pong));
}

#[test]
fn binary_payload_with_embedded_control_bytes() {
    let mut payload = vec![0u8, 1, 2, b'\r', b'\n', b'M', b'S', b'G', 255];
    let mut input = format!("MSG x 1 {}\r\n", payload.len()).into_bytes();
    input.append(&mut payload.clone());
    input.extend_from_slice(b"\r\n");

    let mut parser = Parser::new();
    parser.parse(&input).unwrap();
    let events = parser.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], Event::Msg { payload: p, .. } if p[..] == payload[..]));
}

#[test]
fn rejects_malformed_frame_and_latches() {
    let mut parser = Parser::new();
    assert!(parser.parse(b"NOTAVERB\r\n").is_err());
    assert!(parser.parse(b"PING\r\n").is_err());
}
