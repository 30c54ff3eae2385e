//! The typed events the parser emits.

use bytes::Bytes;

/// A single parsed protocol frame, handed back from
/// [`crate::Parser::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// `+OK`
    Ok,
    /// `PING`
    Ping,
    /// `PONG`
    Pong,
    /// `-ERR <message>` — `message` is the text between `-ERR ` and the
    /// trailing CRLF, verbatim, including surrounding quotes if the server
    /// sent them.
    Err { message: String },
    /// `MSG <subject> <sid> [reply-to] <size>\r\n<payload>\r\n`
    Msg {
        sid: u64,
        subject: String,
        reply_to: String,
        payload: Bytes,
    },
    /// `HMSG <subject> <sid> [reply-to] <hdr-size> <size>\r\n<header><payload>\r\n`
    Hmsg {
        sid: u64,
        subject: String,
        reply_to: String,
        header: Bytes,
        payload: Bytes,
    },
    /// `INFO {json}`
    Info(Box<ServerInfo>),
}

/// The decoded body of an `INFO` frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfo {
    /// Unique server identifier.
    pub server_id: String,
    /// User-facing server name, not guaranteed unique.
    pub server_name: String,
    /// Decomposed server version.
    pub version: Version,
    /// Go runtime version the server was built with.
    pub go: String,
    /// Host the server is listening on.
    pub host: String,
    /// Port the server is listening on.
    pub port: u16,
    /// Whether the server supports headers (HMSG).
    pub headers: bool,
    /// Protocol version the server speaks.
    pub proto: i32,

    /// Maximum payload size the server will accept, if advertised.
    pub max_payload: Option<u64>,
    /// Client ID assigned by the server, if advertised.
    pub client_id: Option<u64>,
    /// Whether the server requires authentication.
    pub auth_required: Option<bool>,
    /// Whether the server requires TLS.
    pub tls_required: Option<bool>,
    /// Whether the server verifies client TLS certificates.
    pub tls_verify: Option<bool>,
    /// Whether the server has TLS available.
    pub tls_available: Option<bool>,
    /// Additional cluster members the client may connect to.
    pub connect_urls: Option<Vec<String>>,
    /// WebSocket variants of `connect_urls`.
    pub ws_connect_urls: Option<Vec<String>>,
    /// Lame duck mode: the server is shutting down gracefully.
    pub ldm: Option<bool>,
    /// Server build's git commit hash, if advertised.
    pub git_commit: Option<String>,
    /// Whether JetStream is enabled on the server.
    pub jetstream: Option<bool>,
    /// Server IP, if advertised.
    pub ip: Option<String>,
    /// Client's IP as seen by the server, if advertised.
    pub client_ip: Option<String>,
    /// Nonce for authentication signing, if advertised.
    pub nonce: Option<String>,
    /// Cluster name, if the server is clustered.
    pub cluster: Option<String>,
    /// JetStream domain, if configured.
    pub domain: Option<String>,
    /// Curve25519 public key for nonce signing, if advertised.
    pub xkey: Option<String>,
}

/// A decomposed server version string, e.g. `"2.10.3-beta"` →
/// `{major: 2, minor: 10, patch: 3, dev: "beta"}`.
///
/// Orders lexicographically as `(major, minor, patch, dev)`, with `dev`
/// compared as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Version {
    /// Major version component.
    pub major: u32,
    /// Minor version component.
    pub minor: u32,
    /// Patch version component.
    pub patch: u32,
    /// Pre-release/build suffix, empty if the version string had none.
    pub dev: String,
}
