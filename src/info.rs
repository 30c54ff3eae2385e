//! Decodes the JSON body of an `INFO` frame.

use serde::Deserialize;

use crate::error::{ErrorKind, ProtocolError};
use crate::event::{ServerInfo, Version};

/// Mirrors the server's INFO JSON body. Unknown keys are ignored by
/// `serde_json` by default (no `deny_unknown_fields`), which is what keeps
/// this decoder forward-compatible with newer server releases per the
/// spec's INFO field evolution note.
#[derive(Deserialize)]
struct RawServerInfo {
    server_id: String,
    server_name: String,
    version: String,
    go: String,
    host: String,
    port: u16,
    headers: bool,
    proto: i32,

    #[serde(default)]
    max_payload: Option<u64>,
    #[serde(default)]
    client_id: Option<u64>,
    #[serde(default)]
    auth_required: Option<bool>,
    #[serde(default)]
    tls_required: Option<bool>,
    #[serde(default)]
    tls_verify: Option<bool>,
    #[serde(default)]
    tls_available: Option<bool>,
    #[serde(default)]
    connect_urls: Option<Vec<String>>,
    #[serde(default)]
    ws_connect_urls: Option<Vec<String>>,
    #[serde(default)]
    ldm: Option<bool>,
    #[serde(default)]
    git_commit: Option<String>,
    #[serde(default)]
    jetstream: Option<bool>,
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    client_ip: Option<String>,
    #[serde(default)]
    nonce: Option<String>,
    #[serde(default)]
    cluster: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    xkey: Option<String>,
}

/// Decodes an `INFO` JSON body (the bytes between `INFO ` and the
/// terminating CRLF, including the enclosing braces) into a [`ServerInfo`].
pub(crate) fn decode_info(json: &[u8]) -> Result<ServerInfo, ProtocolError> {
    let raw: RawServerInfo = serde_json::from_slice(json).map_err(|e| {
        tracing::debug!(error = %e, "INFO body failed to decode as JSON");
        let offending = json.first().copied().unwrap_or(b'{');
        ProtocolError::new(ErrorKind::InfoJson(e), offending, json)
    })?;

    Ok(ServerInfo {
        server_id: raw.server_id,
        server_name: raw.server_name,
        version: parse_version(&raw.version),
        go: raw.go,
        host: raw.host,
        port: raw.port,
        headers: raw.headers,
        proto: raw.proto,
        max_payload: raw.max_payload,
        client_id: raw.client_id,
        auth_required: raw.auth_required,
        tls_required: raw.tls_required,
        tls_verify: raw.tls_verify,
        tls_available: raw.tls_available,
        connect_urls: raw.connect_urls,
        ws_connect_urls: raw.ws_connect_urls,
        ldm: raw.ldm,
        git_commit: raw.git_commit,
        jetstream: raw.jetstream,
        ip: raw.ip,
        client_ip: raw.client_ip,
        nonce: raw.nonce,
        cluster: raw.cluster,
        domain: raw.domain,
        xkey: raw.xkey,
    })
}

/// Splits `s` on the first `-` (suffix becomes `dev`), then splits the
/// prefix on `.` and assigns `major`/`minor`/`patch` from tokens 0/1/2
/// whenever present, defaulting to 0 otherwise. A bare `"2"` must parse
/// to `major: 2`, not a zeroed `major` just because no later tokens
/// exist — each token is assigned as soon as it's present.
pub(crate) fn parse_version(s: &str) -> Version {
    let (prefix, dev) = match s.split_once('-') {
        Some((prefix, dev)) => (prefix, dev.to_string()),
        None => (s, String::new()),
    };

    let mut tokens = prefix.split('.');
    let major = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0);
    let minor = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0);
    let patch = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0);

    Version {
        major,
        minor,
        patch,
        dev,
    }
}
