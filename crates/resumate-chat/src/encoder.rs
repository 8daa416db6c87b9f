//! SSE framing for the UI message stream protocol.

use resumate_types::StreamEvent;
use std::borrow::Cow;

pub const CONTENT_TYPE: &str = "text/event-stream";
pub const DEFAULT_PROTOCOL: &str = "data";
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// Headers every streamed chat response carries, in order
pub const STREAM_HEADERS: [(&str, &str); 4] = [
    ("x-vercel-ai-ui-message-stream", "v1"),
    ("cache-control", "no-cache"),
    ("connection", "keep-alive"),
    ("x-accel-buffering", "no"),
];

pub const PROTOCOL_HEADER: &str = "x-vercel-ai-protocol";

/// Full header set for a response; the protocol header is left out when empty
pub fn response_headers(protocol: Option<&str>) -> Vec<(&'static str, String)> {
    let mut headers: Vec<(&'static str, String)> = vec![("content-type", CONTENT_TYPE.to_string())];
    headers.extend(STREAM_HEADERS.iter().map(|(k, v)| (*k, v.to_string())));

    let protocol = protocol.unwrap_or(DEFAULT_PROTOCOL);
    if !protocol.is_empty() {
        headers.push((PROTOCOL_HEADER, protocol.to_string()));
    }
    headers
}

/// One `data: <json>\n\n` frame; the terminator is the literal `[DONE]` frame
pub fn encode_frame(event: &StreamEvent) -> serde_json::Result<String> {
    if event.is_terminal() {
        return Ok(DONE_FRAME.to_string());
    }

    let payload = serde_json::to_string(event)?;
    Ok(format!("data: {}\n\n", escape_non_ascii(&payload)))
}

/// Rewrite every character outside printable ASCII as `\uXXXX` (UTF-16 units).
///
/// Compact output only carries such characters inside string literals, so the
/// result stays valid JSON and matches what Python's `json.dumps` emits.
fn escape_non_ascii(json: &str) -> Cow<'_, str> {
    if !json.chars().any(needs_escape) {
        return Cow::Borrowed(json);
    }

    let mut out = String::with_capacity(json.len() + 16);
    for ch in json.chars() {
        if needs_escape(ch) {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units).iter() {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

fn needs_escape(ch: char) -> bool {
    !ch.is_ascii() || ch == '\x7f'
}
