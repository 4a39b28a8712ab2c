//! CTCP (Client-to-Client Protocol) framing helpers.
//!
//! Follows the `send_ctcp`/`send_action` convenience-sender convention of
//! wrapping a body in `\u{1}` markers before handing it to the general send
//! path.

use irc_proto::limits::CTCP_MARKER;

/// Returns `Some((verb, body))` if `text` is a CTCP-framed message
/// (`\x01VERB body\x01`), else `None`.
pub fn parse_ctcp(text: &str) -> Option<(&str, &str)> {
    let inner = text
        .strip_prefix(CTCP_MARKER)?
        .strip_suffix(CTCP_MARKER)?;
    match inner.find(' ') {
        Some(i) => Some((&inner[..i], &inner[i + 1..])),
        None => Some((inner, "")),
    }
}

/// Formats a CTCP VERSION reply body (`VERSION <version>`).
pub fn version_reply(version: &str) -> String {
    format!("VERSION {}", version)
}

/// Formats a CTCP ACTION body (`/me <text>` equivalent), as sent in a
/// `PRIVMSG`.
pub fn action_body(text: &str) -> String {
    format!("ACTION {}", text)
}

/// Formats a CTCP PING request body: the current wall-clock time as a
/// millisecond Unix timestamp. A well-behaved peer echoes the payload back
/// verbatim in its CTCP PING reply, letting the sender compute round-trip
/// latency from the difference.
pub fn ping_payload() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}
