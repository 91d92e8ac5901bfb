//! Server-Sent Events wire framing for chat messages.
//!
//! Events are encoded by hand rather than through `axum::response::sse`,
//! because an empty message must still carry a `data:` field for the
//! browser's `EventSource` to dispatch it.

use std::borrow::Cow;

use axum::body::Bytes;

/// Content type of the event stream.
pub const CONTENT_TYPE: &str = "text/event-stream";

/// Comment line sent to keep idle connections open. Ignored by clients.
pub const KEEP_ALIVE: &[u8] = b":\n\n";

/// Frames one message as exactly one SSE event.
///
/// Every line of the text becomes a `data:` field of the same event, so
/// the empty message is `data: \n\n` and `EventSource` delivers `""`.
#[must_use]
pub fn encode_event(text: &str) -> Bytes {
    let text = normalize_line_breaks(text);
    let mut frame = String::with_capacity(text.len() + 8);
    for line in text.split('\n') {
        frame.push_str("data: ");
        frame.push_str(line);
        frame.push('\n');
    }
    frame.push('\n');
    Bytes::from(frame)
}

/// Rewrites `\r\n` and lone `\r` to `\n`.
///
/// SSE treats all three as line terminators, so the client sees the same
/// lines either way.
pub(crate) fn normalize_line_breaks(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(text: &str) -> String {
        String::from_utf8_lossy(&encode_event(text)).into_owned()
    }

    #[test]
    fn empty_message_still_has_a_data_field() {
        assert_eq!(wire(""), "data: \n\n");
    }

    #[test]
    fn single_line() {
        assert_eq!(wire("a"), "data: a\n\n");
    }

    #[test]
    fn multi_line_text_is_one_event() {
        assert_eq!(wire("a\nb"), "data: a\ndata: b\n\n");
        assert_eq!(wire("a\n"), "data: a\ndata: \n\n");
    }

    #[test]
    fn carriage_returns_are_framed_as_line_breaks() {
        assert_eq!(wire("a\r\nb"), "data: a\ndata: b\n\n");
        assert_eq!(wire("a\rb"), "data: a\ndata: b\n\n");
    }

    #[test]
    fn plain_text_is_borrowed() {
        let out = normalize_line_breaks("hello world");
        assert!(matches!(out, Cow::Borrowed("hello world")));
    }

    #[test]
    fn keep_alive_is_a_comment() {
        assert!(KEEP_ALIVE.starts_with(b":"));
        assert!(KEEP_ALIVE.ends_with(b"\n\n"));
    }
}
