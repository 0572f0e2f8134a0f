//! Server-sent-event framing for UI part streams.

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::UIPart;

const DONE_SENTINEL: &str = "[DONE]";

/// One `data: <json>\n\n` frame.
pub fn encode_frame(part: &UIPart) -> Result<String> {
    let json = serde_json::to_string(part)?;
    Ok(format!("data: {json}\n\n"))
}

/// Frame every part of a stream. A part that fails to serialize is replaced
/// by an `error` part frame.
pub fn sse_frames<S>(parts: S) -> BoxStream<'static, String>
where
    S: Stream<Item = UIPart> + Send + 'static,
{
    Box::pin(parts.map(|part| match encode_frame(&part) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, part = part.type_tag(), "failed to encode UI part");
            let fallback = UIPart::error(e.to_string()).to_json();
            format!("data: {fallback}\n\n")
        }
    }))
}

/// Payload of an SSE `data:` line.
///
/// The prefix is matched case-insensitively. Blank payloads and the `[DONE]`
/// sentinel yield `None`.
pub fn parse_data_line(line: &str) -> Option<&str> {
    let line = line.trim();
    let prefix = line.get(..5)?;
    if !prefix.eq_ignore_ascii_case("data:") {
        return None;
    }
    let data = line[5..].trim();
    if data.is_empty() || data == DONE_SENTINEL {
        return None;
    }
    Some(data)
}

/// Parse UI parts from SSE lines, skipping anything that is not a valid part.
pub fn decode_parts<S, L>(lines: S) -> BoxStream<'static, UIPart>
where
    S: Stream<Item = L> + Send + 'static,
    L: AsRef<str> + Send + 'static,
{
    Box::pin(lines.filter_map(|line| async move {
        let data = parse_data_line(line.as_ref())?;
        match serde_json::from_str::<UIPart>(data) {
            Ok(part) => Some(part),
            Err(e) => {
                debug!(error = %e, "skipping unparseable UI stream line");
                None
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_prefix_is_case_insensitive() {
        assert_eq!(parse_data_line("DATA: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(parse_data_line("data:{}"), Some("{}"));
    }

    #[test]
    fn sentinel_and_blank_lines_are_skipped() {
        assert_eq!(parse_data_line("data: [DONE]"), None);
        assert_eq!(parse_data_line("data:   "), None);
        assert_eq!(parse_data_line(""), None);
        assert_eq!(parse_data_line("event: ping"), None);
    }

    #[test]
    fn frame_shape() {
        let frame = encode_frame(&UIPart::text_start("m1")).unwrap();
        assert!(frame.starts_with("data: {"));
        assert!(frame.ends_with("}\n\n"));
        let payload = parse_data_line(frame.trim_end()).unwrap();
        assert_eq!(
            serde_json::from_str::<UIPart>(payload).unwrap(),
            UIPart::text_start("m1")
        );
    }
}
