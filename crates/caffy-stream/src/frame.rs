use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

/// Data payload that ends content accumulation for the turn.
pub const DONE_TOKEN: &str = "[DONE]";

const DATA_PREFIX: &str = "data: ";

/// `SESSION_ID:` (any case), optional spaces, then hex digits and hyphens.
static SESSION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn session_pattern() -> &'static Regex {
    SESSION_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)SESSION_ID:[ \t]*([0-9a-f-]+)").expect("valid regex")
    })
}

/// What one complete line of the stream means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty or whitespace-only.
    Blank,
    /// `data: [DONE]`.
    Done,
    /// `data: {"content": ...}`, already decoded.
    Content(String),
    /// `data: ` followed by something that is not a content record.
    RawData(&'a str),
    /// A session announcement outside a data frame.
    SessionId(&'a str),
    /// Anything else a non-conforming server sent.
    Plain(&'a str),
}

#[derive(Deserialize)]
struct ContentFrame {
    content: String,
}

/// Classify a single line (without its trailing newline).
///
/// Data frames win over session announcements; a session id embedded in a
/// data frame is picked up by the end-of-stream rescan instead.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    if let Some(payload) = strip_data_prefix(line) {
        let payload = payload.trim();
        if payload == DONE_TOKEN {
            return LineKind::Done;
        }
        return match serde_json::from_str::<ContentFrame>(payload) {
            Ok(frame) => LineKind::Content(frame.content),
            Err(_) => LineKind::RawData(payload),
        };
    }

    if let Some(id) = find_session_id(line) {
        return LineKind::SessionId(id);
    }

    LineKind::Plain(line)
}

fn strip_data_prefix(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX).or_else(|| {
        // "data:" with nothing after it survives trimming without its space
        (line == DATA_PREFIX.trim_end()).then_some("")
    })
}

/// First session id announced in `text`.
pub fn find_session_id(text: &str) -> Option<&str> {
    session_pattern()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Last session id announced anywhere in `text`.
pub fn find_last_session_id(text: &str) -> Option<&str> {
    session_pattern()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .last()
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "1234abcd-56ef-78ab-90cd-1234567890ab";

    #[test]
    fn content_frame_is_decoded() {
        assert_eq!(
            classify_line(r#"data: {"content": "Hello"}"#),
            LineKind::Content("Hello".into())
        );
    }

    #[test]
    fn content_with_escapes_is_unescaped() {
        assert_eq!(
            classify_line(r#"data: {"content":"line\nbreak \"quoted\""}"#),
            LineKind::Content("line\nbreak \"quoted\"".into())
        );
    }

    #[test]
    fn done_token_is_recognized_with_padding() {
        assert_eq!(classify_line("data: [DONE]"), LineKind::Done);
        assert_eq!(classify_line("data:   [DONE]  \r"), LineKind::Done);
    }

    #[test]
    fn non_json_payload_is_raw_data() {
        assert_eq!(classify_line("data: not-json-text"), LineKind::RawData("not-json-text"));
    }

    #[test]
    fn json_without_string_content_is_raw_data() {
        assert_eq!(
            classify_line(r#"data: {"delta": "x"}"#),
            LineKind::RawData(r#"{"delta": "x"}"#)
        );
        assert_eq!(
            classify_line(r#"data: {"content": 42}"#),
            LineKind::RawData(r#"{"content": 42}"#)
        );
    }

    #[test]
    fn empty_data_frame_is_raw_empty() {
        assert_eq!(classify_line("data: "), LineKind::RawData(""));
    }

    #[test]
    fn session_line_is_extracted() {
        let line = format!("SESSION_ID: {ID}");
        assert_eq!(classify_line(&line), LineKind::SessionId(ID));
    }

    #[test]
    fn session_token_is_case_insensitive_and_can_be_embedded() {
        let line = format!("[meta] session_id:{ID} (new)");
        assert_eq!(classify_line(&line), LineKind::SessionId(ID));
    }

    #[test]
    fn session_token_without_id_is_plain() {
        assert_eq!(classify_line("SESSION_ID: none?"), LineKind::Plain("SESSION_ID: none?"));
    }

    #[test]
    fn other_lines_are_plain_or_blank() {
        assert_eq!(classify_line("  hello there  "), LineKind::Plain("hello there"));
        assert_eq!(classify_line("event: message"), LineKind::Plain("event: message"));
        assert_eq!(classify_line("   \r"), LineKind::Blank);
    }

    #[test]
    fn last_session_id_wins_in_rescan() {
        let text = "SESSION_ID: aaaa-1111\ndata: x\nsession_id: bbbb-2222\n";
        assert_eq!(find_session_id(text), Some("aaaa-1111"));
        assert_eq!(find_last_session_id(text), Some("bbbb-2222"));
        assert_eq!(find_last_session_id("no marker here"), None);
    }
}
