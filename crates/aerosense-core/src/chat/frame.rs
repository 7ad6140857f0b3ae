//! Line-level decoding of the chat event stream.
//!
//! Each complete line of the response body is one of:
//! - blank or a `:` comment (ignored)
//! - `data: [DONE]` (completion sentinel)
//! - `data: <json>` carrying a `choices[0].delta.content` fragment
//! - anything else (ignored)

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// Prefix of every event line that carries a payload.
pub const DATA_PREFIX: &str = "data: ";
/// Payload that marks the end of the reply.
pub const DONE_SENTINEL: &str = "[DONE]";
/// First character of a comment (keepalive) line.
pub const COMMENT_PREFIX: char = ':';

/// A decoded unit of the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Non-empty text to append to the reply.
    Content(String),
    /// Completion sentinel: no further content follows.
    Done,
    /// Blank, comment, non-data, or content-free event.
    Ignored,
}

/// A `data:` payload that is not valid JSON.
#[derive(Debug)]
pub struct FrameError {
    source: serde_json::Error,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid event payload: {}", self.source)
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Decodes one line (without its `\n`) of the event stream.
///
/// A trailing `\r` is stripped before any prefix check.
///
/// # Errors
/// Returns `FrameError` when a `data:` payload is not valid JSON.
pub fn decode_line(line: &str) -> Result<Frame, FrameError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() || line.starts_with(COMMENT_PREFIX) {
        return Ok(Frame::Ignored);
    }
    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(Frame::Ignored);
    };

    let payload = rest.trim();
    if payload == DONE_SENTINEL {
        return Ok(Frame::Done);
    }
    if payload.is_empty() {
        return Ok(Frame::Ignored);
    }
    decode_payload(payload)
}

fn decode_payload(payload: &str) -> Result<Frame, FrameError> {
    let value: Value = serde_json::from_str(payload).map_err(|source| FrameError { source })?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let error_type = error
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("error");
        let message = error
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error");
        tracing::warn!(
            error_type,
            error_message = message,
            "chat stream carried an error event"
        );
        return Ok(Frame::Ignored);
    }

    let chunk = match serde_json::from_value::<ChatCompletionChunk>(value) {
        Ok(chunk) => chunk,
        Err(err) => {
            tracing::debug!(%err, "skipping event with unexpected shape");
            return Ok(Frame::Ignored);
        }
    };

    let content = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|text| !text.is_empty());

    Ok(content.map_or(Frame::Ignored, Frame::Content))
}
