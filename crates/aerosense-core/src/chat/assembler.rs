//! Incremental assembly of an assistant reply from a chunked event stream.

use super::frame::{self, Frame};
use super::utf8::Utf8Decoder;

/// One step of reply growth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantUpdate {
    /// Non-empty text appended by this step.
    pub fragment: String,
    /// Full reply text after appending `fragment`.
    pub text: String,
}

/// Turns raw network chunks into a strictly growing assistant reply.
///
/// Chunks may split a line, a JSON payload, or a UTF-8 character anywhere;
/// the assembled text does not depend on where the splits fall. Feed chunks
/// with [`push`](Self::push) and call [`finish`](Self::finish) once the
/// source is exhausted.
#[derive(Debug, Default)]
pub struct StreamAssembler {
    decoder: Utf8Decoder,
    /// Decoded text not yet known to end in a complete line.
    buffer: String,
    text: String,
    saw_done: bool,
    ended: bool,
    /// The front line of `buffer` failed to parse on the previous read.
    deferred: bool,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one network chunk and returns the updates it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<AssistantUpdate> {
        if self.is_finished() {
            return Vec::new();
        }

        let decoded = self.decoder.decode(chunk);
        self.buffer.push_str(&decoded);

        let mut updates = Vec::new();
        self.drain_complete_lines(&mut updates);
        updates
    }

    /// Signals end of stream and parses whatever is left in the buffer.
    ///
    /// A final line without a trailing newline is recovered here. Lines that
    /// fail to parse are skipped. Nothing is emitted after the sentinel.
    pub fn finish(&mut self) -> Vec<AssistantUpdate> {
        if self.ended {
            return Vec::new();
        }
        self.ended = true;

        let tail = self.decoder.finish();
        let mut rest = std::mem::take(&mut self.buffer);
        rest.push_str(&tail);

        let mut updates = Vec::new();
        if self.saw_done || rest.trim().is_empty() {
            return updates;
        }

        for line in rest.split('\n') {
            match frame::decode_line(line) {
                Ok(Frame::Content(fragment)) => updates.push(self.append(fragment)),
                Ok(Frame::Done) => {
                    self.saw_done = true;
                    break;
                }
                Ok(Frame::Ignored) => {}
                Err(err) => tracing::debug!(%err, "skipping unparseable trailing event line"),
            }
        }
        updates
    }

    /// Reply text assembled so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// True once the sentinel was seen or [`finish`](Self::finish) ran.
    pub fn is_finished(&self) -> bool {
        self.saw_done || self.ended
    }

    /// True when the stream ended with the completion sentinel.
    pub fn saw_done(&self) -> bool {
        self.saw_done
    }

    fn drain_complete_lines(&mut self, updates: &mut Vec<AssistantUpdate>) {
        while let Some(newline) = self.buffer.find('\n') {
            let mut line: String = self.buffer.drain(..=newline).collect();
            line.pop();

            match frame::decode_line(&line) {
                Ok(Frame::Content(fragment)) => {
                    self.deferred = false;
                    updates.push(self.append(fragment));
                }
                Ok(Frame::Done) => {
                    self.deferred = false;
                    self.saw_done = true;
                    return;
                }
                Ok(Frame::Ignored) => self.deferred = false,
                Err(err) if self.deferred => {
                    tracing::warn!(%err, "dropping event line that still fails to parse");
                    self.deferred = false;
                }
                Err(err) => {
                    // Put the line back and wait for the next read.
                    tracing::debug!(%err, "deferring unparseable event line");
                    line.push('\n');
                    self.buffer.insert_str(0, &line);
                    self.deferred = true;
                    return;
                }
            }
        }
    }

    fn append(&mut self, fragment: String) -> AssistantUpdate {
        self.text.push_str(&fragment);
        AssistantUpdate {
            fragment,
            text: self.text.clone(),
        }
    }
}
