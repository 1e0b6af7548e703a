//! Newline-delimited JSON decoding for streamed chat replies.
//!
//! Lines that are not valid JSON chat chunks are dropped; a malformed line
//! never aborts the stream.
//!
//! ```rust
//! use kprovider::StreamEvent;
//! use kprovider::adapters::ollama::{NdjsonDecoder, decode_line};
//!
//! let mut decoder = NdjsonDecoder::default();
//! let mut lines = decoder.push(b"{\"message\":{\"content\":\"He\"}}\n{\"mess");
//! lines.extend(decoder.push(b"age\":{\"content\":\"llo\"}}\n"));
//!
//! let events = lines.iter().flat_map(|line| decode_line(line)).collect::<Vec<_>>();
//! assert_eq!(
//!     events,
//!     vec![
//!         StreamEvent::TextDelta("He".into()),
//!         StreamEvent::TextDelta("llo".into()),
//!     ]
//! );
//! ```

use crate::{StreamEvent, ToolCall};

use super::serde_api::OllamaApiChatChunk;

/// Splits a byte stream into complete, non-blank lines.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(newline_index) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line = self.buffer.drain(..=newline_index).collect::<Vec<_>>();
            if let Some(line) = non_blank(&line) {
                lines.push(line);
            }
        }
        lines
    }

    /// Flushes a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        non_blank(&rest)
    }
}

fn non_blank(bytes: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(bytes);
    let line = line.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// Maps one NDJSON line to zero or more stream events.
pub fn decode_line(line: &str) -> Vec<StreamEvent> {
    let chunk = match serde_json::from_str::<OllamaApiChatChunk>(line) {
        Ok(chunk) => chunk,
        Err(err) => {
            tracing::debug!(error = %err, line, "discarding unparseable stream line");
            return Vec::new();
        }
    };

    let mut events = Vec::new();
    if let Some(message) = chunk.message {
        if let Some(content) = message.content
            && !content.is_empty()
        {
            events.push(StreamEvent::TextDelta(content));
        }

        events.extend(
            message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|call| StreamEvent::ToolCall(ToolCall::from(call))),
        );
    }

    if chunk.done {
        events.push(StreamEvent::Done);
    }

    events
}
