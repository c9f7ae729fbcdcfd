// ABOUTME: Line-buffering Server-Sent Events parser for the remote assignment change stream
// ABOUTME: Handles events split across network chunks and several events per chunk
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # SSE Frame Parser
//!
//! Network chunks do not line up with SSE event boundaries. The buffer keeps
//! any trailing partial line until the next chunk arrives and only dispatches
//! an event once the blank separator line is seen. Multi-line `data:` fields
//! are joined with `\n`; comments (`:` heartbeats), `id:` and `retry:` are
//! ignored.

use std::mem;
use tracing::warn;

/// One dispatched SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    /// Value of the `event:` field, if the server set one
    pub event: Option<String>,
    /// Joined `data:` payload
    pub data: String,
}

/// Incremental SSE parser
///
/// Bytes are buffered raw and only complete lines are decoded, so a UTF-8
/// character split across chunks is reassembled before decoding.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseLineBuffer {
    /// Create an empty parser
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every event completed by them
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseMessage> {
        self.buffer.extend_from_slice(bytes);

        let mut messages = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let Some(line) = Self::decode(&raw[..newline_pos]) else {
                continue;
            };

            if line.is_empty() {
                messages.extend(self.dispatch());
            } else {
                self.field(&line);
            }
        }
        messages
    }

    /// Dispatch whatever is buffered when the stream ends without a final blank line
    pub fn flush(&mut self) -> Vec<SseMessage> {
        let remaining = mem::take(&mut self.buffer);
        if let Some(line) = Self::decode(&remaining) {
            if !line.is_empty() {
                self.field(&line);
            }
        }
        self.dispatch().into_iter().collect()
    }

    fn decode(raw: &[u8]) -> Option<String> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        match std::str::from_utf8(raw) {
            Ok(line) => Some(line.to_owned()),
            Err(e) => {
                warn!(error = %e, "Skipping SSE line that is not valid UTF-8");
                None
            }
        }
    }

    fn field(&mut self, line: &str) {
        if line.starts_with(':') {
            return;
        }
        let (name, value) = line.split_once(':').map_or((line, ""), |(name, value)| {
            (name, value.strip_prefix(' ').unwrap_or(value))
        });
        match name {
            "data" => self.data.push(value.to_owned()),
            "event" => self.event = Some(value.to_owned()),
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<SseMessage> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = mem::take(&mut self.data).join("\n");
        Some(SseMessage { event, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_events_in_one_chunk() {
        let mut parser = SseLineBuffer::new();
        let messages = parser.feed(b"data: {\"a\":1}\n\ndata: {\"b\":2}\n\n");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].data, "{\"a\":1}");
        assert_eq!(messages[1].data, "{\"b\":2}");
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut parser = SseLineBuffer::new();
        assert!(parser.feed(b"event: assignment\ndata: {\"vers").is_empty());
        assert!(parser.feed(b"ion\":7}\r\n").is_empty());
        let messages = parser.feed(b"\r\n");
        assert_eq!(
            messages,
            vec![SseMessage {
                event: Some("assignment".to_owned()),
                data: "{\"version\":7}".to_owned(),
            }]
        );
    }

    #[test]
    fn test_comments_and_unknown_fields_are_ignored() {
        let mut parser = SseLineBuffer::new();
        let messages = parser.feed(b": heartbeat\n\nid: 4\nretry: 100\ndata:x\n\n");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, "x");
    }

    #[test]
    fn test_multiline_data_is_joined() {
        let mut parser = SseLineBuffer::new();
        let messages = parser.feed(b"data: one\ndata: two\n\n");
        assert_eq!(messages[0].data, "one\ntwo");
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let payload = "data: {\"name\":\"Développé couché\"}\n\n".as_bytes();
        // split between the two bytes of the first 'é'
        let split = payload
            .iter()
            .position(|&b| b == 0xC3)
            .map(|pos| pos + 1)
            .unwrap_or_default();

        let mut parser = SseLineBuffer::new();
        assert!(parser.feed(&payload[..split]).is_empty());
        let messages = parser.feed(&payload[split..]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, "{\"name\":\"Développé couché\"}");
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let mut parser = SseLineBuffer::new();
        let messages = parser.feed(b"data: \xFF\xFE\ndata: ok\n\n");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, "ok");
    }

    #[test]
    fn test_flush_dispatches_trailing_event() {
        let mut parser = SseLineBuffer::new();
        assert!(parser.feed(b"data: tail").is_empty());
        let messages = parser.flush();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, "tail");
        assert!(parser.flush().is_empty());
    }
}
