//! Event-stream (SSE) framing
//!
//! The merged stream can be served as `text/event-stream`: one `data:` frame
//! per message, `: heartbeat` comments while idle and `data: [DONE]` at the
//! end. The parser here reads such captures back into records.

use super::decoder::decode_many;
use super::framer::LineFramer;
use super::message::ProtocolMessage;

/// Sent once after the last message.
pub const DONE_FRAME: &str = "data: [DONE]\n\n";
/// Keep-alive comment frame.
pub const HEARTBEAT_FRAME: &str = ": heartbeat\n\n";

const DONE_MARKER: &str = "[DONE]";

/// Encode one message as a `data:` frame.
pub fn encode_event(message: &ProtocolMessage) -> Result<String, serde_json::Error> {
    Ok(format!("data: {}\n\n", message.to_line()?))
}

/// One event from a captured stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    /// Joined `data:` lines of one event
    Data(String),
    Comment(String),
    /// `data: [DONE]`
    Done,
}

/// Line-level event-stream parser.
#[derive(Debug, Default)]
pub struct SseParser {
    pending: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line without its newline.
    /// An event is returned when the blank line closing it arrives.
    pub fn parse_line(&mut self, line: &str) -> Option<SseEvent> {
        if let Some(data) = line.strip_prefix("data:") {
            // Only the single space after the colon belongs to the framing.
            let data = data.strip_prefix(' ').unwrap_or(data);
            self.pending.push(data.to_string());
            None
        } else if let Some(comment) = line.strip_prefix(':') {
            Some(SseEvent::Comment(comment.trim().to_string()))
        } else if line.is_empty() {
            self.take_event()
        } else {
            // event:, id:, retry: and anything else
            None
        }
    }

    /// End of input: release an event missing its closing blank line.
    pub fn flush(&mut self) -> Option<SseEvent> {
        self.take_event()
    }

    fn take_event(&mut self) -> Option<SseEvent> {
        if self.pending.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.pending).join("\n");
        if data == DONE_MARKER {
            Some(SseEvent::Done)
        } else {
            Some(SseEvent::Data(data))
        }
    }
}

/// Decodes a chunked event stream into messages.
///
/// Each `data:` payload is one record. Comments are skipped and nothing
/// after `[DONE]` is decoded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    framer: LineFramer,
    parser: SseParser,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &str) -> Vec<ProtocolMessage> {
        let mut messages = Vec::new();
        for line in self.framer.feed(fragment) {
            let event = self.parser.parse_line(&line);
            self.handle(event, &mut messages);
        }
        messages
    }

    pub fn finish(&mut self) -> Vec<ProtocolMessage> {
        let mut messages = Vec::new();
        if let Some(line) = self.framer.flush() {
            let event = self.parser.parse_line(&line);
            self.handle(event, &mut messages);
        }
        let event = self.parser.flush();
        self.handle(event, &mut messages);
        messages
    }

    /// Whether `[DONE]` has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn handle(&mut self, event: Option<SseEvent>, messages: &mut Vec<ProtocolMessage>) {
        if self.done {
            return;
        }
        match event {
            Some(SseEvent::Data(data)) => messages.extend(decode_many(&data)),
            Some(SseEvent::Comment(comment)) => {
                ::log::trace!("[A2UI sse] Comment: {}", comment);
            }
            Some(SseEvent::Done) => self.done = true,
            None => {}
        }
    }
}
