//! JSONL line framing
//!
//! Upstream generators hand us text in chunks that ignore record
//! boundaries. The framer carries the unfinished tail across calls and only
//! releases records once their newline has arrived.

/// Splits a chunked text stream into newline-terminated records.
#[derive(Debug, Default, Clone)]
pub struct LineFramer {
    buffer: String,
}

impl LineFramer {
    pub fn new() -> Self {
        LineFramer {
            buffer: String::new(),
        }
    }

    /// Append a fragment and return every record it completed.
    ///
    /// Empty records are returned as-is; skipping them is the decoder's job.
    /// A trailing `\r` is stripped so CRLF streams frame the same way.
    pub fn feed(&mut self, fragment: &str) -> Vec<String> {
        self.buffer.push_str(fragment);

        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };

        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        let mut records: Vec<String> = complete.split('\n').map(strip_cr).collect();
        // `complete` ends with '\n', so the last split segment is always empty.
        records.pop();
        records
    }

    /// Drain the buffered partial record at end of stream.
    pub fn flush(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        Some(strip_cr(&rest))
    }

    /// Bytes currently held back waiting for a newline.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn strip_cr(line: &str) -> String {
    line.strip_suffix('\r').unwrap_or(line).to_string()
}
