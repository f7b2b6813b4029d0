//! Bounded output capture and truncation.

/// Per-field capture budget for execution output and error text, in bytes.
pub const MAX_CAPTURE_BYTES: usize = 8192;

/// Suffix appended to text that exceeded its capture budget.
pub const TRUNCATION_MARKER: &str = "...(truncated)";

/// Cut `text` to at most `max_bytes` bytes on a char boundary, appending
/// [`TRUNCATION_MARKER`] when anything was removed.
pub fn truncate_text(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    cut_with_marker(text, max_bytes)
}

fn cut_with_marker(text: &str, max_bytes: usize) -> String {
    let mut end = max_bytes.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + TRUNCATION_MARKER.len());
    out.push_str(&text[..end]);
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Bytes read from one output stream, capped at a budget.
///
/// Bytes past the budget are discarded but still drained from the pipe so
/// the child never blocks on a full pipe.
#[derive(Debug, Default)]
pub struct CapturedStream {
    bytes: Vec<u8>,
    overflowed: bool,
}

impl CapturedStream {
    /// Append a chunk, keeping at most `limit` bytes in total.
    pub fn push(&mut self, chunk: &[u8], limit: usize) {
        let room = limit.saturating_sub(self.bytes.len());
        if chunk.len() > room {
            self.overflowed = true;
        }
        self.bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }

    /// Whether more bytes arrived than the budget allowed.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Decode as (lossy) UTF-8 and apply the same budget to the text.
    pub fn into_text(self, limit: usize) -> String {
        let text = String::from_utf8_lossy(&self.bytes);
        if self.overflowed {
            cut_with_marker(&text, limit)
        } else {
            truncate_text(&text, limit)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
