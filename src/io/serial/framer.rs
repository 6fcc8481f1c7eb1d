// src/io/serial/framer.rs
//
// Newline framing for device telemetry.
// Accumulates raw serial bytes and emits one record per '\n'.

/// Line terminator byte
const LINE_END: u8 = b'\n';

/// Default forced-split threshold in bytes
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

// =============================================================================
// Types
// =============================================================================

/// A single telemetry record extracted from the serial stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedLine {
    /// Line content, terminator removed and surrounding whitespace trimmed
    pub text: String,
    /// Whether this line came from flush() and never saw a terminator
    pub incomplete: bool,
}

impl FramedLine {
    fn complete(bytes: &[u8]) -> Self {
        FramedLine {
            text: decode(bytes),
            incomplete: false,
        }
    }

    /// Blank keep-alive lines are never exported
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

/// Where to cut a full buffer: before a trailing, still incomplete UTF-8
/// sequence if there is one, otherwise at the end.
fn split_point(bytes: &[u8]) -> usize {
    match std::str::from_utf8(bytes) {
        Err(e) if e.error_len().is_none() && e.valid_up_to() > 0 => e.valid_up_to(),
        _ => bytes.len(),
    }
}

// =============================================================================
// Line Framer
// =============================================================================

/// Stateful line framer for streaming data.
///
/// Knows nothing about where lines go; the same framer feeds both the console
/// and the export path.
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    max_length: usize,
    /// Set by a forced split that left the buffer empty; the terminator that
    /// follows belongs to the record already emitted.
    after_split: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        LineFramer::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl LineFramer {
    pub fn new(max_length: usize) -> Self {
        LineFramer {
            buffer: Vec::new(),
            max_length: max_length.max(1),
            after_split: false,
        }
    }

    /// Feed raw bytes into the framer.
    /// Returns every line completed by this chunk; a trailing partial line
    /// stays buffered for the next call.
    pub fn feed(&mut self, data: &[u8]) -> Vec<FramedLine> {
        let mut lines = Vec::new();

        for &byte in data {
            if byte == LINE_END {
                if self.after_split && self.buffer.iter().all(|&b| b == b'\r') {
                    self.buffer.clear();
                } else {
                    lines.push(FramedLine::complete(&self.buffer));
                    self.buffer.clear();
                }
                self.after_split = false;
                continue;
            }

            if byte != b'\r' {
                self.after_split = false;
            }
            self.buffer.push(byte);

            // Force split on max length, never inside a UTF-8 sequence
            if self.buffer.len() >= self.max_length {
                let cut = split_point(&self.buffer);
                lines.push(FramedLine::complete(&self.buffer[..cut]));
                self.buffer.drain(..cut);
                self.after_split = self.buffer.is_empty();
            }
        }

        lines
    }

    /// Flush any remaining buffered bytes as an incomplete line.
    /// Call when the stream ends.
    pub fn flush(&mut self) -> Option<FramedLine> {
        if self.buffer.is_empty() {
            return None;
        }
        self.after_split = false;
        let bytes: Vec<u8> = self.buffer.drain(..).collect();
        Some(FramedLine {
            text: decode(&bytes),
            incomplete: true,
        })
    }

    /// Bytes received since the last terminator
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[FramedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_line_split_across_feeds() {
        let mut framer = LineFramer::default();

        assert!(framer.feed(b"AB").is_empty());
        let lines = framer.feed(b"C\n");

        assert_eq!(texts(&lines), vec!["ABC"]);
        assert!(framer.is_empty());
    }

    #[test]
    fn test_multiple_lines_with_trailing_partial() {
        let mut framer = LineFramer::default();

        let lines = framer.feed(b"X\nY\nZ");

        assert_eq!(texts(&lines), vec!["X", "Y"]);
        assert_eq!(framer.pending(), b"Z");
    }

    #[test]
    fn test_empty_feed_is_noop() {
        let mut framer = LineFramer::default();
        framer.feed(b"partial");

        assert!(framer.feed(b"").is_empty());
        assert_eq!(framer.pending(), b"partial");
    }

    #[test]
    fn test_crlf_and_whitespace_trimmed() {
        let mut framer = LineFramer::default();

        let lines = framer.feed(b"  12,34,56 \r\n\r\n");

        assert_eq!(texts(&lines), vec!["12,34,56", ""]);
        assert!(lines[1].is_blank());
    }

    #[test]
    fn test_utf8_split_across_chunks() {
        let mut framer = LineFramer::default();
        let text = "25\u{00B0}C\n".as_bytes();

        // Split inside the two-byte degree sign
        assert!(framer.feed(&text[..3]).is_empty());
        let lines = framer.feed(&text[3..]);

        assert_eq!(texts(&lines), vec!["25\u{00B0}C"]);
    }

    #[test]
    fn test_max_length_forces_split() {
        let mut framer = LineFramer::new(5);

        let lines = framer.feed(b"12345678");

        assert_eq!(texts(&lines), vec!["12345"]);
        assert_eq!(framer.pending(), b"678");
    }

    #[test]
    fn test_exact_max_length_line() {
        let mut framer = LineFramer::new(5);

        assert_eq!(texts(&framer.feed(b"12345\n")), vec!["12345"]);
        assert_eq!(texts(&framer.feed(b"12345\r\n")), vec!["12345"]);
        assert!(framer.is_empty());

        // A blank line after the record is still delivered
        assert_eq!(texts(&framer.feed(b"\n")), vec![""]);
    }

    #[test]
    fn test_exact_max_length_terminator_in_next_chunk() {
        let mut framer = LineFramer::new(4);

        assert_eq!(texts(&framer.feed(b"abcd")), vec!["abcd"]);
        assert_eq!(texts(&framer.feed(b"\nxy\n")), vec!["xy"]);
    }

    #[test]
    fn test_long_line_split_into_chunks() {
        let mut framer = LineFramer::new(5);

        let lines = framer.feed(b"1234567890\n");

        assert_eq!(texts(&lines), vec!["12345", "67890"]);
        assert!(framer.is_empty());
    }

    #[test]
    fn test_forced_split_keeps_multibyte_char_whole() {
        let mut framer = LineFramer::new(4);

        // The degree sign would straddle the 4-byte boundary
        let lines = framer.feed("abc\u{00B0}d\n".as_bytes());

        assert_eq!(texts(&lines), vec!["abc", "\u{00B0}d"]);
        assert!(lines.iter().all(|l| !l.text.contains('\u{FFFD}')));
    }

    #[test]
    fn test_forced_split_across_feeds_with_multibyte_char() {
        let mut framer = LineFramer::new(3);
        let text = "ab\u{20AC}\n".as_bytes();

        assert_eq!(texts(&framer.feed(&text[..3])), vec!["ab"]);
        assert_eq!(framer.pending(), &text[2..3]);
        assert_eq!(texts(&framer.feed(&text[3..])), vec!["\u{20AC}"]);
    }

    #[test]
    fn test_flush_marks_incomplete() {
        let mut framer = LineFramer::default();
        framer.feed(b"tail");

        let flushed = framer.flush().expect("buffered bytes should flush");
        assert!(flushed.incomplete);
        assert_eq!(flushed.text, "tail");
        assert!(framer.flush().is_none());
    }
}
