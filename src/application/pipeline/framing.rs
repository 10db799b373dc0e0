//! Byte-level framing helpers used by the normalizer.

/// Decodes UTF-8 incrementally across chunk boundaries.
///
/// An incomplete multi-byte sequence at the end of a chunk is held back until
/// the next chunk completes it. Invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes and returns all text that is now complete.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                    }
                }
            }
        }
    }

    /// Flushes whatever is left, replacing a dangling partial sequence.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Splits a byte stream into `\n`-terminated lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes and returns every complete line, newline included.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Returns the trailing partial line, if any.
    pub fn flush(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carry_passes_ascii_through() {
        let mut carry = Utf8Carry::new();
        assert_eq!(carry.push(b"hello"), "hello");
        assert_eq!(carry.finish(), "");
    }

    #[test]
    fn carry_joins_split_multibyte_character() {
        let bytes = "héllo 世界".as_bytes();
        // Split inside the three-byte '世'.
        let split = "héllo ".len() + 1;
        let mut carry = Utf8Carry::new();

        let first = carry.push(&bytes[..split]);
        let second = carry.push(&bytes[split..]);

        assert_eq!(first, "héllo ");
        assert_eq!(second, "世界");
    }

    #[test]
    fn carry_byte_by_byte() {
        let text = "日本語";
        let mut carry = Utf8Carry::new();
        let out: String = text.as_bytes().iter().map(|b| carry.push(&[*b])).collect();
        assert_eq!(out, text);
    }

    #[test]
    fn carry_replaces_invalid_bytes() {
        let mut carry = Utf8Carry::new();
        assert_eq!(carry.push(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
    }

    #[test]
    fn carry_finish_replaces_dangling_sequence() {
        let mut carry = Utf8Carry::new();
        assert_eq!(carry.push(&[b'x', 0xE4, 0xB8]), "x");
        assert_eq!(carry.finish(), "\u{FFFD}");
    }

    #[test]
    fn framer_splits_lines_across_chunks() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"{\"chunk\":").is_empty());
        assert_eq!(framer.push(b"\"a\"}\n{\"chunk\""), vec!["{\"chunk\":\"a\"}\n"]);
        assert_eq!(framer.push(b":\"b\"}\n"), vec!["{\"chunk\":\"b\"}\n"]);
        assert_eq!(framer.flush(), None);
    }

    #[test]
    fn framer_flushes_partial_line() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.push(b"one\ntwo"), vec!["one\n"]);
        assert_eq!(framer.flush(), Some("two".to_string()));
        assert_eq!(framer.flush(), None);
    }
}
