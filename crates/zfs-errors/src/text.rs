//! Length-bounded text for the action and auxiliary slots.

use std::fmt::{self, Write};

/// Size of the action and auxiliary slots, terminator included.
pub const SLOT_LEN: usize = 1024;

/// A `String` that never grows past `cap` bytes.
///
/// Writes past the bound are dropped at a UTF-8 boundary instead of
/// failing, so a long dataset name shortens the message but never loses it
/// entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedText {
    buf: String,
    cap: usize,
}

impl BoundedText {
    pub fn new(cap: usize) -> Self {
        Self { buf: String::new(), cap }
    }

    /// A slot holding at most `SLOT_LEN - 1` bytes of text.
    pub fn slot() -> Self {
        Self::new(SLOT_LEN - 1)
    }

    /// Replace the contents with the rendering of `value`.
    pub fn set(&mut self, value: impl fmt::Display) {
        self.buf.clear();
        // Our `write_str` never errors; a failing `Display` impl just
        // leaves whatever it produced so far.
        let _ = write!(self, "{}", value);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }
}

impl fmt::Write for BoundedText {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.cap - self.buf.len();
        if s.len() <= room {
            self.buf.push_str(s);
            return Ok(());
        }
        let mut end = room;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buf.push_str(&s[..end]);
        Ok(())
    }
}

impl fmt::Display for BoundedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_kept() {
        let mut t = BoundedText::slot();
        t.set(format_args!("cannot open '{}'", "tank/home"));
        assert_eq!(t.as_str(), "cannot open 'tank/home'");
    }

    #[test]
    fn long_text_is_cut_to_slot() {
        let mut t = BoundedText::slot();
        t.set("x".repeat(5000));
        assert_eq!(t.as_str().len(), SLOT_LEN - 1);
    }

    #[test]
    fn cut_respects_char_boundary() {
        let mut t = BoundedText::new(4);
        t.set("ab\u{00e9}\u{00e9}"); // 2 + 2 + 2 bytes
        assert_eq!(t.as_str(), "ab\u{00e9}");
        let mut t = BoundedText::new(3);
        t.set("ab\u{00e9}");
        assert_eq!(t.as_str(), "ab");
    }

    #[test]
    fn set_replaces_previous() {
        let mut t = BoundedText::slot();
        t.set("first");
        t.set("second");
        assert_eq!(t.as_str(), "second");
        t.clear();
        assert!(t.is_empty());
    }
}
