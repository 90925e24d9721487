//! Cursor-string: a borrowed string paired with a byte cursor.
//!
//! Every sub-parser in this crate advances over a [`CursorStr`]. The cursor
//! never throws: bounds violations are caller bugs (the caller must only
//! advance within bounds it already inspected) and panic, they are never
//! surfaced as parse diagnostics.

use std::fmt;

/// A string slice paired with a cursor.
///
/// Invariant: `0 <= cursor <= text.len()`. All indexing is relative to the
/// cursor; only the cursor ever moves, the backing text is untouched.
///
/// Deliberately not comparable to another `CursorStr` — whether that would
/// mean structural or textual equality is ambiguous. Compare against plain
/// `str` instead.
#[derive(Clone)]
pub struct CursorStr<'a> {
    text: &'a str,
    cursor: usize,
}

impl<'a> CursorStr<'a> {
    /// Create a cursor-string positioned at the start of `text`.
    pub fn new(text: &'a str) -> Self {
        Self { text, cursor: 0 }
    }

    /// Absolute byte offset of the cursor within the backing text.
    pub fn offset(&self) -> usize {
        self.cursor
    }

    /// The remaining view: everything from the cursor to the end.
    pub fn rest(&self) -> &'a str {
        &self.text[self.cursor..]
    }

    /// Number of bytes remaining.
    pub fn len(&self) -> usize {
        self.text.len() - self.cursor
    }

    /// Whether anything is left to consume.
    pub fn is_empty(&self) -> bool {
        self.cursor == self.text.len()
    }

    /// Byte at position `i` relative to the cursor, or `None` past the end.
    pub fn byte(&self, i: usize) -> Option<u8> {
        self.text.as_bytes().get(self.cursor + i).copied()
    }

    /// First remaining byte, or `None` if nothing is left.
    pub fn first(&self) -> Option<u8> {
        self.byte(0)
    }

    /// Sub-slice `[from, to)` relative to the cursor.
    ///
    /// Panics when the range leaves the remaining view — a caller-contract
    /// violation, not a recoverable parse condition.
    pub fn slice(&self, from: usize, to: usize) -> &'a str {
        assert!(
            to <= self.len(),
            "slice({from}, {to}) past end of remaining view (len {})",
            self.len()
        );
        &self.text[self.cursor + from..self.cursor + to]
    }

    /// Move the cursor by `n` bytes: forward, or backward to support the
    /// one-token un-consume used by zero-padding detection.
    ///
    /// Panics when the move would leave `0..=text.len()`.
    pub fn advance(&mut self, n: isize) {
        if n >= 0 {
            let n = n as usize;
            assert!(
                n <= self.len(),
                "tried to advance({n}), but only {} bytes are left",
                self.len()
            );
            self.cursor += n;
        } else {
            let back = n.unsigned_abs();
            assert!(
                back <= self.cursor,
                "tried to advance({n}), but the cursor is only at {}",
                self.cursor
            );
            self.cursor -= back;
        }
    }
}

impl PartialEq<str> for CursorStr<'_> {
    fn eq(&self, other: &str) -> bool {
        self.rest() == other
    }
}

impl PartialEq<&str> for CursorStr<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.rest() == *other
    }
}

impl fmt::Display for CursorStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rest())
    }
}

impl fmt::Debug for CursorStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CursorStr({:?} @ {})", self.text, self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_and_rest() {
        let mut v = CursorStr::new("/24/64");
        assert_eq!(v.len(), 6);
        v.advance(1);
        assert_eq!(v.rest(), "24/64");
        assert_eq!(v.offset(), 1);
        assert!(v == "24/64");
    }

    #[test]
    fn advance_backward_unconsumes() {
        let mut v = CursorStr::new("007");
        v.advance(2);
        v.advance(-1);
        assert_eq!(v.rest(), "07");
    }

    #[test]
    fn byte_peeking() {
        let v = CursorStr::new("ab");
        assert_eq!(v.first(), Some(b'a'));
        assert_eq!(v.byte(1), Some(b'b'));
        assert_eq!(v.byte(2), None);
    }

    #[test]
    fn slice_relative() {
        let mut v = CursorStr::new("ip4:1.2.3.4");
        v.advance(4);
        assert_eq!(v.slice(0, 7), "1.2.3.4");
    }

    #[test]
    fn empty_at_end() {
        let mut v = CursorStr::new("x");
        assert!(!v.is_empty());
        v.advance(1);
        assert!(v.is_empty());
        assert_eq!(v.first(), None);
    }

    #[test]
    #[should_panic(expected = "tried to advance(3)")]
    fn advance_past_end_panics() {
        let mut v = CursorStr::new("ab");
        v.advance(3);
    }

    #[test]
    #[should_panic(expected = "tried to advance(-1)")]
    fn advance_before_start_panics() {
        let mut v = CursorStr::new("ab");
        v.advance(-1);
    }
}
