//! Byte-offset ranges within documents.

use crate::file_id::FileId;
use serde::{Deserialize, Serialize};

/// A byte offset range within a document. `start` is inclusive, `end` exclusive.
///
/// Syntax spans never include leading or trailing trivia, so the span of a
/// base-type reference covers exactly the name as written.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The document this span belongs to.
    pub file: FileId,
    /// Byte offset of the start of the span (inclusive).
    pub start: u32,
    /// Byte offset of the end of the span (exclusive).
    pub end: u32,
}

impl Span {
    /// A dummy span used when no source location is available.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a new span in the given file with the given byte range.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Merges two spans in the same file into one covering both.
    ///
    /// # Panics
    ///
    /// Panics if the two spans are from different files.
    pub fn merge(self, other: Span) -> Span {
        assert_eq!(
            self.file, other.file,
            "cannot merge spans from different files"
        );
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns `true` if `other` lies entirely within this span.
    pub fn contains(&self, other: Span) -> bool {
        self.file == other.file && self.start <= other.start && other.end <= self.end
    }

    /// Returns `true` if the byte offset lies within this span.
    pub fn contains_offset(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` if this span has zero length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if this is the dummy span.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_spans() {
        let f = FileId::from_raw(0);
        let m = Span::new(f, 5, 15).merge(Span::new(f, 10, 25));
        assert_eq!((m.start, m.end), (5, 25));
    }

    #[test]
    fn containment() {
        let f = FileId::from_raw(0);
        let outer = Span::new(f, 10, 30);
        assert!(outer.contains(Span::new(f, 10, 30)));
        assert!(outer.contains(Span::new(f, 12, 20)));
        assert!(!outer.contains(Span::new(f, 5, 20)));
        assert!(!outer.contains(Span::new(FileId::from_raw(1), 12, 20)));
        assert!(outer.contains_offset(10));
        assert!(!outer.contains_offset(30));
    }

    #[test]
    fn len_and_empty() {
        let f = FileId::from_raw(0);
        assert_eq!(Span::new(f, 10, 20).len(), 10);
        assert!(Span::new(f, 5, 5).is_empty());
    }

    #[test]
    fn dummy_span() {
        assert!(Span::DUMMY.is_dummy());
        assert!(!Span::new(FileId::from_raw(0), 0, 0).is_dummy());
    }

    #[test]
    fn serde_roundtrip() {
        let s = Span::new(FileId::from_raw(1), 10, 20);
        let json = serde_json::to_string(&s).unwrap();
        let back: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
