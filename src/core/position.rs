/*!
# Source position types (Position, PackedSpan, TextRange)

Location primitives shared by the syntax tree, the binder and the incremental core.
All offsets are UTF-8 byte offsets into the document text.
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Position in source code (0-based line and byte column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    pub fn zero() -> Self {
        Self::new(0, 0, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Compact span representation (offset + length) within one text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PackedSpan {
    pub start: u32,
    pub len: u32,
}

impl PackedSpan {
    pub fn new(start: u32, len: u32) -> Self { Self { start, len } }
    pub fn empty() -> Self { Self { start: 0, len: 0 } }
    pub fn end(&self) -> u32 { self.start + self.len }

    /// Span between two absolute offsets (`end` before `start` collapses to empty).
    pub fn between(start: u32, end: u32) -> Self {
        Self { start, len: end.saturating_sub(start) }
    }

    /// Half-open containment: `start <= offset < end`.
    pub fn contains_offset(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end()
    }

    pub fn to_range(self) -> TextRange {
        TextRange::new(self.start as usize, self.end() as usize)
    }
}

/// Half-open byte range `[start, end)` in one version of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted range {start}..{end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize { self.end - self.start }
    pub fn is_empty(&self) -> bool { self.start == self.end }

    /// Offset containment with an inclusive end, so an insertion point at `end`
    /// still counts as touching the range.
    pub fn contains_offset(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }

    /// `other` lies entirely within `self` (boundaries may coincide).
    pub fn contains_range(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn as_std(&self) -> std::ops::Range<usize> { self.start..self.end }
}

impl From<PackedSpan> for TextRange {
    fn from(span: PackedSpan) -> Self { span.to_range() }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Line index for fast offset->(line,column) mapping.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets where each line starts.
    line_starts: Arc<Vec<u32>>,
    len: u32,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = Vec::with_capacity(text.len() / 32 + 1);
        starts.push(0u32);
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' { starts.push((i + 1) as u32); }
        }
        Self { line_starts: Arc::new(starts), len: text.len() as u32 }
    }

    pub fn line_count(&self) -> usize { self.line_starts.len() }

    /// Offsets past the end of the text are clamped to the end.
    pub fn to_position(&self, offset: u32) -> Position {
        let offset = offset.min(self.len);
        // Бинарный поиск последнего line_start <= offset
        let starts = &self.line_starts;
        let line = starts.partition_point(|&s| s <= offset).saturating_sub(1);
        let line_start = starts[line];
        Position::new(line, (offset - line_start) as usize, offset as usize)
    }

    /// Same as [`LineIndex::to_position`] for a `usize` offset; offsets that
    /// do not fit in `u32` are clamped to the end as well.
    pub fn position_of(&self, offset: usize) -> Position {
        self.to_position(u32::try_from(offset).unwrap_or(u32::MAX))
    }

    pub fn range_positions(&self, range: TextRange) -> (Position, Position) {
        (self.position_of(range.start), self.position_of(range.end))
    }
}
