//! Byte offset to line/column conversion

use std::ops::Range;
use std::path::Path;

use super::Location;
use crate::cst::is_newline_char;

/// Line start table for one source text
///
/// Recognises the same line breaks as the lexer: `\r\n`, `\n`, `\r`,
/// `\u{85}`, `\u{2028}` and `\u{2029}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMap {
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut chars = source.char_indices().peekable();
        while let Some((idx, ch)) = chars.next() {
            if !is_newline_char(ch) {
                continue;
            }
            let mut end = idx + ch.len_utf8();
            if ch == '\r' && chars.peek().is_some_and(|&(_, next)| next == '\n') {
                chars.next();
                end += 1;
            }
            line_starts.push(end);
        }
        Self { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 0-based line containing `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    /// Byte offset where the 0-based `line` starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Convert a byte offset to a 1-based `(line, column)` pair
    ///
    /// Columns count characters, not bytes.
    pub fn offset_to_position(&self, offset: usize, source: &str) -> (usize, usize) {
        let line_idx = self.line_of(offset);
        let line_start = self.line_starts[line_idx];
        let end = offset.min(source.len());
        let column = source
            .get(line_start..end)
            .map_or(end - line_start, |text| text.chars().count())
            + 1;
        (line_idx + 1, column)
    }

    /// Build a diagnostic location for a byte range
    pub fn span_to_location(&self, span: &Range<usize>, source: &str, file: &Path) -> Location {
        let (line, column) = self.offset_to_position(span.start, source);
        let (end_line, end_column) = self.offset_to_position(span.end, source);
        Location::new(file.to_path_buf(), line, column, span.start, span.end - span.start)
            .with_end(end_line, end_column)
    }
}
