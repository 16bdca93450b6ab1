//! Line/column positions.
//!
//! The syntax tree stores byte offsets; reports and tests speak in lines and
//! columns. `LineMap` converts between the two.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// A 0-indexed line and character (in `char`s) position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Range { start, end }
    }
}

/// Starting offset of every line, for offset <-> position conversion.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<u32>,
}

impl LineMap {
    pub fn build(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut line_starts = vec![0u32];
        for (i, &b) in bytes.iter().enumerate() {
            match b {
                b'\n' => line_starts.push((i + 1) as u32),
                // A lone '\r' ends a line; '\r\n' is handled by the '\n'.
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => line_starts.push((i + 1) as u32),
                _ => {}
            }
        }
        LineMap { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_start(&self, line: usize) -> Option<u32> {
        self.line_starts.get(line).copied()
    }

    pub fn offset_to_position(&self, offset: u32, source: &str) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0) as usize;
        let clamped = (offset as usize).min(source.len());
        let character = source
            .get(line_start.min(clamped)..clamped)
            .map(|s| s.chars().count() as u32)
            .unwrap_or(0);
        Position::new(line as u32, character)
    }

    pub fn position_to_offset(&self, position: Position, source: &str) -> Option<u32> {
        let line_idx = position.line as usize;
        let line_start = *self.line_starts.get(line_idx)?;
        let line_limit = self
            .line_starts
            .get(line_idx + 1)
            .copied()
            .unwrap_or(source.len() as u32);
        let line_text = source.get(line_start as usize..line_limit as usize)?;

        let mut byte_count = 0u32;
        for (seen, ch) in line_text.chars().enumerate() {
            if seen as u32 == position.character || ch == '\n' || ch == '\r' {
                break;
            }
            byte_count += ch.len_utf8() as u32;
        }
        Some(line_start + byte_count)
    }

    pub fn span_to_range(&self, span: Span, source: &str) -> Range {
        Range::new(
            self.offset_to_position(span.start, source),
            self.offset_to_position(span.end, source),
        )
    }
}

#[cfg(test)]
#[path = "../tests/position_tests.rs"]
mod tests;
