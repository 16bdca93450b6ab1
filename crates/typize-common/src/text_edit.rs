//! Text edits over a single document.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Replace the bytes in `span` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub span: Span,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(span: Span, new_text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: new_text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextEditError {
    #[error("edit {start}..{end} is outside the document (length {len})")]
    OutOfBounds { start: u32, end: u32, len: usize },
    #[error("edit {start}..{end} does not fall on a character boundary")]
    NotCharBoundary { start: u32, end: u32 },
    #[error("edits {first:?} and {second:?} overlap")]
    Overlap { first: Span, second: Span },
}

/// Apply a set of non-overlapping edits to `source` in one pass.
///
/// Edit order does not matter; edits are applied by position.
pub fn apply_text_edits(source: &str, edits: &[TextEdit]) -> Result<String, TextEditError> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.span.start, e.span.end));

    for edit in &ordered {
        let (start, end) = (edit.span.start as usize, edit.span.end as usize);
        if start > end || end > source.len() {
            return Err(TextEditError::OutOfBounds {
                start: edit.span.start,
                end: edit.span.end,
                len: source.len(),
            });
        }
        if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return Err(TextEditError::NotCharBoundary {
                start: edit.span.start,
                end: edit.span.end,
            });
        }
    }
    for pair in ordered.windows(2) {
        if pair[0].span.end > pair[1].span.start {
            return Err(TextEditError::Overlap {
                first: pair[0].span,
                second: pair[1].span,
            });
        }
    }

    let extra: usize = ordered.iter().map(|e| e.new_text.len()).sum();
    let mut result = String::with_capacity(source.len() + extra);
    let mut cursor = 0usize;
    for edit in ordered {
        result.push_str(&source[cursor..edit.span.start as usize]);
        result.push_str(&edit.new_text);
        cursor = edit.span.end as usize;
    }
    result.push_str(&source[cursor..]);
    Ok(result)
}

#[cfg(test)]
#[path = "../tests/text_edit_tests.rs"]
mod tests;
