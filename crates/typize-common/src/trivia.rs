//! Trivia scanning.
//!
//! Whitespace and comments are not part of the syntax tree. Nodes record their
//! full start (including leading trivia) and their end; these helpers find the
//! trivia boundaries around them in the source text.

#[inline]
pub fn is_horizontal_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x0B | 0x0C)
}

#[inline]
pub fn is_line_break(b: u8) -> bool {
    matches!(b, b'\n' | b'\r')
}

/// Skip whitespace, line breaks and comments starting at `pos`.
///
/// Returns the offset of the next significant character (or the end of the
/// source). An unterminated block comment runs to the end of the source.
pub fn skip_trivia(source: &str, pos: u32) -> u32 {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut i = pos as usize;

    while i < len {
        let ch = bytes[i];
        if is_horizontal_whitespace(ch) || is_line_break(ch) {
            i += 1;
            continue;
        }
        if ch == b'/' && i + 1 < len {
            match bytes[i + 1] {
                b'/' => {
                    i += 2;
                    while i < len && !is_line_break(bytes[i]) {
                        i += 1;
                    }
                    continue;
                }
                b'*' => {
                    i = block_comment_end(bytes, i);
                    continue;
                }
                _ => {}
            }
        }
        break;
    }

    i.min(len) as u32
}

/// Extent of the trailing trivia that follows a token ending at `end`.
///
/// Trailing trivia stops at the first line break (which is left for the next
/// token's leading trivia) or at the next significant character.
pub fn trailing_trivia_end(source: &str, end: u32) -> u32 {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut i = end as usize;

    while i < len {
        let ch = bytes[i];
        if is_horizontal_whitespace(ch) {
            i += 1;
            continue;
        }
        if ch == b'/' && i + 1 < len {
            if bytes[i + 1] == b'/' {
                while i < len && !is_line_break(bytes[i]) {
                    i += 1;
                }
                break;
            }
            if bytes[i + 1] == b'*' {
                let comment_end = block_comment_end(bytes, i);
                if bytes[i..comment_end].iter().any(|&b| is_line_break(b)) {
                    break;
                }
                i = comment_end;
                continue;
            }
        }
        break;
    }

    i.min(len) as u32
}

/// Offset just past the `*/` of the block comment starting at `start`.
fn block_comment_end(bytes: &[u8], start: usize) -> usize {
    let len = bytes.len();
    let mut i = start + 2;
    while i + 1 < len {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    len
}

#[cfg(test)]
#[path = "../tests/trivia_tests.rs"]
mod tests;
