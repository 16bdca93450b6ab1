use super::*;

#[test]
fn test_skip_trivia_whitespace_and_comments() {
    let source = "  // note\n  /* block */ x";
    assert_eq!(skip_trivia(source, 0), 24);
    assert_eq!(&source[24..], "x");
}

#[test]
fn test_skip_trivia_at_significant_char_is_noop() {
    let source = "abc";
    assert_eq!(skip_trivia(source, 1), 1);
}

#[test]
fn test_skip_trivia_unterminated_block_comment() {
    let source = "x /* never closed";
    assert_eq!(skip_trivia(source, 1), source.len() as u32);
}

#[test]
fn test_trailing_trivia_stops_at_line_break() {
    let source = "Foo   \n  Bar";
    assert_eq!(trailing_trivia_end(source, 3), 6);
}

#[test]
fn test_trailing_trivia_includes_same_line_comments() {
    let source = "Foo /* a */ Bar";
    assert_eq!(trailing_trivia_end(source, 3), 12);

    let source = "Foo // rest of line\nBar";
    assert_eq!(trailing_trivia_end(source, 3), 19);
}

#[test]
fn test_trailing_trivia_multiline_block_comment_belongs_to_next_token() {
    let source = "Foo /* a\n b */ Bar";
    assert_eq!(trailing_trivia_end(source, 3), 4);
}
