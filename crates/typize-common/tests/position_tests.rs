use super::*;

#[test]
fn test_line_map_simple() {
    let source = "line1\nline2\nline3";
    let map = LineMap::build(source);

    assert_eq!(map.line_count(), 3);
    assert_eq!(map.offset_to_position(0, source), Position::new(0, 0));
    assert_eq!(map.offset_to_position(4, source), Position::new(0, 4));
    assert_eq!(map.offset_to_position(6, source), Position::new(1, 0));
    assert_eq!(map.offset_to_position(12, source), Position::new(2, 0));
}

#[test]
fn test_line_map_windows_line_endings() {
    let source = "line1\r\nline2\r\nline3";
    let map = LineMap::build(source);

    assert_eq!(map.line_count(), 3);
    assert_eq!(map.offset_to_position(7, source), Position::new(1, 0));
    assert_eq!(map.line_start(2), Some(14));
}

#[test]
fn test_position_to_offset_roundtrip() {
    let source = "class A\n{\n    IActionResult M() => Ok(1);\n}\n";
    let map = LineMap::build(source);

    for offset in 0..source.len() as u32 {
        let pos = map.offset_to_position(offset, source);
        let back = map.position_to_offset(pos, source);
        assert_eq!(back, Some(offset), "roundtrip failed for offset {offset}");
    }
}

#[test]
fn test_columns_count_chars_not_bytes() {
    let source = "// é\nx";
    let map = LineMap::build(source);

    // 'é' is two bytes but one column.
    assert_eq!(map.offset_to_position(5, source), Position::new(0, 4));
    assert_eq!(map.position_to_offset(Position::new(1, 0), source), Some(6));
}

#[test]
fn test_span_to_range() {
    let source = "a\n  bcd\n";
    let map = LineMap::build(source);

    let range = map.span_to_range(Span::new(4, 7), source);
    assert_eq!(range.start, Position::new(1, 2));
    assert_eq!(range.end, Position::new(1, 5));
}

#[test]
fn test_position_past_last_line_is_none() {
    let source = "one line";
    let map = LineMap::build(source);
    assert_eq!(map.position_to_offset(Position::new(3, 0), source), None);
}
