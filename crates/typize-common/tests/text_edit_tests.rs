use super::*;

#[test]
fn test_apply_single_edit() {
    let source = "public IActionResult Get()";
    let edits = [TextEdit::new(Span::new(7, 20), "ActionResult<string>")];
    assert_eq!(
        apply_text_edits(source, &edits).unwrap(),
        "public ActionResult<string> Get()"
    );
}

#[test]
fn test_apply_edits_in_any_order() {
    let source = "aaa bbb ccc";
    let edits = [
        TextEdit::new(Span::new(8, 11), "C"),
        TextEdit::new(Span::new(0, 3), "A"),
    ];
    assert_eq!(apply_text_edits(source, &edits).unwrap(), "A bbb C");
}

#[test]
fn test_adjacent_edits_are_not_overlapping() {
    let source = "abcd";
    let edits = [
        TextEdit::new(Span::new(0, 2), "x"),
        TextEdit::new(Span::new(2, 4), "y"),
    ];
    assert_eq!(apply_text_edits(source, &edits).unwrap(), "xy");
}

#[test]
fn test_overlapping_edits_rejected() {
    let source = "abcdef";
    let edits = [
        TextEdit::new(Span::new(0, 4), "x"),
        TextEdit::new(Span::new(2, 5), "y"),
    ];
    let err = apply_text_edits(source, &edits).unwrap_err();
    assert!(matches!(err, TextEditError::Overlap { .. }));
}

#[test]
fn test_out_of_bounds_edit_rejected() {
    let err = apply_text_edits("abc", &[TextEdit::new(Span::new(1, 9), "")]).unwrap_err();
    assert_eq!(
        err,
        TextEditError::OutOfBounds {
            start: 1,
            end: 9,
            len: 3
        }
    );
}

#[test]
fn test_no_edits_returns_source() {
    assert_eq!(apply_text_edits("unchanged", &[]).unwrap(), "unchanged");
}
