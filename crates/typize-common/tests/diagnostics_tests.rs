use super::*;

#[test]
fn test_format_message_substitutes_in_order() {
    assert_eq!(format_message("'{0}' then '{1}'", &["a", "b"]), "'a' then 'b'");
}

#[test]
fn test_format_message_repeated_placeholder() {
    assert_eq!(format_message("{0}{0}", &["x"]), "xx");
}

#[test]
fn test_from_message_copies_code_and_category() {
    let diag = Diagnostic::from_message(
        "a.cs",
        4,
        13,
        &diagnostic_messages::RETURN_TYPE_CAN_BE_NARROWED,
        &["IActionResult", "Get", "string"],
    );
    assert_eq!(diag.code, diagnostic_codes::RETURN_TYPE_CAN_BE_NARROWED);
    assert_eq!(diag.category, DiagnosticCategory::Warning);
    assert!(diag.message_text.contains("'IActionResult'"));
    assert!(diag.message_text.contains("'string'"));
    assert!(!diag.is_error());
}

#[test]
fn test_message_template_lookup() {
    assert_eq!(
        get_message_template(diagnostic_codes::TOKEN_EXPECTED),
        Some("'{0}' expected.")
    );
    assert_eq!(get_message_template(9999), None);
}
