use super::*;

fn kinds(source: &str) -> Vec<SyntaxKind> {
    let (tokens, _) = ScannerState::new("test.cs", source).scan_all();
    tokens.into_iter().map(|t| t.kind).collect()
}

#[test]
fn test_scan_method_header() {
    assert_eq!(
        kinds("public async Task<IActionResult> Get()"),
        vec![
            SyntaxKind::PublicKeyword,
            SyntaxKind::AsyncKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::LessThan,
            SyntaxKind::Identifier,
            SyntaxKind::GreaterThan,
            SyntaxKind::Identifier,
            SyntaxKind::OpenParen,
            SyntaxKind::CloseParen,
            SyntaxKind::EndOfFile,
        ]
    );
}

#[test]
fn test_nested_generic_closers_are_separate_tokens() {
    assert_eq!(
        kinds("A<B<C>>"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::LessThan,
            SyntaxKind::Identifier,
            SyntaxKind::LessThan,
            SyntaxKind::Identifier,
            SyntaxKind::GreaterThan,
            SyntaxKind::GreaterThan,
            SyntaxKind::EndOfFile,
        ]
    );
}

#[test]
fn test_token_positions_include_leading_trivia() {
    let source = "public  /* c */ IActionResult";
    let (tokens, diagnostics) = ScannerState::new("test.cs", source).scan_all();
    assert!(diagnostics.is_empty());

    let ty = tokens[1];
    assert_eq!(ty.full_start, 6);
    assert_eq!(ty.start, 16);
    assert_eq!(ty.text(source), "IActionResult");
}

#[test]
fn test_scan_operators() {
    assert_eq!(
        kinds("a == b != c => d && e || !f <= g"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::EqualsEquals,
            SyntaxKind::Identifier,
            SyntaxKind::ExclamationEquals,
            SyntaxKind::Identifier,
            SyntaxKind::EqualsGreaterThan,
            SyntaxKind::Identifier,
            SyntaxKind::AmpersandAmpersand,
            SyntaxKind::Identifier,
            SyntaxKind::BarBar,
            SyntaxKind::Exclamation,
            SyntaxKind::Identifier,
            SyntaxKind::LessThanEquals,
            SyntaxKind::Identifier,
            SyntaxKind::EndOfFile,
        ]
    );
}

#[test]
fn test_scan_literals() {
    assert_eq!(
        kinds(r#""hi" $"x{y}" @"c:\dir" 'c' 42 1.5m .5"#),
        vec![
            SyntaxKind::StringLiteral,
            SyntaxKind::StringLiteral,
            SyntaxKind::StringLiteral,
            SyntaxKind::CharLiteral,
            SyntaxKind::NumericLiteral,
            SyntaxKind::NumericLiteral,
            SyntaxKind::NumericLiteral,
            SyntaxKind::EndOfFile,
        ]
    );
}

#[test]
fn test_escaped_quote_does_not_end_string() {
    let source = r#""say \"hi\"" x"#;
    let (tokens, diagnostics) = ScannerState::new("test.cs", source).scan_all();
    assert!(diagnostics.is_empty());
    assert_eq!(tokens[0].text(source), r#""say \"hi\"""#);
    assert_eq!(tokens[1].kind, SyntaxKind::Identifier);
}

#[test]
fn test_unterminated_string_reports_diagnostic() {
    let (_, diagnostics) = ScannerState::new("test.cs", "\"open\nx").scan_all();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].code,
        typize_common::diagnostics::diagnostic_codes::UNTERMINATED_STRING_LITERAL
    );
}

#[test]
fn test_unterminated_comment_reports_diagnostic() {
    let (tokens, diagnostics) = ScannerState::new("test.cs", "x /* open").scan_all();
    assert_eq!(tokens.len(), 2);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].code,
        typize_common::diagnostics::diagnostic_codes::UNTERMINATED_COMMENT
    );
}

#[test]
fn test_invalid_character() {
    let (tokens, diagnostics) = ScannerState::new("test.cs", "a # b").scan_all();
    assert_eq!(tokens[1].kind, SyntaxKind::Unknown);
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn test_keywords_and_predefined_types() {
    assert_eq!(SyntaxKind::from_keyword("dynamic"), Some(SyntaxKind::DynamicKeyword));
    assert!(SyntaxKind::StringKeyword.is_predefined_type());
    assert!(SyntaxKind::AsyncKeyword.is_modifier());
    assert_eq!(SyntaxKind::from_keyword("Controller"), None);
}
