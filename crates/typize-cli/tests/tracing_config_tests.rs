use super::*;

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
    assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
    assert_eq!(LogFormat::parse("text"), LogFormat::Text);
    assert_eq!(LogFormat::parse(""), LogFormat::Text);
    assert_eq!(LogFormat::parse("verbose"), LogFormat::Text);
}

#[test]
fn test_typize_log_wins_over_rust_log() {
    assert_eq!(
        filter_directives(Some("typize_narrowing=trace".into()), Some("warn".into())),
        Some("typize_narrowing=trace".to_string())
    );
    assert_eq!(filter_directives(None, Some("warn".into())), Some("warn".to_string()));
    assert_eq!(filter_directives(None, None), None);
}
