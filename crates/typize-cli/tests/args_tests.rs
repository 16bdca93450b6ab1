use super::*;

#[test]
fn test_paths_are_required() {
    assert!(CliArgs::try_parse_from(["typize"]).is_err());
}

#[test]
fn test_defaults() {
    let args = CliArgs::try_parse_from(["typize", "src"]).unwrap();
    assert_eq!(args.paths, vec![PathBuf::from("src")]);
    assert_eq!(args.format, OutputFormat::Pretty);
    assert!(!args.fix);
    assert!(args.include.is_none());
    assert!(args.pretty.is_none());
}

#[test]
fn test_list_options_split_on_commas() {
    let args = CliArgs::try_parse_from([
        "typize",
        "--include",
        "**/Controllers/**,**/Api/**",
        "--lib",
        "a.cs,b.cs",
        "--format",
        "json",
        "--fix",
        "src",
        "tests",
    ])
    .unwrap();
    assert_eq!(
        args.include,
        Some(vec!["**/Controllers/**".to_string(), "**/Api/**".to_string()])
    );
    assert_eq!(
        args.extra_libs,
        Some(vec![PathBuf::from("a.cs"), PathBuf::from("b.cs")])
    );
    assert_eq!(args.format, OutputFormat::Json);
    assert!(args.fix);
    assert_eq!(args.paths.len(), 2);
}

#[test]
fn test_vocabulary_overrides() {
    let args = CliArgs::try_parse_from([
        "typize",
        "--handler-base",
        "Api.ApiController`1",
        "--factory-member",
        "Success",
        "--no-parallel",
        "--pretty",
        "false",
        ".",
    ])
    .unwrap();
    assert_eq!(args.handler_base.as_deref(), Some("Api.ApiController`1"));
    assert_eq!(args.factory_member.as_deref(), Some("Success"));
    assert!(args.no_parallel);
    assert_eq!(args.pretty, Some(false));
}
