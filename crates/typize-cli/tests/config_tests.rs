use super::*;
use clap::Parser;

fn args(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["typize"];
    argv.extend_from_slice(extra);
    argv.push(".");
    CliArgs::parse_from(argv)
}

#[test]
fn test_empty_config_uses_defaults() {
    let config = parse_config("{}").unwrap();
    let resolved = merge_config(config, Path::new("/proj"), &args(&[]), Path::new("/proj")).unwrap();
    assert_eq!(resolved.vocabulary, FrameworkVocabulary::default());
    assert_eq!(resolved.options, NarrowingOptions::default());
    assert!(resolved.implicit_usings);
    assert!(resolved.admits(Path::new("Controllers/ItemsController.cs")));
    assert!(!resolved.admits(Path::new("src/obj/Debug/Generated.cs")));
}

#[test]
fn test_partial_vocabulary_keeps_other_defaults() {
    let config = parse_config(
        r#"{ "vocabulary": { "handlerBaseType": "Api.ApiController`1" }, "options": { "parallel": false } }"#,
    )
    .unwrap();
    let resolved = merge_config(config, Path::new("/proj"), &args(&[]), Path::new("/proj")).unwrap();
    assert_eq!(resolved.vocabulary.handler_base_type, "Api.ApiController`1");
    assert_eq!(resolved.vocabulary.factory_member, "Ok");
    assert!(!resolved.options.parallel);
    assert_eq!(resolved.options.parallel_threshold, 4);
}

#[test]
fn test_flags_override_file() {
    let config = parse_config(
        r#"{
            "vocabulary": { "factoryMember": "Success" },
            "include": ["**/Api/**"],
            "implicitUsings": "true"
        }"#,
    )
    .unwrap();
    let resolved = merge_config(
        config,
        Path::new("/proj"),
        &args(&[
            "--factory-member",
            "Ok",
            "--include",
            "**/Controllers/**",
            "--no-implicit-usings",
        ]),
        Path::new("/proj"),
    )
    .unwrap();
    assert_eq!(resolved.vocabulary.factory_member, "Ok");
    assert!(resolved.admits(Path::new("web/Controllers/A.cs")));
    assert!(!resolved.admits(Path::new("web/Api/A.cs")));
    assert!(!resolved.implicit_usings);
}

#[test]
fn test_extra_libs_resolve_against_config_dir() {
    let config = parse_config(r#"{ "extraLibs": ["lib/Mvc.cs"] }"#).unwrap();
    let resolved = merge_config(config, Path::new("/proj"), &args(&[]), Path::new("/work")).unwrap();
    assert_eq!(resolved.extra_libs, vec![PathBuf::from("/proj/lib/Mvc.cs")]);

    let config = parse_config(r#"{ "extraLibs": ["lib/Mvc.cs"] }"#).unwrap();
    let resolved = merge_config(
        config,
        Path::new("/proj"),
        &args(&["--lib", "other.cs"]),
        Path::new("/work"),
    )
    .unwrap();
    assert_eq!(resolved.extra_libs, vec![PathBuf::from("/work/other.cs")]);
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(parse_config(r#"{ "implicitUsings": "maybe" }"#).is_err());
    assert!(parse_config(r#"{ "unknownOption": 1 }"#).is_err());
    let config = parse_config(r#"{ "exclude": ["[unclosed"] }"#).unwrap();
    assert!(merge_config(config, Path::new("/p"), &args(&[]), Path::new("/p")).is_err());
}

#[test]
fn test_explicit_exclude_replaces_defaults() {
    let config = parse_config(r#"{ "exclude": ["**/Generated/**"] }"#).unwrap();
    let resolved = merge_config(config, Path::new("/p"), &args(&[]), Path::new("/p")).unwrap();
    assert!(resolved.admits(Path::new("obj/A.cs")));
    assert!(!resolved.admits(Path::new("src/Generated/A.cs")));
}
