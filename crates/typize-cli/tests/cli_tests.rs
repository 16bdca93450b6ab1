//! Driver tests against real files in a temporary directory.

use clap::Parser;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use typize_cli::args::CliArgs;
use typize_cli::config::{ResolvedConfig, TypizeConfig, merge_config};
use typize_cli::driver::{
    EXIT_DIAGNOSTICS, EXIT_ERROR, EXIT_SUCCESS, RunResult, collect_source_files, run,
};

const CONTROLLER: &str = r#"using Microsoft.AspNetCore.Mvc;
namespace Shop
{
    public class Item { }

    public class ItemsController : ControllerBase
    {
        public IActionResult Get()
        {
            var item = new Item();
            return Ok(item);
        }

        public async Task<IActionResult> GetAsync()
        {
            return Ok("ready");
        }
    }
}
"#;

const PLAIN: &str = r#"public class Plain
{
    public int Value() => 1;
}
"#;

fn write(dir: &Path, relative: &str, text: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn run_in(dir: &Path, extra: &[&str]) -> RunResult {
    let mut argv = vec!["typize"];
    argv.extend_from_slice(extra);
    let args = CliArgs::parse_from(argv);
    run(&args, dir).unwrap()
}

fn default_config(dir: &Path) -> ResolvedConfig {
    let args = CliArgs::parse_from(["typize", "."]);
    merge_config(TypizeConfig::default(), dir, &args, dir).unwrap()
}

#[test]
fn test_reports_diagnostics_without_fix() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Controllers/ItemsController.cs", CONTROLLER);
    write(dir.path(), "Plain.cs", PLAIN);

    let result = run_in(dir.path(), &["."]);
    assert_eq!(result.files_read.len(), 2);
    assert_eq!(result.diagnostics.len(), 2);
    assert!(
        result
            .diagnostics
            .iter()
            .all(|d| d.file == "Controllers/ItemsController.cs" && d.code == 1001)
    );
    assert!(result.diagnostics[1].message_text.contains("'string'"));
    assert_eq!(result.exit_code(), EXIT_DIAGNOSTICS);

    let on_disk = fs::read_to_string(dir.path().join("Controllers/ItemsController.cs")).unwrap();
    assert_eq!(on_disk, CONTROLLER);
}

#[test]
fn test_fix_rewrites_files_in_place() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "ItemsController.cs", CONTROLLER);

    let result = run_in(dir.path(), &["--fix", "ItemsController.cs"]);
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.fixed.len(), 1);
    assert_eq!(result.fixed[0].methods, 2);
    assert_eq!(result.exit_code(), EXIT_SUCCESS);

    let expected = CONTROLLER
        .replace("public IActionResult Get()", "public ActionResult<Item> Get()")
        .replace(
            "public async Task<IActionResult> GetAsync()",
            "public async Task<ActionResult<string>> GetAsync()",
        );
    let on_disk = fs::read_to_string(dir.path().join("ItemsController.cs")).unwrap();
    assert_eq!(on_disk, expected);

    let again = run_in(dir.path(), &["--fix", "."]);
    assert!(again.diagnostics.is_empty());
    assert!(again.fixed.is_empty());
}

#[test]
fn test_parse_errors_skip_the_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Broken.cs", "public class Broken { public IActionResult Get( }");
    write(dir.path(), "ItemsController.cs", CONTROLLER);

    let result = run_in(dir.path(), &["."]);
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| d.file == "Broken.cs" && d.is_error())
    );
    assert_eq!(
        result
            .diagnostics
            .iter()
            .filter(|d| d.file == "ItemsController.cs")
            .count(),
        2
    );
    assert_eq!(result.exit_code(), EXIT_ERROR);
}

#[test]
fn test_inconsistent_async_shape_is_a_file_error() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "Sync.cs",
        r#"using Microsoft.AspNetCore.Mvc;
public class SyncController : ControllerBase
{
    public Task<IActionResult> Get() { return null; }
}
"#,
    );
    let result = run_in(dir.path(), &["."]);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].file, "Sync.cs");
    assert!(result.errors[0].message.contains("Get"));
    assert_eq!(result.exit_code(), EXIT_ERROR);
}

#[test]
fn test_config_file_is_discovered() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "ItemsController.cs", CONTROLLER);
    write(
        dir.path(),
        "typize.json",
        r#"{ "vocabulary": { "factoryMember": "Accepted" } }"#,
    );

    let result = run_in(dir.path(), &["."]);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.contains("Accepted"));
    assert_eq!(result.exit_code(), EXIT_ERROR);

    let overridden = run_in(dir.path(), &["--factory-member", "Ok", "."]);
    assert!(overridden.errors.is_empty());
    assert_eq!(overridden.diagnostics.len(), 2);
}

#[test]
fn test_extra_libs_declare_handler_bases() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "lib/Api.cs",
        r#"using Microsoft.AspNetCore.Mvc;
namespace Api
{
    public abstract class ApiController<T>
    {
        public IActionResult Ok(T value) => null;
    }
}
"#,
    );
    write(
        dir.path(),
        "src/Orders.cs",
        r#"using Microsoft.AspNetCore.Mvc;
using Api;
public class Order { }
public class OrdersController : ApiController<Order>
{
    public IActionResult Get() => Ok(new Order());
}
"#,
    );
    write(
        dir.path(),
        "typize.json",
        r#"{ "vocabulary": { "handlerBaseType": "Api.ApiController`1" }, "extraLibs": ["lib/Api.cs"] }"#,
    );

    let result = run_in(dir.path(), &["src"]);
    assert_eq!(result.diagnostics.len(), 1);
    assert!(result.diagnostics[0].message_text.contains("'Order'"));
}

#[test]
fn test_collect_respects_globs_and_hidden_directories() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "A.cs", PLAIN);
    write(dir.path(), "bin/Debug/B.cs", PLAIN);
    write(dir.path(), "obj/C.cs", PLAIN);
    write(dir.path(), ".git/D.cs", PLAIN);
    write(dir.path(), "notes.txt", "not source");
    write(dir.path(), "Sub/E.cs", PLAIN);

    let config = default_config(dir.path());
    let files = collect_source_files(&[".".into()], dir.path(), &config).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| {
            p.strip_prefix(dir.path().join("."))
                .or_else(|_| p.strip_prefix(dir.path()))
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    assert_eq!(names, vec!["A.cs", "Sub/E.cs"]);

    // Named files bypass the globs.
    let named = collect_source_files(&["obj/C.cs".into()], dir.path(), &config).unwrap();
    assert_eq!(named.len(), 1);
}

#[test]
fn test_missing_path_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = default_config(dir.path());
    assert!(collect_source_files(&["nope".into()], dir.path(), &config).is_err());
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "ItemsController.cs", CONTROLLER);
    let result = run_in(dir.path(), &["--format", "json", "."]);
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert_eq!(json["diagnostics"].as_array().unwrap().len(), 2);
    assert_eq!(json["diagnostics"][0]["code"], 1001);
    assert_eq!(json["diagnostics"][0]["category"], "warning");
    assert!(json["errors"].as_array().unwrap().is_empty());
    assert!(json.get("sources").is_none());
}
