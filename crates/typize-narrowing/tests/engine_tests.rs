use super::*;
use crate::classifier::{SignatureShape, classify_signature};
use crate::known_symbols::CallTargetMatcher;
use crate::rewriter::narrowed_return_type;
use typize_checker::{Program, ProgramBuilder};

const CONTROLLER: &str = r#"using Microsoft.AspNetCore.Mvc;
public abstract class Base : ControllerBase
{
    public abstract IActionResult Abstract();
}
public class ItemsController : Base
{
    public override IActionResult Abstract() => Ok("a");
    public async Task<IActionResult> Load() { return Ok(1); }
    public string Name() => "items";
}
"#;

fn program(source: &str) -> (Program, FileId) {
    Program::from_source("Items.cs", source)
}

fn candidate_named(program: &Program, file: FileId, name: &str) -> MethodCandidate {
    let arena = program.arena(file).unwrap();
    collect_candidates(arena, file)
        .into_iter()
        .find(|c| c.name == name)
        .unwrap()
}

#[test]
fn test_known_symbols_are_cached_per_snapshot() {
    let engine = NarrowingEngine::default();
    let (first, _) = program(CONTROLLER);
    assert_eq!(engine.cached_snapshot(), None);

    let a = engine.known_symbols(&first).unwrap();
    let b = engine.known_symbols(&first).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(engine.cached_snapshot(), Some(first.snapshot_id()));

    let (second, _) = program(CONTROLLER);
    let c = engine.known_symbols(&second).unwrap();
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(engine.cached_snapshot(), Some(second.snapshot_id()));
}

#[test]
fn test_failed_resolution_is_not_cached() {
    let engine = NarrowingEngine::default();
    let mut builder = ProgramBuilder::new();
    builder.add_file("a.cs", "class A { }");
    builder.include_framework(false);
    let bare = builder.build();
    assert!(engine.known_symbols(&bare).is_err());
    assert_eq!(engine.cached_snapshot(), None);
}

#[test]
fn test_default_vocabulary_uses_exact_matcher() {
    let (program, _) = program(CONTROLLER);
    let known = KnownSymbols::resolve(&program, &FrameworkVocabulary::default()).unwrap();
    assert_eq!(known.matcher, CallTargetMatcher::Exact(known.factory));
    assert_eq!(program.parameter_count(known.factory), 1);
    assert_eq!(program.display_type(known.marker_type), "IActionResult");
}

#[test]
fn test_candidates_skip_bodiless_methods() {
    let (program, file) = program(CONTROLLER);
    let arena = program.arena(file).unwrap();
    let names: Vec<String> = collect_candidates(arena, file)
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Abstract", "Load", "Name"]);
}

#[test]
fn test_classification_shapes() {
    let (program, file) = program(CONTROLLER);
    let engine = NarrowingEngine::default();
    let known = engine.known_symbols(&program).unwrap();

    let direct = candidate_named(&program, file, "Abstract");
    let (shape, _) = classify_signature(&program, &known, &direct).unwrap().unwrap();
    assert_eq!(shape, SignatureShape::Direct);

    let wrapped = candidate_named(&program, file, "Load");
    let (shape, declared) = classify_signature(&program, &known, &wrapped).unwrap().unwrap();
    assert_eq!(shape, SignatureShape::Wrapped);
    assert_eq!(program.display_type(declared), "Task<IActionResult>");

    let plain = candidate_named(&program, file, "Name");
    assert_eq!(classify_signature(&program, &known, &plain).unwrap(), None);
}

#[test]
fn test_evaluate_reports_payload_and_call_site() {
    let (program, file) = program(CONTROLLER);
    let engine = NarrowingEngine::default();
    let load = candidate_named(&program, file, "Load");
    let EligibilityResult::Eligible {
        is_async_wrapped,
        payload_type,
        success_call,
        ..
    } = engine.evaluate(&program, &load).unwrap()
    else {
        panic!("expected Load to be eligible");
    };
    assert!(is_async_wrapped);
    assert_eq!(program.display_type(payload_type), "int");
    let arena = program.arena(file).unwrap();
    assert_eq!(
        arena.node_span(success_call.call).map(|s| s.text(CONTROLLER)),
        Some("Ok(1)")
    );

    let name = candidate_named(&program, file, "Name");
    assert_eq!(engine.evaluate(&program, &name).unwrap(), EligibilityResult::Ineligible);
}

#[test]
fn test_narrowed_type_wraps_async_results() {
    let (program, _) = program(CONTROLLER);
    let engine = NarrowingEngine::default();
    let known = engine.known_symbols(&program).unwrap();
    let string = program.intrinsic(typize_checker::IntrinsicKind::String);
    let direct = narrowed_return_type(&program, &known, string, false);
    let wrapped = narrowed_return_type(&program, &known, string, true);
    assert_eq!(program.display_type(direct), "ActionResult<string>");
    assert_eq!(program.display_type(wrapped), "Task<ActionResult<string>>");
}

#[test]
fn test_sink_receives_diagnostics_in_order() {
    let (program, file) = program(CONTROLLER);
    let engine = NarrowingEngine::default();
    let mut sink: Vec<NarrowingDiagnostic> = Vec::new();
    let reported = engine
        .analyze_document_into(&program, file, &CancellationToken::new(), &mut sink)
        .unwrap();
    assert_eq!(reported, 2);
    let methods: Vec<&str> = sink.iter().map(|d| d.message_args[1].as_str()).collect();
    assert_eq!(methods, vec!["Abstract", "Load"]);
    assert!(sink.windows(2).all(|w| w[0].span.start < w[1].span.start));
}

#[test]
fn test_analyze_method_matches_document_pass() {
    let (program, file) = program(CONTROLLER);
    let engine = NarrowingEngine::default();
    let load = candidate_named(&program, file, "Load");
    let single = engine.analyze_method(&program, &load).unwrap().unwrap();
    let all = engine
        .analyze_document(&program, file, &CancellationToken::new())
        .unwrap();
    assert_eq!(all[1], single);
}

#[test]
fn test_unknown_file_has_no_diagnostics() {
    let (program, _) = program(CONTROLLER);
    let engine = NarrowingEngine::default();
    let diagnostics = engine
        .analyze_document(&program, FileId(999), &CancellationToken::new())
        .unwrap();
    assert!(diagnostics.is_empty());
}
