use super::*;
use crate::program::ProgramBuilder;
use typize_parser::NodeKind;

fn build(source: &str) -> (Program, FileId) {
    let mut builder = ProgramBuilder::new();
    let file = builder.add_file("test.cs", source);
    (builder.build(), file)
}

fn find_node(program: &Program, file: FileId, kind: NodeKind, text: &str) -> NodeIndex {
    let arena = &program.file(file).unwrap().arena;
    arena
        .nodes()
        .find(|(idx, n)| n.kind == kind && arena.node_text(*idx) == text)
        .map(|(idx, _)| idx)
        .unwrap_or_else(|| panic!("no {kind:?} `{text}`"))
}

fn call(program: &Program, file: FileId, text: &str) -> NodeIndex {
    find_node(program, file, NodeKind::InvocationExpression, text)
}

/// Type of the first argument of the invocation spelled `text`.
fn argument_type(program: &Program, file: FileId, text: &str) -> Option<TypeId> {
    let arena = &program.file(file).unwrap().arena;
    let node = call(program, file, text);
    let data = arena.get_call_expr(arena.get(node).unwrap()).unwrap();
    program.type_of_expression(file, data.arguments.nodes[0])
}

fn argument_display(program: &Program, file: FileId, text: &str) -> String {
    program.display_type(argument_type(program, file, text).unwrap())
}

fn owner_name(program: &Program, sym: SymbolId) -> String {
    let parent = program.symbol(sym).unwrap().parent.unwrap();
    program.symbol_name(parent)
}

const MODELS: &str = r#"
public class Item
{
    public string Name { get; set; }
    public int Count { get; set; }
}
"#;

fn with_models(body: &str) -> String {
    format!("using Microsoft.AspNetCore.Mvc;\n{MODELS}\n{body}")
}

#[test]
fn test_numeric_literal_kinds() {
    assert_eq!(numeric_literal_kind("42"), IntrinsicKind::Int);
    assert_eq!(numeric_literal_kind("42L"), IntrinsicKind::Long);
    assert_eq!(numeric_literal_kind("42u"), IntrinsicKind::UInt);
    assert_eq!(numeric_literal_kind("42UL"), IntrinsicKind::ULong);
    assert_eq!(numeric_literal_kind("1.5"), IntrinsicKind::Double);
    assert_eq!(numeric_literal_kind("1.5m"), IntrinsicKind::Decimal);
    assert_eq!(numeric_literal_kind("1.5f"), IntrinsicKind::Float);
    assert_eq!(numeric_literal_kind("2d"), IntrinsicKind::Double);
    assert_eq!(numeric_literal_kind("1e3"), IntrinsicKind::Double);
    assert_eq!(numeric_literal_kind("0xFF"), IntrinsicKind::Int);
}

#[test]
fn test_literal_argument_types() {
    let source = with_models(
        r#"class C : ControllerBase
{
    public IActionResult A() { return Ok("text"); }
    public IActionResult B() { return Ok(12.5m); }
    public IActionResult D() { return Ok(true); }
    public IActionResult E() { return Ok(null); }
}
"#,
    );
    let (program, file) = build(&source);
    assert_eq!(argument_display(&program, file, "Ok(\"text\")"), "string");
    assert_eq!(argument_display(&program, file, "Ok(12.5m)"), "decimal");
    assert_eq!(argument_display(&program, file, "Ok(true)"), "bool");
    assert_eq!(argument_type(&program, file, "Ok(null)"), None);
}

#[test]
fn test_factory_call_binds_to_framework_overload() {
    let source = with_models(
        r#"class ItemsController : ControllerBase
{
    public IActionResult Get()
    {
        var item = new Item();
        if (item.Count > 0)
        {
            return Ok();
        }
        return Ok(item);
    }
}
"#,
    );
    let (program, file) = build(&source);
    let with_value = program.invocation_target(file, call(&program, file, "Ok(item)")).unwrap();
    assert_eq!(owner_name(&program, with_value), "ControllerBase");
    assert_eq!(program.parameter_count(with_value), 1);

    let empty = program.invocation_target(file, call(&program, file, "Ok()")).unwrap();
    assert_eq!(program.parameter_count(empty), 0);
    assert_eq!(argument_display(&program, file, "Ok(item)"), "Item");
}

#[test]
fn test_member_named_like_factory_shadows_base() {
    let source = with_models(
        r#"class ItemsController : ControllerBase
{
    private IActionResult Ok(object value) => null;

    public IActionResult Get()
    {
        return Ok(new Item());
    }
}
"#,
    );
    let (program, file) = build(&source);
    let target = program
        .invocation_target(file, call(&program, file, "Ok(new Item())"))
        .unwrap();
    assert_eq!(owner_name(&program, target), "ItemsController");
}

#[test]
fn test_base_overloads_with_other_arity_stay_visible() {
    let source = with_models(
        r#"class ApiBase : ControllerBase
{
    protected OkObjectResult Ok(string message, int code) => null;
}

class ItemsController : ApiBase
{
    public IActionResult Get()
    {
        var x = "hi";
        if (x == "")
        {
            return Ok(x, 1);
        }
        return Ok(x);
    }
}
"#,
    );
    let (program, file) = build(&source);
    let single = program.invocation_target(file, call(&program, file, "Ok(x)")).unwrap();
    assert_eq!(owner_name(&program, single), "ControllerBase");

    let pair = program.invocation_target(file, call(&program, file, "Ok(x, 1)")).unwrap();
    assert_eq!(owner_name(&program, pair), "ApiBase");
}

#[test]
fn test_property_hides_base_methods_of_the_same_name() {
    let source = with_models(
        r#"class ApiBase : ControllerBase
{
    public int Ok { get; set; }
}

class ItemsController : ApiBase
{
    public IActionResult Get() { return Ok(1); }
}
"#,
    );
    let (program, file) = build(&source);
    assert_eq!(program.invocation_target(file, call(&program, file, "Ok(1)")), None);
}

#[test]
fn test_local_function_shadows_members() {
    let source = with_models(
        r#"class ItemsController : ControllerBase
{
    public IActionResult Get()
    {
        IActionResult Ok(object value)
        {
            return null;
        }
        return Ok(new Item());
    }
}
"#,
    );
    let (program, file) = build(&source);
    let target = program
        .invocation_target(file, call(&program, file, "Ok(new Item())"))
        .unwrap();
    assert_eq!(program.symbol(target).unwrap().kind, SymbolKind::LocalFunction);
}

#[test]
fn test_this_and_base_receivers() {
    let source = with_models(
        r#"class ItemsController : ControllerBase
{
    public override OkObjectResult Ok(object value) => null;

    public IActionResult A() { return this.Ok(1); }
    public IActionResult B() { return base.Ok(2); }
}
"#,
    );
    let (program, file) = build(&source);
    let own = program.invocation_target(file, call(&program, file, "this.Ok(1)")).unwrap();
    assert_eq!(owner_name(&program, own), "ItemsController");
    let inherited = program.invocation_target(file, call(&program, file, "base.Ok(2)")).unwrap();
    assert_eq!(owner_name(&program, inherited), "ControllerBase");
}

#[test]
fn test_members_of_constructed_generic_base() {
    let source = with_models(
        r#"class ApiController<T> : ControllerBase
{
    public T Echo(T value) => value;
}

class ItemsController : ApiController<Item>
{
    public IActionResult Get()
    {
        return Ok(Echo(new Item()));
    }
}
"#,
    );
    let (program, file) = build(&source);
    let node = call(&program, file, "Echo(new Item())");
    let target = program.invocation_target(file, node).unwrap();
    let api = program.type_by_metadata_name("ApiController`1").unwrap();
    let definition = program.members_named(api, "Echo")[0];

    assert_ne!(target, definition);
    assert_eq!(program.original_definition(target), definition);
    assert_eq!(program.symbol(target).unwrap().name, "Echo");
    let ty = program.type_of_expression(file, node).unwrap();
    assert_eq!(program.display_type(ty), "Item");

    // Reaching the same member twice yields the same constructed symbol.
    assert_eq!(program.invocation_target(file, node), Some(target));
}

#[test]
fn test_locals_parameters_and_members() {
    let source = with_models(
        r#"class ItemsController : ControllerBase
{
    private readonly Item _default;

    public IActionResult A(int id) { return Ok(id); }
    public IActionResult B() { return Ok(_default); }
    public IActionResult C() { Item typed = null; return Ok(typed); }
    public IActionResult D() { var list = new List<Item>(); return Ok(list); }
    public IActionResult E() { var item = new Item(); return Ok(item.Name); }
    public IActionResult F() { var list = new List<Item>(); return Ok(list.Count); }
}
"#,
    );
    let (program, file) = build(&source);
    assert_eq!(argument_display(&program, file, "Ok(id)"), "int");
    assert_eq!(argument_display(&program, file, "Ok(_default)"), "Item");
    assert_eq!(argument_display(&program, file, "Ok(typed)"), "Item");
    assert_eq!(argument_display(&program, file, "Ok(list)"), "List<Item>");
    assert_eq!(argument_display(&program, file, "Ok(item.Name)"), "string");
    assert_eq!(argument_display(&program, file, "Ok(list.Count)"), "int");
}

#[test]
fn test_await_unwraps_task() {
    let source = with_models(
        r#"class ItemsController : ControllerBase
{
    private Task<Item> LoadAsync() => null;

    public async Task<IActionResult> Get()
    {
        var item = await LoadAsync();
        return Ok(item);
    }
}
"#,
    );
    let (program, file) = build(&source);
    assert_eq!(argument_display(&program, file, "Ok(item)"), "Item");
}

#[test]
fn test_anonymous_and_object_arguments() {
    let source = with_models(
        r#"class ItemsController : ControllerBase
{
    public IActionResult A() { return Ok(new { Id = 1 }); }
    public IActionResult B() { object boxed = 1; return Ok(boxed); }
}
"#,
    );
    let (program, file) = build(&source);
    let anonymous = argument_type(&program, file, "Ok(new { Id = 1 })").unwrap();
    assert!(matches!(program.type_key(anonymous), Some(TypeKey::Anonymous { .. })));
    assert_eq!(program.display_type(anonymous), "<anonymous type>");
    assert_eq!(argument_display(&program, file, "Ok(boxed)"), "object");
}

#[test]
fn test_operators() {
    let source = with_models(
        r#"class ItemsController : ControllerBase
{
    public IActionResult A() { return Ok("n" + 1); }
    public IActionResult B(int x) { return Ok(x >= 2 && x < 10); }
    public IActionResult D(int x) { return Ok(x * 2); }
    public IActionResult E(bool b) { return Ok(!b); }
}
"#,
    );
    let (program, file) = build(&source);
    assert_eq!(argument_display(&program, file, "Ok(\"n\" + 1)"), "string");
    assert_eq!(argument_display(&program, file, "Ok(x >= 2 && x < 10)"), "bool");
    assert_eq!(argument_display(&program, file, "Ok(x * 2)"), "int");
    assert_eq!(argument_display(&program, file, "Ok(!b)"), "bool");
}

#[test]
fn test_static_member_access() {
    let source = with_models(
        r#"static class Factory
{
    public static Item Create() => new Item();
}

class ItemsController : ControllerBase
{
    public IActionResult Get() { return Ok(Factory.Create()); }
}
"#,
    );
    let (program, file) = build(&source);
    assert_eq!(argument_display(&program, file, "Ok(Factory.Create())"), "Item");
}

#[test]
fn test_unresolved_names_are_errors() {
    let source = with_models(
        r#"class ItemsController : ControllerBase
{
    public IActionResult Get() { return Ok(missing); }
}
"#,
    );
    let (program, file) = build(&source);
    let ty = argument_type(&program, file, "Ok(missing)").unwrap();
    assert_eq!(ty, program.interner().error());
    assert_eq!(program.display_type(ty), "?");
}
