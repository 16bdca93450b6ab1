use super::*;
use crate::parse_file;

fn parse(source: &str) -> (NodeArena, Vec<Diagnostic>) {
    parse_file("test.cs", source)
}

fn find_named(arena: &NodeArena, kind: NodeKind, name: &str) -> NodeIndex {
    arena
        .nodes()
        .find(|(idx, node)| node.kind == kind && arena.declaration_name(*idx) == Some(name))
        .map(|(idx, _)| idx)
        .unwrap_or(NodeIndex::NONE)
}

fn method<'a>(arena: &'a NodeArena, name: &str) -> &'a MethodData {
    let idx = find_named(arena, NodeKind::MethodDeclaration, name);
    arena.get_method(arena.get(idx).unwrap()).unwrap()
}

const CONTROLLER: &str = r#"using System;
using Microsoft.AspNetCore.Mvc;

namespace Shop.Api
{
    [ApiController]
    public class ProductsController : ControllerBase, IDisposable
    {
        private readonly string _name = "p";

        public string Title { get; set; } = "";

        public ProductsController(string name) : base()
        {
            _name = name;
        }

        [HttpGet("{id}")]
        public IActionResult Get(int id)
        {
            var x = "value";
            return Ok(x);
        }
    }
}
"#;

#[test]
fn test_parse_controller_structure() {
    let (arena, diagnostics) = parse(CONTROLLER);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let root = arena.get(arena.root()).unwrap();
    let file = arena.get_source_file(root).unwrap();
    assert_eq!(file.members.len(), 3);

    let using = arena.get(file.members.nodes[1]).unwrap();
    assert_eq!(arena.get_using(using).unwrap().name, "Microsoft.AspNetCore.Mvc");

    let ns = arena.get(file.members.nodes[2]).unwrap();
    let ns_data = arena.get_namespace(ns).unwrap();
    assert_eq!(ns_data.name, "Shop.Api");
    assert!(!ns_data.is_file_scoped);

    let class_idx = find_named(&arena, NodeKind::ClassDeclaration, "ProductsController");
    let class = arena.get_type_decl(arena.get(class_idx).unwrap()).unwrap();
    assert!(class.modifiers.contains(ModifierFlags::PUBLIC));
    assert_eq!(class.base_types.len(), 2);
    assert_eq!(class.members.len(), 4);
    assert_eq!(arena.parent(class_idx), file.members.nodes[2]);

    let kinds: Vec<NodeKind> = class
        .members
        .iter()
        .map(|&m| arena.kind(m).unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::FieldDeclaration,
            NodeKind::PropertyDeclaration,
            NodeKind::ConstructorDeclaration,
            NodeKind::MethodDeclaration,
        ]
    );
}

#[test]
fn test_method_return_type_spans() {
    let (arena, _) = parse(CONTROLLER);
    let get = method(&arena, "Get");
    let ret = arena.get(get.return_type).unwrap();
    assert_eq!(ret.kind, NodeKind::TypeReference);
    assert_eq!(arena.node_text(get.return_type), "IActionResult");

    let start = CONTROLLER.find("IActionResult Get").unwrap() as u32;
    assert_eq!(ret.start, start);
    // Leading trivia is the single space after `public`.
    assert_eq!(ret.pos, start - 1);
    assert!(get.body.is_some());
    assert!(get.expression_body.is_none());
    assert_eq!(get.parameters.len(), 1);
}

#[test]
fn test_return_statement_and_invocation() {
    let (arena, _) = parse(CONTROLLER);
    let get = method(&arena, "Get");
    let body = arena.get_block(arena.get(get.body).unwrap()).unwrap();
    assert_eq!(body.statements.len(), 2);

    let local = arena.get(body.statements.nodes[0]).unwrap();
    assert_eq!(local.kind, NodeKind::LocalDeclaration);
    assert!(arena.get_variable(local).unwrap().type_annotation.is_none());

    let ret = arena.get(body.statements.nodes[1]).unwrap();
    assert_eq!(ret.kind, NodeKind::ReturnStatement);
    let call_idx = arena.get_wrapped(ret);
    let call = arena.get_call_expr(arena.get(call_idx).unwrap()).unwrap();
    assert_eq!(arena.identifier_text(call.expression), Some("Ok"));
    assert_eq!(call.arguments.len(), 1);
    assert_eq!(arena.node_text(call_idx), "Ok(x)");
}

#[test]
fn test_async_method_with_nested_generics() {
    let source = "class C { public async Task<ActionResult<List<string>>> Get() => await Load(); }";
    let (arena, diagnostics) = parse(source);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let get = method(&arena, "Get");
    assert!(get.is_async());
    assert!(get.body.is_none());
    assert_eq!(
        arena.kind(get.expression_body),
        Some(NodeKind::AwaitExpression)
    );

    let task = arena.get(get.return_type).unwrap();
    let task_ref = arena.get_type_ref(task).unwrap();
    assert_eq!(task_ref.name, "Task");
    let inner = arena.get(task_ref.type_arguments.nodes[0]).unwrap();
    let inner_ref = arena.get_type_ref(inner).unwrap();
    assert_eq!(inner_ref.name, "ActionResult");
    assert_eq!(
        arena.node_text(task_ref.type_arguments.nodes[0]),
        "ActionResult<List<string>>"
    );
}

#[test]
fn test_local_function_and_typed_local() {
    let source = r#"class C {
    IActionResult M() {
        List<int> items = Make();
        IActionResult Ok(object value) { return null; }
        async Task Run() { }
        return Ok(items);
    }
}"#;
    let (arena, diagnostics) = parse(source);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let m = method(&arena, "M");
    let body = arena.get_block(arena.get(m.body).unwrap()).unwrap();
    let kinds: Vec<NodeKind> = body
        .statements
        .iter()
        .map(|&s| arena.kind(s).unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::LocalDeclaration,
            NodeKind::LocalFunction,
            NodeKind::LocalFunction,
            NodeKind::ReturnStatement,
        ]
    );
    let ok = find_named(&arena, NodeKind::LocalFunction, "Ok");
    assert_eq!(arena.declaration_name(ok), Some("Ok"));
    let run = find_named(&arena, NodeKind::LocalFunction, "Run");
    assert!(arena.get_method(arena.get(run).unwrap()).unwrap().is_async());
}

#[test]
fn test_if_else_and_binary_operators() {
    let source = r#"class C {
    IActionResult M(int a) {
        if (a >= 1 && a != 3) { return Ok(a); } else return NotFound();
    }
}"#;
    let (arena, diagnostics) = parse(source);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let if_idx = arena
        .nodes()
        .find(|(_, n)| n.kind == NodeKind::IfStatement)
        .map(|(i, _)| i)
        .unwrap();
    let if_data = arena.get_if_statement(arena.get(if_idx).unwrap()).unwrap();
    let cond = arena.get_binary_expr(arena.get(if_data.condition).unwrap()).unwrap();
    assert_eq!(cond.operator, SyntaxKind::AmpersandAmpersand);
    let left = arena.get_binary_expr(arena.get(cond.left).unwrap()).unwrap();
    assert_eq!(left.operator, SyntaxKind::GreaterThanEquals);
    assert_eq!(arena.kind(if_data.then_statement), Some(NodeKind::Block));
    assert_eq!(
        arena.kind(if_data.else_statement),
        Some(NodeKind::ReturnStatement)
    );
}

#[test]
fn test_object_creation_and_anonymous_object() {
    let source = r#"class C {
    object M() {
        var p = new Product("a") { Name = "n", Price = 1.5m };
        return new { p.Name, Total = 2 };
    }
}"#;
    let (arena, diagnostics) = parse(source);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let (_, creation) = arena
        .nodes()
        .find(|(_, n)| n.kind == NodeKind::ObjectCreationExpression)
        .unwrap();
    let data = arena.get_object_creation(creation).unwrap();
    assert_eq!(arena.node_text(data.type_node), "Product");
    assert_eq!(data.arguments.len(), 1);
    assert_eq!(data.initializers.len(), 2);

    let (_, anon) = arena
        .nodes()
        .find(|(_, n)| n.kind == NodeKind::AnonymousObjectCreationExpression)
        .unwrap();
    let anon_data = arena.get_object_creation(anon).unwrap();
    assert!(anon_data.type_node.is_none());
    assert_eq!(anon_data.initializers.len(), 2);
}

#[test]
fn test_file_scoped_namespace_and_global_using() {
    let source = "global using System.Linq;\nnamespace A.B;\npublic interface IThing { string Name(); }\nclass D : IThing { }";
    let (arena, diagnostics) = parse(source);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let root = arena.get(arena.root()).unwrap();
    let file = arena.get_source_file(root).unwrap();
    let using = arena.get_using(arena.get(file.members.nodes[0]).unwrap()).unwrap();
    assert!(using.is_global);
    assert_eq!(using.name, "System.Linq");

    let ns = arena.get_namespace(arena.get(file.members.nodes[1]).unwrap()).unwrap();
    assert!(ns.is_file_scoped);
    assert_eq!(ns.members.len(), 2);
    assert_eq!(
        arena.kind(ns.members.nodes[0]),
        Some(NodeKind::InterfaceDeclaration)
    );
}

#[test]
fn test_generic_class_with_constraints() {
    let source = "abstract class Base<T> : ControllerBase where T : class { protected T Value; }";
    let (arena, diagnostics) = parse(source);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let idx = find_named(&arena, NodeKind::ClassDeclaration, "Base");
    let decl = arena.get_type_decl(arena.get(idx).unwrap()).unwrap();
    assert!(decl.modifiers.contains(ModifierFlags::ABSTRACT));
    assert_eq!(decl.type_parameters.len(), 1);
    assert_eq!(arena.identifier_text(decl.type_parameters.nodes[0]), Some("T"));
    assert_eq!(decl.members.len(), 1);
}

#[test]
fn test_missing_semicolon_reports_and_recovers() {
    let source = "class C { IActionResult M() { var x = 1 return Ok(x); } }";
    let (arena, diagnostics) = parse(source);
    assert!(!diagnostics.is_empty());
    assert_eq!(
        diagnostics[0].code,
        typize_common::diagnostics::diagnostic_codes::TOKEN_EXPECTED
    );
    // The method and its return statement are still there.
    let m = method(&arena, "M");
    assert!(m.body.is_some());
    assert!(
        arena
            .nodes()
            .any(|(_, n)| n.kind == NodeKind::ReturnStatement)
    );
}

#[test]
fn test_garbage_input_terminates() {
    let source = ") ] } class { ( => ; namespace";
    let (arena, diagnostics) = parse(source);
    assert!(!diagnostics.is_empty());
    assert!(arena.root().is_some());
}

#[test]
fn test_find_node_at_offset() {
    let (arena, _) = parse(CONTROLLER);
    let offset = CONTROLLER.find("Ok(x)").unwrap() as u32;
    let idx = arena.find_node_at_offset(offset);
    assert_eq!(arena.kind(idx), Some(NodeKind::Identifier));
    assert_eq!(arena.identifier_text(idx), Some("Ok"));

    let call = arena.parent(idx);
    assert_eq!(arena.kind(call), Some(NodeKind::InvocationExpression));
    let span = arena.node_span(call).unwrap();
    assert_eq!(
        arena.find_node_with_span(span, NodeKind::InvocationExpression),
        call
    );
}

#[test]
fn test_nullable_and_array_types() {
    let source = "class C { int? A; string[] B; }";
    let (arena, diagnostics) = parse(source);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert!(arena.nodes().any(|(_, n)| n.kind == NodeKind::NullableType));
    let (_, array) = arena
        .nodes()
        .find(|(_, n)| n.kind == NodeKind::ArrayType)
        .unwrap();
    assert_eq!(arena.node_text(arena.get_wrapped(array)), "string");
}

#[test]
fn test_typed_accessors_borrow_from_the_node() {
    let (arena, _) = parse(CONTROLLER);
    let idx = find_named(&arena, NodeKind::MethodDeclaration, "Get");
    let node = arena.get(idx).unwrap().clone();
    // The typed view outlives the arena it was requested through.
    let data = {
        let (scratch, _) = parse("");
        scratch.get_method(&node).unwrap()
    };
    assert_eq!(data.parameters.len(), 1);
    assert!(data.body.is_some());
}
