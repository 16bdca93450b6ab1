use super::*;
use typize_parser::parse_file;

fn bind(sources: &[&str]) -> BinderState {
    let mut binder = BinderState::new();
    for (i, source) in sources.iter().enumerate() {
        let (arena, _) = parse_file(format!("file{i}.cs"), *source);
        binder.bind_source_file(FileId(i as u32), &arena);
    }
    binder
}

fn type_symbol<'a>(binder: &'a BinderState, metadata_name: &str) -> &'a Symbol {
    let id = binder.types_by_metadata_name[metadata_name];
    binder.symbols.get(id).unwrap()
}

#[test]
fn test_namespaces_merge_across_files() {
    let binder = bind(&[
        "namespace Shop.Models { public class Item { } }",
        "namespace Shop.Models { public class Order { } }",
    ]);
    let item = type_symbol(&binder, "Shop.Models.Item");
    let order = type_symbol(&binder, "Shop.Models.Order");
    assert_eq!(item.parent, order.parent);

    let ns = binder.symbols.get(item.parent.unwrap()).unwrap();
    assert_eq!(ns.kind, SymbolKind::Namespace);
    assert_eq!(ns.declarations.len(), 2);
    assert_eq!(namespace_path(&binder.symbols, item.parent.unwrap()), "Shop.Models");
}

#[test]
fn test_file_scoped_namespace() {
    let binder = bind(&["namespace Shop.Api;\n\npublic class ItemsController { }\n"]);
    assert!(binder.types_by_metadata_name.contains_key("Shop.Api.ItemsController"));
}

#[test]
fn test_partial_classes_merge() {
    let binder = bind(&[
        "namespace A { public partial class P { void First() { } } }",
        "namespace A { public partial class P { void Second() { } } }",
    ]);
    let p = type_symbol(&binder, "A.P");
    assert_eq!(p.declarations.len(), 2);
    assert_eq!(p.members_named("First").len(), 1);
    assert_eq!(p.members_named("Second").len(), 1);
}

#[test]
fn test_generic_and_nested_metadata_names() {
    let binder = bind(&["namespace N { class Outer<T> { class Inner { } } class Outer { } }"]);
    let generic = type_symbol(&binder, "N.Outer`1");
    assert_eq!(generic.arity(), 1);
    assert!(binder.types_by_metadata_name.contains_key("N.Outer`1+Inner"));
    let plain = type_symbol(&binder, "N.Outer");
    assert_eq!(plain.arity(), 0);

    let inner = binder.types_by_metadata_name["N.Outer`1+Inner"];
    assert_eq!(metadata_name(&binder.symbols, inner), "N.Outer`1+Inner");
}

#[test]
fn test_global_usings_are_collected() {
    let binder = bind(&[
        "global using Shop.Models;\nclass A { }",
        "global using Shop.Models;\nglobal using Shop.Data;\nclass B { }",
    ]);
    assert_eq!(binder.global_usings, vec!["Shop.Models", "Shop.Data"]);
}

#[test]
fn test_parameters_and_required_count() {
    let binder = bind(&["class C { void M(int a, int b = 2) { } }"]);
    let c = type_symbol(&binder, "C");
    let m = binder.symbols.get(c.members_named("M")[0]).unwrap();
    assert_eq!(m.kind, SymbolKind::Method);
    assert_eq!(m.parameters.len(), 2);
    assert_eq!(m.required_parameter_count, 1);
    assert!(!m.accepts_argument_count(0));
    assert!(m.accepts_argument_count(1));
    assert!(m.accepts_argument_count(2));
    assert!(!m.accepts_argument_count(3));
}

#[test]
fn test_constructors_use_reserved_name() {
    let binder = bind(&["class C { public C(int x) { } }"]);
    let c = type_symbol(&binder, "C");
    let ctors = c.members_named(CONSTRUCTOR_NAME);
    assert_eq!(ctors.len(), 1);
    assert_eq!(binder.symbols.get(ctors[0]).unwrap().kind, SymbolKind::Constructor);
    assert!(c.members_named("C").is_empty());
}

#[test]
fn test_locals_and_local_functions() {
    let binder = bind(&[r#"class C {
    void M() {
        var x = 1;
        int Helper() {
            int y = 2;
            return y;
        }
    }
}"#]);
    let locals: Vec<&Symbol> = binder
        .symbols
        .iter()
        .map(|(_, s)| s)
        .filter(|s| matches!(s.kind, SymbolKind::Local | SymbolKind::LocalFunction))
        .collect();
    let names: Vec<&str> = locals.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["x", "Helper", "y"]);

    let helper = locals[1];
    assert_eq!(helper.kind, SymbolKind::LocalFunction);
    let m = binder.symbols.get(helper.parent.unwrap()).unwrap();
    assert_eq!(m.name, "M");
    let y = locals[2];
    assert_eq!(binder.symbols.get(y.parent.unwrap()).unwrap().name, "Helper");
}

#[test]
fn test_every_declaration_node_is_mapped() {
    let (arena, _) = parse_file("a.cs", "class C { int f; string P { get; } void M(int a) { } }");
    let mut binder = BinderState::new();
    binder.bind_source_file(FileId(0), &arena);
    for (idx, node) in arena.nodes() {
        let expects_symbol = matches!(
            node.kind,
            NodeKind::ClassDeclaration
                | NodeKind::FieldDeclaration
                | NodeKind::PropertyDeclaration
                | NodeKind::MethodDeclaration
                | NodeKind::Parameter
        );
        if expects_symbol {
            assert!(
                binder.node_symbols.contains_key(&(FileId(0), idx)),
                "{:?} has no symbol",
                node.kind
            );
        }
    }
}
