//! Binder: creates symbols for declarations.
//!
//! Binding is purely syntactic. Namespaces merge across files, partial
//! classes merge into one symbol, and every declaration node is mapped to its
//! symbol. Declared types are resolved later, once every type is known.

use crate::symbols::{Symbol, SymbolArena, SymbolKind};
use rustc_hash::FxHashMap;
use tracing::trace;
use typize_common::{FileId, SymbolId};
use typize_parser::node::MethodData;
use typize_parser::{ModifierFlags, NodeArena, NodeIndex, NodeKind};

/// Member-table key for constructors.
pub const CONSTRUCTOR_NAME: &str = ".ctor";

pub struct BinderState {
    pub symbols: SymbolArena,
    pub node_symbols: FxHashMap<(FileId, NodeIndex), SymbolId>,
    pub types_by_metadata_name: FxHashMap<String, SymbolId>,
    pub global_namespace: SymbolId,
    /// Namespaces imported by `global using` directives.
    pub global_usings: Vec<String>,
}

impl Default for BinderState {
    fn default() -> Self {
        Self::new()
    }
}

impl BinderState {
    pub fn new() -> Self {
        let mut symbols = SymbolArena::new();
        let global_namespace = symbols.alloc(Symbol::new(SymbolKind::Namespace, "", None));
        BinderState {
            symbols,
            node_symbols: FxHashMap::default(),
            types_by_metadata_name: FxHashMap::default(),
            global_namespace,
            global_usings: Vec::new(),
        }
    }

    pub fn bind_source_file(&mut self, file: FileId, arena: &NodeArena) {
        let Some(root) = arena.get(arena.root()) else {
            return;
        };
        let Some(source) = arena.get_source_file(root) else {
            return;
        };
        let global = self.global_namespace;
        for &member in &source.members {
            self.bind_namespace_member(file, arena, member, global);
        }
    }

    fn bind_namespace_member(&mut self, file: FileId, arena: &NodeArena, idx: NodeIndex, ns: SymbolId) {
        let Some(node) = arena.get(idx) else {
            return;
        };
        match node.kind {
            NodeKind::UsingDirective => {
                if let Some(using) = arena.get_using(node)
                    && using.is_global
                    && !self.global_usings.contains(&using.name)
                {
                    self.global_usings.push(using.name.clone());
                }
            }
            NodeKind::NamespaceDeclaration => {
                let Some(data) = arena.get_namespace(node) else {
                    return;
                };
                let ns_sym = self.declare_namespace(ns, &data.name, file, idx);
                for &member in &data.members {
                    self.bind_namespace_member(file, arena, member, ns_sym);
                }
            }
            NodeKind::ClassDeclaration | NodeKind::InterfaceDeclaration => {
                self.bind_type_declaration(file, arena, idx, ns);
            }
            _ => {}
        }
    }

    fn declare_namespace(&mut self, parent: SymbolId, dotted: &str, file: FileId, idx: NodeIndex) -> SymbolId {
        let mut current = parent;
        for segment in dotted.split('.').filter(|s| !s.is_empty()) {
            let existing = self.symbols.get(current).and_then(|s| {
                s.members_named(segment).iter().copied().find(|&m| {
                    self.symbols
                        .get(m)
                        .is_some_and(|m| m.kind == SymbolKind::Namespace)
                })
            });
            current = match existing {
                Some(ns) => ns,
                None => {
                    let ns = self
                        .symbols
                        .alloc(Symbol::new(SymbolKind::Namespace, segment, Some(current)));
                    self.symbols.add_member(current, segment, ns);
                    ns
                }
            };
        }
        if let Some(sym) = self.symbols.get_mut(current) {
            sym.declarations.push((file, idx));
        }
        self.node_symbols.insert((file, idx), current);
        current
    }

    fn bind_type_declaration(&mut self, file: FileId, arena: &NodeArena, idx: NodeIndex, parent: SymbolId) -> Option<SymbolId> {
        let node = arena.get(idx)?;
        let data = arena.get_type_decl(node)?;
        let name = arena.identifier_text(data.name).unwrap_or_default().to_string();
        if name.is_empty() {
            return None;
        }
        let kind = if node.kind == NodeKind::InterfaceDeclaration {
            SymbolKind::Interface
        } else {
            SymbolKind::Class
        };
        let metadata_name = metadata_name_in(&self.symbols, parent, &name, data.type_parameters.len());

        // Partial declarations merge into the first symbol.
        let existing = self
            .types_by_metadata_name
            .get(&metadata_name)
            .copied()
            .filter(|_| data.modifiers.contains(ModifierFlags::PARTIAL));

        let sym = match existing {
            Some(sym) => {
                if let Some(s) = self.symbols.get_mut(sym) {
                    s.declarations.push((file, idx));
                }
                let params = self
                    .symbols
                    .get(sym)
                    .map(|s| s.type_parameters.clone())
                    .unwrap_or_default();
                for (&tp, &param_sym) in data.type_parameters.iter().zip(params.iter()) {
                    self.node_symbols.insert((file, tp), param_sym);
                }
                sym
            }
            None => {
                let mut symbol = Symbol::new(kind, name.clone(), Some(parent));
                symbol.modifiers = data.modifiers;
                symbol.declarations.push((file, idx));
                let sym = self.symbols.alloc(symbol);
                self.symbols.add_member(parent, &name, sym);
                self.bind_type_parameters(file, arena, &data.type_parameters.nodes, sym);
                self.types_by_metadata_name
                    .entry(metadata_name.clone())
                    .or_insert(sym);
                trace!(name = %metadata_name, symbol = sym.0, "bound type");
                sym
            }
        };
        self.node_symbols.insert((file, idx), sym);

        for &member in &data.members {
            self.bind_member(file, arena, member, sym);
        }
        Some(sym)
    }

    fn bind_type_parameters(&mut self, file: FileId, arena: &NodeArena, nodes: &[NodeIndex], owner: SymbolId) {
        for &tp in nodes {
            let name = arena.identifier_text(tp).unwrap_or_default().to_string();
            let param = self
                .symbols
                .alloc(Symbol::new(SymbolKind::TypeParameter, name, Some(owner)));
            if let Some(s) = self.symbols.get_mut(param) {
                s.declarations.push((file, tp));
            }
            if let Some(o) = self.symbols.get_mut(owner) {
                o.type_parameters.push(param);
            }
            self.node_symbols.insert((file, tp), param);
        }
    }

    fn bind_member(&mut self, file: FileId, arena: &NodeArena, idx: NodeIndex, owner: SymbolId) {
        let Some(node) = arena.get(idx) else {
            return;
        };
        match node.kind {
            NodeKind::ClassDeclaration | NodeKind::InterfaceDeclaration => {
                self.bind_type_declaration(file, arena, idx, owner);
            }
            NodeKind::MethodDeclaration => {
                self.bind_function(file, arena, idx, SymbolKind::Method, owner);
            }
            NodeKind::ConstructorDeclaration => {
                self.bind_function(file, arena, idx, SymbolKind::Constructor, owner);
            }
            NodeKind::PropertyDeclaration | NodeKind::FieldDeclaration => {
                let Some(data) = arena.get_property(node) else {
                    return;
                };
                let kind = if node.kind == NodeKind::PropertyDeclaration {
                    SymbolKind::Property
                } else {
                    SymbolKind::Field
                };
                let name = arena.identifier_text(data.name).unwrap_or_default().to_string();
                let mut symbol = Symbol::new(kind, name.clone(), Some(owner));
                symbol.modifiers = data.modifiers;
                symbol.declarations.push((file, idx));
                let sym = self.symbols.alloc(symbol);
                self.symbols.add_member(owner, &name, sym);
                self.node_symbols.insert((file, idx), sym);
            }
            _ => {}
        }
    }

    fn bind_function(&mut self, file: FileId, arena: &NodeArena, idx: NodeIndex, kind: SymbolKind, owner: SymbolId) -> Option<SymbolId> {
        let node = arena.get(idx)?;
        let data: &MethodData = arena.get_method(node)?;
        let name = match kind {
            SymbolKind::Constructor => CONSTRUCTOR_NAME.to_string(),
            _ => arena.identifier_text(data.name).unwrap_or_default().to_string(),
        };

        let mut symbol = Symbol::new(kind, name.clone(), Some(owner));
        symbol.modifiers = data.modifiers;
        symbol.declarations.push((file, idx));
        let sym = self.symbols.alloc(symbol);
        self.symbols.add_member(owner, &name, sym);
        self.node_symbols.insert((file, idx), sym);
        self.bind_type_parameters(file, arena, &data.type_parameters.nodes, sym);

        let mut required = 0;
        for &param in &data.parameters {
            let Some(param_node) = arena.get(param) else {
                continue;
            };
            let Some(param_data) = arena.get_parameter(param_node) else {
                continue;
            };
            if param_data.initializer.is_none() {
                required += 1;
            }
            let param_name = arena
                .identifier_text(param_data.name)
                .unwrap_or_default()
                .to_string();
            let mut param_symbol = Symbol::new(SymbolKind::Parameter, param_name, Some(sym));
            param_symbol.declarations.push((file, param));
            let param_sym = self.symbols.alloc(param_symbol);
            self.node_symbols.insert((file, param), param_sym);
            if let Some(s) = self.symbols.get_mut(sym) {
                s.parameters.push(param_sym);
            }
        }
        if let Some(s) = self.symbols.get_mut(sym) {
            s.required_parameter_count = required;
        }

        self.bind_body(file, arena, data.body, sym);
        self.bind_body(file, arena, data.expression_body, sym);
        Some(sym)
    }

    /// Bind locals and local functions declared anywhere under `idx`.
    fn bind_body(&mut self, file: FileId, arena: &NodeArena, idx: NodeIndex, owner: SymbolId) {
        let Some(node) = arena.get(idx) else {
            return;
        };
        match node.kind {
            NodeKind::LocalFunction => {
                self.bind_function(file, arena, idx, SymbolKind::LocalFunction, owner);
                return;
            }
            NodeKind::LocalDeclaration => {
                if let Some(data) = arena.get_variable(node) {
                    let name = arena.identifier_text(data.name).unwrap_or_default().to_string();
                    let mut symbol = Symbol::new(SymbolKind::Local, name, Some(owner));
                    symbol.declarations.push((file, idx));
                    let sym = self.symbols.alloc(symbol);
                    self.node_symbols.insert((file, idx), sym);
                }
            }
            _ => {}
        }
        for child in arena.children(idx) {
            self.bind_body(file, arena, child, owner);
        }
    }
}

/// Dotted path of a namespace symbol; empty for the global namespace.
pub fn namespace_path(symbols: &SymbolArena, ns: SymbolId) -> String {
    let mut segments = Vec::new();
    let mut current = Some(ns);
    while let Some(id) = current {
        let Some(sym) = symbols.get(id) else {
            break;
        };
        if sym.kind != SymbolKind::Namespace {
            break;
        }
        if !sym.name.is_empty() {
            segments.push(sym.name.as_str());
        }
        current = sym.parent;
    }
    segments.reverse();
    segments.join(".")
}

/// Metadata name of a type named `name` with `arity` type parameters declared
/// under `parent`: ``Ns.Name`N`` for namespace members, ``Outer+Name`` for
/// nested types.
pub fn metadata_name_in(symbols: &SymbolArena, parent: SymbolId, name: &str, arity: usize) -> String {
    let mut out = String::new();
    if let Some(p) = symbols.get(parent) {
        if p.kind == SymbolKind::Namespace {
            let path = namespace_path(symbols, parent);
            if !path.is_empty() {
                out.push_str(&path);
                out.push('.');
            }
        } else if p.kind.is_type() {
            out.push_str(&metadata_name(symbols, parent));
            out.push('+');
        }
    }
    out.push_str(name);
    if arity > 0 {
        out.push('`');
        out.push_str(&arity.to_string());
    }
    out
}

/// Metadata name of a bound type symbol.
pub fn metadata_name(symbols: &SymbolArena, sym: SymbolId) -> String {
    match symbols.get(sym) {
        Some(s) => match s.parent {
            Some(parent) => metadata_name_in(symbols, parent, &s.name, s.arity()),
            None => s.name.clone(),
        },
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../tests/binder_tests.rs"]
mod tests;
