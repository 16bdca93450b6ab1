//! Resolution of type syntax and type names.
//!
//! Simple names are looked up in this order: type parameters of enclosing
//! functions and types, types nested in enclosing types, enclosing
//! namespaces from the innermost outwards, then imported namespaces. A name
//! imported from more than one namespace is ambiguous and does not resolve.

use crate::program::Program;
use crate::symbols::SymbolKind;
use crate::types::{IntrinsicKind, TypeArgs, TypeKey};
use smallvec::SmallVec;
use typize_common::{FileId, SymbolId, TypeId};
use typize_parser::{NodeData, NodeIndex, NodeKind};

impl Program {
    /// Resolve a type-syntax node. Unresolvable types become the error type.
    pub fn resolve_type_node(&self, file: FileId, node: NodeIndex) -> TypeId {
        let error = self.interner.error();
        let Some(source) = self.file(file) else {
            return error;
        };
        let arena = &source.arena;
        let Some(n) = arena.get(node) else {
            return error;
        };
        match &n.data {
            NodeData::Predefined(kind) => IntrinsicKind::from_keyword(*kind)
                .map_or(error, |k| self.interner.intrinsic(k)),
            NodeData::WrappedType(inner) => {
                let elem = self.resolve_type_node(file, *inner);
                if elem == error {
                    return error;
                }
                match n.kind {
                    NodeKind::ArrayType => self.interner.intern(TypeKey::Array(elem)),
                    _ => self.interner.intern(TypeKey::Nullable(elem)),
                }
            }
            NodeData::TypeRef(data) => {
                let args: TypeArgs = data
                    .type_arguments
                    .iter()
                    .map(|&arg| self.resolve_type_node(file, arg))
                    .collect();
                let Some(sym) = self.lookup_type_name(file, node, &data.name, args.len()) else {
                    return error;
                };
                match self.symbol(sym).map(|s| s.kind) {
                    Some(SymbolKind::TypeParameter) => {
                        self.interner.intern(TypeKey::TypeParameter(sym))
                    }
                    Some(kind) if kind.is_type() => {
                        self.interner.intern(TypeKey::Named { symbol: sym, args })
                    }
                    _ => error,
                }
            }
            _ => error,
        }
    }

    /// Resolve a (possibly dotted) type name as written at `context`.
    pub fn lookup_type_name(
        &self,
        file: FileId,
        context: NodeIndex,
        name: &str,
        arity: usize,
    ) -> Option<SymbolId> {
        let arena = &self.file(file)?.arena;
        if name.contains('.') {
            return self.lookup_qualified_type_name(file, context, name, arity);
        }

        let scopes: Vec<NodeIndex> = std::iter::once(context)
            .chain(arena.ancestors(context))
            .collect();

        if arity == 0 {
            for &scope in &scopes {
                let Some(node) = arena.get(scope) else {
                    continue;
                };
                let params = match &node.data {
                    NodeData::Method(d) => &d.type_parameters,
                    NodeData::TypeDecl(d) => &d.type_parameters,
                    _ => continue,
                };
                if let Some(&tp) = params
                    .iter()
                    .find(|&&tp| arena.identifier_text(tp) == Some(name))
                {
                    return self.declared_symbol(file, tp);
                }
            }
        }

        for &scope in &scopes {
            if arena.kind(scope).is_some_and(NodeKind::is_type_declaration)
                && let Some(owner) = self.declared_symbol(file, scope)
                && let Some(found) = self.find_type_member(owner, name, arity)
            {
                return Some(found);
            }
        }

        for ns in self.enclosing_namespaces(file, context) {
            if let Some(found) = self.find_type_member(ns, name, arity) {
                return Some(found);
            }
        }

        let mut imported: SmallVec<[SymbolId; 2]> = SmallVec::new();
        for ns in self.imported_namespaces(file) {
            if let Some(found) = self.find_type_member(ns, name, arity)
                && !imported.contains(&found)
            {
                imported.push(found);
            }
        }
        match imported.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    fn lookup_qualified_type_name(
        &self,
        file: FileId,
        context: NodeIndex,
        name: &str,
        arity: usize,
    ) -> Option<SymbolId> {
        let segments: Vec<&str> = name.split('.').collect();
        for ns in self.enclosing_namespaces(file, context) {
            if let Some(found) = self.walk_type_path(ns, &segments, arity) {
                return Some(found);
            }
        }
        // `Outer.Inner` where `Outer` is itself found by simple-name lookup.
        let (first, rest) = segments.split_first()?;
        let outer = self.lookup_type_name(file, context, first, 0)?;
        self.walk_type_path(outer, rest, arity)
    }

    /// Follow `segments` from `start` through namespaces and nested types.
    fn walk_type_path(&self, start: SymbolId, segments: &[&str], arity: usize) -> Option<SymbolId> {
        let mut current = start;
        for (i, segment) in segments.iter().enumerate() {
            let is_last = i + 1 == segments.len();
            let owner = self.symbol(current)?;
            current = owner.members_named(segment).iter().copied().find(|&m| {
                self.symbol(m).is_some_and(|s| {
                    if is_last {
                        s.kind.is_type() && s.arity() == arity
                    } else {
                        s.kind == SymbolKind::Namespace || (s.kind.is_type() && s.arity() == 0)
                    }
                })
            })?;
        }
        Some(current)
    }

    fn find_type_member(&self, owner: SymbolId, name: &str, arity: usize) -> Option<SymbolId> {
        self.symbol(owner)?
            .members_named(name)
            .iter()
            .copied()
            .find(|&m| {
                self.symbol(m)
                    .is_some_and(|s| s.kind.is_type() && s.arity() == arity)
            })
    }

    /// Namespaces enclosing `node`, innermost first, ending with the global one.
    pub(crate) fn enclosing_namespaces(&self, file: FileId, node: NodeIndex) -> Vec<SymbolId> {
        let innermost = self.file(file).and_then(|f| {
            let arena = &f.arena;
            std::iter::once(node)
                .chain(arena.ancestors(node))
                .find(|&idx| arena.kind(idx) == Some(NodeKind::NamespaceDeclaration))
        });
        let mut out = Vec::new();
        let mut current = innermost
            .and_then(|ns| self.declared_symbol(file, ns))
            .or(Some(self.global_namespace));
        while let Some(ns) = current {
            out.push(ns);
            current = self.symbols.get(ns).and_then(|s| s.parent);
        }
        out
    }

    /// Namespaces imported into `file` by usings, global usings included.
    pub(crate) fn imported_namespaces(&self, file: FileId) -> Vec<SymbolId> {
        let local = self.file(file).map(|f| f.usings.as_slice()).unwrap_or(&[]);
        let mut out: Vec<SymbolId> = Vec::new();
        for name in self.global_usings.iter().chain(local.iter()) {
            if let Some(ns) = self.namespace_by_name(name)
                && !out.contains(&ns)
            {
                out.push(ns);
            }
        }
        out
    }

    /// Whether the dotted namespace encloses `position` or is imported into
    /// `file`.
    pub fn is_namespace_in_scope(&self, file: FileId, position: u32, namespace: &str) -> bool {
        let Some(ns) = self.namespace_by_name(namespace) else {
            return false;
        };
        let Some(source) = self.file(file) else {
            return false;
        };
        let mut context = source.arena.find_node_at_offset(position);
        if context.is_none() {
            context = source.arena.root();
        }
        self.enclosing_namespaces(file, context).contains(&ns)
            || self.imported_namespaces(file).contains(&ns)
    }

    /// Whether `sym`'s simple name resolves to `sym` at `position` in `file`.
    pub fn is_name_visible(&self, file: FileId, position: u32, sym: SymbolId) -> bool {
        let Some(source) = self.file(file) else {
            return false;
        };
        let mut context = source.arena.find_node_at_offset(position);
        if context.is_none() {
            context = source.arena.root();
        }
        let Some(target) = self.symbol(sym) else {
            return false;
        };
        let definition = self.original_definition(sym);
        self.lookup_type_name(file, context, &target.name, target.arity()) == Some(definition)
    }
}
