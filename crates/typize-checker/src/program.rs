//! Program: an immutable snapshot of parsed, bound and resolved files.

use crate::binder::{self, BinderState};
use crate::symbols::{Symbol, SymbolArena, SymbolKind};
use crate::types::{IntrinsicKind, TypeArgs, TypeInterner, TypeKey};
use dashmap::DashMap;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::RwLock;
use tracing::{debug, info_span};
use typize_common::{Diagnostic, FileId, SnapshotId, SymbolId, TypeId};
use typize_parser::{NodeArena, NodeData, NodeIndex, NodeKind, parse_file};

/// Framework declarations compiled into every program unless disabled.
pub const FRAMEWORK_SOURCE: &str = include_str!("../lib/framework.cs");
pub const FRAMEWORK_FILE_NAME: &str = "framework.cs";

/// Namespaces imported into every file when implicit usings are enabled.
pub const IMPLICIT_USINGS: &[&str] = &[
    "System",
    "System.Collections.Generic",
    "System.Linq",
    "System.Threading.Tasks",
];

/// Symbol ids at or above this value denote members of constructed generic types.
const CONSTRUCTED_SYMBOL_BASE: u32 = 1 << 31;

pub struct SourceFile {
    pub id: FileId,
    pub name: String,
    pub arena: NodeArena,
    pub parse_diagnostics: Vec<Diagnostic>,
    /// Framework and extra library files are not analyzed.
    pub is_library: bool,
    /// Namespaces named by this file's own (non-global) using directives.
    pub usings: Vec<String>,
}

impl SourceFile {
    pub fn source_text(&self) -> &str {
        self.arena.source_text()
    }

    pub fn has_parse_errors(&self) -> bool {
        self.parse_diagnostics.iter().any(Diagnostic::is_error)
    }
}

#[derive(Clone, Copy, Debug)]
struct ConstructedMember {
    definition: SymbolId,
    receiver: TypeId,
}

/// Members reached through a constructed generic receiver, e.g. `Ok` on
/// `ApiBase<Item>`. Each (definition, receiver) pair gets one stable id.
#[derive(Default)]
struct ConstructedMembers {
    by_key: DashMap<(SymbolId, TypeId), SymbolId>,
    entries: RwLock<Vec<ConstructedMember>>,
}

impl ConstructedMembers {
    fn get_or_create(&self, definition: SymbolId, receiver: TypeId) -> SymbolId {
        if let Some(id) = self.by_key.get(&(definition, receiver)) {
            return *id;
        }
        *self
            .by_key
            .entry((definition, receiver))
            .or_insert_with(|| {
                let mut entries = match self.entries.write() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                let id = SymbolId(CONSTRUCTED_SYMBOL_BASE + entries.len() as u32);
                entries.push(ConstructedMember {
                    definition,
                    receiver,
                });
                id
            })
    }

    fn get(&self, id: SymbolId) -> Option<ConstructedMember> {
        let index = id.0.checked_sub(CONSTRUCTED_SYMBOL_BASE)? as usize;
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.get(index).copied()
    }
}

pub struct Program {
    snapshot: SnapshotId,
    files: Vec<SourceFile>,
    pub(crate) symbols: SymbolArena,
    pub(crate) node_symbols: FxHashMap<(FileId, NodeIndex), SymbolId>,
    types_by_metadata_name: FxHashMap<String, SymbolId>,
    pub(crate) global_namespace: SymbolId,
    /// Implicit usings plus every `global using` in the program.
    pub(crate) global_usings: Vec<String>,
    pub(crate) interner: TypeInterner,
    constructed: ConstructedMembers,
    pub(crate) task_symbol: Option<SymbolId>,
    pub(crate) task_generic_symbol: Option<SymbolId>,
}

pub struct ProgramBuilder {
    files: Vec<(String, String)>,
    libraries: Vec<(String, String)>,
    include_framework: bool,
    implicit_usings: bool,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramBuilder {
    pub fn new() -> Self {
        ProgramBuilder {
            files: Vec::new(),
            libraries: Vec::new(),
            include_framework: true,
            implicit_usings: true,
        }
    }

    /// Add a file to analyze. Ids are assigned in the order files are added.
    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> FileId {
        self.files.push((name.into(), source.into()));
        FileId(self.files.len() as u32 - 1)
    }

    /// Add a library file: bound and resolved, but not analyzed.
    pub fn add_library(&mut self, name: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.libraries.push((name.into(), source.into()));
        self
    }

    pub fn include_framework(&mut self, include: bool) -> &mut Self {
        self.include_framework = include;
        self
    }

    pub fn implicit_usings(&mut self, enabled: bool) -> &mut Self {
        self.implicit_usings = enabled;
        self
    }

    pub fn build(self) -> Program {
        let _span = info_span!(
            "build_program",
            files = self.files.len(),
            libraries = self.libraries.len()
        )
        .entered();

        let mut inputs: Vec<(String, String, bool)> = self
            .files
            .into_iter()
            .map(|(name, text)| (name, text, false))
            .collect();
        if self.include_framework {
            inputs.push((FRAMEWORK_FILE_NAME.to_string(), FRAMEWORK_SOURCE.to_string(), true));
        }
        inputs.extend(self.libraries.into_iter().map(|(name, text)| (name, text, true)));

        let files: Vec<SourceFile> = inputs
            .into_par_iter()
            .enumerate()
            .map(|(i, (name, text, is_library))| {
                let (arena, parse_diagnostics) = parse_file(name.clone(), text);
                let usings = collect_usings(&arena);
                SourceFile {
                    id: FileId(i as u32),
                    name,
                    arena,
                    parse_diagnostics,
                    is_library,
                    usings,
                }
            })
            .collect();

        let mut binder = BinderState::new();
        for file in &files {
            binder.bind_source_file(file.id, &file.arena);
        }

        let mut global_usings: Vec<String> = if self.implicit_usings {
            IMPLICIT_USINGS.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };
        for using in binder.global_usings {
            if !global_usings.contains(&using) {
                global_usings.push(using);
            }
        }

        let task_symbol = binder
            .types_by_metadata_name
            .get("System.Threading.Tasks.Task")
            .copied();
        let task_generic_symbol = binder
            .types_by_metadata_name
            .get("System.Threading.Tasks.Task`1")
            .copied();

        let mut program = Program {
            snapshot: SnapshotId::fresh(),
            files,
            symbols: binder.symbols,
            node_symbols: binder.node_symbols,
            types_by_metadata_name: binder.types_by_metadata_name,
            global_namespace: binder.global_namespace,
            global_usings,
            interner: TypeInterner::new(),
            constructed: ConstructedMembers::default(),
            task_symbol,
            task_generic_symbol,
        };
        program.resolve_declarations();

        debug!(
            snapshot = program.snapshot.0,
            symbols = program.symbols.len(),
            types = program.interner.len(),
            "program built"
        );
        program
    }
}

fn collect_usings(arena: &NodeArena) -> Vec<String> {
    arena
        .nodes()
        .filter_map(|(_, node)| match &node.data {
            NodeData::Using(using) if !using.is_global => Some(using.name.clone()),
            _ => None,
        })
        .collect()
}

/// Declared types of one symbol, computed in parallel and applied afterwards.
struct DeclarationTypes {
    declared_type: Option<TypeId>,
    base_class: Option<TypeId>,
    interfaces: SmallVec<[TypeId; 2]>,
}

impl Program {
    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::new()
    }

    /// Parse and build a program from a single file.
    pub fn from_source(name: &str, source: &str) -> (Program, FileId) {
        let mut builder = ProgramBuilder::new();
        let file = builder.add_file(name, source);
        (builder.build(), file)
    }

    fn resolve_declarations(&mut self) {
        let _span = info_span!("resolve_declarations").entered();
        let updates: Vec<(SymbolId, DeclarationTypes)> = (0..self.symbols.len() as u32)
            .into_par_iter()
            .filter_map(|i| {
                let id = SymbolId(i);
                self.declaration_types(id).map(|types| (id, types))
            })
            .collect();
        for (id, types) in updates {
            if let Some(sym) = self.symbols.get_mut(id) {
                sym.declared_type = types.declared_type;
                sym.base_class = types.base_class;
                sym.interfaces = types.interfaces;
            }
        }
    }

    fn declaration_types(&self, id: SymbolId) -> Option<DeclarationTypes> {
        let sym = self.symbols.get(id)?;
        let mut types = DeclarationTypes {
            declared_type: None,
            base_class: None,
            interfaces: SmallVec::new(),
        };
        match sym.kind {
            SymbolKind::Class | SymbolKind::Interface => {
                for &(file, decl) in &sym.declarations {
                    let arena = &self.file(file)?.arena;
                    let data = arena.get_type_decl(arena.get(decl)?)?;
                    for &base in &data.base_types {
                        let ty = self.resolve_type_node(file, base);
                        let base_kind = match self.interner.lookup(ty) {
                            Some(TypeKey::Named { symbol, .. }) => {
                                self.symbol(symbol).map(|s| s.kind)
                            }
                            _ => None,
                        };
                        match base_kind {
                            Some(SymbolKind::Class)
                                if sym.kind == SymbolKind::Class && types.base_class.is_none() =>
                            {
                                types.base_class = Some(ty);
                            }
                            Some(SymbolKind::Interface) => types.interfaces.push(ty),
                            _ => {}
                        }
                    }
                }
            }
            SymbolKind::Method
            | SymbolKind::LocalFunction
            | SymbolKind::Property
            | SymbolKind::Field
            | SymbolKind::Parameter
            | SymbolKind::Local => {
                let (file, decl) = sym.declaration()?;
                let arena = &self.file(file)?.arena;
                let node = arena.get(decl)?;
                let type_node = match &node.data {
                    NodeData::Method(d) => d.return_type,
                    NodeData::Property(d) => d.type_annotation,
                    NodeData::Parameter(d) => d.type_annotation,
                    NodeData::Variable(d) => d.type_annotation,
                    _ => NodeIndex::NONE,
                };
                if type_node.is_none() {
                    return None;
                }
                types.declared_type = Some(self.resolve_type_node(file, type_node));
            }
            _ => return None,
        }
        Some(types)
    }

    // =========================================================================
    // Files
    // =========================================================================

    pub fn snapshot_id(&self) -> SnapshotId {
        self.snapshot
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Files added with `ProgramBuilder::add_file`, in order.
    pub fn user_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|f| !f.is_library)
    }

    pub fn file_by_name(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn interner(&self) -> &TypeInterner {
        &self.interner
    }

    // =========================================================================
    // Symbols
    // =========================================================================

    /// The symbol for `id`. Members of constructed types share their
    /// definition's symbol data.
    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(self.original_definition(id))
    }

    pub fn original_definition(&self, id: SymbolId) -> SymbolId {
        self.constructed.get(id).map_or(id, |c| c.definition)
    }

    /// The constructed receiver a member was reached through, if any.
    pub fn constructed_receiver(&self, id: SymbolId) -> Option<TypeId> {
        self.constructed.get(id).map(|c| c.receiver)
    }

    pub(crate) fn constructed_member(&self, definition: SymbolId, receiver: TypeId) -> SymbolId {
        self.constructed.get_or_create(definition, receiver)
    }

    pub fn type_by_metadata_name(&self, name: &str) -> Option<SymbolId> {
        self.types_by_metadata_name.get(name).copied()
    }

    pub fn metadata_name(&self, id: SymbolId) -> String {
        binder::metadata_name(&self.symbols, self.original_definition(id))
    }

    pub fn declared_symbol(&self, file: FileId, node: NodeIndex) -> Option<SymbolId> {
        self.node_symbols.get(&(file, node)).copied()
    }

    /// Members named `name` declared directly on `owner`.
    pub fn members_named(&self, owner: SymbolId, name: &str) -> Vec<SymbolId> {
        self.symbol(owner)
            .map(|s| s.members_named(name).to_vec())
            .unwrap_or_default()
    }

    /// Class symbols strictly above `id` in its base-class chain, nearest first.
    pub fn base_class_chain(&self, id: SymbolId) -> Vec<SymbolId> {
        let mut chain = Vec::new();
        let mut current = self.symbol(id).and_then(|s| s.base_class);
        while let Some(ty) = current {
            let Some(TypeKey::Named { symbol, .. }) = self.interner.lookup(ty) else {
                break;
            };
            // Cyclic inheritance is an error in the source; stop rather than loop.
            if symbol == id || chain.contains(&symbol) {
                break;
            }
            chain.push(symbol);
            current = self.symbol(symbol).and_then(|s| s.base_class);
        }
        chain
    }

    pub fn parameter_count(&self, id: SymbolId) -> usize {
        self.symbol(id).map_or(0, |s| s.parameters.len())
    }

    pub fn type_parameter_count(&self, id: SymbolId) -> usize {
        self.symbol(id).map_or(0, Symbol::arity)
    }

    pub fn symbol_name(&self, id: SymbolId) -> String {
        self.symbol(id).map(|s| s.name.clone()).unwrap_or_default()
    }

    /// Dotted namespace of a type, `None` for the global namespace.
    pub fn containing_namespace(&self, id: SymbolId) -> Option<String> {
        let mut current = self.symbol(id)?.parent;
        while let Some(parent) = current {
            let sym = self.symbols.get(parent)?;
            if sym.kind == SymbolKind::Namespace {
                let path = binder::namespace_path(&self.symbols, parent);
                return (!path.is_empty()).then_some(path);
            }
            current = sym.parent;
        }
        None
    }

    /// Enclosing type of a nested type.
    pub fn containing_type(&self, id: SymbolId) -> Option<SymbolId> {
        let parent = self.symbol(self.original_definition(id))?.parent?;
        self.symbol(parent)
            .is_some_and(|s| s.kind.is_type())
            .then_some(parent)
    }

    /// `Namespace.Outer.Name`, without arity suffixes.
    pub fn qualified_name(&self, id: SymbolId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(self.original_definition(id));
        while let Some(sym_id) = current {
            let Some(sym) = self.symbols.get(sym_id) else {
                break;
            };
            if !sym.name.is_empty() {
                segments.push(sym.name.as_str());
            }
            current = sym.parent;
        }
        segments.reverse();
        segments.join(".")
    }

    pub fn namespace_by_name(&self, dotted: &str) -> Option<SymbolId> {
        let mut current = self.global_namespace;
        for segment in dotted.split('.').filter(|s| !s.is_empty()) {
            current = self
                .symbols
                .get(current)?
                .members_named(segment)
                .iter()
                .copied()
                .find(|&m| {
                    self.symbols
                        .get(m)
                        .is_some_and(|s| s.kind == SymbolKind::Namespace)
                })?;
        }
        Some(current)
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn type_key(&self, ty: TypeId) -> Option<TypeKey> {
        self.interner.lookup(ty)
    }

    /// `definition<args...>`; `args` may be empty for non-generic types.
    pub fn construct_type(&self, definition: SymbolId, args: &[TypeId]) -> TypeId {
        let args: TypeArgs = args.iter().copied().collect();
        self.interner.intern(TypeKey::Named {
            symbol: self.original_definition(definition),
            args,
        })
    }

    pub fn intrinsic(&self, kind: IntrinsicKind) -> TypeId {
        self.interner.intrinsic(kind)
    }

    /// `Sym<T1, ...>` over its own type parameters.
    pub(crate) fn self_type(&self, sym: SymbolId) -> TypeId {
        let args: TypeArgs = self
            .symbol(sym)
            .map(|s| {
                s.type_parameters
                    .iter()
                    .map(|&tp| self.interner.intern(TypeKey::TypeParameter(tp)))
                    .collect()
            })
            .unwrap_or_default();
        self.interner.intern(TypeKey::Named { symbol: sym, args })
    }

    /// Type of a type-syntax node or an expression node.
    pub fn type_of_node(&self, file: FileId, node: NodeIndex) -> Option<TypeId> {
        let arena = &self.file(file)?.arena;
        let kind = arena.kind(node)?;
        if kind.is_type_syntax() && !self.is_expression_position(arena, node) {
            return Some(self.resolve_type_node(file, node));
        }
        if kind == NodeKind::Missing {
            return None;
        }
        self.type_of_expression(file, node)
    }

    /// A predefined type used as an expression (`int.Parse`).
    fn is_expression_position(&self, arena: &NodeArena, node: NodeIndex) -> bool {
        arena.kind(arena.parent(node)) == Some(NodeKind::MemberAccessExpression)
    }
}

#[cfg(test)]
#[path = "../tests/program_tests.rs"]
mod tests;
