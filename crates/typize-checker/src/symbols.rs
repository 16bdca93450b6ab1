//! Symbol table.

use indexmap::IndexMap;
use smallvec::SmallVec;
use typize_common::{FileId, SymbolId, TypeId};
use typize_parser::{ModifierFlags, NodeIndex};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Namespace,
    Class,
    Interface,
    TypeParameter,
    Method,
    Constructor,
    Property,
    Field,
    Parameter,
    Local,
    LocalFunction,
}

impl SymbolKind {
    pub fn is_type(self) -> bool {
        matches!(self, SymbolKind::Class | SymbolKind::Interface)
    }

    /// Symbols that can be the target of an invocation.
    pub fn is_invocable(self) -> bool {
        matches!(
            self,
            SymbolKind::Method | SymbolKind::Constructor | SymbolKind::LocalFunction
        )
    }

    /// Symbols whose declared type is the type of a value.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            SymbolKind::Property | SymbolKind::Field | SymbolKind::Parameter | SymbolKind::Local
        )
    }
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    /// Namespace, type or function that declares this symbol.
    pub parent: Option<SymbolId>,
    /// Namespaces may have many declarations; everything else has at most one.
    pub declarations: SmallVec<[(FileId, NodeIndex); 1]>,
    pub modifiers: ModifierFlags,
    pub type_parameters: SmallVec<[SymbolId; 2]>,
    /// Nested namespaces, types and members by name, in declaration order.
    pub members: IndexMap<String, SmallVec<[SymbolId; 1]>>,
    pub parameters: SmallVec<[SymbolId; 4]>,
    /// Parameters without a default value.
    pub required_parameter_count: usize,
    /// Return type for functions, value type for properties, fields,
    /// parameters and explicitly typed locals. `None` until resolved.
    pub declared_type: Option<TypeId>,
    pub base_class: Option<TypeId>,
    pub interfaces: SmallVec<[TypeId; 2]>,
}

impl Symbol {
    pub fn new(kind: SymbolKind, name: impl Into<String>, parent: Option<SymbolId>) -> Self {
        Symbol {
            kind,
            name: name.into(),
            parent,
            declarations: SmallVec::new(),
            modifiers: ModifierFlags::empty(),
            type_parameters: SmallVec::new(),
            members: IndexMap::new(),
            parameters: SmallVec::new(),
            required_parameter_count: 0,
            declared_type: None,
            base_class: None,
            interfaces: SmallVec::new(),
        }
    }

    pub fn declaration(&self) -> Option<(FileId, NodeIndex)> {
        self.declarations.first().copied()
    }

    /// Number of type parameters.
    pub fn arity(&self) -> usize {
        self.type_parameters.len()
    }

    pub fn members_named(&self, name: &str) -> &[SymbolId] {
        self.members.get(name).map_or(&[], |ids| ids.as_slice())
    }

    /// Whether an invocation with `argc` arguments can bind to this function.
    pub fn accepts_argument_count(&self, argc: usize) -> bool {
        self.required_parameter_count <= argc && argc <= self.parameters.len()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> Self {
        SymbolArena::default()
    }

    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    #[inline]
    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }

    /// Register `child` under `name` in `parent`'s member table.
    pub fn add_member(&mut self, parent: SymbolId, name: &str, child: SymbolId) {
        if let Some(p) = self.get_mut(parent) {
            p.members.entry(name.to_string()).or_default().push(child);
        }
    }
}
