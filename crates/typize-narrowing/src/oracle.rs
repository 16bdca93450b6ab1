//! The semantic oracle: everything the engine knows about a program.
//!
//! The engine never resolves names or computes types itself. It reads the
//! host's syntax trees and asks the oracle for symbols and types. All answers
//! refer to one immutable snapshot, identified by `snapshot_id`.

use smallvec::SmallVec;
use typize_common::{FileId, SnapshotId, SymbolId, TypeId};
use typize_parser::{NodeArena, NodeIndex};

/// Structural view of a type, as much as the engine needs to classify it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeShape {
    /// The universal top type (`object`, `dynamic`), with its keyword.
    Top(&'static str),
    /// A type the host could not resolve.
    Error,
    /// The type of an anonymous object creation.
    Anonymous,
    /// A predefined type other than the top type, e.g. `int` or `string`.
    Keyword(&'static str),
    /// A class or interface, with type arguments if constructed. Arguments
    /// of generic containing types come first, outermost first.
    Named {
        definition: SymbolId,
        arguments: SmallVec<[TypeId; 2]>,
    },
    Array(TypeId),
    Nullable(TypeId),
    TypeParameter(String),
}

pub trait SemanticOracle: Sync {
    /// Identity of the snapshot every answer refers to.
    fn snapshot_id(&self) -> SnapshotId;

    /// Syntax tree of a file.
    fn arena(&self, file: FileId) -> Option<&NodeArena>;

    /// Name of a file, as diagnostics report it.
    fn file_name(&self, file: FileId) -> Option<&str>;

    /// Type symbol with the given metadata name (``Ns.Name`N``, ``Outer+Inner``).
    fn type_by_metadata_name(&self, name: &str) -> Option<SymbolId>;

    /// Symbol declared by a declaration node.
    fn declared_symbol(&self, file: FileId, node: NodeIndex) -> Option<SymbolId>;

    /// Method or local function an invocation binds to.
    fn invocation_target(&self, file: FileId, call: NodeIndex) -> Option<SymbolId>;

    /// Classes strictly above `symbol` in its base-class chain, nearest first.
    /// Interfaces never appear.
    fn base_class_chain(&self, symbol: SymbolId) -> Vec<SymbolId>;

    fn symbols_identical(&self, a: SymbolId, b: SymbolId) -> bool {
        a == b
    }

    /// The unconstructed definition of a member reached through a constructed
    /// generic type; any other symbol is its own original definition.
    fn original_definition(&self, symbol: SymbolId) -> SymbolId;

    /// Members named `name` declared directly on `owner`.
    fn members_named(&self, owner: SymbolId, name: &str) -> Vec<SymbolId>;

    fn parameter_count(&self, symbol: SymbolId) -> usize;

    fn type_parameter_count(&self, symbol: SymbolId) -> usize;

    /// Simple name of a symbol.
    fn symbol_name(&self, symbol: SymbolId) -> String;

    /// Namespace declaring a type, `None` for the global namespace.
    fn containing_namespace(&self, symbol: SymbolId) -> Option<String>;

    /// Type a nested type is declared in, `None` for namespace members.
    fn containing_type(&self, symbol: SymbolId) -> Option<SymbolId>;

    /// Whether `namespace` encloses `position` or is imported into `file`.
    fn namespace_in_scope(&self, file: FileId, position: u32, namespace: &str) -> bool;

    /// Whether the simple name of `symbol` refers to `symbol` at `position`.
    fn visible_from(&self, file: FileId, position: u32, symbol: SymbolId) -> bool;

    /// Type of an expression or type-syntax node. `None` when the expression
    /// has no type (`null`).
    fn type_of_node(&self, file: FileId, node: NodeIndex) -> Option<TypeId>;

    fn type_shape(&self, ty: TypeId) -> TypeShape;

    /// `definition<arguments...>`.
    fn construct_type(&self, definition: SymbolId, arguments: &[TypeId]) -> TypeId;

    /// Short display form for messages, e.g. `Task<IActionResult>`.
    fn display_type(&self, ty: TypeId) -> String;
}
