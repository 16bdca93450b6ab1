//! `SemanticOracle` for the reference host's `Program`.

use crate::oracle::{SemanticOracle, TypeShape};
use typize_checker::{IntrinsicKind, Program, TypeKey};
use typize_common::{FileId, SnapshotId, SymbolId, TypeId};
use typize_parser::{NodeArena, NodeIndex};

impl SemanticOracle for Program {
    fn snapshot_id(&self) -> SnapshotId {
        Program::snapshot_id(self)
    }

    fn arena(&self, file: FileId) -> Option<&NodeArena> {
        self.file(file).map(|f| &f.arena)
    }

    fn file_name(&self, file: FileId) -> Option<&str> {
        self.file(file).map(|f| f.name.as_str())
    }

    fn type_by_metadata_name(&self, name: &str) -> Option<SymbolId> {
        Program::type_by_metadata_name(self, name)
    }

    fn declared_symbol(&self, file: FileId, node: NodeIndex) -> Option<SymbolId> {
        Program::declared_symbol(self, file, node)
    }

    fn invocation_target(&self, file: FileId, call: NodeIndex) -> Option<SymbolId> {
        Program::invocation_target(self, file, call)
    }

    fn base_class_chain(&self, symbol: SymbolId) -> Vec<SymbolId> {
        Program::base_class_chain(self, symbol)
    }

    fn original_definition(&self, symbol: SymbolId) -> SymbolId {
        Program::original_definition(self, symbol)
    }

    fn members_named(&self, owner: SymbolId, name: &str) -> Vec<SymbolId> {
        Program::members_named(self, owner, name)
    }

    fn parameter_count(&self, symbol: SymbolId) -> usize {
        Program::parameter_count(self, symbol)
    }

    fn type_parameter_count(&self, symbol: SymbolId) -> usize {
        Program::type_parameter_count(self, symbol)
    }

    fn symbol_name(&self, symbol: SymbolId) -> String {
        Program::symbol_name(self, symbol)
    }

    fn containing_namespace(&self, symbol: SymbolId) -> Option<String> {
        Program::containing_namespace(self, symbol)
    }

    fn containing_type(&self, symbol: SymbolId) -> Option<SymbolId> {
        Program::containing_type(self, symbol)
    }

    fn namespace_in_scope(&self, file: FileId, position: u32, namespace: &str) -> bool {
        self.is_namespace_in_scope(file, position, namespace)
    }

    fn visible_from(&self, file: FileId, position: u32, symbol: SymbolId) -> bool {
        self.is_name_visible(file, position, symbol)
    }

    fn type_of_node(&self, file: FileId, node: NodeIndex) -> Option<TypeId> {
        Program::type_of_node(self, file, node)
    }

    fn type_shape(&self, ty: TypeId) -> TypeShape {
        match self.type_key(ty) {
            None | Some(TypeKey::Intrinsic(IntrinsicKind::Error)) => TypeShape::Error,
            Some(TypeKey::Intrinsic(kind)) => match kind.keyword() {
                Some(keyword) if kind.is_top() => TypeShape::Top(keyword),
                Some(keyword) => TypeShape::Keyword(keyword),
                None => TypeShape::Error,
            },
            Some(TypeKey::Named { symbol, args }) => TypeShape::Named {
                definition: symbol,
                arguments: args,
            },
            Some(TypeKey::TypeParameter(param)) => TypeShape::TypeParameter(self.symbol_name(param)),
            Some(TypeKey::Array(elem)) => TypeShape::Array(elem),
            Some(TypeKey::Nullable(elem)) => TypeShape::Nullable(elem),
            Some(TypeKey::Anonymous { .. }) => TypeShape::Anonymous,
        }
    }

    fn construct_type(&self, definition: SymbolId, arguments: &[TypeId]) -> TypeId {
        Program::construct_type(self, definition, arguments)
    }

    fn display_type(&self, ty: TypeId) -> String {
        Program::display_type(self, ty)
    }
}
