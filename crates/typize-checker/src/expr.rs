//! Expression typing and invocation binding.
//!
//! Only the expression forms the parser produces are typed. Anything that
//! cannot be typed gets the error type, except the `null` literal, which has
//! no type at all.

use crate::program::Program;
use crate::symbols::SymbolKind;
use crate::types::{IntrinsicKind, Substitution, TypeKey};
use smallvec::SmallVec;
use tracing::trace;
use typize_common::{FileId, SymbolId, TypeId};
use typize_parser::{NodeArena, NodeData, NodeIndex, NodeKind, SyntaxKind};

/// Nesting limit for expression typing; deeper expressions type as errors.
const MAX_DEPTH: u32 = 64;

/// A member found by name lookup, with the substitution of the receiver it
/// was reached through.
#[derive(Clone, Debug)]
pub struct MemberLookup {
    pub symbol: SymbolId,
    pub substitution: Substitution,
}

impl Program {
    /// Type of an expression node. `None` for expressions with no type (`null`).
    pub fn type_of_expression(&self, file: FileId, node: NodeIndex) -> Option<TypeId> {
        self.type_of_expression_worker(file, node, 0)
    }

    fn type_of_expression_worker(&self, file: FileId, node: NodeIndex, depth: u32) -> Option<TypeId> {
        let error = self.interner.error();
        if depth > MAX_DEPTH {
            return Some(error);
        }
        let arena = &self.file(file)?.arena;
        let Some(n) = arena.get(node) else {
            return Some(error);
        };
        let ty = match n.kind {
            NodeKind::StringLiteral => self.intrinsic(IntrinsicKind::String),
            NodeKind::CharLiteral => self.intrinsic(IntrinsicKind::Char),
            NodeKind::TrueLiteral | NodeKind::FalseLiteral => self.intrinsic(IntrinsicKind::Bool),
            NodeKind::NullLiteral => return None,
            NodeKind::NumericLiteral => {
                let text = arena.get_literal(n).map_or("", |l| l.text.as_str());
                self.intrinsic(numeric_literal_kind(text))
            }
            NodeKind::Identifier => self.type_of_identifier(file, arena, node, depth),
            NodeKind::ThisExpression => self.enclosing_type(file, node).map_or(error, |t| self.self_type(t)),
            NodeKind::BaseExpression => self.base_type_at(file, node).unwrap_or(error),
            NodeKind::ParenthesizedExpression => {
                return self.type_of_expression_worker(file, arena.get_wrapped(n), depth + 1);
            }
            NodeKind::MemberAccessExpression => self.type_of_member_access(file, arena, node, depth),
            NodeKind::InvocationExpression => match self.resolve_call(file, node, depth) {
                Some(found) => self
                    .symbol(found.symbol)
                    .and_then(|s| s.declared_type)
                    .map_or(error, |t| found.substitution.apply(&self.interner, t)),
                None => error,
            },
            NodeKind::ObjectCreationExpression => match arena.get_object_creation(n) {
                Some(data) if data.type_node.is_some() => self.resolve_type_node(file, data.type_node),
                _ => error,
            },
            NodeKind::AnonymousObjectCreationExpression => {
                self.interner.intern(TypeKey::Anonymous { file, node })
            }
            NodeKind::AwaitExpression => {
                let operand = self.type_of_expression_worker(file, arena.get_wrapped(n), depth + 1);
                operand.map_or(error, |t| self.awaited_type(t))
            }
            NodeKind::PrefixUnaryExpression => match arena.get_unary_expr(n) {
                Some(data) if data.operator == SyntaxKind::Exclamation => {
                    self.intrinsic(IntrinsicKind::Bool)
                }
                Some(data) => {
                    return self.type_of_expression_worker(file, data.operand, depth + 1);
                }
                None => error,
            },
            NodeKind::BinaryExpression => match arena.get_binary_expr(n) {
                Some(data) => self.type_of_binary(file, data.left, data.operator, data.right, depth),
                None => error,
            },
            NodeKind::AssignmentExpression => match arena.get_binary_expr(n) {
                Some(data) => return self.type_of_expression_worker(file, data.left, depth + 1),
                None => error,
            },
            _ => error,
        };
        Some(ty)
    }

    fn type_of_binary(
        &self,
        file: FileId,
        left: NodeIndex,
        operator: SyntaxKind,
        right: NodeIndex,
        depth: u32,
    ) -> TypeId {
        use SyntaxKind::*;
        let string = self.intrinsic(IntrinsicKind::String);
        match operator {
            EqualsEquals | ExclamationEquals | LessThan | LessThanEquals | GreaterThan
            | GreaterThanEquals | AmpersandAmpersand | BarBar => self.intrinsic(IntrinsicKind::Bool),
            _ => {
                let lhs = self.type_of_expression_worker(file, left, depth + 1);
                if operator == Plus {
                    let rhs = self.type_of_expression_worker(file, right, depth + 1);
                    if lhs == Some(string) || rhs == Some(string) {
                        return string;
                    }
                }
                lhs.unwrap_or_else(|| self.interner.error())
            }
        }
    }

    /// `T` for `Task<T>`, `void` for `Task`, the error type otherwise.
    fn awaited_type(&self, ty: TypeId) -> TypeId {
        match self.interner.lookup(ty) {
            Some(TypeKey::Named { symbol, args }) if Some(symbol) == self.task_generic_symbol => {
                args.first().copied().unwrap_or_else(|| self.interner.error())
            }
            Some(TypeKey::Named { symbol, .. }) if Some(symbol) == self.task_symbol => {
                self.intrinsic(IntrinsicKind::Void)
            }
            _ => self.interner.error(),
        }
    }

    fn type_of_identifier(&self, file: FileId, arena: &NodeArena, node: NodeIndex, depth: u32) -> TypeId {
        let error = self.interner.error();
        let Some(name) = arena.identifier_text(node) else {
            return error;
        };
        let start = arena.get(node).map_or(0, |n| n.start);

        // Locals declared earlier in an enclosing block.
        for scope in arena.ancestors(node) {
            let Some(block) = arena.get(scope).and_then(|n| arena.get_block(n)) else {
                continue;
            };
            for &stmt in &block.statements {
                let Some(s) = arena.get(stmt) else {
                    continue;
                };
                if s.kind != NodeKind::LocalDeclaration || s.end > start {
                    continue;
                }
                let Some(var) = arena.get_variable(s) else {
                    continue;
                };
                if arena.identifier_text(var.name) != Some(name) {
                    continue;
                }
                let declared = self
                    .declared_symbol(file, stmt)
                    .and_then(|sym| self.symbol(sym))
                    .and_then(|s| s.declared_type);
                return match declared {
                    Some(ty) => ty,
                    None => self
                        .type_of_expression_worker(file, var.initializer, depth + 1)
                        .unwrap_or(error),
                };
            }
        }

        // Parameters of enclosing functions, innermost first.
        for scope in arena.ancestors(node) {
            let Some(method) = arena.get(scope).and_then(|n| arena.get_method(n)) else {
                continue;
            };
            for &param in &method.parameters {
                if arena.declaration_name(param) == Some(name) {
                    return self
                        .declared_symbol(file, param)
                        .and_then(|sym| self.symbol(sym))
                        .and_then(|s| s.declared_type)
                        .unwrap_or(error);
                }
            }
        }

        // Fields and properties of enclosing types.
        for owner in self.enclosing_types(file, node) {
            let found = self
                .lookup_members(self.self_type(owner), name)
                .into_iter()
                .find(|m| self.symbol(m.symbol).is_some_and(|s| s.kind.is_value()));
            if let Some(found) = found {
                return self
                    .symbol(found.symbol)
                    .and_then(|s| s.declared_type)
                    .map_or(error, |t| found.substitution.apply(&self.interner, t));
            }
        }
        trace!(name, "unresolved identifier");
        error
    }

    fn type_of_member_access(&self, file: FileId, arena: &NodeArena, node: NodeIndex, depth: u32) -> TypeId {
        let error = self.interner.error();
        let Some(access) = arena.get(node).and_then(|n| arena.get_access_expr(n)) else {
            return error;
        };
        let Some(name) = arena.identifier_text(access.name) else {
            return error;
        };
        let Some(receiver) = self.receiver_type(file, arena, access.expression, depth) else {
            return error;
        };
        self.lookup_members(receiver, name)
            .into_iter()
            .find(|m| self.symbol(m.symbol).is_some_and(|s| s.kind.is_value()))
            .and_then(|m| {
                let ty = self.symbol(m.symbol)?.declared_type?;
                Some(m.substitution.apply(&self.interner, ty))
            })
            .unwrap_or(error)
    }

    /// Type whose members a member access on `expr` searches: the value's
    /// type, or the named type itself for static access.
    fn receiver_type(&self, file: FileId, arena: &NodeArena, expr: NodeIndex, depth: u32) -> Option<TypeId> {
        let error = self.interner.error();
        if let Some(ty) = self.type_of_expression_worker(file, expr, depth + 1)
            && ty != error
        {
            return Some(ty);
        }
        let sym = match arena.get(expr)?.data {
            NodeData::Predefined(_) => return Some(self.resolve_type_node(file, expr)),
            _ => {
                let dotted = dotted_name(arena, expr)?;
                self.lookup_type_name(file, expr, &dotted, 0)?
            }
        };
        Some(self.interner.named(sym, &[]))
    }

    // =========================================================================
    // Invocations
    // =========================================================================

    /// The method or local function an invocation expression binds to.
    pub fn invocation_target(&self, file: FileId, node: NodeIndex) -> Option<SymbolId> {
        self.resolve_call(file, node, 0).map(|m| m.symbol)
    }

    fn resolve_call(&self, file: FileId, node: NodeIndex, depth: u32) -> Option<MemberLookup> {
        let arena = &self.file(file)?.arena;
        let call = arena.get_call_expr(arena.get(node)?)?;
        let argc = call.arguments.len();
        let callee = arena.skip_parentheses(call.expression);
        let callee_node = arena.get(callee)?;
        let accepts = |m: &MemberLookup| {
            self.symbol(m.symbol)
                .is_some_and(|s| s.kind.is_invocable() && s.accepts_argument_count(argc))
        };

        match callee_node.kind {
            NodeKind::Identifier => {
                let name = arena.identifier_text(callee)?;
                if let Some(local) = self.find_local_function(file, arena, callee, name, argc) {
                    return Some(MemberLookup {
                        symbol: local,
                        substitution: Substitution::new(),
                    });
                }
                for owner in self.enclosing_types(file, node) {
                    let candidates = self.lookup_members(self.self_type(owner), name);
                    if candidates.is_empty() {
                        continue;
                    }
                    return candidates.into_iter().find(accepts);
                }
                None
            }
            NodeKind::MemberAccessExpression => {
                let access = arena.get_access_expr(callee_node)?;
                let name = arena.identifier_text(access.name)?;
                let receiver = self.receiver_type(file, arena, access.expression, depth)?;
                self.lookup_members(receiver, name).into_iter().find(accepts)
            }
            _ => None,
        }
    }

    /// Local functions in enclosing blocks shadow members of the same name.
    fn find_local_function(
        &self,
        file: FileId,
        arena: &NodeArena,
        node: NodeIndex,
        name: &str,
        argc: usize,
    ) -> Option<SymbolId> {
        for scope in arena.ancestors(node) {
            let scope_node = arena.get(scope)?;
            if scope_node.kind == NodeKind::MethodDeclaration
                || scope_node.kind == NodeKind::ConstructorDeclaration
            {
                break;
            }
            let Some(block) = arena.get_block(scope_node) else {
                continue;
            };
            let found = block
                .statements
                .iter()
                .copied()
                .filter(|&stmt| arena.kind(stmt) == Some(NodeKind::LocalFunction))
                .filter(|&stmt| arena.declaration_name(stmt) == Some(name))
                .filter_map(|stmt| self.declared_symbol(file, stmt))
                .find(|&sym| self.symbol(sym).is_some_and(|s| s.accepts_argument_count(argc)));
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Members named `name` on `receiver`, nearest first.
    ///
    /// Methods hide base methods with the same parameter count only, so the
    /// walk continues through base classes (or base interfaces) collecting
    /// the remaining overloads. A property, field or nested type hides every
    /// base member of that name.
    pub fn lookup_members(&self, receiver: TypeId, name: &str) -> Vec<MemberLookup> {
        let mut found: Vec<MemberLookup> = Vec::new();
        let mut hidden_arities: SmallVec<[usize; 4]> = SmallVec::new();
        let mut pending = vec![receiver];
        let mut visited: Vec<SymbolId> = Vec::new();
        while let Some(level) = pending.pop() {
            let Some(TypeKey::Named { symbol, args }) = self.interner.lookup(level) else {
                continue;
            };
            if visited.contains(&symbol) {
                continue;
            }
            visited.push(symbol);
            let Some(sym) = self.symbols.get(symbol) else {
                continue;
            };
            let substitution = Substitution::from_pairs(&sym.type_parameters, &args);
            let members = sym.members_named(name);
            let constructed = !args.is_empty() && level != self.self_type(symbol);
            let lookup = |m: SymbolId| MemberLookup {
                symbol: if constructed { self.constructed_member(m, level) } else { m },
                substitution: substitution.clone(),
            };

            let hides_all = members
                .iter()
                .any(|&m| self.symbols.get(m).is_some_and(|s| !s.kind.is_invocable()));
            if hides_all {
                if found.is_empty() {
                    return members.iter().map(|&m| lookup(m)).collect();
                }
                return found;
            }
            let mut declared: SmallVec<[usize; 4]> = SmallVec::new();
            for &m in members {
                let Some(member) = self.symbols.get(m) else {
                    continue;
                };
                let arity = member.parameters.len();
                if hidden_arities.contains(&arity) {
                    continue;
                }
                declared.push(arity);
                found.push(lookup(m));
            }
            hidden_arities.extend(declared);

            match sym.kind {
                SymbolKind::Class => {
                    if let Some(base) = sym.base_class {
                        pending.push(substitution.apply(&self.interner, base));
                    }
                }
                SymbolKind::Interface => {
                    for &base in sym.interfaces.iter().rev() {
                        pending.push(substitution.apply(&self.interner, base));
                    }
                }
                _ => {}
            }
        }
        found
    }

    // =========================================================================
    // Enclosing declarations
    // =========================================================================

    /// Type declarations enclosing `node`, innermost first.
    pub(crate) fn enclosing_types(&self, file: FileId, node: NodeIndex) -> Vec<SymbolId> {
        let Some(source) = self.file(file) else {
            return Vec::new();
        };
        let arena = &source.arena;
        arena
            .ancestors(node)
            .filter(|&idx| arena.kind(idx).is_some_and(NodeKind::is_type_declaration))
            .filter_map(|idx| self.declared_symbol(file, idx))
            .collect()
    }

    pub(crate) fn enclosing_type(&self, file: FileId, node: NodeIndex) -> Option<SymbolId> {
        self.enclosing_types(file, node).into_iter().next()
    }

    fn base_type_at(&self, file: FileId, node: NodeIndex) -> Option<TypeId> {
        let owner = self.enclosing_type(file, node)?;
        self.symbol(owner)?.base_class
    }
}

/// `a.b.c` for a chain of identifiers and member accesses.
fn dotted_name(arena: &NodeArena, expr: NodeIndex) -> Option<String> {
    let node = arena.get(expr)?;
    match &node.data {
        NodeData::Identifier(d) => Some(d.text.clone()),
        NodeData::MemberAccess(access) => {
            let mut prefix = dotted_name(arena, access.expression)?;
            prefix.push('.');
            prefix.push_str(arena.identifier_text(access.name)?);
            Some(prefix)
        }
        _ => None,
    }
}

/// Type of a numeric literal from its spelling and suffix.
pub fn numeric_literal_kind(text: &str) -> IntrinsicKind {
    let lower = text.to_ascii_lowercase();
    let is_hex = lower.starts_with("0x");
    if lower.ends_with("ul") || lower.ends_with("lu") {
        return IntrinsicKind::ULong;
    }
    if lower.ends_with('l') {
        return IntrinsicKind::Long;
    }
    if lower.ends_with('u') {
        return IntrinsicKind::UInt;
    }
    if is_hex {
        return IntrinsicKind::Int;
    }
    if lower.ends_with('m') {
        IntrinsicKind::Decimal
    } else if lower.ends_with('f') {
        IntrinsicKind::Float
    } else if lower.ends_with('d') || lower.contains('.') || lower.contains('e') {
        IntrinsicKind::Double
    } else {
        IntrinsicKind::Int
    }
}

#[cfg(test)]
#[path = "../tests/expr_tests.rs"]
mod tests;
