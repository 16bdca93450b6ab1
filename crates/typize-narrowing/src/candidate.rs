//! Method declarations under analysis.

use typize_common::{FileId, Span};
use typize_parser::{NodeArena, NodeIndex, NodeKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodBody {
    Block(NodeIndex),
    /// `=> expr;`
    Expression(NodeIndex),
}

/// A method declaration, read fresh from the syntax tree for every pass.
#[derive(Clone, Debug)]
pub struct MethodCandidate {
    pub file: FileId,
    pub declaration: NodeIndex,
    pub name: String,
    pub return_type: NodeIndex,
    pub return_type_span: Span,
    pub is_async: bool,
    pub body: MethodBody,
    /// The enclosing class or interface declaration.
    pub container: NodeIndex,
}

impl MethodCandidate {
    /// `None` for anything but a method declaration with a return type and a
    /// body (abstract and interface methods have none).
    pub fn from_declaration(arena: &NodeArena, file: FileId, declaration: NodeIndex) -> Option<Self> {
        let node = arena.get(declaration)?;
        if node.kind != NodeKind::MethodDeclaration {
            return None;
        }
        let data = arena.get_method(node)?;
        let return_type_span = arena.node_span(data.return_type)?;
        let body = if data.body.is_some() {
            MethodBody::Block(data.body)
        } else if data.expression_body.is_some() {
            MethodBody::Expression(data.expression_body)
        } else {
            return None;
        };
        let container = arena.parent(declaration);
        if !arena.kind(container).is_some_and(NodeKind::is_type_declaration) {
            return None;
        }
        Some(MethodCandidate {
            file,
            declaration,
            name: arena.identifier_text(data.name).unwrap_or_default().to_string(),
            return_type: data.return_type,
            return_type_span,
            is_async: data.is_async(),
            body,
            container,
        })
    }

    /// The method declaration whose return type occupies `span`.
    pub fn at_return_type_span(arena: &NodeArena, file: FileId, span: Span) -> Option<Self> {
        let start = arena.find_node_at_offset(span.start);
        let declaration = arena.find_ancestor_or_self(start, |n| n.kind == NodeKind::MethodDeclaration)?;
        let candidate = Self::from_declaration(arena, file, declaration)?;
        (candidate.return_type_span == span).then_some(candidate)
    }
}

/// Every method declaration in `arena`, in document order.
pub fn collect_candidates(arena: &NodeArena, file: FileId) -> Vec<MethodCandidate> {
    let mut out: Vec<MethodCandidate> = arena
        .nodes()
        .filter(|(_, n)| n.kind == NodeKind::MethodDeclaration)
        .filter_map(|(idx, _)| MethodCandidate::from_declaration(arena, file, idx))
        .collect();
    out.sort_by_key(|c| c.return_type_span.start);
    out
}
