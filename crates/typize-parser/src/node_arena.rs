//! NodeArena: node storage, creation and typed access.

use crate::node::*;
use typize_common::Span;

/// Owns every node of one parsed file together with its source text.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    source: String,
    file_name: String,
    root: Option<NodeIndex>,
}

impl NodeArena {
    /// Maximum pre-allocation to avoid capacity overflow in huge files.
    const MAX_NODE_PREALLOC: usize = 1_000_000;

    pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> NodeArena {
        let source = source.into();
        let capacity = (source.len() / 6).min(Self::MAX_NODE_PREALLOC);
        NodeArena {
            nodes: Vec::with_capacity(capacity),
            source,
            file_name: file_name.into(),
            root: None,
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The `SourceFile` node, once parsing has finished.
    pub fn root(&self) -> NodeIndex {
        self.root.unwrap_or(NodeIndex::NONE)
    }

    pub(crate) fn set_root(&mut self, root: NodeIndex) {
        self.root = Some(root);
    }

    // ============================================================================
    // Node Creation
    // ============================================================================

    /// Add a node and adopt its children.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        pos: u32,
        start: u32,
        end: u32,
        data: NodeData,
    ) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        let mut children = Vec::new();
        data.for_each_child(|child| children.push(child));
        self.nodes.push(Node {
            kind,
            pos,
            start,
            end,
            parent: NodeIndex::NONE,
            data,
        });
        for child in children {
            if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                node.parent = index;
            }
        }
        index
    }

    pub fn add_identifier(&mut self, pos: u32, start: u32, end: u32, text: String) -> NodeIndex {
        self.add_node(
            NodeKind::Identifier,
            pos,
            start,
            end,
            NodeData::Identifier(IdentifierData { text }),
        )
    }

    // ============================================================================
    // Access
    // ============================================================================

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            return None;
        }
        self.nodes.get(index.0 as usize)
    }

    /// All nodes in creation order (children before parents).
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i as u32), node))
    }

    pub fn kind(&self, index: NodeIndex) -> Option<NodeKind> {
        self.get(index).map(|n| n.kind)
    }

    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        self.get(index).map_or(NodeIndex::NONE, |n| n.parent)
    }

    /// Ancestors of `index`, nearest first, excluding the node itself.
    pub fn ancestors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(Some(self.parent(index)), move |&idx| Some(self.parent(idx)))
            .take_while(|idx| idx.is_some())
    }

    /// The nearest ancestor (or the node itself) satisfying `pred`.
    pub fn find_ancestor_or_self(
        &self,
        index: NodeIndex,
        pred: impl Fn(&Node) -> bool,
    ) -> Option<NodeIndex> {
        std::iter::once(index)
            .chain(self.ancestors(index))
            .find(|&idx| self.get(idx).is_some_and(&pred))
    }

    pub fn children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        if let Some(node) = self.get(index) {
            node.data.for_each_child(|c| out.push(c));
        }
        out
    }

    pub fn node_span(&self, index: NodeIndex) -> Option<Span> {
        self.get(index).map(Node::span)
    }

    pub fn full_span(&self, index: NodeIndex) -> Option<Span> {
        self.get(index).map(Node::full_span)
    }

    pub fn node_text(&self, index: NodeIndex) -> &str {
        self.node_span(index)
            .map_or("", |span| span.text(&self.source))
    }

    /// Innermost node whose significant span contains `offset`.
    pub fn find_node_at_offset(&self, offset: u32) -> NodeIndex {
        let mut current = self.root();
        if !self.get(current).is_some_and(|n| n.span().contains(offset)) {
            return NodeIndex::NONE;
        }
        'descend: loop {
            for child in self.children(current) {
                if self.get(child).is_some_and(|n| n.span().contains(offset)) {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Node of `kind` whose significant span is exactly `span`.
    pub fn find_node_with_span(&self, span: Span, kind: NodeKind) -> NodeIndex {
        let mut current = self.find_node_at_offset(span.start);
        while current.is_some() {
            match self.get(current) {
                Some(node) if node.kind == kind && node.span() == span => return current,
                Some(node) if node.start < span.start || node.end > span.end => {
                    return NodeIndex::NONE;
                }
                Some(node) => current = node.parent,
                None => break,
            }
        }
        NodeIndex::NONE
    }

    pub fn identifier_text(&self, index: NodeIndex) -> Option<&str> {
        match &self.get(index)?.data {
            NodeData::Identifier(d) => Some(&d.text),
            _ => None,
        }
    }

    pub fn get_source_file<'a>(&self, node: &'a Node) -> Option<&'a SourceFileData> {
        match &node.data {
            NodeData::SourceFile(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_using<'a>(&self, node: &'a Node) -> Option<&'a UsingData> {
        match &node.data {
            NodeData::Using(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_namespace<'a>(&self, node: &'a Node) -> Option<&'a NamespaceData> {
        match &node.data {
            NodeData::Namespace(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_type_decl<'a>(&self, node: &'a Node) -> Option<&'a TypeDeclData> {
        match &node.data {
            NodeData::TypeDecl(d) => Some(d),
            _ => None,
        }
    }

    /// Methods, constructors and local functions.
    pub fn get_method<'a>(&self, node: &'a Node) -> Option<&'a MethodData> {
        match &node.data {
            NodeData::Method(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_property<'a>(&self, node: &'a Node) -> Option<&'a PropertyData> {
        match &node.data {
            NodeData::Property(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_parameter<'a>(&self, node: &'a Node) -> Option<&'a ParameterData> {
        match &node.data {
            NodeData::Parameter(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_type_ref<'a>(&self, node: &'a Node) -> Option<&'a TypeRefData> {
        match &node.data {
            NodeData::TypeRef(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_block<'a>(&self, node: &'a Node) -> Option<&'a BlockData> {
        match &node.data {
            NodeData::Block(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_variable<'a>(&self, node: &'a Node) -> Option<&'a VariableData> {
        match &node.data {
            NodeData::Variable(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_if_statement<'a>(&self, node: &'a Node) -> Option<&'a IfData> {
        match &node.data {
            NodeData::If(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_literal<'a>(&self, node: &'a Node) -> Option<&'a LiteralData> {
        match &node.data {
            NodeData::Literal(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_access_expr<'a>(&self, node: &'a Node) -> Option<&'a AccessData> {
        match &node.data {
            NodeData::MemberAccess(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_call_expr<'a>(&self, node: &'a Node) -> Option<&'a CallData> {
        match &node.data {
            NodeData::Invocation(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_object_creation<'a>(&self, node: &'a Node) -> Option<&'a ObjectCreationData> {
        match &node.data {
            NodeData::ObjectCreation(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_member_initializer<'a>(&self, node: &'a Node) -> Option<&'a InitializerData> {
        match &node.data {
            NodeData::MemberInitializer(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_unary_expr<'a>(&self, node: &'a Node) -> Option<&'a UnaryData> {
        match &node.data {
            NodeData::Unary(d) => Some(d),
            _ => None,
        }
    }

    pub fn get_binary_expr<'a>(&self, node: &'a Node) -> Option<&'a BinaryData> {
        match &node.data {
            NodeData::Binary(d) => Some(d),
            _ => None,
        }
    }

    /// Operand of a return, await, parenthesized or expression statement node,
    /// or the element of an array/nullable type.
    pub fn get_wrapped(&self, node: &Node) -> NodeIndex {
        match node.data {
            NodeData::Wrapped(inner) | NodeData::WrappedType(inner) => inner,
            _ => NodeIndex::NONE,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn skip_parentheses(&self, mut index: NodeIndex) -> NodeIndex {
        while let Some(node) = self.get(index) {
            if node.kind != NodeKind::ParenthesizedExpression {
                break;
            }
            index = self.get_wrapped(node);
        }
        index
    }

    /// Name of a method, type, property, parameter or local declaration.
    pub fn declaration_name(&self, index: NodeIndex) -> Option<&str> {
        let node = self.get(index)?;
        let name = match &node.data {
            NodeData::TypeDecl(d) => d.name,
            NodeData::Method(d) => d.name,
            NodeData::Property(d) => d.name,
            NodeData::Parameter(d) => d.name,
            NodeData::Variable(d) => d.name,
            NodeData::Identifier(d) => return Some(&d.text),
            _ => return None,
        };
        self.identifier_text(name)
    }
}
