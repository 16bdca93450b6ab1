//! Syntax tree node definitions.
//!
//! Nodes live in a `NodeArena` and refer to each other by `NodeIndex`.
//! Every node records:
//! - `pos`: full start, including leading trivia
//! - `start`: start of its first significant token
//! - `end`: end of its last token (trailing trivia excluded)

use crate::scanner::SyntaxKind;
use bitflags::bitflags;
use typize_common::Span;

/// Index of a node in its arena. `NodeIndex::NONE` marks an absent child.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == NodeIndex::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != NodeIndex::NONE
    }

    /// `None` for the sentinel, `Some(self)` otherwise.
    #[inline]
    pub fn into_option(self) -> Option<NodeIndex> {
        if self.is_none() { None } else { Some(self) }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeList {
    pub nodes: Vec<NodeIndex>,
}

impl NodeList {
    pub fn new(nodes: Vec<NodeIndex>) -> Self {
        NodeList { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeIndex> {
        self.nodes.iter()
    }

    pub fn first(&self) -> Option<NodeIndex> {
        self.nodes.first().copied()
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a NodeIndex;
    type IntoIter = std::slice::Iter<'a, NodeIndex>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u32 {
        const PUBLIC    = 1 << 0;
        const PRIVATE   = 1 << 1;
        const PROTECTED = 1 << 2;
        const INTERNAL  = 1 << 3;
        const STATIC    = 1 << 4;
        const ASYNC     = 1 << 5;
        const VIRTUAL   = 1 << 6;
        const OVERRIDE  = 1 << 7;
        const ABSTRACT  = 1 << 8;
        const SEALED    = 1 << 9;
        const PARTIAL   = 1 << 10;
        const READONLY  = 1 << 11;
    }
}

impl ModifierFlags {
    pub fn from_keyword(kind: SyntaxKind) -> ModifierFlags {
        match kind {
            SyntaxKind::PublicKeyword => ModifierFlags::PUBLIC,
            SyntaxKind::PrivateKeyword => ModifierFlags::PRIVATE,
            SyntaxKind::ProtectedKeyword => ModifierFlags::PROTECTED,
            SyntaxKind::InternalKeyword => ModifierFlags::INTERNAL,
            SyntaxKind::StaticKeyword => ModifierFlags::STATIC,
            SyntaxKind::AsyncKeyword => ModifierFlags::ASYNC,
            SyntaxKind::VirtualKeyword => ModifierFlags::VIRTUAL,
            SyntaxKind::OverrideKeyword => ModifierFlags::OVERRIDE,
            SyntaxKind::AbstractKeyword => ModifierFlags::ABSTRACT,
            SyntaxKind::SealedKeyword => ModifierFlags::SEALED,
            SyntaxKind::PartialKeyword => ModifierFlags::PARTIAL,
            SyntaxKind::ReadonlyKeyword => ModifierFlags::READONLY,
            _ => ModifierFlags::empty(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    SourceFile,
    UsingDirective,
    NamespaceDeclaration,
    ClassDeclaration,
    InterfaceDeclaration,
    MethodDeclaration,
    ConstructorDeclaration,
    PropertyDeclaration,
    FieldDeclaration,
    Parameter,
    TypeParameter,

    // Types
    TypeReference,
    PredefinedType,
    ArrayType,
    NullableType,

    // Statements
    Block,
    ReturnStatement,
    LocalDeclaration,
    LocalFunction,
    IfStatement,
    ExpressionStatement,

    // Expressions
    Identifier,
    StringLiteral,
    NumericLiteral,
    CharLiteral,
    TrueLiteral,
    FalseLiteral,
    NullLiteral,
    ThisExpression,
    BaseExpression,
    MemberAccessExpression,
    InvocationExpression,
    ObjectCreationExpression,
    AnonymousObjectCreationExpression,
    MemberInitializer,
    AwaitExpression,
    ParenthesizedExpression,
    PrefixUnaryExpression,
    BinaryExpression,
    AssignmentExpression,

    /// Placeholder produced by error recovery.
    Missing,
}

impl NodeKind {
    pub fn is_type_declaration(self) -> bool {
        matches!(self, NodeKind::ClassDeclaration | NodeKind::InterfaceDeclaration)
    }

    /// Methods, constructors and local functions share `MethodData`.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            NodeKind::MethodDeclaration | NodeKind::ConstructorDeclaration | NodeKind::LocalFunction
        )
    }

    pub fn is_type_syntax(self) -> bool {
        matches!(
            self,
            NodeKind::TypeReference
                | NodeKind::PredefinedType
                | NodeKind::ArrayType
                | NodeKind::NullableType
        )
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub pos: u32,
    pub start: u32,
    pub end: u32,
    pub parent: NodeIndex,
    pub data: NodeData,
}

impl Node {
    /// Span of the node's significant text.
    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Span including leading trivia.
    #[inline]
    pub fn full_span(&self) -> Span {
        Span::new(self.pos, self.end)
    }
}

#[derive(Clone, Debug)]
pub enum NodeData {
    None,
    SourceFile(SourceFileData),
    Using(UsingData),
    Namespace(NamespaceData),
    TypeDecl(TypeDeclData),
    Method(MethodData),
    Property(PropertyData),
    Parameter(ParameterData),
    TypeRef(TypeRefData),
    Predefined(SyntaxKind),
    /// Element of `T[]` or `T?`.
    WrappedType(NodeIndex),
    Block(BlockData),
    /// Operand of `return`, `await`, parentheses and expression statements.
    Wrapped(NodeIndex),
    Variable(VariableData),
    If(IfData),
    Identifier(IdentifierData),
    Literal(LiteralData),
    MemberAccess(AccessData),
    Invocation(CallData),
    ObjectCreation(ObjectCreationData),
    MemberInitializer(InitializerData),
    Unary(UnaryData),
    Binary(BinaryData),
}

#[derive(Clone, Debug)]
pub struct SourceFileData {
    pub file_name: String,
    pub members: NodeList,
}

#[derive(Clone, Debug)]
pub struct UsingData {
    /// Dotted namespace name, e.g. `Microsoft.AspNetCore.Mvc`.
    pub name: String,
    pub is_global: bool,
}

#[derive(Clone, Debug)]
pub struct NamespaceData {
    pub name: String,
    pub is_file_scoped: bool,
    pub members: NodeList,
}

#[derive(Clone, Debug)]
pub struct TypeDeclData {
    pub modifiers: ModifierFlags,
    pub name: NodeIndex,
    pub type_parameters: NodeList,
    pub base_types: NodeList,
    pub members: NodeList,
}

#[derive(Clone, Debug)]
pub struct MethodData {
    pub modifiers: ModifierFlags,
    /// `NONE` for constructors.
    pub return_type: NodeIndex,
    pub name: NodeIndex,
    pub type_parameters: NodeList,
    pub parameters: NodeList,
    /// Block body, or `NONE`.
    pub body: NodeIndex,
    /// `=> expr;` body, or `NONE`.
    pub expression_body: NodeIndex,
}

impl MethodData {
    pub fn is_async(&self) -> bool {
        self.modifiers.contains(ModifierFlags::ASYNC)
    }
}

/// Properties and fields.
#[derive(Clone, Debug)]
pub struct PropertyData {
    pub modifiers: ModifierFlags,
    pub type_annotation: NodeIndex,
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ParameterData {
    pub type_annotation: NodeIndex,
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct TypeRefData {
    /// Dotted name as written, e.g. `Mvc.ActionResult`.
    pub name: String,
    pub type_arguments: NodeList,
}

#[derive(Clone, Debug)]
pub struct BlockData {
    pub statements: NodeList,
}

#[derive(Clone, Debug)]
pub struct VariableData {
    /// `NONE` for `var`.
    pub type_annotation: NodeIndex,
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct IfData {
    pub condition: NodeIndex,
    pub then_statement: NodeIndex,
    pub else_statement: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct IdentifierData {
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct LiteralData {
    /// Raw source text of the literal.
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct AccessData {
    pub expression: NodeIndex,
    pub name: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct CallData {
    pub expression: NodeIndex,
    pub arguments: NodeList,
}

#[derive(Clone, Debug)]
pub struct ObjectCreationData {
    /// `NONE` for anonymous object creation.
    pub type_node: NodeIndex,
    pub arguments: NodeList,
    pub initializers: NodeList,
}

#[derive(Clone, Debug)]
pub struct InitializerData {
    pub name: NodeIndex,
    pub value: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct UnaryData {
    pub operator: SyntaxKind,
    pub operand: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct BinaryData {
    pub left: NodeIndex,
    pub operator: SyntaxKind,
    pub right: NodeIndex,
}

impl NodeData {
    /// Visit direct children in source order.
    pub fn for_each_child(&self, mut f: impl FnMut(NodeIndex)) {
        let mut visit = |idx: NodeIndex| {
            if idx.is_some() {
                f(idx);
            }
        };
        match self {
            NodeData::None
            | NodeData::Using(_)
            | NodeData::Predefined(_)
            | NodeData::Identifier(_)
            | NodeData::Literal(_) => {}
            NodeData::SourceFile(d) => d.members.iter().for_each(|&n| visit(n)),
            NodeData::Namespace(d) => d.members.iter().for_each(|&n| visit(n)),
            NodeData::TypeDecl(d) => {
                visit(d.name);
                d.type_parameters.iter().for_each(|&n| visit(n));
                d.base_types.iter().for_each(|&n| visit(n));
                d.members.iter().for_each(|&n| visit(n));
            }
            NodeData::Method(d) => {
                visit(d.return_type);
                visit(d.name);
                d.type_parameters.iter().for_each(|&n| visit(n));
                d.parameters.iter().for_each(|&n| visit(n));
                visit(d.body);
                visit(d.expression_body);
            }
            NodeData::Property(d) => {
                visit(d.type_annotation);
                visit(d.name);
                visit(d.initializer);
            }
            NodeData::Parameter(d) => {
                visit(d.type_annotation);
                visit(d.name);
                visit(d.initializer);
            }
            NodeData::TypeRef(d) => d.type_arguments.iter().for_each(|&n| visit(n)),
            NodeData::WrappedType(inner) | NodeData::Wrapped(inner) => visit(*inner),
            NodeData::Block(d) => d.statements.iter().for_each(|&n| visit(n)),
            NodeData::Variable(d) => {
                visit(d.type_annotation);
                visit(d.name);
                visit(d.initializer);
            }
            NodeData::If(d) => {
                visit(d.condition);
                visit(d.then_statement);
                visit(d.else_statement);
            }
            NodeData::MemberAccess(d) => {
                visit(d.expression);
                visit(d.name);
            }
            NodeData::Invocation(d) => {
                visit(d.expression);
                d.arguments.iter().for_each(|&n| visit(n));
            }
            NodeData::ObjectCreation(d) => {
                visit(d.type_node);
                d.arguments.iter().for_each(|&n| visit(n));
                d.initializers.iter().for_each(|&n| visit(n));
            }
            NodeData::MemberInitializer(d) => {
                visit(d.name);
                visit(d.value);
            }
            NodeData::Unary(d) => visit(d.operand),
            NodeData::Binary(d) => {
                visit(d.left);
                visit(d.right);
            }
        }
    }
}
