//! Recursive-descent parser producing a `NodeArena`.
//!
//! The parser works over the pre-scanned token vector, so arbitrary lookahead
//! is an index bump. Error recovery always consumes at least one token per
//! failed construct; parse diagnostics are collected, never fatal.

use crate::node::*;
use crate::node_arena::NodeArena;
use crate::scanner::{ScannerState, SyntaxKind, Token};
use tracing::{debug, debug_span};
use typize_common::diagnostics::diagnostic_messages;
use typize_common::{Diagnostic, DiagnosticMessage};

/// Contextual keywords the scanner hands out as identifiers but which act as
/// declaration modifiers when followed by a type.
const CONTEXTUAL_MODIFIERS: &[&str] = &["const", "extern", "unsafe", "volatile", "required", "file"];

/// Parameter modifiers without semantic effect here.
const PARAMETER_MODIFIERS: &[&str] = &["ref", "out", "in", "params", "scoped"];

pub struct ParserState {
    file_name: String,
    tokens: Vec<Token>,
    current: usize,
    arena: NodeArena,
    diagnostics: Vec<Diagnostic>,
    last_error_start: Option<u32>,
}

impl ParserState {
    pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> ParserState {
        let file_name = file_name.into();
        let source = source.into();
        let (tokens, diagnostics) = ScannerState::new(&file_name, &source).scan_all();
        ParserState {
            arena: NodeArena::new(file_name.clone(), source),
            file_name,
            tokens,
            current: 0,
            diagnostics,
            last_error_start: None,
        }
    }

    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (NodeArena, Vec<Diagnostic>) {
        (self.arena, self.diagnostics)
    }

    // =========================================================================
    // Token access
    // =========================================================================

    #[inline]
    fn token_at(&self, index: usize) -> Token {
        // The token vector always ends with EndOfFile.
        let last = self.tokens.len().saturating_sub(1);
        self.tokens[index.min(last)]
    }

    #[inline]
    fn current_token(&self) -> Token {
        self.token_at(self.current)
    }

    #[inline]
    fn token(&self) -> SyntaxKind {
        self.current_token().kind
    }

    #[inline]
    fn kind_at(&self, index: usize) -> SyntaxKind {
        self.token_at(index).kind
    }

    #[inline]
    fn peek(&self, n: usize) -> SyntaxKind {
        self.kind_at(self.current + n)
    }

    /// Full start (leading trivia included) of the current token.
    #[inline]
    fn token_pos(&self) -> u32 {
        self.current_token().full_start
    }

    #[inline]
    fn token_start(&self) -> u32 {
        self.current_token().start
    }

    fn text_at(&self, index: usize) -> &str {
        self.token_at(index).text(self.arena.source_text())
    }

    fn token_text(&self) -> String {
        self.text_at(self.current).to_string()
    }

    /// End of the last consumed token.
    fn prev_end(&self) -> u32 {
        if self.current == 0 {
            0
        } else {
            self.token_at(self.current - 1).end
        }
    }

    fn next_token(&mut self) {
        if self.token() != SyntaxKind::EndOfFile {
            self.current += 1;
        }
    }

    #[inline]
    fn is_token(&self, kind: SyntaxKind) -> bool {
        self.token() == kind
    }

    fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        self.parse_error_at_current_token(&diagnostic_messages::TOKEN_EXPECTED, &[kind.text()]);
        false
    }

    fn parse_error_at_current_token(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        let token = self.current_token();
        // One diagnostic per position keeps cascades quiet.
        if self.last_error_start == Some(token.start) {
            return;
        }
        self.last_error_start = Some(token.start);
        self.diagnostics.push(Diagnostic::from_message(
            self.file_name.clone(),
            token.start,
            token.end - token.start,
            message,
            args,
        ));
    }

    fn report_unexpected_token(&mut self) {
        let text = match self.token() {
            SyntaxKind::EndOfFile => SyntaxKind::EndOfFile.text().to_string(),
            _ => self.token_text(),
        };
        self.parse_error_at_current_token(&diagnostic_messages::UNEXPECTED_TOKEN, &[&text]);
    }

    fn finish_node(&mut self, kind: NodeKind, pos: u32, start: u32, data: NodeData) -> NodeIndex {
        let end = self.prev_end().max(start);
        self.arena.add_node(kind, pos, start, end, data)
    }

    fn create_missing(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let start = self.token_start();
        self.arena.add_node(
            NodeKind::Missing,
            pos,
            start,
            start,
            NodeData::Identifier(IdentifierData {
                text: String::new(),
            }),
        )
    }

    // =========================================================================
    // Lookahead
    // =========================================================================

    fn is_identifier_like(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::Identifier
                | SyntaxKind::VarKeyword
                | SyntaxKind::WhereKeyword
                | SyntaxKind::PartialKeyword
        )
    }

    fn is_contextual_at(&self, index: usize, words: &[&str]) -> bool {
        self.kind_at(index) == SyntaxKind::Identifier && words.contains(&self.text_at(index))
    }

    /// Index just past a type starting at `index`, if one is there.
    fn scan_type_at(&self, mut index: usize) -> Option<usize> {
        let kind = self.kind_at(index);
        if kind.is_predefined_type() {
            index += 1;
        } else if Self::is_identifier_like(kind) {
            index += 1;
            loop {
                match self.kind_at(index) {
                    SyntaxKind::Dot if Self::is_identifier_like(self.kind_at(index + 1)) => {
                        index += 2;
                    }
                    SyntaxKind::LessThan => {
                        index = self.scan_type_arguments_at(index)?;
                        break;
                    }
                    _ => break,
                }
            }
        } else {
            return None;
        }
        loop {
            match self.kind_at(index) {
                SyntaxKind::Question => index += 1,
                SyntaxKind::OpenBracket if self.kind_at(index + 1) == SyntaxKind::CloseBracket => {
                    index += 2;
                }
                _ => return Some(index),
            }
        }
    }

    /// Index just past `<T, ...>` starting at `index`.
    fn scan_type_arguments_at(&self, mut index: usize) -> Option<usize> {
        if self.kind_at(index) != SyntaxKind::LessThan {
            return None;
        }
        index += 1;
        loop {
            index = self.scan_type_at(index)?;
            match self.kind_at(index) {
                SyntaxKind::Comma => index += 1,
                SyntaxKind::GreaterThan => return Some(index + 1),
                _ => return None,
            }
        }
    }

    /// `Type Name =`, `Type Name;` or `Type Name,` at the current token.
    fn is_local_declaration_start(&self) -> bool {
        let Some(after_type) = self.scan_type_at(self.current) else {
            return false;
        };
        Self::is_identifier_like(self.kind_at(after_type))
            && matches!(
                self.kind_at(after_type + 1),
                SyntaxKind::Equals | SyntaxKind::Semicolon | SyntaxKind::Comma
            )
    }

    /// `[async|static]* Type Name(` or `Type Name<` at the current token.
    fn is_local_function_start(&self) -> bool {
        let mut index = self.current;
        while matches!(
            self.kind_at(index),
            SyntaxKind::AsyncKeyword | SyntaxKind::StaticKeyword
        ) {
            index += 1;
        }
        let Some(after_type) = self.scan_type_at(index) else {
            return false;
        };
        Self::is_identifier_like(self.kind_at(after_type))
            && matches!(
                self.kind_at(after_type + 1),
                SyntaxKind::OpenParen | SyntaxKind::LessThan
            )
    }

    // =========================================================================
    // Skipping
    // =========================================================================

    /// Skip a balanced `open ... close` group starting at the current token.
    fn skip_balanced(&mut self, open: SyntaxKind, close: SyntaxKind) {
        let mut depth = 0usize;
        loop {
            let kind = self.token();
            if kind == SyntaxKind::EndOfFile {
                self.parse_error_at_current_token(
                    &diagnostic_messages::TOKEN_EXPECTED,
                    &[close.text()],
                );
                return;
            }
            self.next_token();
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return;
                }
            }
        }
    }

    fn skip_attributes(&mut self) {
        while self.is_token(SyntaxKind::OpenBracket) {
            self.skip_balanced(SyntaxKind::OpenBracket, SyntaxKind::CloseBracket);
        }
    }

    fn skip_where_clauses(&mut self) {
        while self.is_token(SyntaxKind::WhereKeyword) {
            self.next_token();
            while !matches!(
                self.token(),
                SyntaxKind::OpenBrace
                    | SyntaxKind::EqualsGreaterThan
                    | SyntaxKind::Semicolon
                    | SyntaxKind::WhereKeyword
                    | SyntaxKind::EndOfFile
            ) {
                self.next_token();
            }
        }
    }

    /// Skip to just past the next `;`, or up to a `}` that closes the
    /// enclosing construct.
    fn skip_to_statement_end(&mut self) {
        loop {
            match self.token() {
                SyntaxKind::EndOfFile | SyntaxKind::CloseBrace => return,
                SyntaxKind::Semicolon => {
                    self.next_token();
                    return;
                }
                SyntaxKind::OpenBrace => {
                    self.skip_balanced(SyntaxKind::OpenBrace, SyntaxKind::CloseBrace);
                    return;
                }
                SyntaxKind::OpenParen => {
                    self.skip_balanced(SyntaxKind::OpenParen, SyntaxKind::CloseParen);
                }
                _ => self.next_token(),
            }
        }
    }

    fn parse_modifiers(&mut self) -> ModifierFlags {
        let mut flags = ModifierFlags::empty();
        loop {
            let kind = self.token();
            if kind.is_modifier() {
                flags |= ModifierFlags::from_keyword(kind);
                self.next_token();
            } else if (kind == SyntaxKind::NewKeyword
                || self.is_contextual_at(self.current, CONTEXTUAL_MODIFIERS))
                && (Self::is_identifier_like(self.peek(1))
                    || self.peek(1).is_predefined_type()
                    || self.peek(1).is_modifier())
            {
                self.next_token();
            } else {
                return flags;
            }
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Parse the whole file. Returns the `SourceFile` node.
    pub fn parse_source_file(&mut self) -> NodeIndex {
        let _span = debug_span!("parse_source_file", file = %self.file_name).entered();

        let members = self.parse_namespace_members(SyntaxKind::EndOfFile);
        let end = self.arena.source_text().len() as u32;
        let root = self.arena.add_node(
            NodeKind::SourceFile,
            0,
            0,
            end,
            NodeData::SourceFile(SourceFileData {
                file_name: self.file_name.clone(),
                members,
            }),
        );
        self.arena.set_root(root);
        self.diagnostics.sort_by_key(|d| d.start);

        debug!(
            nodes = self.arena.len(),
            diagnostics = self.diagnostics.len(),
            "parsed"
        );
        root
    }

    fn parse_namespace_members(&mut self, terminator: SyntaxKind) -> NodeList {
        let mut members = Vec::new();
        while !self.is_token(terminator) && !self.is_token(SyntaxKind::EndOfFile) {
            let before = self.current;
            let member = self.parse_namespace_member();
            if member.is_some() {
                members.push(member);
            }
            if self.current == before {
                self.report_unexpected_token();
                self.next_token();
            }
        }
        NodeList::new(members)
    }

    fn parse_namespace_member(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let start = self.token_start();

        if self.is_token(SyntaxKind::UsingKeyword)
            || (self.is_contextual_at(self.current, &["global"])
                && self.peek(1) == SyntaxKind::UsingKeyword)
        {
            return self.parse_using_directive(pos, start);
        }
        if self.is_token(SyntaxKind::NamespaceKeyword) {
            return self.parse_namespace_declaration(pos, start);
        }

        self.skip_attributes();
        let modifiers = self.parse_modifiers();
        match self.token() {
            SyntaxKind::ClassKeyword | SyntaxKind::InterfaceKeyword => {
                self.parse_type_declaration(pos, start, modifiers)
            }
            _ => {
                self.report_unexpected_token();
                self.skip_to_statement_end();
                NodeIndex::NONE
            }
        }
    }

    fn parse_dotted_name(&mut self) -> String {
        let mut name = String::new();
        loop {
            if !Self::is_identifier_like(self.token()) {
                self.parse_error_at_current_token(&diagnostic_messages::IDENTIFIER_EXPECTED, &[]);
                break;
            }
            name.push_str(self.text_at(self.current));
            self.next_token();
            if self.is_token(SyntaxKind::Dot) && Self::is_identifier_like(self.peek(1)) {
                name.push('.');
                self.next_token();
            } else {
                break;
            }
        }
        name
    }

    fn parse_using_directive(&mut self, pos: u32, start: u32) -> NodeIndex {
        let is_global = !self.is_token(SyntaxKind::UsingKeyword);
        if is_global {
            self.next_token();
        }
        self.parse_expected(SyntaxKind::UsingKeyword);
        self.parse_optional(SyntaxKind::StaticKeyword);

        // Aliases (`using X = A.B;`) do not import a namespace.
        if Self::is_identifier_like(self.token()) && self.peek(1) == SyntaxKind::Equals {
            self.skip_to_statement_end();
            return NodeIndex::NONE;
        }

        let name = self.parse_dotted_name();
        self.parse_expected(SyntaxKind::Semicolon);
        self.finish_node(
            NodeKind::UsingDirective,
            pos,
            start,
            NodeData::Using(UsingData { name, is_global }),
        )
    }

    fn parse_namespace_declaration(&mut self, pos: u32, start: u32) -> NodeIndex {
        self.next_token();
        let name = self.parse_dotted_name();
        let (is_file_scoped, members) = if self.parse_optional(SyntaxKind::Semicolon) {
            (true, self.parse_namespace_members(SyntaxKind::EndOfFile))
        } else {
            self.parse_expected(SyntaxKind::OpenBrace);
            let members = self.parse_namespace_members(SyntaxKind::CloseBrace);
            self.parse_expected(SyntaxKind::CloseBrace);
            (false, members)
        };
        self.finish_node(
            NodeKind::NamespaceDeclaration,
            pos,
            start,
            NodeData::Namespace(NamespaceData {
                name,
                is_file_scoped,
                members,
            }),
        )
    }

    fn parse_identifier(&mut self) -> NodeIndex {
        if !Self::is_identifier_like(self.token()) {
            self.parse_error_at_current_token(&diagnostic_messages::IDENTIFIER_EXPECTED, &[]);
            return self.create_missing();
        }
        let token = self.current_token();
        let text = self.token_text();
        self.next_token();
        self.arena
            .add_identifier(token.full_start, token.start, token.end, text)
    }

    fn parse_type_parameters(&mut self) -> NodeList {
        let mut params = Vec::new();
        if !self.parse_optional(SyntaxKind::LessThan) {
            return NodeList::default();
        }
        loop {
            self.skip_attributes();
            // Variance annotations.
            if self.is_contextual_at(self.current, &["in", "out"])
                && Self::is_identifier_like(self.peek(1))
            {
                self.next_token();
            }
            let pos = self.token_pos();
            let start = self.token_start();
            let text = if Self::is_identifier_like(self.token()) {
                let text = self.token_text();
                self.next_token();
                text
            } else {
                self.parse_error_at_current_token(&diagnostic_messages::IDENTIFIER_EXPECTED, &[]);
                String::new()
            };
            params.push(self.finish_node(
                NodeKind::TypeParameter,
                pos,
                start,
                NodeData::Identifier(IdentifierData { text }),
            ));
            if !self.parse_optional(SyntaxKind::Comma) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThan);
        NodeList::new(params)
    }

    fn parse_type_declaration(&mut self, pos: u32, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        let kind = if self.is_token(SyntaxKind::InterfaceKeyword) {
            NodeKind::InterfaceDeclaration
        } else {
            NodeKind::ClassDeclaration
        };
        self.next_token();
        let name = self.parse_identifier();
        let class_name = self.arena.identifier_text(name).unwrap_or("").to_string();
        let type_parameters = self.parse_type_parameters();

        let mut base_types = Vec::new();
        if self.parse_optional(SyntaxKind::Colon) {
            loop {
                base_types.push(self.parse_type());
                if !self.parse_optional(SyntaxKind::Comma) {
                    break;
                }
            }
        }
        self.skip_where_clauses();

        let mut members = Vec::new();
        if self.parse_expected(SyntaxKind::OpenBrace) {
            while !self.is_token(SyntaxKind::CloseBrace) && !self.is_token(SyntaxKind::EndOfFile) {
                let before = self.current;
                let member = self.parse_class_member(&class_name);
                if member.is_some() {
                    members.push(member);
                }
                if self.current == before {
                    self.report_unexpected_token();
                    self.next_token();
                }
            }
            self.parse_expected(SyntaxKind::CloseBrace);
        }
        self.parse_optional(SyntaxKind::Semicolon);

        self.finish_node(
            kind,
            pos,
            start,
            NodeData::TypeDecl(TypeDeclData {
                modifiers,
                name,
                type_parameters,
                base_types: NodeList::new(base_types),
                members: NodeList::new(members),
            }),
        )
    }

    fn parse_class_member(&mut self, class_name: &str) -> NodeIndex {
        let pos = self.token_pos();
        let start = self.token_start();
        self.skip_attributes();
        let modifiers = self.parse_modifiers();

        match self.token() {
            SyntaxKind::ClassKeyword | SyntaxKind::InterfaceKeyword => {
                return self.parse_type_declaration(pos, start, modifiers);
            }
            SyntaxKind::Identifier
                if self.peek(1) == SyntaxKind::OpenParen && self.text_at(self.current) == class_name =>
            {
                return self.parse_constructor(pos, start, modifiers);
            }
            _ => {}
        }

        if self.scan_type_at(self.current).is_none() {
            self.report_unexpected_token();
            self.skip_to_statement_end();
            return NodeIndex::NONE;
        }
        let type_node = self.parse_type();

        if self.is_token(SyntaxKind::ThisKeyword) {
            // Indexers are not modelled.
            self.report_unexpected_token();
            self.skip_to_statement_end();
            return NodeIndex::NONE;
        }
        let name = self.parse_identifier();

        match self.token() {
            SyntaxKind::OpenParen | SyntaxKind::LessThan => {
                self.parse_method_rest(NodeKind::MethodDeclaration, pos, start, modifiers, type_node, name)
            }
            SyntaxKind::OpenBrace | SyntaxKind::EqualsGreaterThan => {
                self.parse_property_rest(pos, start, modifiers, type_node, name)
            }
            _ => self.parse_field_rest(pos, start, modifiers, type_node, name),
        }
    }

    fn parse_constructor(&mut self, pos: u32, start: u32, modifiers: ModifierFlags) -> NodeIndex {
        let name = self.parse_identifier();
        let parameters = self.parse_parameter_list();
        // `: base(...)` / `: this(...)` initializer.
        if self.parse_optional(SyntaxKind::Colon) {
            if matches!(self.token(), SyntaxKind::BaseKeyword | SyntaxKind::ThisKeyword) {
                self.next_token();
            }
            if self.is_token(SyntaxKind::OpenParen) {
                self.skip_balanced(SyntaxKind::OpenParen, SyntaxKind::CloseParen);
            }
        }
        let (body, expression_body) = self.parse_function_body();
        self.finish_node(
            NodeKind::ConstructorDeclaration,
            pos,
            start,
            NodeData::Method(MethodData {
                modifiers,
                return_type: NodeIndex::NONE,
                name,
                type_parameters: NodeList::default(),
                parameters,
                body,
                expression_body,
            }),
        )
    }

    fn parse_method_rest(
        &mut self,
        kind: NodeKind,
        pos: u32,
        start: u32,
        modifiers: ModifierFlags,
        return_type: NodeIndex,
        name: NodeIndex,
    ) -> NodeIndex {
        let type_parameters = self.parse_type_parameters();
        let parameters = self.parse_parameter_list();
        self.skip_where_clauses();
        let (body, expression_body) = self.parse_function_body();
        self.finish_node(
            kind,
            pos,
            start,
            NodeData::Method(MethodData {
                modifiers,
                return_type,
                name,
                type_parameters,
                parameters,
                body,
                expression_body,
            }),
        )
    }

    /// Block body, `=> expr;`, or `;`. Returns `(body, expression_body)`.
    fn parse_function_body(&mut self) -> (NodeIndex, NodeIndex) {
        match self.token() {
            SyntaxKind::OpenBrace => (self.parse_block(), NodeIndex::NONE),
            SyntaxKind::EqualsGreaterThan => {
                self.next_token();
                let expr = self.parse_expression();
                self.parse_expected(SyntaxKind::Semicolon);
                (NodeIndex::NONE, expr)
            }
            _ => {
                self.parse_expected(SyntaxKind::Semicolon);
                (NodeIndex::NONE, NodeIndex::NONE)
            }
        }
    }

    fn parse_parameter_list(&mut self) -> NodeList {
        let mut params = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenParen) {
            return NodeList::default();
        }
        while !self.is_token(SyntaxKind::CloseParen) && !self.is_token(SyntaxKind::EndOfFile) {
            let before = self.current;
            params.push(self.parse_parameter());
            if !self.parse_optional(SyntaxKind::Comma) {
                break;
            }
            if self.current == before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParen);
        NodeList::new(params)
    }

    fn parse_parameter(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let start = self.token_start();
        self.skip_attributes();
        while self.is_token(SyntaxKind::ThisKeyword)
            || (self.is_contextual_at(self.current, PARAMETER_MODIFIERS)
                && (Self::is_identifier_like(self.peek(1)) || self.peek(1).is_predefined_type()))
        {
            self.next_token();
        }
        let type_annotation = self.parse_type();
        let name = self.parse_identifier();
        let initializer = if self.parse_optional(SyntaxKind::Equals) {
            self.parse_expression()
        } else {
            NodeIndex::NONE
        };
        self.finish_node(
            NodeKind::Parameter,
            pos,
            start,
            NodeData::Parameter(ParameterData {
                type_annotation,
                name,
                initializer,
            }),
        )
    }

    fn parse_property_rest(
        &mut self,
        pos: u32,
        start: u32,
        modifiers: ModifierFlags,
        type_annotation: NodeIndex,
        name: NodeIndex,
    ) -> NodeIndex {
        let mut initializer = NodeIndex::NONE;
        if self.parse_optional(SyntaxKind::EqualsGreaterThan) {
            initializer = self.parse_expression();
            self.parse_expected(SyntaxKind::Semicolon);
        } else {
            // Accessor bodies are not modelled.
            self.skip_balanced(SyntaxKind::OpenBrace, SyntaxKind::CloseBrace);
            if self.parse_optional(SyntaxKind::Equals) {
                initializer = self.parse_expression();
                self.parse_expected(SyntaxKind::Semicolon);
            }
        }
        self.finish_node(
            NodeKind::PropertyDeclaration,
            pos,
            start,
            NodeData::Property(PropertyData {
                modifiers,
                type_annotation,
                name,
                initializer,
            }),
        )
    }

    fn parse_field_rest(
        &mut self,
        pos: u32,
        start: u32,
        modifiers: ModifierFlags,
        type_annotation: NodeIndex,
        name: NodeIndex,
    ) -> NodeIndex {
        let initializer = if self.parse_optional(SyntaxKind::Equals) {
            self.parse_expression()
        } else {
            NodeIndex::NONE
        };
        // Further declarators share the type; only the first is recorded.
        if self.is_token(SyntaxKind::Comma) {
            self.skip_to_statement_end();
        } else {
            self.parse_expected(SyntaxKind::Semicolon);
        }
        self.finish_node(
            NodeKind::FieldDeclaration,
            pos,
            start,
            NodeData::Property(PropertyData {
                modifiers,
                type_annotation,
                name,
                initializer,
            }),
        )
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub(crate) fn parse_type(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let start = self.token_start();
        let kind = self.token();

        let mut ty = if kind.is_predefined_type() {
            self.next_token();
            self.finish_node(NodeKind::PredefinedType, pos, start, NodeData::Predefined(kind))
        } else if Self::is_identifier_like(kind) {
            self.parse_type_reference(pos, start)
        } else {
            self.parse_error_at_current_token(&diagnostic_messages::TYPE_EXPECTED, &[]);
            return self.create_missing();
        };

        loop {
            match self.token() {
                SyntaxKind::Question => {
                    self.next_token();
                    ty = self.finish_node(NodeKind::NullableType, pos, start, NodeData::WrappedType(ty));
                }
                SyntaxKind::OpenBracket if self.peek(1) == SyntaxKind::CloseBracket => {
                    self.next_token();
                    self.next_token();
                    ty = self.finish_node(NodeKind::ArrayType, pos, start, NodeData::WrappedType(ty));
                }
                _ => return ty,
            }
        }
    }

    fn parse_type_reference(&mut self, pos: u32, start: u32) -> NodeIndex {
        let name = self.parse_dotted_name();
        let mut type_arguments = Vec::new();
        if self.parse_optional(SyntaxKind::LessThan) {
            loop {
                type_arguments.push(self.parse_type());
                if !self.parse_optional(SyntaxKind::Comma) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::GreaterThan);
        }
        self.finish_node(
            NodeKind::TypeReference,
            pos,
            start,
            NodeData::TypeRef(TypeRefData {
                name,
                type_arguments: NodeList::new(type_arguments),
            }),
        )
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let start = self.token_start();
        let mut statements = Vec::new();
        self.parse_expected(SyntaxKind::OpenBrace);
        while !self.is_token(SyntaxKind::CloseBrace) && !self.is_token(SyntaxKind::EndOfFile) {
            let before = self.current;
            let statement = self.parse_statement();
            if statement.is_some() {
                statements.push(statement);
            }
            if self.current == before {
                self.report_unexpected_token();
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBrace);
        self.finish_node(
            NodeKind::Block,
            pos,
            start,
            NodeData::Block(BlockData {
                statements: NodeList::new(statements),
            }),
        )
    }

    fn parse_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let start = self.token_start();
        match self.token() {
            SyntaxKind::OpenBrace => self.parse_block(),
            SyntaxKind::Semicolon => {
                self.next_token();
                NodeIndex::NONE
            }
            SyntaxKind::ReturnKeyword => {
                self.next_token();
                let expr = if self.is_token(SyntaxKind::Semicolon) {
                    NodeIndex::NONE
                } else {
                    self.parse_expression()
                };
                self.parse_expected(SyntaxKind::Semicolon);
                self.finish_node(NodeKind::ReturnStatement, pos, start, NodeData::Wrapped(expr))
            }
            SyntaxKind::IfKeyword => self.parse_if_statement(pos, start),
            SyntaxKind::VarKeyword if Self::is_identifier_like(self.peek(1)) => {
                self.next_token();
                self.parse_local_declaration_rest(pos, start, NodeIndex::NONE)
            }
            _ if self.is_local_function_start() => self.parse_local_function(pos, start),
            _ if self.is_local_declaration_start() => {
                let ty = self.parse_type();
                self.parse_local_declaration_rest(pos, start, ty)
            }
            _ => {
                let expr = self.parse_expression();
                if self.arena.kind(expr) == Some(NodeKind::Missing) {
                    self.skip_to_statement_end();
                    return NodeIndex::NONE;
                }
                self.parse_expected(SyntaxKind::Semicolon);
                self.finish_node(NodeKind::ExpressionStatement, pos, start, NodeData::Wrapped(expr))
            }
        }
    }

    fn parse_if_statement(&mut self, pos: u32, start: u32) -> NodeIndex {
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParen);
        let condition = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParen);
        let then_statement = self.parse_statement();
        let else_statement = if self.parse_optional(SyntaxKind::ElseKeyword) {
            self.parse_statement()
        } else {
            NodeIndex::NONE
        };
        self.finish_node(
            NodeKind::IfStatement,
            pos,
            start,
            NodeData::If(IfData {
                condition,
                then_statement,
                else_statement,
            }),
        )
    }

    fn parse_local_declaration_rest(&mut self, pos: u32, start: u32, type_annotation: NodeIndex) -> NodeIndex {
        let name = self.parse_identifier();
        let initializer = if self.parse_optional(SyntaxKind::Equals) {
            self.parse_expression()
        } else {
            NodeIndex::NONE
        };
        if self.is_token(SyntaxKind::Comma) {
            self.skip_to_statement_end();
        } else {
            self.parse_expected(SyntaxKind::Semicolon);
        }
        self.finish_node(
            NodeKind::LocalDeclaration,
            pos,
            start,
            NodeData::Variable(VariableData {
                type_annotation,
                name,
                initializer,
            }),
        )
    }

    fn parse_local_function(&mut self, pos: u32, start: u32) -> NodeIndex {
        let modifiers = self.parse_modifiers();
        let return_type = self.parse_type();
        let name = self.parse_identifier();
        self.parse_method_rest(NodeKind::LocalFunction, pos, start, modifiers, return_type, name)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub(crate) fn parse_expression(&mut self) -> NodeIndex {
        let left = self.parse_binary_expression(0);
        if !self.is_token(SyntaxKind::Equals) {
            return left;
        }
        self.next_token();
        let right = self.parse_expression();
        let (pos, start) = self.node_starts(left);
        self.finish_node(
            NodeKind::AssignmentExpression,
            pos,
            start,
            NodeData::Binary(BinaryData {
                left,
                operator: SyntaxKind::Equals,
                right,
            }),
        )
    }

    fn node_starts(&self, index: NodeIndex) -> (u32, u32) {
        self.arena
            .get(index)
            .map_or((self.token_pos(), self.token_start()), |n| (n.pos, n.start))
    }

    /// Operator at the current token and its precedence; `>=` spans two tokens.
    fn binary_operator(&self) -> Option<(SyntaxKind, u8, usize)> {
        let op = match self.token() {
            SyntaxKind::BarBar => (SyntaxKind::BarBar, 1, 1),
            SyntaxKind::AmpersandAmpersand => (SyntaxKind::AmpersandAmpersand, 2, 1),
            SyntaxKind::EqualsEquals => (SyntaxKind::EqualsEquals, 3, 1),
            SyntaxKind::ExclamationEquals => (SyntaxKind::ExclamationEquals, 3, 1),
            SyntaxKind::LessThan => (SyntaxKind::LessThan, 4, 1),
            SyntaxKind::LessThanEquals => (SyntaxKind::LessThanEquals, 4, 1),
            SyntaxKind::GreaterThan => {
                let gt = self.current_token();
                let next = self.token_at(self.current + 1);
                if next.kind == SyntaxKind::Equals && next.start == gt.end {
                    (SyntaxKind::GreaterThanEquals, 4, 2)
                } else {
                    (SyntaxKind::GreaterThan, 4, 1)
                }
            }
            SyntaxKind::Plus => (SyntaxKind::Plus, 5, 1),
            SyntaxKind::Minus => (SyntaxKind::Minus, 5, 1),
            SyntaxKind::Asterisk => (SyntaxKind::Asterisk, 6, 1),
            SyntaxKind::Slash => (SyntaxKind::Slash, 6, 1),
            SyntaxKind::Percent => (SyntaxKind::Percent, 6, 1),
            _ => return None,
        };
        Some(op)
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        let mut left = self.parse_unary_expression();
        while let Some((operator, precedence, width)) = self.binary_operator() {
            if precedence < min_precedence {
                break;
            }
            for _ in 0..width {
                self.next_token();
            }
            let right = self.parse_binary_expression(precedence + 1);
            let (pos, start) = self.node_starts(left);
            left = self.finish_node(
                NodeKind::BinaryExpression,
                pos,
                start,
                NodeData::Binary(BinaryData {
                    left,
                    operator,
                    right,
                }),
            );
        }
        left
    }

    fn parse_unary_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let start = self.token_start();
        match self.token() {
            SyntaxKind::Exclamation | SyntaxKind::Minus | SyntaxKind::Plus => {
                let operator = self.token();
                self.next_token();
                let operand = self.parse_unary_expression();
                self.finish_node(
                    NodeKind::PrefixUnaryExpression,
                    pos,
                    start,
                    NodeData::Unary(UnaryData { operator, operand }),
                )
            }
            SyntaxKind::AwaitKeyword => {
                self.next_token();
                let operand = self.parse_unary_expression();
                self.finish_node(NodeKind::AwaitExpression, pos, start, NodeData::Wrapped(operand))
            }
            _ => {
                let primary = self.parse_primary_expression();
                self.parse_postfix_expression(primary, pos, start)
            }
        }
    }

    /// Skip explicit type arguments of a generic invocation (`Foo<T>(...)`).
    fn skip_invocation_type_arguments(&mut self) {
        if let Some(after) = self.scan_type_arguments_at(self.current)
            && self.kind_at(after) == SyntaxKind::OpenParen
        {
            self.current = after;
        }
    }

    fn parse_primary_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let start = self.token_start();
        let kind = self.token();
        match kind {
            k if Self::is_identifier_like(k) => {
                let id = self.parse_identifier();
                self.skip_invocation_type_arguments();
                id
            }
            SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral | SyntaxKind::CharLiteral => {
                let text = self.token_text();
                self.next_token();
                let node_kind = match kind {
                    SyntaxKind::StringLiteral => NodeKind::StringLiteral,
                    SyntaxKind::NumericLiteral => NodeKind::NumericLiteral,
                    _ => NodeKind::CharLiteral,
                };
                self.finish_node(node_kind, pos, start, NodeData::Literal(LiteralData { text }))
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword | SyntaxKind::NullKeyword => {
                let text = self.token_text();
                self.next_token();
                let node_kind = match kind {
                    SyntaxKind::TrueKeyword => NodeKind::TrueLiteral,
                    SyntaxKind::FalseKeyword => NodeKind::FalseLiteral,
                    _ => NodeKind::NullLiteral,
                };
                self.finish_node(node_kind, pos, start, NodeData::Literal(LiteralData { text }))
            }
            SyntaxKind::ThisKeyword => {
                self.next_token();
                self.finish_node(NodeKind::ThisExpression, pos, start, NodeData::None)
            }
            SyntaxKind::BaseKeyword => {
                self.next_token();
                self.finish_node(NodeKind::BaseExpression, pos, start, NodeData::None)
            }
            k if k.is_predefined_type() => {
                // `string.Empty`, `int.Parse(...)`
                self.next_token();
                self.finish_node(NodeKind::PredefinedType, pos, start, NodeData::Predefined(k))
            }
            SyntaxKind::OpenParen => {
                self.next_token();
                let inner = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParen);
                self.finish_node(
                    NodeKind::ParenthesizedExpression,
                    pos,
                    start,
                    NodeData::Wrapped(inner),
                )
            }
            SyntaxKind::NewKeyword => self.parse_object_creation(pos, start),
            _ => {
                self.parse_error_at_current_token(&diagnostic_messages::EXPRESSION_EXPECTED, &[]);
                self.create_missing()
            }
        }
    }

    fn parse_postfix_expression(&mut self, mut expr: NodeIndex, pos: u32, start: u32) -> NodeIndex {
        loop {
            match self.token() {
                SyntaxKind::Dot => {
                    self.next_token();
                    let name = self.parse_identifier();
                    self.skip_invocation_type_arguments();
                    expr = self.finish_node(
                        NodeKind::MemberAccessExpression,
                        pos,
                        start,
                        NodeData::MemberAccess(AccessData {
                            expression: expr,
                            name,
                        }),
                    );
                }
                SyntaxKind::OpenParen => {
                    let arguments = self.parse_argument_list();
                    expr = self.finish_node(
                        NodeKind::InvocationExpression,
                        pos,
                        start,
                        NodeData::Invocation(CallData {
                            expression: expr,
                            arguments,
                        }),
                    );
                }
                _ => return expr,
            }
        }
    }

    fn parse_argument_list(&mut self) -> NodeList {
        let mut arguments = Vec::new();
        self.parse_expected(SyntaxKind::OpenParen);
        while !self.is_token(SyntaxKind::CloseParen) && !self.is_token(SyntaxKind::EndOfFile) {
            // Named arguments: `name: value`.
            if Self::is_identifier_like(self.token()) && self.peek(1) == SyntaxKind::Colon {
                self.next_token();
                self.next_token();
            }
            let before = self.current;
            arguments.push(self.parse_expression());
            if !self.parse_optional(SyntaxKind::Comma) || self.current == before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParen);
        NodeList::new(arguments)
    }

    fn parse_object_creation(&mut self, pos: u32, start: u32) -> NodeIndex {
        self.next_token();
        if self.is_token(SyntaxKind::OpenBrace) {
            let initializers = self.parse_initializer_list();
            return self.finish_node(
                NodeKind::AnonymousObjectCreationExpression,
                pos,
                start,
                NodeData::ObjectCreation(ObjectCreationData {
                    type_node: NodeIndex::NONE,
                    arguments: NodeList::default(),
                    initializers,
                }),
            );
        }

        let type_node = self.parse_type();
        let arguments = if self.is_token(SyntaxKind::OpenParen) {
            self.parse_argument_list()
        } else {
            NodeList::default()
        };
        let initializers = if self.is_token(SyntaxKind::OpenBrace) {
            self.parse_initializer_list()
        } else {
            NodeList::default()
        };
        self.finish_node(
            NodeKind::ObjectCreationExpression,
            pos,
            start,
            NodeData::ObjectCreation(ObjectCreationData {
                type_node,
                arguments,
                initializers,
            }),
        )
    }

    /// `{ Name = value, ... }` or `{ value, ... }` (projection / collection element).
    fn parse_initializer_list(&mut self) -> NodeList {
        let mut initializers = Vec::new();
        self.parse_expected(SyntaxKind::OpenBrace);
        while !self.is_token(SyntaxKind::CloseBrace) && !self.is_token(SyntaxKind::EndOfFile) {
            let before = self.current;
            let pos = self.token_pos();
            let start = self.token_start();
            let name = if Self::is_identifier_like(self.token()) && self.peek(1) == SyntaxKind::Equals {
                let name = self.parse_identifier();
                self.next_token();
                name
            } else {
                NodeIndex::NONE
            };
            let value = self.parse_binary_expression(0);
            initializers.push(self.finish_node(
                NodeKind::MemberInitializer,
                pos,
                start,
                NodeData::MemberInitializer(InitializerData { name, value }),
            ));
            if !self.parse_optional(SyntaxKind::Comma) || self.current == before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBrace);
        NodeList::new(initializers)
    }
}

#[cfg(test)]
#[path = "../tests/parser_tests.rs"]
mod tests;
