//! Building the narrowed return type and the edit that installs it.

use crate::candidate::MethodCandidate;
use crate::known_symbols::KnownSymbols;
use crate::oracle::{SemanticOracle, TypeShape};
use serde::{Deserialize, Serialize};
use typize_common::trivia::trailing_trivia_end;
use typize_common::{FileId, Span, SymbolId, TextEdit, TypeId};

/// Replacement of one method's return type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewritePlan {
    pub file: FileId,
    pub method: String,
    /// The return type with its leading and trailing trivia.
    pub replace_span: Span,
    pub leading_trivia: String,
    pub new_type_text: String,
    pub trailing_trivia: String,
    /// The rendering may be shortened further by a host formatter.
    pub simplifiable: bool,
    /// Namespaces whose types were spelled fully qualified because no
    /// `using` brings them into scope. No imports are added.
    pub missing_imports: Vec<String>,
}

impl RewritePlan {
    pub fn replacement_text(&self) -> String {
        format!(
            "{}{}{}",
            self.leading_trivia, self.new_type_text, self.trailing_trivia
        )
    }

    pub fn to_text_edit(&self) -> TextEdit {
        TextEdit::new(self.replace_span, self.replacement_text())
    }
}

/// `ResultGeneric<payload>`, wrapped in the future type for async methods.
pub fn narrowed_return_type(
    oracle: &dyn SemanticOracle,
    known: &KnownSymbols,
    payload_type: TypeId,
    is_async_wrapped: bool,
) -> TypeId {
    let narrowed = oracle.construct_type(known.result_generic, &[payload_type]);
    if is_async_wrapped {
        oracle.construct_type(known.future, &[narrowed])
    } else {
        narrowed
    }
}

pub fn build_plan(
    oracle: &dyn SemanticOracle,
    known: &KnownSymbols,
    candidate: &MethodCandidate,
    payload_type: TypeId,
    is_async_wrapped: bool,
) -> Option<RewritePlan> {
    let arena = oracle.arena(candidate.file)?;
    let node = arena.get(candidate.return_type)?;
    let source = arena.source_text();

    let new_type = narrowed_return_type(oracle, known, payload_type, is_async_wrapped);
    let mut renderer = TypeRenderer {
        oracle,
        file: candidate.file,
        position: node.start,
        missing_imports: Vec::new(),
    };
    let new_type_text = renderer.render(new_type);

    let trailing_end = trailing_trivia_end(source, node.end);
    Some(RewritePlan {
        file: candidate.file,
        method: candidate.name.clone(),
        replace_span: Span::new(node.pos, trailing_end),
        leading_trivia: Span::new(node.pos, node.start).text(source).to_string(),
        new_type_text,
        trailing_trivia: Span::new(node.end, trailing_end).text(source).to_string(),
        simplifiable: true,
        missing_imports: renderer.missing_imports,
    })
}

/// Renders types with the shortest spelling valid at `position`.
struct TypeRenderer<'a> {
    oracle: &'a dyn SemanticOracle,
    file: FileId,
    position: u32,
    missing_imports: Vec<String>,
}

impl TypeRenderer<'_> {
    fn render(&mut self, ty: TypeId) -> String {
        match self.oracle.type_shape(ty) {
            TypeShape::Top(keyword) | TypeShape::Keyword(keyword) => keyword.to_string(),
            TypeShape::Named {
                definition,
                arguments,
            } => self.named(definition, &arguments),
            TypeShape::Array(elem) => format!("{}[]", self.render(elem)),
            TypeShape::Nullable(elem) => format!("{}?", self.render(elem)),
            TypeShape::TypeParameter(name) => name,
            TypeShape::Error | TypeShape::Anonymous => self.oracle.display_type(ty),
        }
    }

    /// Nested types are spelled from the innermost containing type whose
    /// simple name is visible. Only when the outermost type is not visible
    /// does the namespace prefix appear.
    fn named(&mut self, definition: SymbolId, arguments: &[TypeId]) -> String {
        let mut chain = vec![definition];
        while let Some(outer) = chain.last().and_then(|&s| self.oracle.containing_type(s)) {
            chain.push(outer);
        }

        // Innermost first, each segment taking its own arguments from the end.
        let mut end = arguments.len();
        let mut segments = Vec::with_capacity(chain.len());
        for &sym in &chain {
            let arity = self.oracle.type_parameter_count(sym).min(end);
            segments.push(self.segment(sym, &arguments[end - arity..end]));
            end -= arity;
        }

        for (depth, &sym) in chain.iter().enumerate() {
            if self.oracle.visible_from(self.file, self.position, sym) {
                return join_segments(&segments[..=depth]);
            }
        }

        let spelled = join_segments(&segments);
        let outermost = chain[chain.len() - 1];
        match self.oracle.containing_namespace(outermost) {
            Some(namespace) => {
                if !self.oracle.namespace_in_scope(self.file, self.position, &namespace)
                    && !self.missing_imports.contains(&namespace)
                {
                    self.missing_imports.push(namespace.clone());
                }
                format!("{namespace}.{spelled}")
            }
            None => spelled,
        }
    }

    fn segment(&mut self, sym: SymbolId, arguments: &[TypeId]) -> String {
        let mut out = self.oracle.symbol_name(sym);
        if !arguments.is_empty() {
            let rendered: Vec<String> = arguments.iter().map(|&a| self.render(a)).collect();
            out.push('<');
            out.push_str(&rendered.join(", "));
            out.push('>');
        }
        out
    }
}

/// Segments are innermost first; the spelling is outermost first.
fn join_segments(segments: &[String]) -> String {
    let mut parts: Vec<&str> = segments.iter().map(String::as_str).collect();
    parts.reverse();
    parts.join(".")
}
