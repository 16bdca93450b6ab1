//! Scanner and parser for the typize reference host language, a C#-like
//! controller language.
//!
//! The parser produces a `NodeArena` per file. Nodes keep both their full
//! start (leading trivia included) and their significant start so that
//! rewrites can transplant trivia exactly.

pub mod scanner;
pub use scanner::{ScannerState, SyntaxKind, Token};

pub mod node;
pub use node::{ModifierFlags, Node, NodeData, NodeIndex, NodeKind, NodeList};

pub mod node_arena;
pub use node_arena::NodeArena;

pub mod parser;
pub use parser::ParserState;

/// Parse `source` in one step.
pub fn parse_file(
    file_name: impl Into<String>,
    source: impl Into<String>,
) -> (NodeArena, Vec<typize_common::Diagnostic>) {
    let mut parser = ParserState::new(file_name, source);
    parser.parse_source_file();
    parser.into_parts()
}
