//! Common types and utilities shared by the typize crates.
//!
//! This crate provides foundational types used across the workspace:
//! - Source spans (`Span`) and file/snapshot identifiers
//! - Position/Range types and the `LineMap` for line/column conversion
//! - Diagnostics and message templates
//! - Trivia scanning (whitespace and comments around tokens)
//! - Text edits and their application to a document

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Identifiers for files within a program and for program snapshots
pub mod ids;
pub use ids::{FileId, SnapshotId, SymbolId, TypeId};

// Position/Range types for line/column source locations
pub mod position;
pub use position::{LineMap, Position, Range};

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticMessage};

// Whitespace and comment scanning
pub mod trivia;

pub mod text_edit;
pub use text_edit::{TextEdit, TextEditError, apply_text_edits};
