//! Binder and type resolver for the typize reference host language.
//!
//! A `Program` is an immutable snapshot of a set of files: parsed, bound,
//! and with every declared type resolved. Expression types and invocation
//! targets are computed on demand, so a program can be queried from many
//! threads at once.

pub mod symbols;
pub use symbols::{Symbol, SymbolArena, SymbolKind};

pub mod types;
pub use types::{IntrinsicKind, Substitution, TypeArgs, TypeInterner, TypeKey};

pub mod binder;
pub use binder::{BinderState, CONSTRUCTOR_NAME};

pub mod program;
pub use program::{FRAMEWORK_SOURCE, IMPLICIT_USINGS, Program, ProgramBuilder, SourceFile};

mod type_resolution;

pub mod expr;
pub use expr::MemberLookup;

mod display;
