//! Return-type narrowing engine.
//!
//! Finds request-handler methods declared to return the erased-result marker
//! (`IActionResult`, or `Task<IActionResult>` for async methods) whose body
//! returns a success-factory call such as `Ok(item)`, and rewrites the
//! declared return type to the precise generic result (`ActionResult<Item>`,
//! `Task<ActionResult<Item>>`).
//!
//! A method is eligible when all of the following hold:
//! - the declared return type is the marker, or the future type over it
//! - the enclosing class derives (through base classes only) from the
//!   handler base
//! - some returned expression invokes the handler base's factory member
//! - the first such call's argument has an informative static type
//!
//! The engine reads syntax from the host and asks a [`SemanticOracle`] for
//! everything semantic. [`Program`](typize_checker::Program) from the
//! reference host implements the oracle.

pub mod cancellation;
pub mod candidate;
pub mod classifier;
pub mod container;
pub mod diagnostics;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod fix;
mod host_oracle;
pub mod known_symbols;
pub mod locator;
pub mod oracle;
pub mod rewriter;
pub mod vocabulary;

pub use cancellation::CancellationToken;
pub use candidate::{MethodBody, MethodCandidate, collect_candidates};
pub use diagnostics::{DiagnosticSink, NarrowingDiagnostic, RULE_ID};
pub use eligibility::EligibilityResult;
pub use engine::NarrowingEngine;
pub use error::{NarrowingError, Result};
pub use fix::{BatchOutcome, DocumentEdit, FIX_TITLE};
pub use known_symbols::{CallTargetMatcher, KnownSymbols};
pub use locator::SuccessCallSite;
pub use oracle::{SemanticOracle, TypeShape};
pub use rewriter::RewritePlan;
pub use vocabulary::{FrameworkVocabulary, NarrowingOptions};
