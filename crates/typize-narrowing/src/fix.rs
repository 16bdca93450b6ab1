//! Applying rewrites: one diagnostic at a time, or every diagnostic in a file.

use crate::cancellation::CancellationToken;
use crate::candidate::MethodCandidate;
use crate::diagnostics::NarrowingDiagnostic;
use crate::eligibility::{EligibilityResult, evaluate};
use crate::engine::NarrowingEngine;
use crate::error::{NarrowingError, Result};
use crate::known_symbols::KnownSymbols;
use crate::oracle::SemanticOracle;
use crate::rewriter::{RewritePlan, build_plan};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};
use typize_common::{FileId, TextEdit, apply_text_edits};

/// Title shown for the code fix.
pub const FIX_TITLE: &str = "Narrow return type to the returned payload type";

/// The complete new text of one document, and the edits that produce it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEdit {
    pub file: FileId,
    pub title: String,
    pub edits: Vec<TextEdit>,
    pub new_text: String,
    /// Namespaces the rewritten types would need imported to be spelled short.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_imports: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// `None` when no diagnostic produced a rewrite.
    pub edit: Option<DocumentEdit>,
    pub applied: usize,
    /// Stale, duplicate and foreign-file diagnostics.
    pub skipped: usize,
}

impl NarrowingEngine {
    /// Rewrite the method a diagnostic points at.
    ///
    /// Eligibility is re-derived from the current snapshot; if it no longer
    /// holds, or the diagnostic no longer points at a method's return type,
    /// the result is `Ok(None)`.
    pub fn fix_one(
        &self,
        oracle: &dyn SemanticOracle,
        diagnostic: &NarrowingDiagnostic,
    ) -> Result<Option<DocumentEdit>> {
        let known = self.known_symbols(oracle)?;
        let Some(plan) = plan_for(oracle, &known, diagnostic)? else {
            return Ok(None);
        };
        apply_plans(oracle, diagnostic.file, vec![plan])
    }

    /// Rewrite every method in `file` named by `diagnostics`, as one edit.
    ///
    /// Stale diagnostics are skipped. Cancellation is checked between
    /// methods; a cancelled batch applies nothing.
    pub fn fix_all_in_file(
        &self,
        oracle: &dyn SemanticOracle,
        file: FileId,
        diagnostics: &[NarrowingDiagnostic],
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome> {
        let _span = info_span!("fix_all_in_file", file = file.0, count = diagnostics.len()).entered();
        let known = self.known_symbols(oracle)?;
        let mut seen = FxHashSet::default();
        let mut plans = Vec::new();
        let mut skipped = 0;

        for diagnostic in diagnostics {
            cancel.check()?;
            if diagnostic.file != file || !seen.insert(diagnostic.span) {
                skipped += 1;
                continue;
            }
            match plan_for(oracle, &known, diagnostic)? {
                Some(plan) => plans.push(plan),
                None => {
                    debug!(start = diagnostic.span.start, "skipping stale diagnostic");
                    skipped += 1;
                }
            }
        }

        let applied = plans.len();
        let edit = apply_plans(oracle, file, plans)?;
        Ok(BatchOutcome {
            edit,
            applied,
            skipped,
        })
    }
}

fn plan_for(
    oracle: &dyn SemanticOracle,
    known: &KnownSymbols,
    diagnostic: &NarrowingDiagnostic,
) -> Result<Option<RewritePlan>> {
    let Some(arena) = oracle.arena(diagnostic.file) else {
        return Ok(None);
    };
    let Some(candidate) = MethodCandidate::at_return_type_span(arena, diagnostic.file, diagnostic.span)
    else {
        return Ok(None);
    };
    // A method edited into an inconsistent async shape is stale, not fatal.
    let eligibility = match evaluate(oracle, known, &candidate) {
        Err(NarrowingError::InconsistentAsyncShape { method }) => {
            debug!(method = %method, "diagnosed method no longer has a consistent async shape");
            return Ok(None);
        }
        other => other?,
    };
    let EligibilityResult::Eligible {
        is_async_wrapped,
        payload_type,
        ..
    } = eligibility
    else {
        return Ok(None);
    };
    Ok(build_plan(oracle, known, &candidate, payload_type, is_async_wrapped))
}

fn apply_plans(
    oracle: &dyn SemanticOracle,
    file: FileId,
    plans: Vec<RewritePlan>,
) -> Result<Option<DocumentEdit>> {
    if plans.is_empty() {
        return Ok(None);
    }
    let Some(arena) = oracle.arena(file) else {
        return Ok(None);
    };
    let mut missing_imports: Vec<String> = Vec::new();
    for plan in &plans {
        for namespace in &plan.missing_imports {
            if !missing_imports.contains(namespace) {
                missing_imports.push(namespace.clone());
            }
        }
    }
    let edits: Vec<TextEdit> = plans.iter().map(RewritePlan::to_text_edit).collect();
    let new_text = apply_text_edits(arena.source_text(), &edits)?;
    Ok(Some(DocumentEdit {
        file,
        title: FIX_TITLE.to_string(),
        edits,
        new_text,
        missing_imports,
    }))
}
