//! The narrowing engine: analysis passes and the known-symbols cache.

use crate::cancellation::CancellationToken;
use crate::candidate::{MethodCandidate, collect_candidates};
use crate::diagnostics::{DiagnosticSink, NarrowingDiagnostic, RULE_ID};
use crate::eligibility::{EligibilityResult, evaluate};
use crate::error::Result;
use crate::known_symbols::KnownSymbols;
use crate::oracle::SemanticOracle;
use crate::vocabulary::{FrameworkVocabulary, NarrowingOptions};
use rayon::prelude::*;
use std::sync::{Arc, RwLock};
use tracing::{debug, info_span};
use typize_common::{FileId, SnapshotId};

pub struct NarrowingEngine {
    vocabulary: FrameworkVocabulary,
    options: NarrowingOptions,
    /// Framework symbols of the most recently analyzed snapshot.
    known: RwLock<Option<(SnapshotId, Arc<KnownSymbols>)>>,
}

impl Default for NarrowingEngine {
    fn default() -> Self {
        NarrowingEngine::new(FrameworkVocabulary::default(), NarrowingOptions::default())
    }
}

impl NarrowingEngine {
    pub fn new(vocabulary: FrameworkVocabulary, options: NarrowingOptions) -> Self {
        NarrowingEngine {
            vocabulary,
            options,
            known: RwLock::new(None),
        }
    }

    pub fn vocabulary(&self) -> &FrameworkVocabulary {
        &self.vocabulary
    }

    pub fn options(&self) -> &NarrowingOptions {
        &self.options
    }

    /// Framework symbols for the oracle's snapshot, resolved on first use.
    /// A new snapshot replaces the cached entry.
    pub fn known_symbols(&self, oracle: &dyn SemanticOracle) -> Result<Arc<KnownSymbols>> {
        let snapshot = oracle.snapshot_id();
        {
            let cached = match self.known.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some((id, known)) = cached.as_ref()
                && *id == snapshot
            {
                return Ok(Arc::clone(known));
            }
        }
        let known = Arc::new(KnownSymbols::resolve(oracle, &self.vocabulary)?);
        let mut cached = match self.known.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *cached = Some((snapshot, Arc::clone(&known)));
        Ok(known)
    }

    /// Snapshot whose symbols are currently cached, if any.
    pub fn cached_snapshot(&self) -> Option<SnapshotId> {
        let cached = match self.known.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cached.as_ref().map(|(id, _)| *id)
    }

    pub fn evaluate(
        &self,
        oracle: &dyn SemanticOracle,
        candidate: &MethodCandidate,
    ) -> Result<EligibilityResult> {
        let known = self.known_symbols(oracle)?;
        evaluate(oracle, &known, candidate)
    }

    /// The diagnostic for one method, if it is eligible.
    pub fn analyze_method(
        &self,
        oracle: &dyn SemanticOracle,
        candidate: &MethodCandidate,
    ) -> Result<Option<NarrowingDiagnostic>> {
        let known = self.known_symbols(oracle)?;
        analyze_with(oracle, &known, candidate)
    }

    /// Every diagnostic in one document, in document order.
    pub fn analyze_document(
        &self,
        oracle: &dyn SemanticOracle,
        file: FileId,
        cancel: &CancellationToken,
    ) -> Result<Vec<NarrowingDiagnostic>> {
        let mut diagnostics = Vec::new();
        self.analyze_document_into(oracle, file, cancel, &mut diagnostics)?;
        Ok(diagnostics)
    }

    /// Analyze one document, reporting diagnostics to `sink` in document
    /// order. On cancellation or a hard error, diagnostics for methods before
    /// the failing one have already been reported.
    pub fn analyze_document_into(
        &self,
        oracle: &dyn SemanticOracle,
        file: FileId,
        cancel: &CancellationToken,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<usize> {
        let Some(arena) = oracle.arena(file) else {
            return Ok(0);
        };
        let _span = info_span!("analyze_document", file = arena.file_name()).entered();
        cancel.check()?;
        let known = self.known_symbols(oracle)?;
        let candidates = collect_candidates(arena, file);

        let analyze = |candidate: &MethodCandidate| -> Result<Option<NarrowingDiagnostic>> {
            cancel.check()?;
            analyze_with(oracle, &known, candidate)
        };
        let results: Vec<Result<Option<NarrowingDiagnostic>>> =
            if self.options.parallel && candidates.len() >= self.options.parallel_threshold {
                candidates.par_iter().map(analyze).collect()
            } else {
                candidates.iter().map(analyze).collect()
            };

        let mut reported = 0;
        for result in results {
            if let Some(diagnostic) = result? {
                sink.report(diagnostic);
                reported += 1;
            }
        }
        debug!(candidates = candidates.len(), reported, "document analyzed");
        Ok(reported)
    }
}

pub(crate) fn analyze_with(
    oracle: &dyn SemanticOracle,
    known: &KnownSymbols,
    candidate: &MethodCandidate,
) -> Result<Option<NarrowingDiagnostic>> {
    let EligibilityResult::Eligible {
        payload_type,
        declared_return_type,
        success_call,
        ..
    } = evaluate(oracle, known, candidate)?
    else {
        return Ok(None);
    };
    let payload_span = oracle
        .arena(candidate.file)
        .and_then(|arena| arena.node_span(success_call.argument));
    debug!(method = %candidate.name, "return type can be narrowed");
    Ok(Some(NarrowingDiagnostic {
        file: candidate.file,
        span: candidate.return_type_span,
        rule_id: RULE_ID.to_string(),
        message_args: vec![
            oracle.display_type(declared_return_type),
            candidate.name.clone(),
            oracle.display_type(payload_type),
        ],
        payload_span,
    }))
}

#[cfg(test)]
#[path = "../tests/engine_tests.rs"]
mod tests;
