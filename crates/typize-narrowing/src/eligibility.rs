//! Eligibility: classification, container check, call location and payload
//! extraction, in that order. All four must succeed.

use crate::candidate::MethodCandidate;
use crate::classifier::{SignatureShape, classify_signature};
use crate::container::derives_from_handler_base;
use crate::error::Result;
use crate::extractor::extract_payload_type;
use crate::known_symbols::KnownSymbols;
use crate::locator::{SuccessCallSite, locate_success_call};
use crate::oracle::SemanticOracle;
use tracing::trace;
use typize_common::TypeId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EligibilityResult {
    Ineligible,
    Eligible {
        is_async_wrapped: bool,
        payload_type: TypeId,
        declared_return_type: TypeId,
        success_call: SuccessCallSite,
    },
}

impl EligibilityResult {
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityResult::Eligible { .. })
    }
}

/// Eligibility of one method against one snapshot. Pure: the same candidate
/// and snapshot always give the same answer.
pub fn evaluate(
    oracle: &dyn SemanticOracle,
    known: &KnownSymbols,
    candidate: &MethodCandidate,
) -> Result<EligibilityResult> {
    let method = candidate.name.as_str();
    let Some((shape, declared_return_type)) = classify_signature(oracle, known, candidate)? else {
        trace!(method, "return type is not narrowable");
        return Ok(EligibilityResult::Ineligible);
    };
    if !derives_from_handler_base(oracle, known, candidate) {
        trace!(method, "container does not derive from the handler base");
        return Ok(EligibilityResult::Ineligible);
    }
    let Some(success_call) = locate_success_call(oracle, known, candidate) else {
        trace!(method, "no factory call returned");
        return Ok(EligibilityResult::Ineligible);
    };
    let Some(payload_type) = extract_payload_type(oracle, candidate.file, &success_call) else {
        trace!(method, "payload type carries no information");
        return Ok(EligibilityResult::Ineligible);
    };
    Ok(EligibilityResult::Eligible {
        is_async_wrapped: shape == SignatureShape::Wrapped,
        payload_type,
        declared_return_type,
        success_call,
    })
}
