//! Container eligibility: does the enclosing type derive from the handler base?

use crate::candidate::MethodCandidate;
use crate::known_symbols::KnownSymbols;
use crate::oracle::SemanticOracle;

/// True iff the enclosing type, or a class above it in its base-class chain,
/// is the handler base. Implemented interfaces are not consulted.
pub fn derives_from_handler_base(
    oracle: &dyn SemanticOracle,
    known: &KnownSymbols,
    candidate: &MethodCandidate,
) -> bool {
    let Some(container) = oracle.declared_symbol(candidate.file, candidate.container) else {
        return false;
    };
    let base = oracle.original_definition(known.handler_base);
    std::iter::once(container)
        .chain(oracle.base_class_chain(container))
        .any(|class| oracle.symbols_identical(oracle.original_definition(class), base))
}
