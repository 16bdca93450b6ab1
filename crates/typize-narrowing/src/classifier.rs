//! Signature classification: is the declared return type one the engine can narrow?

use crate::candidate::MethodCandidate;
use crate::error::{NarrowingError, Result};
use crate::known_symbols::KnownSymbols;
use crate::oracle::{SemanticOracle, TypeShape};
use typize_common::TypeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureShape {
    /// The return type is exactly the marker type.
    Direct,
    /// The return type is the future type over exactly the marker type.
    Wrapped,
}

/// The declared return type and its shape, or `None` if it has neither shape.
///
/// A wrapped return type on a method without the `async` modifier is an
/// `InconsistentAsyncShape` error.
pub fn classify_signature(
    oracle: &dyn SemanticOracle,
    known: &KnownSymbols,
    candidate: &MethodCandidate,
) -> Result<Option<(SignatureShape, TypeId)>> {
    let Some(declared) = oracle.type_of_node(candidate.file, candidate.return_type) else {
        return Ok(None);
    };
    let shape = match oracle.type_shape(declared) {
        TypeShape::Named {
            definition,
            arguments,
        } => {
            if arguments.is_empty() && oracle.symbols_identical(definition, known.marker) {
                SignatureShape::Direct
            } else if oracle.symbols_identical(definition, known.future)
                && arguments.len() == 1
                && is_marker(oracle, known, arguments[0])
            {
                SignatureShape::Wrapped
            } else {
                return Ok(None);
            }
        }
        _ => return Ok(None),
    };
    if shape == SignatureShape::Wrapped && !candidate.is_async {
        return Err(NarrowingError::InconsistentAsyncShape {
            method: candidate.name.clone(),
        });
    }
    Ok(Some((shape, declared)))
}

fn is_marker(oracle: &dyn SemanticOracle, known: &KnownSymbols, ty: TypeId) -> bool {
    ty == known.marker_type
        || matches!(
            oracle.type_shape(ty),
            TypeShape::Named { definition, arguments }
                if arguments.is_empty() && oracle.symbols_identical(definition, known.marker)
        )
}
