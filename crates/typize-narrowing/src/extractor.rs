//! Payload extraction: the statically resolved type of the factory argument.

use crate::locator::SuccessCallSite;
use crate::oracle::{SemanticOracle, TypeShape};
use tracing::trace;
use typize_common::{FileId, TypeId};

/// The payload type, or `None` when the argument carries no useful type:
/// no argument, `null`, the top type, an anonymous type, `void`, or a type
/// the host could not resolve.
pub fn extract_payload_type(
    oracle: &dyn SemanticOracle,
    file: FileId,
    site: &SuccessCallSite,
) -> Option<TypeId> {
    if site.argument.is_none() {
        return None;
    }
    let ty = oracle.type_of_node(file, site.argument)?;
    match oracle.type_shape(ty) {
        TypeShape::Top(keyword) => {
            trace!(keyword, "payload is the top type");
            None
        }
        TypeShape::Anonymous | TypeShape::Error | TypeShape::Keyword("void") => None,
        _ => Some(ty),
    }
}
