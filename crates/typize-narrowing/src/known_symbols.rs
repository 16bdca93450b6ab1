//! Framework symbols resolved once per oracle snapshot.

use crate::error::{NarrowingError, Result};
use crate::oracle::SemanticOracle;
use crate::vocabulary::FrameworkVocabulary;
use tracing::debug;
use typize_common::{SymbolId, TypeId};

/// Decides whether an invocation target is the factory member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallTargetMatcher {
    /// Neither the handler base nor the factory is generic.
    Exact(SymbolId),
    /// Targets reached through a constructed type match by original definition.
    OriginalDefinition(SymbolId),
}

impl CallTargetMatcher {
    pub fn matches(&self, oracle: &dyn SemanticOracle, target: SymbolId) -> bool {
        match *self {
            CallTargetMatcher::Exact(factory) => oracle.symbols_identical(target, factory),
            CallTargetMatcher::OriginalDefinition(factory) => oracle.symbols_identical(
                oracle.original_definition(target),
                oracle.original_definition(factory),
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct KnownSymbols {
    pub marker: SymbolId,
    /// The marker as a type, for identity comparison with return types.
    pub marker_type: TypeId,
    pub result_generic: SymbolId,
    pub future: SymbolId,
    pub handler_base: SymbolId,
    pub factory: SymbolId,
    pub matcher: CallTargetMatcher,
}

impl KnownSymbols {
    pub fn resolve(oracle: &dyn SemanticOracle, vocabulary: &FrameworkVocabulary) -> Result<Self> {
        let lookup = |name: &str| {
            oracle
                .type_by_metadata_name(name)
                .ok_or_else(|| NarrowingError::FrameworkTypeMissing {
                    name: name.to_string(),
                })
        };
        let marker = lookup(&vocabulary.marker_type)?;
        let result_generic = lookup(&vocabulary.result_generic_type)?;
        let future = lookup(&vocabulary.future_type)?;
        let handler_base = lookup(&vocabulary.handler_base_type)?;

        let factory = oracle
            .members_named(handler_base, &vocabulary.factory_member)
            .into_iter()
            .find(|&m| oracle.parameter_count(m) == vocabulary.factory_arity)
            .ok_or_else(|| NarrowingError::FactoryMemberMissing {
                base: vocabulary.handler_base_type.clone(),
                member: vocabulary.factory_member.clone(),
                arity: vocabulary.factory_arity,
            })?;

        let generic = oracle.type_parameter_count(handler_base) > 0
            || oracle.type_parameter_count(factory) > 0;
        let matcher = if generic {
            CallTargetMatcher::OriginalDefinition(factory)
        } else {
            CallTargetMatcher::Exact(factory)
        };
        debug!(?matcher, snapshot = oracle.snapshot_id().0, "resolved framework symbols");

        Ok(KnownSymbols {
            marker,
            marker_type: oracle.construct_type(marker, &[]),
            result_generic,
            future,
            handler_base,
            factory,
            matcher,
        })
    }
}
