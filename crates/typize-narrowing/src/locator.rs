//! Success-call location: the factory invocation that carries the payload.

use crate::candidate::{MethodBody, MethodCandidate};
use crate::known_symbols::KnownSymbols;
use crate::oracle::SemanticOracle;
use typize_parser::{NodeArena, NodeIndex, NodeKind};

/// A factory invocation and its payload argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SuccessCallSite {
    pub call: NodeIndex,
    /// First argument, `NONE` if the call has none.
    pub argument: NodeIndex,
}

/// The first returned expression (in document order) that invokes the
/// factory member. For an expression body, the body itself must be the call.
pub fn locate_success_call(
    oracle: &dyn SemanticOracle,
    known: &KnownSymbols,
    candidate: &MethodCandidate,
) -> Option<SuccessCallSite> {
    let arena = oracle.arena(candidate.file)?;
    match candidate.body {
        MethodBody::Expression(expr) => match_factory_call(oracle, known, candidate, arena, expr),
        MethodBody::Block(block) => {
            let mut returns = Vec::new();
            collect_returns(arena, block, &mut returns);
            returns.into_iter().find_map(|ret| {
                let expr = arena.get(ret).map(|n| arena.get_wrapped(n))?;
                match_factory_call(oracle, known, candidate, arena, expr)
            })
        }
    }
}

fn match_factory_call(
    oracle: &dyn SemanticOracle,
    known: &KnownSymbols,
    candidate: &MethodCandidate,
    arena: &NodeArena,
    expr: NodeIndex,
) -> Option<SuccessCallSite> {
    let call = arena.skip_parentheses(expr);
    let data = arena.get_call_expr(arena.get(call)?)?;
    let target = oracle.invocation_target(candidate.file, call)?;
    if !known.matcher.matches(oracle, target) {
        return None;
    }
    Some(SuccessCallSite {
        call,
        argument: data.arguments.first().unwrap_or(NodeIndex::NONE),
    })
}

/// Return statements under `node` in document order, not descending into
/// local functions.
fn collect_returns(arena: &NodeArena, node: NodeIndex, out: &mut Vec<NodeIndex>) {
    let Some(kind) = arena.kind(node) else {
        return;
    };
    match kind {
        NodeKind::ReturnStatement => out.push(node),
        NodeKind::LocalFunction => {}
        _ => {
            for child in arena.children(node) {
                collect_returns(arena, child, out);
            }
        }
    }
}
