//! Framework vocabulary and engine options.

use serde::{Deserialize, Serialize};

/// Names of the framework types and members the engine recognizes.
///
/// Type names are metadata names: namespace-qualified, with a backtick arity
/// suffix for generic types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameworkVocabulary {
    /// The erased-result marker, e.g. `IActionResult`.
    pub marker_type: String,
    /// The generic result type the marker is narrowed to.
    pub result_generic_type: String,
    /// The one-argument future type wrapping results of async methods.
    pub future_type: String,
    /// Base class of request handlers.
    pub handler_base_type: String,
    /// Member of the handler base whose argument carries the payload.
    pub factory_member: String,
    pub factory_arity: usize,
}

impl Default for FrameworkVocabulary {
    fn default() -> Self {
        FrameworkVocabulary {
            marker_type: "Microsoft.AspNetCore.Mvc.IActionResult".to_string(),
            result_generic_type: "Microsoft.AspNetCore.Mvc.ActionResult`1".to_string(),
            future_type: "System.Threading.Tasks.Task`1".to_string(),
            handler_base_type: "Microsoft.AspNetCore.Mvc.ControllerBase".to_string(),
            factory_member: "Ok".to_string(),
            factory_arity: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NarrowingOptions {
    /// Analyze methods of a document on the rayon pool.
    pub parallel: bool,
    /// Documents with fewer candidate methods are analyzed sequentially.
    pub parallel_threshold: usize,
}

impl Default for NarrowingOptions {
    fn default() -> Self {
        NarrowingOptions {
            parallel: true,
            parallel_threshold: 4,
        }
    }
}
