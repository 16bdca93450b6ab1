//! Diagnostics reported for eligible methods.

use serde::{Deserialize, Serialize};
use typize_common::diagnostics::{diagnostic_messages, format_message};
use typize_common::{Diagnostic, FileId, Span};

/// Rule identifier carried by every narrowing diagnostic.
pub const RULE_ID: &str = "TYP1001";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrowingDiagnostic {
    pub file: FileId,
    /// Span of the declared return type.
    pub span: Span,
    pub rule_id: String,
    /// Declared return type, method name, payload type.
    pub message_args: Vec<String>,
    /// Span of the factory argument that carries the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_span: Option<Span>,
}

impl NarrowingDiagnostic {
    pub fn message(&self) -> String {
        let args: Vec<&str> = self.message_args.iter().map(String::as_str).collect();
        format_message(diagnostic_messages::RETURN_TYPE_CAN_BE_NARROWED.message, &args)
    }

    /// Host diagnostic with the payload argument as related information.
    pub fn to_diagnostic(&self, file_name: &str) -> Diagnostic {
        let args: Vec<&str> = self.message_args.iter().map(String::as_str).collect();
        let diagnostic = Diagnostic::from_message(
            file_name,
            self.span.start,
            self.span.len(),
            &diagnostic_messages::RETURN_TYPE_CAN_BE_NARROWED,
            &args,
        );
        match self.payload_span {
            Some(payload) => diagnostic.with_related(
                file_name,
                payload.start,
                payload.len(),
                "The payload type is taken from this argument.",
            ),
            None => diagnostic,
        }
    }
}

/// Receives diagnostics as analysis produces them.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: NarrowingDiagnostic);
}

impl DiagnosticSink for Vec<NarrowingDiagnostic> {
    fn report(&mut self, diagnostic: NarrowingDiagnostic) {
        self.push(diagnostic);
    }
}
