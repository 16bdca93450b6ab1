//! Logging for `typize` runs.
//!
//! The engine opens an `analyze_document` span per file and a
//! `fix_all_in_file` span per `--fix` batch. Rejected methods are logged at
//! `trace` with the stage that rejected them, and stale diagnostics skipped
//! by a batch at `debug`. To see why a method was not reported:
//!
//! ```bash
//! TYPIZE_LOG="typize_narrowing=trace" TYPIZE_LOG_FORMAT=tree typize Controllers/
//! ```
//!
//! `TYPIZE_LOG_FORMAT` is `text` (default), `tree` or `json`. Logs always go
//! to stderr so `--format json` output on stdout stays parseable. Nothing is
//! installed unless `TYPIZE_LOG` or `RUST_LOG` is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("TYPIZE_LOG_FORMAT").unwrap_or_default())
    }
}

/// Filter directives to install, `TYPIZE_LOG` taking precedence over
/// `RUST_LOG`. `None` when neither is set.
pub fn filter_directives(typize_log: Option<String>, rust_log: Option<String>) -> Option<String> {
    typize_log.or(rust_log)
}

/// Install the global subscriber. Output goes to stderr so it never mixes
/// with `--format json` on stdout.
pub fn init_tracing() {
    let Some(directives) =
        filter_directives(std::env::var("TYPIZE_LOG").ok(), std::env::var("RUST_LOG").ok())
    else {
        return;
    };
    let filter = EnvFilter::builder().parse_lossy(directives);

    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[cfg(test)]
#[path = "../tests/tracing_config_tests.rs"]
mod tests;
