use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the typize binary.
#[derive(Parser, Debug)]
#[command(
    name = "typize",
    version,
    about = "Narrow IActionResult return types to ActionResult<T>"
)]
pub struct CliArgs {
    /// Source files or directories to analyze.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Path to typize.json. Defaults to typize.json in the working directory.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Rewrite files in place.
    #[arg(long)]
    pub fix: bool,

    /// Output format for diagnostics.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Enable color and formatting in output. Defaults to on for terminals.
    #[arg(long)]
    pub pretty: Option<bool>,

    // ==================== Overrides of typize.json ====================
    /// Glob patterns a file must match to be analyzed.
    #[arg(long, value_delimiter = ',')]
    pub include: Option<Vec<String>>,

    /// Glob patterns of files to leave out.
    #[arg(long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Additional library source files declaring framework types.
    #[arg(long = "lib", value_delimiter = ',')]
    pub extra_libs: Option<Vec<PathBuf>>,

    /// Metadata name of the handler base class.
    #[arg(long = "handler-base")]
    pub handler_base: Option<String>,

    /// Name of the success factory member on the handler base.
    #[arg(long = "factory-member")]
    pub factory_member: Option<String>,

    /// Do not import the implicit global namespaces.
    #[arg(long = "no-implicit-usings")]
    pub no_implicit_usings: bool,

    /// Analyze methods on a single thread.
    #[arg(long = "no-parallel")]
    pub no_parallel: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `file:line:col - warning TYP1001: ...` with a source snippet.
    Pretty,
    /// One JSON document on stdout.
    Json,
}

#[cfg(test)]
#[path = "../tests/args_tests.rs"]
mod tests;
