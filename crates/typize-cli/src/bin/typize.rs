#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use typize_cli::args::{CliArgs, OutputFormat};
use typize_cli::driver::{self, EXIT_ERROR};
use typize_cli::reporter::Reporter;

fn main() -> Result<()> {
    // Installed only when TYPIZE_LOG or RUST_LOG is set.
    typize_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;

    let result = match driver::run(&args, &cwd) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(EXIT_ERROR);
        }
    };

    match args.format {
        OutputFormat::Json => {
            println!("{}", result.to_json()?);
        }
        OutputFormat::Pretty => {
            let pretty = args.pretty.unwrap_or_else(|| std::io::stderr().is_terminal());
            let mut reporter = Reporter::new(pretty);
            for (name, text) in &result.sources {
                reporter.add_source(name.clone(), text.clone());
            }
            eprint!("{}", reporter.render(&result.diagnostics));
            for error in &result.errors {
                if error.file.is_empty() {
                    eprintln!("error: {}", error.message);
                } else {
                    eprintln!("error: {}: {}", error.file, error.message);
                }
            }
            for fixed in &result.fixed {
                eprintln!("Narrowed {} method(s) in {}", fixed.methods, fixed.file);
                if !fixed.missing_imports.is_empty() {
                    eprintln!(
                        "  types were written fully qualified; consider importing {}",
                        fixed.missing_imports.join(", ")
                    );
                }
            }
            if let Some(summary) = reporter.summary(&result.diagnostics) {
                eprintln!("{summary}");
            }
        }
    }

    std::process::exit(result.exit_code());
}
