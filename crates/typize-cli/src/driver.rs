//! Collects sources, builds one program, analyzes it and applies fixes.

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};
use typize_checker::{Program, ProgramBuilder};
use typize_common::{Diagnostic, FileId};
use typize_narrowing::{
    BatchOutcome, CancellationToken, NarrowingDiagnostic, NarrowingEngine, NarrowingError,
};
use walkdir::{DirEntry, WalkDir};

use crate::args::CliArgs;
use crate::config::{ResolvedConfig, resolve_config};

pub const EXIT_SUCCESS: i32 = 0;
/// Narrowing opportunities were reported and left unfixed.
pub const EXIT_DIAGNOSTICS: i32 = 1;
/// Parse errors, hard analysis errors, or unusable input.
pub const EXIT_ERROR: i32 = 2;

const SOURCE_EXTENSION: &str = "cs";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileError {
    pub file: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedFile {
    pub file: String,
    pub methods: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_imports: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    #[serde(skip)]
    pub files_read: Vec<PathBuf>,
    /// Display name and text of every file read, for rendering snippets.
    #[serde(skip)]
    pub sources: Vec<(String, String)>,
    /// Unfixed narrowing warnings and parse errors.
    pub diagnostics: Vec<Diagnostic>,
    pub fixed: Vec<FixedFile>,
    pub errors: Vec<FileError>,
}

impl RunResult {
    pub fn exit_code(&self) -> i32 {
        if !self.errors.is_empty() || self.diagnostics.iter().any(Diagnostic::is_error) {
            EXIT_ERROR
        } else if !self.diagnostics.is_empty() {
            EXIT_DIAGNOSTICS
        } else {
            EXIT_SUCCESS
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize results")
    }
}

struct Input {
    id: FileId,
    path: PathBuf,
    name: String,
}

enum FileOutcome {
    ParseErrors(Vec<Diagnostic>),
    Analyzed {
        diagnostics: Vec<NarrowingDiagnostic>,
        batch: Option<BatchOutcome>,
    },
    Failed(NarrowingError),
}

pub fn run(args: &CliArgs, cwd: &Path) -> Result<RunResult> {
    let config = resolve_config(args, cwd)?;
    let paths = collect_source_files(&args.paths, cwd, &config)?;
    analyze_files(&paths, cwd, &config, args.fix)
}

/// `.cs` files named directly or found below the given directories.
///
/// Files named directly are always taken; files found by walking a directory
/// must pass the include and exclude globs, matched against the path relative
/// to that directory. Hidden directories are not searched.
pub fn collect_source_files(
    roots: &[PathBuf],
    cwd: &Path,
    config: &ResolvedConfig,
) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for root in roots {
        let root = cwd.join(root);
        if root.is_file() {
            out.push(root);
            continue;
        }
        if !root.is_dir() {
            bail!("no such file or directory: {}", root.display());
        }
        for entry in WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().is_none_or(|ext| ext != SOURCE_EXTENSION)
            {
                continue;
            }
            let relative = path.strip_prefix(&root).unwrap_or(path);
            if config.admits(relative) {
                out.push(entry.into_path());
            } else {
                debug!(file = %relative.display(), "excluded by configuration");
            }
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Path relative to `cwd` when possible, with forward slashes.
pub fn display_name(path: &Path, cwd: &Path) -> String {
    path.strip_prefix(cwd)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

pub fn analyze_files(
    paths: &[PathBuf],
    cwd: &Path,
    config: &ResolvedConfig,
    fix: bool,
) -> Result<RunResult> {
    let _span = info_span!("analyze_files", files = paths.len(), fix).entered();
    let mut result = RunResult::default();
    let mut builder = ProgramBuilder::new();
    builder.implicit_usings(config.implicit_usings);

    let mut inputs = Vec::with_capacity(paths.len());
    for path in paths {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = display_name(path, cwd);
        let id = builder.add_file(name.clone(), text.clone());
        result.files_read.push(path.clone());
        result.sources.push((name.clone(), text));
        inputs.push(Input {
            id,
            path: path.clone(),
            name,
        });
    }
    for lib in &config.extra_libs {
        let text = std::fs::read_to_string(lib)
            .with_context(|| format!("failed to read library {}", lib.display()))?;
        let name = display_name(lib, cwd);
        builder.add_library(name.clone(), text.clone());
        result.files_read.push(lib.clone());
        result.sources.push((name, text));
    }

    let program = builder.build();
    for library in program.files().iter().filter(|f| f.is_library) {
        result.diagnostics.extend(library.parse_diagnostics.iter().cloned());
    }

    let engine = NarrowingEngine::new(config.vocabulary.clone(), config.options.clone());
    if let Err(err) = engine.known_symbols(&program) {
        result.errors.push(FileError {
            file: String::new(),
            message: err.to_string(),
        });
        return Ok(result);
    }

    let outcomes: Vec<FileOutcome> = inputs
        .par_iter()
        .map(|input| analyze_one(&engine, &program, input, fix))
        .collect();

    for (input, outcome) in inputs.iter().zip(outcomes) {
        match outcome {
            FileOutcome::ParseErrors(diagnostics) => {
                warn!(file = %input.name, count = diagnostics.len(), "skipping file with parse errors");
                result.diagnostics.extend(diagnostics);
            }
            FileOutcome::Failed(err) => result.errors.push(FileError {
                file: input.name.clone(),
                message: err.to_string(),
            }),
            FileOutcome::Analyzed { diagnostics, batch } => {
                let fixed_all = match batch {
                    Some(BatchOutcome {
                        edit: Some(edit),
                        applied,
                        skipped,
                    }) => {
                        std::fs::write(&input.path, &edit.new_text)
                            .with_context(|| format!("failed to write {}", input.path.display()))?;
                        info!(file = %input.name, applied, skipped, "rewrote file");
                        result.fixed.push(FixedFile {
                            file: input.name.clone(),
                            methods: applied,
                            missing_imports: edit.missing_imports,
                        });
                        skipped == 0
                    }
                    _ => false,
                };
                if !fixed_all {
                    result
                        .diagnostics
                        .extend(diagnostics.iter().map(|d| d.to_diagnostic(&input.name)));
                }
            }
        }
    }
    Ok(result)
}

fn analyze_one(engine: &NarrowingEngine, program: &Program, input: &Input, fix: bool) -> FileOutcome {
    let Some(file) = program.file(input.id) else {
        return FileOutcome::Analyzed {
            diagnostics: Vec::new(),
            batch: None,
        };
    };
    if file.has_parse_errors() {
        return FileOutcome::ParseErrors(file.parse_diagnostics.clone());
    }
    // Never cancelled.
    let cancel = CancellationToken::new();
    let diagnostics = match engine.analyze_document(program, input.id, &cancel) {
        Ok(diagnostics) => diagnostics,
        Err(err) => return FileOutcome::Failed(err),
    };
    if !fix || diagnostics.is_empty() {
        return FileOutcome::Analyzed {
            diagnostics,
            batch: None,
        };
    }
    match engine.fix_all_in_file(program, input.id, &diagnostics, &cancel) {
        Ok(batch) => FileOutcome::Analyzed {
            diagnostics,
            batch: Some(batch),
        },
        Err(err) => FileOutcome::Failed(err),
    }
}
