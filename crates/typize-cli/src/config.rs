//! `typize.json` loading and merging with command-line overrides.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use typize_narrowing::{FrameworkVocabulary, NarrowingOptions};

use crate::args::CliArgs;

pub const CONFIG_FILE_NAME: &str = "typize.json";

/// Build output directories are never analyzed unless `exclude` is given.
pub const DEFAULT_EXCLUDES: &[&str] = &["**/bin/**", "**/obj/**"];

/// Accepts `true` as well as `"true"` for boolean options.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

/// Contents of `typize.json`. Every field is optional.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TypizeConfig {
    #[serde(default)]
    pub vocabulary: Option<FrameworkVocabulary>,
    #[serde(default)]
    pub options: Option<NarrowingOptions>,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    /// Library sources, relative to the directory holding the config file.
    #[serde(default)]
    pub extra_libs: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub implicit_usings: Option<bool>,
}

/// Settings after merging `typize.json` with command-line flags.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub vocabulary: FrameworkVocabulary,
    pub options: NarrowingOptions,
    /// `None` admits every `.cs` file.
    pub include: Option<GlobSet>,
    pub exclude: GlobSet,
    pub extra_libs: Vec<PathBuf>,
    pub implicit_usings: bool,
}

impl ResolvedConfig {
    /// Whether `relative` (a path below a searched directory) should be analyzed.
    pub fn admits(&self, relative: &Path) -> bool {
        if self.exclude.is_match(relative) {
            return false;
        }
        self.include
            .as_ref()
            .is_none_or(|include| include.is_match(relative))
    }
}

pub fn parse_config(text: &str) -> Result<TypizeConfig> {
    serde_json::from_str(text).context("invalid typize.json")
}

pub fn load_config(path: &Path) -> Result<TypizeConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_config(&text).with_context(|| format!("in {}", path.display()))
}

/// `typize.json` in `dir`, if there is one.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Load the configuration named by `--config`, or the one discovered in `cwd`,
/// and apply command-line overrides.
pub fn resolve_config(args: &CliArgs, cwd: &Path) -> Result<ResolvedConfig> {
    let path = match &args.config {
        Some(path) => Some(cwd.join(path)),
        None => find_config(cwd),
    };
    let (config, base_dir) = match &path {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading configuration");
            let base = path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
            (load_config(path)?, base)
        }
        None => (TypizeConfig::default(), cwd.to_path_buf()),
    };
    merge_config(config, &base_dir, args, cwd)
}

pub fn merge_config(
    config: TypizeConfig,
    base_dir: &Path,
    args: &CliArgs,
    cwd: &Path,
) -> Result<ResolvedConfig> {
    let mut vocabulary = config.vocabulary.unwrap_or_default();
    if let Some(base) = &args.handler_base {
        vocabulary.handler_base_type = base.clone();
    }
    if let Some(member) = &args.factory_member {
        vocabulary.factory_member = member.clone();
    }

    let mut options = config.options.unwrap_or_default();
    if args.no_parallel {
        options.parallel = false;
    }

    let include = match args.include.as_ref().or(config.include.as_ref()) {
        Some(patterns) => Some(build_globset(patterns)?),
        None => None,
    };
    let exclude = match args.exclude.as_ref().or(config.exclude.as_ref()) {
        Some(patterns) => build_globset(patterns)?,
        None => {
            let defaults: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
            build_globset(&defaults)?
        }
    };

    let extra_libs = match &args.extra_libs {
        Some(libs) => libs.iter().map(|p| cwd.join(p)).collect(),
        None => config
            .extra_libs
            .unwrap_or_default()
            .iter()
            .map(|p| base_dir.join(p))
            .collect(),
    };

    Ok(ResolvedConfig {
        vocabulary,
        options,
        include,
        exclude,
        extra_libs,
        implicit_usings: !args.no_implicit_usings && config.implicit_usings.unwrap_or(true),
    })
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("invalid glob pattern '{pattern}'"))?;
        builder.add(glob);
    }
    builder.build().context("failed to compile glob patterns")
}

#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod tests;
