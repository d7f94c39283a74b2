//! Formatter configuration loaded from `template-fmt.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::token_map::{TokenMap, TokenPair};

pub const DEFAULT_CONFIG_PATH: &str = "template-fmt.toml";

/// Formatter configuration (TOML).
///
/// Every field is optional. The defaults reproduce the cookiecutter setup:
/// Python files under `{{cookiecutter.project_slug}}`, the package-name token
/// in both spellings, and `ruff check --fix` followed by `ruff format`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormatConfig {
    /// Root of the template tree, relative to the working directory.
    pub template_dir: PathBuf,

    /// File extensions (without the dot) to collect.
    pub extensions: Vec<String>,

    pub tokens: Vec<TokenEntry>,

    pub linter: LinterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenEntry {
    pub token: String,
    pub substitute: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinterConfig {
    /// Executable to run for every pass.
    pub program: String,

    /// Arguments for the availability check, e.g. `["--version"]`.
    pub preflight_args: Vec<String>,

    /// Per-invocation wall-clock limit in seconds.
    pub timeout_secs: u64,

    /// Keep at most this many bytes of stdout/stderr per invocation.
    pub output_limit_bytes: usize,

    pub passes: Vec<PassConfig>,
}

/// One linter pass. The file path is appended after `args`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassConfig {
    pub name: String,
    pub args: Vec<String>,
    /// Exit codes that count as success. `0` means nothing to fix; any other
    /// listed code means the tool fixed something.
    #[serde(default = "default_ok_exit_codes")]
    pub ok_exit_codes: Vec<i32>,
}

fn default_ok_exit_codes() -> Vec<i32> {
    vec![0]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            program: "ruff".to_string(),
            preflight_args: strings(&["--version"]),
            timeout_secs: 120,
            output_limit_bytes: 100_000,
            passes: vec![
                PassConfig {
                    name: "check".to_string(),
                    args: strings(&[
                        "check",
                        "--fix",
                        "--unsafe-fixes",
                        "--select",
                        "E,W,F,I,B,UP",
                        "--isolated",
                    ]),
                    // ruff exits 1 when it found (and fixed) issues.
                    ok_exit_codes: vec![0, 1],
                },
                PassConfig {
                    name: "format".to_string(),
                    args: strings(&["format", "--isolated"]),
                    ok_exit_codes: vec![0],
                },
            ],
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("{{cookiecutter.project_slug}}"),
            extensions: strings(&["py"]),
            tokens: vec![
                TokenEntry {
                    token: "{{ cookiecutter.package_name }}".to_string(),
                    substitute: "placeholder_package".to_string(),
                },
                TokenEntry {
                    token: "{{cookiecutter.package_name}}".to_string(),
                    substitute: "compact_package_placeholder".to_string(),
                },
            ],
            linter: LinterConfig::default(),
        }
    }
}

impl FormatConfig {
    pub fn validate(&self) -> Result<()> {
        if self.template_dir.as_os_str().is_empty() {
            return Err(anyhow!("template_dir must not be empty"));
        }
        if self.extensions.is_empty() || self.extensions.iter().any(|e| e.trim().is_empty()) {
            return Err(anyhow!("extensions must be a non-empty array of names"));
        }
        self.token_map().context("tokens")?;
        self.linter.validate()
    }

    pub fn token_map(&self) -> Result<TokenMap> {
        TokenMap::new(
            self.tokens
                .iter()
                .map(|entry| TokenPair::new(&entry.token, &entry.substitute))
                .collect(),
        )
    }
}

impl LinterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(anyhow!("linter.program must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("linter.timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("linter.output_limit_bytes must be > 0"));
        }
        if self.passes.is_empty() {
            return Err(anyhow!("linter.passes must not be empty"));
        }
        for pass in &self.passes {
            if pass.name.trim().is_empty() {
                return Err(anyhow!("linter pass name must not be empty"));
            }
            if pass.ok_exit_codes.is_empty() {
                return Err(anyhow!(
                    "linter pass '{}' needs at least one ok exit code",
                    pass.name
                ));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `FormatConfig::default()`.
pub fn load_config(path: &Path) -> Result<FormatConfig> {
    if !path.exists() {
        let cfg = FormatConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: FormatConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
