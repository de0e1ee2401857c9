//! Refactoring configuration stored in `refactor.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::extract::DEFAULT_KEYWORD;
use crate::core::identifier::validate_declaration_keyword;
use crate::io::source::write_atomic;

pub const DEFAULT_CONFIG_FILE: &str = "refactor.toml";

/// Refactoring configuration (TOML).
///
/// Intended to be edited by humans. Missing fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RefactorConfig {
    /// Indent unit used by code generation.
    pub indent: String,

    /// Copy the original to `<file>.bak` before overwriting it.
    pub backup: bool,

    pub extract: ExtractConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractConfig {
    /// Declaration keyword or type for extracted variables (e.g. `var`).
    pub keyword: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            keyword: DEFAULT_KEYWORD.to_string(),
        }
    }
}

impl Default for RefactorConfig {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            backup: false,
            extract: ExtractConfig::default(),
        }
    }
}

impl RefactorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.indent.is_empty() {
            return Err(anyhow!("indent must not be empty"));
        }
        if !self.indent.chars().all(|ch| ch == ' ' || ch == '\t') {
            return Err(anyhow!("indent must contain only spaces or tabs"));
        }
        validate_declaration_keyword(&self.extract.keyword).context("extract.keyword")?;
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RefactorConfig::default()`.
pub fn load_config(path: &Path) -> Result<RefactorConfig> {
    if !path.exists() {
        let cfg = RefactorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RefactorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &RefactorConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    if !buf.ends_with('\n') {
        buf.push('\n');
    }
    write_atomic(path, &buf)
}
