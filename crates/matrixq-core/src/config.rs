//! Plugin-level defaults.
//!
//! Applied when an authoring form or an imported file leaves an option
//! unset. Loaded from TOML with environment overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{GradeMethod, InputType};

/// Site-wide defaults for new matrix questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixConfig {
    #[serde(default)]
    pub input_type: InputType,
    #[serde(default)]
    pub grade_method: GradeMethod,
    #[serde(default = "default_true")]
    pub shuffle_answers: bool,
    #[serde(default)]
    pub show_num_correct: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            input_type: InputType::Single,
            grade_method: GradeMethod::Partial,
            shuffle_answers: true,
            show_num_correct: false,
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `matrixq.toml` in the current directory
/// 2. `~/.config/matrixq/config.toml`
///
/// Environment overrides: `MATRIXQ_INPUT_TYPE`, `MATRIXQ_GRADE_METHOD`,
/// `MATRIXQ_SHUFFLE_ANSWERS`.
pub fn load_config() -> Result<MatrixConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<MatrixConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("matrixq.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<MatrixConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MatrixConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn apply_env_overrides(
    config: &mut MatrixConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(value) = var("MATRIXQ_INPUT_TYPE") {
        config.input_type = value
            .parse()
            .map_err(|e: String| anyhow::anyhow!("MATRIXQ_INPUT_TYPE: {e}"))?;
    }
    if let Some(value) = var("MATRIXQ_GRADE_METHOD") {
        config.grade_method = value
            .parse()
            .map_err(|e: String| anyhow::anyhow!("MATRIXQ_GRADE_METHOD: {e}"))?;
    }
    if let Some(value) = var("MATRIXQ_SHUFFLE_ANSWERS") {
        config.shuffle_answers = match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => anyhow::bail!("MATRIXQ_SHUFFLE_ANSWERS: expected a boolean, got '{other}'"),
        };
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("matrixq"))
}
