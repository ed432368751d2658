use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::time::Duration;

use anyhow::Context as _;
use drill_oracle::OracleConfig;
use serde::Deserialize;

use crate::asset;
use crate::evaluation::HeuristicEvaluator;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub autosave: AutoSaveConfig,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Overrides the problem's own time budget.
    #[serde(default)]
    pub time_budget_secs: Option<u32>,
    #[serde(default = "default_true")]
    pub auto_submit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AutoSaveConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "AutoSaveConfig::default_debounce_secs")]
    pub debounce_secs: u64,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Strategy {
    #[default]
    Heuristic,
    Oracle,
}

/// What the delegating evaluator reports when the oracle gives no usable verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FallbackKind {
    #[default]
    Standard,
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EvaluatorConfig {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default = "EvaluatorConfig::default_min_source_len")]
    pub min_source_len: usize,
    #[serde(default)]
    pub reproducible: bool,
    #[serde(default)]
    pub fallback: FallbackKind,
    #[serde(default)]
    pub oracle: Option<OracleConfig>,
}

fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_budget_secs: None,
            auto_submit: true,
        }
    }
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_secs: Self::default_debounce_secs(),
            dir: None,
        }
    }
}

impl AutoSaveConfig {
    fn default_debounce_secs() -> u64 {
        30
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }

    /// `dir` resolved against the config file's directory, or `fallback` when unset.
    pub fn resolve_dir(&self, base: Option<&Path>, fallback: impl AsRef<Path>) -> PathBuf {
        match (&self.dir, base) {
            (Some(dir), Some(base)) if dir.is_relative() => base.join(dir),
            (Some(dir), _) => dir.clone(),
            (None, _) => fallback.as_ref().to_owned(),
        }
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            min_source_len: Self::default_min_source_len(),
            reproducible: false,
            fallback: FallbackKind::default(),
            oracle: None,
        }
    }
}

impl EvaluatorConfig {
    fn default_min_source_len() -> usize {
        HeuristicEvaluator::DEFAULT_MIN_SOURCE_LEN
    }
}

impl Config {
    pub const FILENAME: &str = "drill.toml";

    pub fn example_toml() -> String {
        asset::text(Self::FILENAME)
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> Option<PathBuf> {
        cur_dir
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
    }

    /// Loads the nearest `drill.toml`, or the built-in defaults when there is none.
    pub fn load_or_default(cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        match Self::find_file_in_ancestors(cur_dir) {
            Some(path) => {
                log::debug!("Using config {:?}", path);
                Self::from_toml_file(path)
            }
            None => {
                log::debug!("No {} found, using the defaults", Self::FILENAME);
                Self::from_toml(&Self::example_toml()).context("Embedded config is broken")
            }
        }
    }

    pub fn config_dir(&self) -> Option<&Path> {
        self.source_config_file.as_deref().and_then(Path::parent)
    }

    /// Writes the example config into `dir`. Fails if one already exists.
    pub fn init_in_dir(dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let path = dir.as_ref().join(Self::FILENAME);
        let created = fsutil::write_if_absent(&path, Self::example_toml())?;
        anyhow::ensure!(created, "Already exists: {:?}", path);
        Ok(path)
    }
}
