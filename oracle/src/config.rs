use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OracleKind {
    /// An HTTP function taking `{code, language, problemDescription}` and answering the verdict.
    Function,
    /// Google's Gemini `generateContent` API, prompted to act as a judge.
    Gemini,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OracleConfig {
    pub kind: OracleKind,
    pub endpoint: Url,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "OracleConfig::default_timeout_secs")]
    pub timeout_secs: u64,

    /// Never read from the config file; see [`OracleConfig::with_api_key_from_env`].
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OracleEnv {
    api_key: Option<String>,
}

impl OracleConfig {
    pub const ENV_PREFIX: &str = "DRILL_ORACLE_";
    pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

    fn default_timeout_secs() -> u64 {
        30
    }

    pub fn new(kind: OracleKind, endpoint: Url) -> Self {
        Self {
            kind,
            endpoint,
            model: None,
            timeout_secs: Self::default_timeout_secs(),
            api_key: None,
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Fill `api_key` from `DRILL_ORACLE_API_KEY` when it is set and non-blank.
    pub fn with_api_key_from_env(mut self) -> Result<Self> {
        let env: OracleEnv = envy::prefixed(Self::ENV_PREFIX).from_env()?;
        if let Some(key) = env.api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(Self::DEFAULT_GEMINI_MODEL)
    }
}
