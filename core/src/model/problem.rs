use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::asset;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemId(String);

impl ProblemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: ProblemId,
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: String,
    #[serde(default = "Problem::default_time_budget_secs")]
    pub time_budget_secs: u32,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub testcases: Vec<TestCase>,
}

impl Problem {
    pub const DEFAULT_TIME_BUDGET_SECS: u32 = 30 * 60;

    const BUILTIN_FILE: &str = "problems/two-sum.toml";

    fn default_time_budget_secs() -> u32 {
        Self::DEFAULT_TIME_BUDGET_SECS
    }

    /// Problem with no statement, handy for ad-hoc sessions.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: ProblemId::new(id),
            title: title.into(),
            difficulty: Difficulty::default(),
            description: String::new(),
            time_budget_secs: Self::DEFAULT_TIME_BUDGET_SECS,
            constraints: Vec::new(),
            examples: Vec::new(),
            testcases: Vec::new(),
        }
    }

    pub fn time_budget_secs(mut self, secs: u32) -> Self {
        self.time_budget_secs = secs;
        self
    }

    pub fn testcases(mut self, testcases: impl IntoIterator<Item = TestCase>) -> Self {
        self.testcases = testcases.into_iter().collect();
        self
    }

    /// The "Two Sum" problem shipped inside the binary.
    pub fn builtin() -> Self {
        static BUILTIN: Lazy<Problem> = Lazy::new(|| {
            Problem::from_toml(&asset::text(Problem::BUILTIN_FILE))
                .unwrap_or_else(|e| panic!("Embedded {} is broken: {}", Problem::BUILTIN_FILE, e))
        });
        BUILTIN.clone()
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let filepath = filepath.as_ref();
        let toml = fsutil::read_to_string(filepath).context("Cannot read problem file")?;
        Self::from_toml(&toml).with_context(|| format!("Invalid problem TOML: {:?}", filepath))
    }

    /// Loads `filepath`, or the builtin problem when `None`.
    pub fn load(filepath: Option<&Path>) -> anyhow::Result<Self> {
        match filepath {
            Some(path) => Self::from_toml_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.time_budget_secs.into())
    }

    pub fn num_testcases(&self) -> u32 {
        u32::try_from(self.testcases.len()).unwrap_or(u32::MAX)
    }
}
