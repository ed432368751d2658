use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use drill_oracle::{GradingOracle, OracleRequest};

use super::{Evaluator, HeuristicEvaluator};
use crate::model::{EvaluationResult, Language, Problem};

#[derive(Debug, Clone, Default)]
pub enum Fallback {
    /// A 0-pass error result asking the user to check the implementation.
    #[default]
    Standard,
    Heuristic(HeuristicEvaluator),
}

/// Grades through a [`GradingOracle`]. Never fails: when the oracle is
/// unreachable or its answer is unusable, the [`Fallback`] verdict is returned.
pub struct DelegatingEvaluator {
    oracle: Arc<dyn GradingOracle>,
    fallback: Fallback,
}

impl DelegatingEvaluator {
    pub fn new(oracle: Arc<dyn GradingOracle>) -> Self {
        Self {
            oracle,
            fallback: Fallback::Standard,
        }
    }

    pub fn fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn request_for(source: &str, language: Language, problem: &Problem) -> OracleRequest {
        let description = format!("{} - {}", problem.title, problem.description.trim());
        OracleRequest::new(source, language.lowercase(), description).test_cases(
            problem
                .testcases
                .iter()
                .map(|t| (t.input.as_str(), t.expected_output.as_str())),
        )
    }

    async fn ask_oracle(
        &self,
        source: &str,
        language: Language,
        problem: &Problem,
    ) -> anyhow::Result<EvaluationResult> {
        let req = Self::request_for(source, language, problem);
        let text = self
            .oracle
            .grade(&req)
            .await
            .with_context(|| format!("{} oracle request failed", self.oracle.kind()))?;
        let verdict = drill_oracle::parse_verdict(&text).context("Unreadable verdict")?;
        EvaluationResult::try_from(verdict).context("Inconsistent verdict")
    }
}

#[async_trait]
impl Evaluator for DelegatingEvaluator {
    fn name(&self) -> &'static str {
        "delegating"
    }

    async fn evaluate(
        &self,
        source: &str,
        language: Language,
        problem: &Problem,
    ) -> anyhow::Result<EvaluationResult> {
        match self.ask_oracle(source, language, problem).await {
            Ok(res) => Ok(res),
            Err(e) => {
                log::warn!("Falling back to a {:?} verdict: {:#}", self.fallback, e);
                Ok(match &self.fallback {
                    Fallback::Standard => EvaluationResult::fallback(problem.num_testcases()),
                    Fallback::Heuristic(h) => h.grade(source, language, problem),
                })
            }
        }
    }
}
