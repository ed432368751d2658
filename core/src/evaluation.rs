pub mod delegating;
pub mod heuristic;
pub mod random;

pub use delegating::*;
pub use heuristic::*;
pub use random::*;

use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;

use crate::config::{EvaluatorConfig, FallbackKind, Strategy};
use crate::model::{EvaluationResult, Language, Problem};

#[async_trait]
pub trait Evaluator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(
        &self,
        source: &str,
        language: Language,
        problem: &Problem,
    ) -> anyhow::Result<EvaluationResult>;
}

pub fn heuristic_from_config(cfg: &EvaluatorConfig) -> HeuristicEvaluator {
    let e = HeuristicEvaluator::new().min_source_len(cfg.min_source_len);
    if cfg.reproducible {
        e.random(KeyedRandom)
    } else {
        e
    }
}

pub fn build_evaluator(cfg: &EvaluatorConfig) -> anyhow::Result<Arc<dyn Evaluator>> {
    let heuristic = self::heuristic_from_config(cfg);
    match cfg.strategy {
        Strategy::Heuristic => Ok(Arc::new(heuristic)),
        Strategy::Oracle => {
            let oracle_cfg = cfg
                .oracle
                .clone()
                .context("strategy = \"oracle\" requires an [evaluator.oracle] section")?
                .with_api_key_from_env()
                .context("Cannot read the oracle API key from the environment")?;
            let oracle = drill_oracle::new_oracle(&oracle_cfg)
                .with_context(|| format!("Cannot set up the {} oracle", oracle_cfg.kind))?;

            let fallback = match cfg.fallback {
                FallbackKind::Standard => Fallback::Standard,
                FallbackKind::Heuristic => Fallback::Heuristic(heuristic),
            };
            Ok(Arc::new(
                DelegatingEvaluator::new(Arc::from(oracle)).fallback(fallback),
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_should_build_heuristic() {
        let e = build_evaluator(&EvaluatorConfig::default()).unwrap();
        assert_eq!(e.name(), "heuristic");
    }

    #[test]
    fn oracle_strategy_without_section_should_fail() {
        let cfg = EvaluatorConfig {
            strategy: Strategy::Oracle,
            ..Default::default()
        };
        let err = build_evaluator(&cfg).err().unwrap();
        assert!(err.to_string().contains("[evaluator.oracle]"), "{:#}", err);
    }

    #[test]
    fn function_oracle_should_build_without_key() {
        let cfg = EvaluatorConfig {
            strategy: Strategy::Oracle,
            oracle: Some(drill_oracle::OracleConfig::new(
                drill_oracle::OracleKind::Function,
                "http://127.0.0.1:9/analyze".parse().unwrap(),
            )),
            ..Default::default()
        };
        let e = build_evaluator(&cfg).unwrap();
        assert_eq!(e.name(), "delegating");
    }
}
