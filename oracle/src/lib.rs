// exported modules
pub mod config;
pub mod error;
pub mod model;

// oracle impls
pub mod function;
pub mod gemini;

// re-exports
pub use config::*;
pub use error::*;
pub use function::FunctionOracle;
pub use gemini::GeminiOracle;
pub use model::*;

pub fn new_oracle(cfg: &OracleConfig) -> Result<Box<dyn GradingOracle>> {
    use OracleKind::*;
    Ok(match cfg.kind {
        Function => Box::new(FunctionOracle::new(cfg)?),
        Gemini => Box::new(GeminiOracle::new(cfg)?),
    })
}

// internal modules
mod http;
mod prompt;
