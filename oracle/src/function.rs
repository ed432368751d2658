use async_trait::async_trait;
use url::Url;

use crate::{error::*, http, GradingOracle, OracleConfig, OracleKind, OracleRequest};

/// Oracle reached through a single HTTP function that does the judging itself
/// and answers with the verdict JSON (possibly wrapped in other text).
pub struct FunctionOracle {
    http: http::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl FunctionOracle {
    pub fn new(cfg: &OracleConfig) -> Result<Self> {
        Ok(Self {
            http: http::Client::new(cfg.timeout())?,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[async_trait]
impl GradingOracle for FunctionOracle {
    fn kind(&self) -> OracleKind {
        OracleKind::Function
    }

    async fn grade(&self, req: &OracleRequest) -> Result<String> {
        log::debug!(
            "Requesting verdict from {} ({} bytes of {})",
            self.endpoint,
            req.code.len(),
            req.language
        );
        self.http
            .post_json(self.endpoint.clone(), req, self.api_key.as_deref())
            .await
    }
}
