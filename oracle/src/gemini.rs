use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{error::*, http, prompt, GradingOracle, OracleConfig, OracleKind, OracleRequest};

pub struct GeminiOracle {
    http: http::Client,
    url: Url,
}

impl GeminiOracle {
    pub fn new(cfg: &OracleConfig) -> Result<Self> {
        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or(Error::MissingApiKey(OracleKind::Gemini))?;
        Ok(Self {
            http: http::Client::new(cfg.timeout())?,
            url: Self::generate_content_url(&cfg.endpoint, cfg.model_name(), api_key)?,
        })
    }

    fn generate_content_url(endpoint: &Url, model: &str, api_key: &str) -> Result<Url> {
        let raw = format!(
            "{}/models/{}:generateContent",
            endpoint.as_str().trim_end_matches('/'),
            model
        );
        let mut url = Url::parse(&raw).map_err(|source| Error::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }
}

#[async_trait]
impl GradingOracle for GeminiOracle {
    fn kind(&self) -> OracleKind {
        OracleKind::Gemini
    }

    async fn grade(&self, req: &OracleRequest) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt::build(req)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                top_k: 1,
                top_p: 1.0,
                max_output_tokens: 2048,
            },
        };

        let text = self.http.post_json(self.url.clone(), &body, None).await?;
        let resp: GenerateResponse = serde_json::from_str(&text)?;
        let generated = resp.first_text().ok_or(Error::EmptyResponse)?;
        log::debug!("Gemini verdict text: {}", generated);
        Ok(generated)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.text)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn url_should_contain_model_and_key() {
        let endpoint = Url::parse("https://generativelanguage.googleapis.com/v1beta/").unwrap();
        let url = GeminiOracle::generate_content_url(&endpoint, "gemini-1.5-flash", "k3y").unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key=k3y"
        );
    }

    #[test]
    fn missing_api_key_should_be_rejected() {
        let cfg = OracleConfig::new(
            OracleKind::Gemini,
            Url::parse("https://generativelanguage.googleapis.com/v1beta").unwrap(),
        );
        assert!(matches!(
            GeminiOracle::new(&cfg),
            Err(Error::MissingApiKey(OracleKind::Gemini))
        ));
    }

    #[test]
    fn should_pick_first_candidate_text() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"status\": \"error\"}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.first_text().as_deref(), Some("{\"status\": \"error\"}"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(empty.first_text(), None);
    }
}
