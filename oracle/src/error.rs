use reqwest::StatusCode;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Missing API key for {0} oracle (set DRILL_ORACLE_API_KEY)")]
    MissingApiKey(crate::OracleKind),

    #[error("Failed to build URL from '{url}'")]
    InvalidUrl {
        url: String,

        #[source]
        source: url::ParseError,
    },

    #[error("Unexpected response code '{got}' while requesting to {requested_url}")]
    UnexpectedResponseCode {
        got: StatusCode,
        requested_url: String,
    },

    #[error("Grader response has no candidate text")]
    EmptyResponse,

    #[error("No JSON object found in grader response")]
    NoJsonObject,

    #[error("Env error: {0}")]
    Env(#[from] envy::Error),

    #[error("Http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
