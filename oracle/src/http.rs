use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::error::*;

#[derive(Clone)]
pub struct Client {
    inner: ::reqwest::Client,
}

impl Client {
    pub fn new(timeout: Duration) -> Result<Self> {
        let inner = ::reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .user_agent(concat!("drill/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { inner })
    }

    /// POST `body` as JSON and return the body text of a 2xx response.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
        bearer_token: Option<&str>,
    ) -> Result<String> {
        let requested_url = self::without_query(&url);

        let mut req = self.inner.post(url).json(body);
        if let Some(token) = bearer_token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;

        let got = resp.status();
        if !got.is_success() {
            return Err(Error::UnexpectedResponseCode { got, requested_url });
        }
        Ok(resp.text().await?)
    }
}

/// Query strings may carry API keys; keep them out of error messages and logs.
fn without_query(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
