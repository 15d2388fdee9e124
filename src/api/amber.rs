//! [Amber Electric](https://www.amber.com.au/) BFF API client.

use std::time::Duration;

use async_trait::async_trait;
use bon::bon;
use reqwest::{
    Client,
    Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde_json::Value;

use crate::{api::protocol::PriceProtocol, prelude::*};

pub struct Api {
    client: Client,
    base_url: Url,
}

#[bon]
impl Api {
    #[builder]
    pub fn new(base_url: Url, auth_token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(auth_token) = auth_token {
            let mut value = HeaderValue::from_str(auth_token)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let client = Client::builder()
            .user_agent("amber")
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl PriceProtocol for Api {
    #[instrument(skip_all, fields(path = path))]
    async fn api_post(&self, path: &str, body: &Value) -> Result<Option<Value>> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to build the URL for `{path}`"))?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to call `{path}`"))?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "the price service refused the request");
            return Ok(None);
        }
        let payload = response
            .json()
            .await
            .with_context(|| format!("failed to deserialize `{path}` response JSON"))?;
        debug!("call succeeded");
        Ok(Some(payload))
    }
}
