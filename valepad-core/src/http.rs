//! HTTP transport for the Valetudo capability API.
//!
//! `ReqwestTransport` is the production `RobotTransport`: it joins capability
//! paths onto the configured base URL, bounds every request with a timeout,
//! and turns non-2xx responses into `Error::HttpStatus`. Tests swap in their
//! own `RobotTransport` instead of making network calls.

use std::time::Duration;

use async_trait::async_trait;
use reqwest;
use serde_json::Value;
use url::Url;

use valepad_common::error::Error;
use valepad_common::traits::RobotTransport;

#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn url_for(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("cannot join '{}' onto {}: {}", path, self.base_url, e)))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::HttpStatus {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RobotTransport for ReqwestTransport {
    async fn put_json(&self, path: &str, body: Value) -> Result<(), Error> {
        let response = self
            .client
            .put(self.url_for(path)?)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn get_json(&self, path: &str) -> Result<Value, Error> {
        let response = self.client.get(self.url_for(path)?).send().await?;
        let value = check_status(response).await?.json::<Value>().await?;
        Ok(value)
    }
}
