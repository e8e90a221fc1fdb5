use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde_json::Value;

use crate::error::PredictError;

const CLIENT_USER_AGENT: &str = concat!("squad_terminal/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("failed to build http client")
}

/// The one HTTP operation the pages need. Implemented over `reqwest` for the
/// binary and by scripted fakes in tests.
pub trait PredictTransport: Send + Sync {
    /// POSTs `body` as JSON and returns the raw response body of a 2xx reply.
    fn post_json(&self, url: &str, body: &Value) -> Result<String, PredictError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl PredictTransport for ReqwestTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<String, PredictError> {
        let resp = self
            .client
            .post(url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(body)
            .send()
            .map_err(|err| PredictError::request(err.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .map_err(|err| PredictError::request(format!("failed reading body: {err}")))?;
        if !status.is_success() {
            return Err(PredictError::request(format!("http {status}: {text}")));
        }
        Ok(text)
    }
}
