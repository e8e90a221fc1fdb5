use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::error::PredictError;
use crate::http_client::{PredictTransport, ReqwestTransport, build_http_client};
use crate::prediction::{PredictRequest, PredictionResult, parse_prediction_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Predict,
    PredictCustom,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Predict => "/api/predict",
            Endpoint::PredictCustom => "/api/predict-custom",
        }
    }
}

/// Posts input text to the prediction service rooted at `base_url`.
#[derive(Clone)]
pub struct PredictClient {
    base_url: String,
    transport: Arc<dyn PredictTransport>,
}

impl PredictClient {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn PredictTransport>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(config.request_timeout)?;
        Ok(Self::new(
            config.base_url.clone(),
            Arc::new(ReqwestTransport::new(client)),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    pub fn predict(&self, endpoint: Endpoint, input: &str) -> Result<PredictionResult, PredictError> {
        let body = serde_json::to_value(PredictRequest { input })
            .map_err(|err| PredictError::request(format!("failed encoding request: {err}")))?;
        let raw = self.transport.post_json(&self.url_for(endpoint), &body)?;
        parse_prediction_json(&raw)
    }
}
