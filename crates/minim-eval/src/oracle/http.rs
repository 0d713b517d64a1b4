//! HTTP(S) and `file:` liveness probing.

use super::LivenessOracle;
use crate::config::EvalConfig;
use crate::error::{ConfigError, LivenessCheckError};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};

/// Default liveness oracle.
///
/// `http`/`https` URIs are probed with HEAD, retried as GET when the server
/// does not support HEAD. A final 2xx status (after redirects) is live.
/// `file` URIs are live when the path exists.
#[derive(Debug, Clone)]
pub struct HttpLivenessOracle {
    http: reqwest::Client,
}

impl HttpLivenessOracle {
    /// Build the HTTP client from the engine configuration.
    pub fn new(config: &EvalConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.probe_timeout())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { http })
    }

    /// Use an existing client.
    #[must_use]
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn probe_http(&self, url: Url) -> Result<bool, LivenessCheckError> {
        let response = self
            .http
            .head(url.clone())
            .send()
            .await
            .map_err(|e| LivenessCheckError::Transport(e.to_string()))?;

        let status = match response.status() {
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => self
                .http
                .get(url)
                .send()
                .await
                .map_err(|e| LivenessCheckError::Transport(e.to_string()))?
                .status(),
            status => status,
        };
        Ok(status.is_success())
    }
}

#[async_trait]
impl LivenessOracle for HttpLivenessOracle {
    async fn is_live(&self, uri: &str) -> Result<bool, LivenessCheckError> {
        let url = Url::parse(uri).map_err(|e| LivenessCheckError::InvalidUri(format!("{uri}: {e}")))?;
        match url.scheme() {
            "http" | "https" => self.probe_http(url).await,
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| LivenessCheckError::InvalidUri(uri.to_string()))?;
                Ok(tokio::fs::metadata(path).await.is_ok())
            }
            scheme => Err(LivenessCheckError::UnsupportedScheme(scheme.to_string())),
        }
    }
}
