//! Remote sink transport
//!
//! `LokiTransport` posts one JSON body per batch to the Loki push API with
//! a blocking ureq agent. It is only ever called from the flush thread.

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, trace};
use ureq::Agent;

use super::entry::Batch;
use super::payload::{DefaultLabels, PushRequest};
use crate::config::ShippingConfig;
use crate::errors::{Result, UrlxError};

/// 一次批量发送失败的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// 请求无法构建（序列化失败、非法 URL 等）
    Request(String),
    /// 连接失败、超时
    Unreachable(String),
    /// 服务端返回非 2xx
    Status(u16),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(msg) => write!(f, "could not build request: {}", msg),
            TransportError::Unreachable(msg) => write!(f, "sink unreachable: {}", msg),
            TransportError::Status(code) => write!(f, "sink returned status {}", code),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => TransportError::Status(code),
            ureq::Error::BadUri(msg) => TransportError::Request(msg),
            ureq::Error::Http(e) => TransportError::Request(e.to_string()),
            other => TransportError::Unreachable(other.to_string()),
        }
    }
}

/// Something that can deliver a batch to the sink.
pub trait LogTransport: Send + Sync {
    fn send(&self, batch: Batch) -> std::result::Result<(), TransportError>;

    fn name(&self) -> &'static str;
}

/// Connection parameters for the sink, fixed at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub endpoint: String,
    pub username: String,
    pub api_key: String,
    pub default_labels: DefaultLabels,
    pub timeout: Duration,
}

impl TransportConfig {
    /// 缺少 url / user / api_key 时返回 MissingCredentials（启动期致命错误）
    pub fn from_config(config: &ShippingConfig) -> Result<Self> {
        fn required(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        }

        let endpoint = required(&config.url);
        let username = required(&config.user);
        let api_key = required(&config.api_key);

        match (endpoint, username, api_key) {
            (Some(endpoint), Some(username), Some(api_key)) => Ok(Self {
                endpoint,
                username,
                api_key,
                default_labels: DefaultLabels {
                    language: config.language.clone(),
                    source: config.source.clone(),
                    service_name: config.service_name.clone(),
                },
                timeout: config.timeout(),
            }),
            (endpoint, username, api_key) => {
                let missing: Vec<&str> = [
                    ("GRAFANA_LOKI_URL", endpoint.is_none()),
                    ("GRAFANA_LOKI_USER", username.is_none()),
                    ("GRAFANA_LOKI_API_KEY", api_key.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();

                Err(UrlxError::missing_credentials(format!(
                    "Loki URL, user, and API key must be set; missing: {}",
                    missing.join(", ")
                )))
            }
        }
    }

    fn basic_auth(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.api_key));
        format!("Basic {}", token)
    }
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("api_key", &"***")
            .field("default_labels", &self.default_labels)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Loki push API client.
pub struct LokiTransport {
    config: TransportConfig,
    authorization: String,
    agent: Agent,
}

impl LokiTransport {
    pub fn new(config: TransportConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        let authorization = config.basic_auth();

        Self {
            config,
            authorization,
            agent,
        }
    }
}

impl LogTransport for LokiTransport {
    fn send(&self, batch: Batch) -> std::result::Result<(), TransportError> {
        if batch.is_empty() {
            return Ok(());
        }

        let push = PushRequest::from_batch(&batch, &self.config.default_labels);
        let body =
            serde_json::to_vec(&push).map_err(|e| TransportError::Request(e.to_string()))?;
        trace!(
            "LokiTransport: pushing {} streams ({} bytes)",
            push.streams.len(),
            body.len()
        );

        let response = self
            .agent
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", self.authorization.as_str())
            .send(&body[..])?;

        let status = response.status().as_u16();
        if status >= 300 {
            return Err(TransportError::Status(status));
        }

        debug!("LokiTransport: pushed {} entries", batch.len());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "loki"
    }
}
