use async_trait::async_trait;
use reqwest::Client;
use std::env;
use std::time::Duration;

use crate::error::{classify_transport_failure, RewriteError, TransportErrorKind};
use crate::gemini_service::GeminiService;
use crate::models::Provider;
use crate::openai_service::OpenAiService;

/// "Send a prompt, get JSON-formatted text back."
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn generate_json(&self, prompt: &str) -> Result<String, RewriteError>;
}

/// Endpoints, models and timeout for the provider clients.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub openai_base_url: String,
    pub openai_model: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub timeout: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            gemini_model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl LlmSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str, default: String| {
            env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default)
        };

        let timeout = match env::var("LLM_TIMEOUT_SECS") {
            Ok(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    log::warn!("Ignoring invalid LLM_TIMEOUT_SECS='{}'", value);
                    defaults.timeout
                }
            },
            Err(_) => defaults.timeout,
        };

        Self {
            openai_base_url: var("OPENAI_BASE_URL", defaults.openai_base_url),
            openai_model: var("OPENAI_MODEL", defaults.openai_model),
            gemini_base_url: var("GEMINI_BASE_URL", defaults.gemini_base_url),
            gemini_model: var("GEMINI_MODEL", defaults.gemini_model),
            timeout,
        }
    }

    pub fn http_client(&self) -> Result<Client, RewriteError> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| RewriteError::Internal(format!("failed to build HTTP client: {}", e)))
    }
}

/// Opens a client for a provider/key pair.
pub trait LlmConnector: Send + Sync {
    fn connect(&self, provider: Provider, api_key: &str) -> Box<dyn LlmClient>;
}

/// Connector backed by the real provider HTTP APIs.
pub struct HttpLlmConnector {
    settings: LlmSettings,
    http: Client,
}

impl HttpLlmConnector {
    pub fn new(settings: LlmSettings) -> Result<Self, RewriteError> {
        let http = settings.http_client()?;
        Ok(Self { settings, http })
    }
}

impl LlmConnector for HttpLlmConnector {
    fn connect(&self, provider: Provider, api_key: &str) -> Box<dyn LlmClient> {
        match provider {
            Provider::OpenAI => Box::new(OpenAiService::new(
                self.http.clone(),
                api_key,
                &self.settings.openai_base_url,
                &self.settings.openai_model,
            )),
            Provider::Gemini => Box::new(GeminiService::new(
                self.http.clone(),
                api_key,
                &self.settings.gemini_base_url,
                &self.settings.gemini_model,
            )),
        }
    }
}

/// Turns a non-success provider response into a classified transport error.
pub(crate) async fn error_from_response(provider: Provider, response: reqwest::Response) -> RewriteError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let kind = classify_transport_failure(status.as_u16(), &body);
    log::error!("{} API error ({}): {}", provider.display_name(), status, body);
    RewriteError::transport(provider, kind, format!("HTTP {}: {}", status, body))
}

pub(crate) fn error_from_reqwest(provider: Provider, err: reqwest::Error) -> RewriteError {
    // the Gemini URL carries the API key
    let err = err.without_url();
    log::error!("{} request failed: {}", provider.display_name(), err);
    let kind = match err.status() {
        Some(status) => classify_transport_failure(status.as_u16(), ""),
        None => TransportErrorKind::Other,
    };
    RewriteError::transport(provider, kind, err.to_string())
}
