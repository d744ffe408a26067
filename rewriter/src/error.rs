//! Error taxonomy for the rewrite pipeline.
//!
//! A JSON parse failure of the model output is deliberately absent here: it
//! produces a degraded plain-text result instead of an error.

use thiserror::Error;

use crate::models::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Authentication,
    QuotaExceeded,
    RateLimited,
    Other,
}

#[derive(Debug, Error)]
pub enum RewriteError {
    /// Malformed request fields.
    #[error("{0}")]
    Validation(String),

    /// No usable provider/key could be resolved.
    #[error("{0}")]
    Configuration(String),

    /// Failure talking to the LLM provider.
    #[error("{provider} API error: {detail}")]
    Transport {
        provider: Provider,
        kind: TransportErrorKind,
        detail: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RewriteError {
    pub fn not_configured() -> Self {
        RewriteError::Configuration(
            "IA não configurada. Configure sua chave de API nas configurações.".to_string(),
        )
    }

    pub fn transport(provider: Provider, kind: TransportErrorKind, detail: impl Into<String>) -> Self {
        RewriteError::Transport {
            provider,
            kind,
            detail: detail.into(),
        }
    }

    /// Wording shown to the end user.
    pub fn user_message(&self) -> String {
        match self {
            RewriteError::Validation(msg) | RewriteError::Configuration(msg) => msg.clone(),
            RewriteError::Transport {
                provider,
                kind,
                detail,
            } => match kind {
                TransportErrorKind::Authentication => format!(
                    "Chave da API {} não configurada corretamente",
                    provider.display_name()
                ),
                TransportErrorKind::QuotaExceeded => format!(
                    "Limite da API {} excedido. Tente novamente mais tarde",
                    provider.display_name()
                ),
                TransportErrorKind::RateLimited => {
                    "Muitas requisições. Aguarde alguns minutos e tente novamente".to_string()
                }
                TransportErrorKind::Other => {
                    format!("Erro no processamento do conteúdo: {}", detail)
                }
            },
            RewriteError::Internal(msg) => {
                format!("Erro no processamento do conteúdo: {}", msg)
            }
        }
    }
}

/// Maps a failed provider response onto a transport error kind.
pub fn classify_transport_failure(status: u16, body: &str) -> TransportErrorKind {
    let body = body.to_lowercase();

    if status == 401
        || status == 403
        || body.contains("api key")
        || body.contains("api_key_invalid")
        || body.contains("invalid_api_key")
    {
        TransportErrorKind::Authentication
    } else if body.contains("quota") || body.contains("resource_exhausted") {
        TransportErrorKind::QuotaExceeded
    } else if status == 429 || body.contains("rate limit") {
        TransportErrorKind::RateLimited
    } else {
        TransportErrorKind::Other
    }
}
