pub mod models;
pub mod error;
pub mod config_store;
pub mod niche;
pub mod search_service;
pub mod case_study_service;
pub mod prompt;
pub mod llm_service;
pub mod gemini_service;
pub mod openai_service;
pub mod markup;
pub mod metrics;
pub mod rewrite_service;
pub mod history_store;

pub use models::*;
pub use error::{RewriteError, TransportErrorKind};
pub use config_store::{ConfigStore, EnvDefaults, StartupReport};
pub use search_service::{StaticWebSearch, WebSearch};
pub use llm_service::{HttpLlmConnector, LlmClient, LlmConnector, LlmSettings};
pub use gemini_service::GeminiService;
pub use openai_service::OpenAiService;
pub use metrics::ContentMetrics;
pub use rewrite_service::{RewriteService, RewriteSettings, ScoreDefaults};
pub use history_store::HistoryStore;
