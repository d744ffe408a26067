use chrono::Utc;
use std::env;
use std::sync::{PoisonError, RwLock};

use crate::error::RewriteError;
use crate::models::{ActiveConfig, AiStatus, ConfigSource, Configuration, Provider};

/// Credentials supplied through the environment.
#[derive(Debug, Clone)]
pub struct EnvDefaults {
    pub gemini_api_key: String,
    pub openai_api_key: String,
    pub preferred_provider: Provider,
}

impl Default for EnvDefaults {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            openai_api_key: String::new(),
            preferred_provider: Provider::Gemini,
        }
    }
}

impl EnvDefaults {
    pub fn from_env() -> Self {
        let preferred_provider = match env::var("PREFERRED_AI_PROVIDER") {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                log::warn!(
                    "Ignoring PREFERRED_AI_PROVIDER='{}', falling back to gemini",
                    value
                );
                Provider::Gemini
            }),
            Err(_) => Provider::Gemini,
        };

        Self {
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default().trim().to_string(),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default().trim().to_string(),
            preferred_provider,
        }
    }

    fn key_for(&self, provider: Provider) -> &str {
        match provider {
            Provider::Gemini => &self.gemini_api_key,
            Provider::OpenAI => &self.openai_api_key,
        }
    }

    /// Preferred provider first, then any provider with a key.
    pub fn resolve(&self) -> Option<ActiveConfig> {
        let order = [self.preferred_provider, Provider::Gemini, Provider::OpenAI];
        order.into_iter().find_map(|provider| {
            let key = self.key_for(provider);
            (!key.is_empty()).then(|| ActiveConfig {
                provider,
                api_key: key.to_string(),
                source: ConfigSource::Environment,
            })
        })
    }
}

/// What the store found at startup, for the host to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    pub gemini_key_present: bool,
    pub openai_key_present: bool,
    pub preferred_provider: Provider,
    pub active_provider: Option<Provider>,
}

impl StartupReport {
    pub fn log(&self) {
        let mark = |present: bool| if present { "yes" } else { "no" };
        log::info!("API key status:");
        log::info!("- Gemini key: {}", mark(self.gemini_key_present));
        log::info!("- OpenAI key: {}", mark(self.openai_key_present));
        log::info!("- Preferred provider: {}", self.preferred_provider);
        match self.active_provider {
            Some(provider) => log::info!("Active configuration: {}", provider),
            None => log::warn!(
                "No API key configured; set GEMINI_API_KEY / OPENAI_API_KEY or save one through /api/config"
            ),
        }
    }
}

/// Singleton holder of the active provider configuration.
pub struct ConfigStore {
    saved: RwLock<Option<Configuration>>,
    env: EnvDefaults,
}

impl ConfigStore {
    pub fn new(env: EnvDefaults) -> Self {
        Self {
            saved: RwLock::new(None),
            env,
        }
    }

    pub fn from_env() -> Self {
        Self::new(EnvDefaults::from_env())
    }

    pub fn initialize(&self) -> StartupReport {
        StartupReport {
            gemini_key_present: !self.env.gemini_api_key.is_empty(),
            openai_key_present: !self.env.openai_api_key.is_empty(),
            preferred_provider: self.env.preferred_provider,
            active_provider: self.get_active().map(|c| c.provider),
        }
    }

    pub fn get_saved(&self) -> Option<Configuration> {
        self.saved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_active(&self) -> Option<ActiveConfig> {
        if let Some(saved) = self.get_saved() {
            if !saved.api_key.is_empty() {
                return Some(ActiveConfig {
                    provider: saved.provider,
                    api_key: saved.api_key,
                    source: ConfigSource::Saved,
                });
            }
        }
        self.env.resolve()
    }

    pub fn save(&self, provider: &str, api_key: &str) -> Result<Configuration, RewriteError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(RewriteError::Validation("API key is required".to_string()));
        }
        let provider: Provider = provider.parse()?;

        let mut saved = self.saved.write().unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now();
        let config = Configuration {
            provider,
            api_key: api_key.to_string(),
            created_at: saved.as_ref().map(|c| c.created_at).unwrap_or(now),
            updated_at: now,
        };
        *saved = Some(config.clone());

        log::info!(
            "Saved configuration for {} (key: {}...)",
            provider,
            key_prefix(api_key)
        );
        Ok(config)
    }

    pub fn status(&self) -> AiStatus {
        let active = self.get_active();
        AiStatus {
            is_configured: active.is_some(),
            provider: active.as_ref().map(|c| c.provider),
            has_key: active.is_some_and(|c| !c.api_key.is_empty()),
        }
    }
}

/// First few characters of a key, safe to log.
pub fn key_prefix(api_key: &str) -> String {
    api_key.chars().take(4).collect()
}
