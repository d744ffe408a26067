use async_trait::async_trait;
use reqwest::Client;

use crate::error::{RewriteError, TransportErrorKind};
use crate::llm_service::{error_from_reqwest, error_from_response, LlmClient};
use crate::models::*;

pub struct GeminiService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiService {
    pub fn new(client: Client, api_key: &str, base_url: &str, model: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl LlmClient for GeminiService {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn generate_json(&self, prompt: &str) -> Result<String, RewriteError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: 0.7,
                max_output_tokens: 8192,
                response_mime_type: "application/json".to_string(),
            }),
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| error_from_reqwest(Provider::Gemini, e))?;

        if !response.status().is_success() {
            return Err(error_from_response(Provider::Gemini, response).await);
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| error_from_reqwest(Provider::Gemini, e))?;

        let text: String = gemini_response
            .candidates
            .first()
            .map(|c| c.content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(RewriteError::transport(
                Provider::Gemini,
                TransportErrorKind::Other,
                "empty response from Gemini",
            ));
        }

        Ok(text)
    }
}
