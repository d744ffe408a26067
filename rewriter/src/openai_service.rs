use async_trait::async_trait;
use reqwest::Client;

use crate::error::{RewriteError, TransportErrorKind};
use crate::llm_service::{error_from_reqwest, error_from_response, LlmClient};
use crate::models::*;

pub struct OpenAiService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiService {
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
impl LlmClient for OpenAiService {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn generate_json(&self, prompt: &str) -> Result<String, RewriteError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
            max_tokens: 4000,
            temperature: 0.7,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| error_from_reqwest(Provider::OpenAI, e))?;

        if !response.status().is_success() {
            return Err(error_from_response(Provider::OpenAI, response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| error_from_reqwest(Provider::OpenAI, e))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                RewriteError::transport(
                    Provider::OpenAI,
                    TransportErrorKind::Other,
                    "empty response from OpenAI",
                )
            })
    }
}
