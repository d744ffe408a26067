use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;
use uuid::Uuid;

use crate::error::RewriteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    Gemini,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Gemini => "gemini",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "gemini" => Ok(Provider::Gemini),
            other => Err(RewriteError::Validation(format!(
                "Unsupported AI provider: '{}'. Must be openai or gemini.",
                other
            ))),
        }
    }
}

/// The explicitly saved provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub provider: Provider,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Saved,
    Environment,
}

/// Provider and key resolved for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveConfig {
    pub provider: Provider,
    pub api_key: String,
    pub source: ConfigSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiStatus {
    pub is_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    pub has_key: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    pub original_content: String,
    pub target_keyword: String,
    #[serde(default)]
    pub keyword_link: Option<String>,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_description: String,
}

impl RewriteRequest {
    pub const MIN_CONTENT_CHARS: usize = 10;

    pub fn validate(&self) -> Result<(), RewriteError> {
        if self.original_content.chars().count() < Self::MIN_CONTENT_CHARS {
            return Err(RewriteError::Validation(
                "Content must be at least 10 characters long".to_string(),
            ));
        }
        if self.target_keyword.trim().is_empty() {
            return Err(RewriteError::Validation("Target keyword is required".to_string()));
        }
        if let Some(link) = self.link() {
            match Url::parse(link) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                _ => return Err(RewriteError::Validation("Invalid URL format".to_string())),
            }
        }
        Ok(())
    }

    /// The keyword link, with an empty string treated as absent.
    pub fn link(&self) -> Option<&str> {
        self.keyword_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudy {
    pub title: String,
    pub description: String,
    pub results: String,
    pub external_link: String,
}

/// A case study assembled from a search result or the per-niche table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicCaseStudy {
    pub title: String,
    pub company: String,
    pub description: String,
    pub location: String,
    pub sector: String,
    pub growth_metric: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<DynamicCaseStudy> for CaseStudy {
    fn from(study: DynamicCaseStudy) -> Self {
        Self {
            title: study.title,
            description: study.description,
            results: study.growth_metric,
            external_link: study.source_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalLink {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedImage {
    pub title: String,
    pub alt_text: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedGraphic {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedImage {
    pub position: String,
    pub description: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub position: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichContent {
    #[serde(default)]
    pub suggested_graphics: Vec<SuggestedGraphic>,
    #[serde(default)]
    pub suggested_images: Vec<SuggestedImage>,
    #[serde(default)]
    pub visual_elements: Vec<VisualElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    #[serde(default)]
    pub suggested_link: String,
    #[serde(default)]
    pub credibility: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalLinkSuggestion {
    pub anchor_text: String,
    pub target_page: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub relevance_score: f32,
}

impl From<&InternalLink> for InternalLinkSuggestion {
    fn from(link: &InternalLink) -> Self {
        Self {
            anchor_text: link.text.clone(),
            target_page: link.url.clone(),
            context: "link interno relevante".to_string(),
            relevance_score: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub concepts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMarkup {
    #[serde(default)]
    pub article_schema: bool,
    #[serde(default)]
    pub author_schema: bool,
    #[serde(default)]
    pub faq_schema: bool,
    #[serde(default)]
    pub organization_schema: bool,
    #[serde(default)]
    pub review_schema: bool,
}

impl Default for SchemaMarkup {
    fn default() -> Self {
        Self {
            article_schema: true,
            author_schema: false,
            faq_schema: false,
            organization_schema: false,
            review_schema: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaSection {
    pub title: String,
    pub text: String,
    pub button_text: String,
}

/// Fully populated rewrite payload returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResult {
    pub rewritten_content: String,
    pub word_count: usize,
    pub keyword_density: String,
    pub seo_score: u32,
    pub readability_score: String,
    pub meta_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
    pub slug_suggestion: String,
    pub user_instructions: Vec<String>,
    pub glossary: Vec<GlossaryEntry>,

    pub helpfulness_score: u32,
    pub quality_score: u32,
    pub eat_score: u32,
    pub structure_score: u32,
    pub ai_optimization_score: u32,
    pub geo_seo_score: u32,
    pub rank_math_score: u32,

    pub featured_image: FeaturedImage,
    pub faq: Vec<FaqEntry>,
    pub case_studies: Vec<CaseStudy>,
    pub rich_content: RichContent,
    pub citations: Vec<Citation>,
    pub internal_linking: Vec<InternalLinkSuggestion>,
    pub entities: Entities,
    pub schema_markup: SchemaMarkup,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_section: Option<CtaSection>,
}

/// Fields of a history entry supplied by the caller.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub original_content: String,
    pub rewritten_content: String,
    pub target_keyword: String,
    pub keyword_link: Option<String>,
    pub company_name: String,
    pub author_name: String,
    pub author_description: String,
    pub word_count: usize,
    pub keyword_density: String,
    pub seo_score: u32,
}

impl NewHistoryEntry {
    pub fn from_rewrite(request: &RewriteRequest, result: &RewriteResult) -> Self {
        Self {
            original_content: request.original_content.clone(),
            rewritten_content: result.rewritten_content.clone(),
            target_keyword: request.target_keyword.clone(),
            keyword_link: request.keyword_link.clone(),
            company_name: request.company_name.clone(),
            author_name: request.author_name.clone(),
            author_description: request.author_description.clone(),
            word_count: result.word_count,
            keyword_density: result.keyword_density.clone(),
            seo_score: result.seo_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub original_content: String,
    pub rewritten_content: String,
    pub target_keyword: String,
    pub keyword_link: Option<String>,
    pub company_name: String,
    pub author_name: String,
    pub author_description: String,
    pub word_count: usize,
    pub keyword_density: String,
    pub seo_score: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_rewrites: usize,
    pub avg_seo_score: u32,
    pub total_word_count: usize,
}

// Gemini generateContent wire types

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiCandidate {
    pub content: GeminiContent,
}

// OpenAI chat/completions wire types

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}
