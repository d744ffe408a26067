use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::env;
use std::sync::Arc;
use std::time::Instant;
use unicode_segmentation::UnicodeSegmentation;

use crate::case_study_service::{
    base_domain_for, dynamic_case_studies, generate_internal_links, slugify, static_case_studies,
    MAX_CASE_STUDIES,
};
use crate::error::RewriteError;
use crate::llm_service::{HttpLlmConnector, LlmClient, LlmConnector, LlmSettings};
use crate::markup::markdown_to_html;
use crate::metrics::ContentMetrics;
use crate::models::*;
use crate::niche::detect_niche;
use crate::prompt::build_prompt;
use crate::search_service::WebSearch;

/// Key value shipped in sample configs; never a real credential.
pub const PLACEHOLDER_API_KEY: &str = "dummy-key";

const MAX_FAQ_ENTRIES: usize = 8;
const MAX_META_DESCRIPTION_CHARS: usize = 155;

/// Scores used when the model leaves one out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreDefaults {
    pub helpfulness: u32,
    pub quality: u32,
    pub eat: u32,
    pub structure: u32,
    pub ai_optimization: u32,
    pub geo_seo: u32,
    pub rank_math: u32,
}

impl Default for ScoreDefaults {
    fn default() -> Self {
        Self {
            helpfulness: 85,
            quality: 80,
            eat: 75,
            structure: 82,
            ai_optimization: 78,
            geo_seo: 80,
            rank_math: 80,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RewriteSettings {
    pub scores: ScoreDefaults,
    pub llm: LlmSettings,
    /// Overrides the company-derived domain of internal links.
    pub base_domain: Option<String>,
}

impl RewriteSettings {
    pub fn from_env() -> Self {
        Self {
            scores: ScoreDefaults::default(),
            llm: LlmSettings::from_env(),
            base_domain: env::var("SITE_BASE_DOMAIN")
                .ok()
                .map(|domain| domain.trim().to_string())
                .filter(|domain| !domain.is_empty()),
        }
    }
}

/// Sample request used by [`RewriteService::test_connection`].
pub fn connection_test_request() -> RewriteRequest {
    RewriteRequest {
        original_content: "Este é um teste de conexão.".to_string(),
        target_keyword: "teste".to_string(),
        keyword_link: None,
        company_name: "Test Company".to_string(),
        author_name: "Test Author".to_string(),
        author_description: String::new(),
    }
}

pub struct RewriteService {
    settings: RewriteSettings,
    connector: Arc<dyn LlmConnector>,
}

impl RewriteService {
    pub fn new(settings: RewriteSettings) -> Result<Self, RewriteError> {
        let connector = HttpLlmConnector::new(settings.llm.clone())?;
        Ok(Self::with_connector(settings, Arc::new(connector)))
    }

    pub fn with_connector(settings: RewriteSettings, connector: Arc<dyn LlmConnector>) -> Self {
        Self {
            settings,
            connector,
        }
    }

    pub fn settings(&self) -> &RewriteSettings {
        &self.settings
    }

    /// Rewrites `request` with the provider and key in `config`.
    ///
    /// When `search` is given, case studies come from the search heuristics;
    /// otherwise from the static catalog.
    pub async fn rewrite(
        &self,
        request: &RewriteRequest,
        config: &ActiveConfig,
        search: Option<&dyn WebSearch>,
    ) -> Result<RewriteResult, RewriteError> {
        request.validate()?;
        ensure_usable_key(&config.api_key)?;

        let client = self.connector.connect(config.provider, &config.api_key);
        self.rewrite_with_client(request, client.as_ref(), search).await
    }

    pub async fn rewrite_with_client(
        &self,
        request: &RewriteRequest,
        client: &dyn LlmClient,
        search: Option<&dyn WebSearch>,
    ) -> Result<RewriteResult, RewriteError> {
        request.validate()?;
        let start_time = Instant::now();
        let keyword = request.target_keyword.trim();

        let case_studies = self.resolve_case_studies(request, search).await;
        let base_domain = self.base_domain(request);
        let internal_links = generate_internal_links(keyword, &request.original_content, &base_domain);

        log::info!(
            "Rewriting with {} for keyword '{}' (niche: {}, {} case studies, {} internal links)",
            client.provider().display_name(),
            keyword,
            detect_niche(keyword, &request.original_content),
            case_studies.len(),
            internal_links.len()
        );

        let prompt = build_prompt(request, &case_studies, &internal_links);
        let raw = client.generate_json(&prompt).await?;
        let result = self.assemble_result(request, &raw, case_studies);

        log::info!(
            "Rewrite finished in {}ms: {} words, density {}, SEO score {}",
            start_time.elapsed().as_millis(),
            result.word_count,
            result.keyword_density,
            result.seo_score
        );
        Ok(result)
    }

    /// Runs the full pipeline on a fixed sample without touching history.
    pub async fn test_connection(&self, provider: Provider, api_key: &str) -> Result<(), RewriteError> {
        let api_key = api_key.trim();
        ensure_usable_key(api_key)?;

        let client = self.connector.connect(provider, api_key);
        self.rewrite_with_client(&connection_test_request(), client.as_ref(), None)
            .await?;

        log::info!("Connection test with {} succeeded", provider.display_name());
        Ok(())
    }

    async fn resolve_case_studies(
        &self,
        request: &RewriteRequest,
        search: Option<&dyn WebSearch>,
    ) -> Vec<CaseStudy> {
        let keyword = request.target_keyword.trim();
        match search {
            Some(search) => {
                dynamic_case_studies(search, keyword, &request.original_content, MAX_CASE_STUDIES)
                    .await
                    .into_iter()
                    .map(CaseStudy::from)
                    .collect()
            }
            None => static_case_studies(keyword),
        }
    }

    fn base_domain(&self, request: &RewriteRequest) -> String {
        match &self.settings.base_domain {
            Some(domain) => domain.clone(),
            None => base_domain_for(&request.company_name),
        }
    }

    /// Turns the raw model output into a fully populated result.
    ///
    /// Output that is not a JSON object becomes the rewritten body as-is,
    /// with every other field defaulted.
    pub fn assemble_result(
        &self,
        request: &RewriteRequest,
        raw: &str,
        case_studies: Vec<CaseStudy>,
    ) -> RewriteResult {
        let keyword = request.target_keyword.trim();
        let company = request.company_name.trim();
        let author = request.author_name.trim();

        let (content, map) = match parse_llm_json(raw) {
            Some(map) => {
                let body = map
                    .get("rewrittenContent")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                (markdown_to_html(body), map)
            }
            None => {
                log::warn!("Model response is not a JSON object, using plain-text fallback");
                (raw.to_string(), Map::new())
            }
        };
        let fields = LlmFields(&map);
        let metrics = ContentMetrics::compute(&content, keyword);
        let defaults = &self.settings.scores;

        let meta_description = fields
            .text("metaDescription")
            .unwrap_or_else(|| format!("{} - resumo otimizado para SEO", keyword));

        let image = fields.nested("featuredImage");
        let featured_image = FeaturedImage {
            title: image
                .and_then(|i| i.text("title"))
                .unwrap_or_else(|| format!("Imagem sobre {}", keyword)),
            alt_text: image
                .and_then(|i| i.text("altText"))
                .unwrap_or_else(|| format!("{} - imagem ilustrativa", keyword)),
            keywords: image
                .map(|i| i.list::<String>("keywords"))
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| vec![keyword.to_string()]),
        };

        let mut faq: Vec<FaqEntry> = fields
            .list::<FaqEntry>("faq")
            .into_iter()
            .filter(|entry| !entry.question.trim().is_empty())
            .collect();
        if faq.is_empty() {
            faq.push(FaqEntry {
                question: format!("O que é {}?", keyword),
                answer: "Resposta baseada no conteúdo reescrito.".to_string(),
            });
        }
        faq.truncate(MAX_FAQ_ENTRIES);

        let mut case_studies = non_empty_or(fields.list::<CaseStudy>("caseStudies"), case_studies);
        case_studies.truncate(MAX_CASE_STUDIES);

        let rich = fields.nested("richContent");
        let rich_content = RichContent {
            suggested_graphics: rich.map(|r| r.list("suggestedGraphics")).unwrap_or_default(),
            suggested_images: rich.map(|r| r.list("suggestedImages")).unwrap_or_default(),
            visual_elements: rich.map(|r| r.list("visualElements")).unwrap_or_default(),
        };

        let author_bio = fields.text("authorBio").or_else(|| {
            (!author.is_empty()).then(|| format!("Biografia do autor {}", author))
        });
        let cta_section = fields.object::<CtaSection>("ctaSection").or_else(|| {
            (!company.is_empty()).then(|| CtaSection {
                title: format!("Transforme seu negócio com {}", keyword),
                text: format!(
                    "A {} é especialista em {} e pode ajudar você a alcançar os mesmos resultados. Entre em contato conosco hoje mesmo!",
                    company, keyword
                ),
                button_text: format!("Falar com {}", company),
            })
        });

        RewriteResult {
            rewritten_content: content,
            word_count: metrics.word_count,
            keyword_density: metrics.keyword_density,
            seo_score: metrics.seo_score,
            readability_score: metrics.readability,
            meta_description: truncate_chars(&meta_description, MAX_META_DESCRIPTION_CHARS),
            executive_summary: fields.text("executiveSummary"),
            slug_suggestion: fields
                .text("slugSuggestion")
                .unwrap_or_else(|| slugify(keyword)),
            user_instructions: fields.list("userInstructions"),
            glossary: fields.list("glossary"),

            helpfulness_score: fields.score("helpfulnessScore").unwrap_or(defaults.helpfulness),
            quality_score: fields.score("qualityScore").unwrap_or(defaults.quality),
            eat_score: fields.score("eatScore").unwrap_or(defaults.eat),
            structure_score: fields.score("structureScore").unwrap_or(defaults.structure),
            ai_optimization_score: fields
                .score("aiOptimizationScore")
                .unwrap_or(defaults.ai_optimization),
            geo_seo_score: fields.score("geoSeoScore").unwrap_or(defaults.geo_seo),
            rank_math_score: fields.score("rankMathScore").unwrap_or(defaults.rank_math),

            featured_image,
            faq,
            case_studies,
            rich_content,
            citations: fields.list("citations"),
            internal_linking: fields.list("internalLinking"),
            entities: fields.object("entities").unwrap_or_default(),
            schema_markup: fields.object("schemaMarkup").unwrap_or_default(),
            author_bio,
            cta_section,
        }
    }
}

fn ensure_usable_key(api_key: &str) -> Result<(), RewriteError> {
    let api_key = api_key.trim();
    if api_key.is_empty() || api_key == PLACEHOLDER_API_KEY {
        return Err(RewriteError::not_configured());
    }
    Ok(())
}

/// Unwraps a ```` ```json ```` fenced block, if any.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    {
        Some(inner) => inner
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric())
            .trim(),
        None => trimmed,
    }
}

fn parse_llm_json(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(strip_code_fences(raw)) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            log::warn!("Model returned JSON that is not an object");
            None
        }
        Err(e) => {
            log::warn!("Failed to parse model response as JSON: {}", e);
            None
        }
    }
}

fn non_empty_or<T>(values: Vec<T>, fallback: Vec<T>) -> Vec<T> {
    if values.is_empty() {
        fallback
    } else {
        values
    }
}

/// Cuts at a grapheme boundary so the result has at most `max` chars.
fn truncate_chars(text: &str, max: usize) -> String {
    let mut out = String::new();
    let mut count = 0;
    for grapheme in text.graphemes(true) {
        let len = grapheme.chars().count();
        if count + len > max {
            break;
        }
        count += len;
        out.push_str(grapheme);
    }
    out
}

/// Lenient accessors over the model's JSON object.
#[derive(Clone, Copy)]
struct LlmFields<'a>(&'a Map<String, Value>);

impl<'a> LlmFields<'a> {
    fn text(&self, key: &str) -> Option<String> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// A literal `0` counts as missing: models echo the template's placeholder.
    fn score(&self, key: &str) -> Option<u32> {
        let value = self.0.get(key)?;
        let number = value
            .as_f64()
            .or_else(|| value.as_str()?.trim().parse::<f64>().ok())?;
        (number.is_finite() && number != 0.0).then(|| number.round().clamp(0.0, 100.0) as u32)
    }

    /// Well-formed elements of an array; malformed ones are dropped.
    fn list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn object<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .filter(|value| value.is_object())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    fn nested(&self, key: &str) -> Option<LlmFields<'a>> {
        self.0.get(key).and_then(Value::as_object).map(LlmFields)
    }
}
