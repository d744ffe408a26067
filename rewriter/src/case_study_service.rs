//! Case-study and internal-link suggestions handed to the model as evidence.
//!
//! Every generator here falls back to a fixed catalog rather than returning
//! nothing.

use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;
use url::Url;

use crate::models::{CaseStudy, DynamicCaseStudy, InternalLink, SearchResult, SearchResults};
use crate::niche::{detect_niche, extract_company_name, extract_growth_metric, DEFAULT_NICHE};
use crate::search_service::WebSearch;

pub const MAX_CASE_STUDIES: usize = 3;
const MAX_SEARCH_RESULTS: usize = 5;
const MAX_INTERNAL_LINKS: usize = 2;
pub const DEFAULT_BASE_DOMAIN: &str = "exemplo.com.br";

fn case(title: &str, description: &str, results: &str, link: &str) -> CaseStudy {
    CaseStudy {
        title: title.to_string(),
        description: description.to_string(),
        results: results.to_string(),
        external_link: link.to_string(),
    }
}

fn universal_case_studies() -> Vec<CaseStudy> {
    vec![
        case(
            "Magazine Luiza - Transformação Digital Completa",
            "A Magazine Luiza digitalizou seus processos e criou métodos que servem para qualquer setor.",
            "Crescimento de 67% nas vendas e operações totalmente digitalizadas",
            "https://www.magazineluiza.com.br/institucional/sobre-nos",
        ),
        case(
            "Nubank - Inovação em Experiência do Cliente",
            "O Nubank montou processos de experiência do cliente que vão além do setor financeiro.",
            "Mais de 90 milhões de clientes e valor de mercado de US$ 41,5 bilhões",
            "https://ir.nu/",
        ),
        case(
            "Sebrae - Metodologias para Todos os Setores",
            "O Sebrae aplica metodologias de gestão em empresas de todos os nichos do mercado brasileiro.",
            "Mais de 500 mil empresas atendidas em todos os setores",
            "https://sebrae.com.br/",
        ),
    ]
}

fn specific_case_studies(keyword: &str) -> Vec<CaseStudy> {
    let keyword = keyword.to_lowercase();
    let mentions = |terms: &[&str]| terms.iter().any(|t| keyword.contains(t));
    let mut specific = Vec::new();

    if mentions(&["marketing", "digital", "publicidade"]) {
        specific.push(case(
            "iFood - Estratégias de Marketing Multicanal",
            "O iFood criou campanhas multicanal que viraram referência para empresas de vários setores.",
            "Presença em mais de 1.000 cidades e crescimento de 70%",
            "https://institucional.ifood.com.br/",
        ));
    }

    if mentions(&["ecommerce", "e-commerce", "vendas", "loja"]) {
        specific.push(case(
            "Mercado Livre - Liderança em Vendas Online",
            "O Mercado Livre desenvolveu métodos de venda online usados por empresas de todos os segmentos.",
            "288 milhões de usuários únicos e crescimento de 79% na receita",
            "https://investor.mercadolibre.com/",
        ));
    }

    if mentions(&["seo", "conteudo", "conteúdo", "blog"]) {
        specific.push(case(
            "Rock Content - Metodologia de Conteúdo",
            "A Rock Content criou uma metodologia de marketing de conteúdo aplicável a qualquer nicho.",
            "Mais de 3.000 clientes atendidos em diversos setores",
            "https://rockcontent.com/br/sobre/",
        ));
    }

    specific
}

/// Catalog used when the static catalog cannot be assembled.
pub fn fallback_case_studies() -> Vec<CaseStudy> {
    vec![
        case(
            "Sebrae - Metodologias Universais para Todos os Setores",
            "O Sebrae desenvolveu metodologias de gestão que funcionam em todos os nichos do mercado brasileiro.",
            "Mais de 500 mil empresas atendidas em todos os setores",
            "https://sebrae.com.br/",
        ),
        case(
            "BNDES - Financiamento e Crescimento",
            "O BNDES mantém programas de crescimento para empresas de qualquer setor da economia.",
            "Mais de R$ 50 bilhões investidos por ano",
            "https://www.bndes.gov.br/",
        ),
        case(
            "Endeavor Brasil - Metodologias de Alto Impacto",
            "A Endeavor acelera startups e empresas de todos os segmentos com metodologias próprias.",
            "Mais de 2.000 empresas aceleradas",
            "https://endeavor.org.br/",
        ),
    ]
}

fn try_static_case_studies(keyword: &str) -> Result<Vec<CaseStudy>> {
    let specific = specific_case_studies(keyword);
    let universal_slots = MAX_CASE_STUDIES - specific.len().min(1);

    let studies: Vec<CaseStudy> = universal_case_studies()
        .into_iter()
        .take(universal_slots)
        .chain(specific)
        .take(MAX_CASE_STUDIES)
        .collect();

    // Catalog links are checked before they reach a prompt.
    for study in &studies {
        Url::parse(&study.external_link)
            .map_err(|e| anyhow::anyhow!("invalid link for '{}': {}", study.title, e))?;
    }
    if studies.is_empty() {
        anyhow::bail!("static catalog produced no case studies");
    }

    Ok(studies)
}

/// Universal entries first, then at most one keyword-specific entry, capped at three.
pub fn static_case_studies(keyword: &str) -> Vec<CaseStudy> {
    try_static_case_studies(keyword).unwrap_or_else(|e| {
        log::error!("Static case study catalog failed, using fallback: {}", e);
        fallback_case_studies()
    })
}

fn dynamic(
    title: &str,
    company: &str,
    description: &str,
    location: &str,
    sector: &str,
    growth_metric: &str,
    source_url: &str,
) -> DynamicCaseStudy {
    DynamicCaseStudy {
        title: title.to_string(),
        company: company.to_string(),
        description: description.to_string(),
        location: location.to_string(),
        sector: sector.to_string(),
        growth_metric: growth_metric.to_string(),
        source_url: source_url.to_string(),
        image_url: None,
    }
}

/// Per-niche table used when the search path fails.
pub fn niche_fallback_case_studies(niche: &str, count: usize) -> Vec<DynamicCaseStudy> {
    let studies = match niche {
        "e-commerce" => vec![
            dynamic(
                "Americanas - Transformação Digital no Varejo",
                "Americanas",
                "Gigante do varejo brasileiro acelerou vendas online com integração omnichannel.",
                "Rio de Janeiro, RJ",
                "e-commerce",
                "200% de crescimento digital",
                "https://ri.americanas.com/",
            ),
            dynamic(
                "Via Varejo - Inovação no E-commerce",
                "Via Varejo",
                "Grupo controlador das Casas Bahia e Ponto Frio expandiu seu marketplace.",
                "São Paulo, SP",
                "e-commerce",
                "150% aumento em vendas online",
                "https://ri.viavarejo.com.br/",
            ),
        ],
        "fintech" => vec![
            dynamic(
                "PicPay - Revolução nos Pagamentos Digitais",
                "PicPay",
                "Super app brasileiro transformou pagamentos com carteira digital.",
                "São Paulo, SP",
                "fintech",
                "300% crescimento de usuários",
                "https://picpay.com/",
            ),
            dynamic(
                "Inter - Banco Digital Completo",
                "Inter",
                "Banco digital oferece conta gratuita e serviços financeiros integrados.",
                "Belo Horizonte, MG",
                "fintech",
                "400% crescimento em clientes",
                "https://inter.co/",
            ),
        ],
        _ => vec![
            dynamic(
                "TOTVS - Líder em Software Empresarial",
                "TOTVS",
                "Maior empresa de software do Brasil oferece soluções para gestão empresarial.",
                "São Paulo, SP",
                DEFAULT_NICHE,
                "25% crescimento anual",
                "https://totvs.com/",
            ),
            dynamic(
                "Locaweb - Infraestrutura Digital",
                "Locaweb",
                "Provedor líder de hospedagem e soluções digitais para empresas.",
                "São Paulo, SP",
                DEFAULT_NICHE,
                "180% aumento em receita",
                "https://locaweb.com.br/",
            ),
        ],
    };

    studies.into_iter().take(count).collect()
}

pub fn case_study_query(niche: &str) -> String {
    format!(
        "casos de sucesso empresas brasileiras {} crescimento resultados site:*.com.br",
        niche
    )
}

fn truncate_graphemes(text: &str, max: usize) -> String {
    text.graphemes(true).take(max).collect()
}

fn parse_search_result(result: &SearchResult, niche: &str) -> Result<DynamicCaseStudy> {
    let company = extract_company_name(&result.title, &result.snippet)
        .ok_or_else(|| anyhow::anyhow!("no company name in '{}'", result.title))?;
    let growth_metric = extract_growth_metric(&result.snippet)
        .unwrap_or_else(|| "Crescimento significativo registrado".to_string());

    let source_url = if result.url.is_empty() {
        format!("https://{}/{}", DEFAULT_BASE_DOMAIN, slugify(&company))
    } else {
        result.url.clone()
    };

    Ok(DynamicCaseStudy {
        title: format!("{} - Caso de Sucesso em {}", company, niche),
        description: format!(
            "{} demonstrou crescimento excepcional no setor de {}. {}...",
            company,
            niche,
            truncate_graphemes(&result.snippet, 150)
        ),
        company,
        location: "Brasil".to_string(),
        sector: niche.to_string(),
        growth_metric,
        source_url,
        image_url: Some(
            "https://images.unsplash.com/photo-1560472354-b33ff0c44a43?w=400&h=200&fit=crop"
                .to_string(),
        ),
    })
}

fn extract_case_studies(results: &SearchResults, niche: &str) -> Vec<DynamicCaseStudy> {
    results
        .results
        .iter()
        .take(MAX_SEARCH_RESULTS)
        .filter_map(|result| match parse_search_result(result, niche) {
            Ok(study) => Some(study),
            Err(e) => {
                log::warn!("Skipping search result: {}", e);
                None
            }
        })
        .collect()
}

/// Builds case studies from web search results for the detected niche.
pub async fn dynamic_case_studies(
    search: &dyn WebSearch,
    keyword: &str,
    content: &str,
    count: usize,
) -> Vec<DynamicCaseStudy> {
    let niche = detect_niche(keyword, content);

    match search.search(&case_study_query(niche)).await {
        Ok(results) => {
            let mut studies = extract_case_studies(&results, niche);
            if studies.is_empty() {
                log::info!("No usable search results for niche {}, using fallback table", niche);
                return niche_fallback_case_studies(niche, count);
            }
            studies.truncate(count);
            studies
        }
        Err(e) => {
            log::error!("Dynamic case study search failed: {}", e);
            niche_fallback_case_studies(niche, count)
        }
    }
}

static LINKABLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(?:como|guia|tutorial|estratégia|dicas|melhores práticas)[\s\w]+",
        r"(?i)(?:ferramentas|técnicas|métodos|processos)[\s\w]+",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static NON_SLUG_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let cleaned = NON_SLUG_CHARS.replace_all(&lowered, "");
    let slug = WHITESPACE.replace_all(cleaned.trim(), "-");
    slug.chars().take(50).collect()
}

/// Domain used for internal links: the company's own site when known.
pub fn base_domain_for(company_name: &str) -> String {
    let compact: String = company_name
        .to_lowercase()
        .split_whitespace()
        .collect();
    if compact.is_empty() {
        DEFAULT_BASE_DOMAIN.to_string()
    } else {
        format!("{}.com.br", compact)
    }
}

fn generic_links(keyword: &str, base_domain: &str) -> Vec<InternalLink> {
    let keyword_slug = slugify(keyword);
    vec![
        InternalLink {
            text: format!("Guia completo de {}", keyword),
            url: format!("https://{}/guia-completo-{}", base_domain, keyword_slug),
        },
        InternalLink {
            text: format!("Melhores práticas em {}", keyword),
            url: format!("https://{}/melhores-praticas-{}", base_domain, keyword_slug),
        },
    ]
}

/// Suggests internal links from linkable phrases in the content, padded with
/// keyword-based links so at least two are always returned.
pub fn generate_internal_links(keyword: &str, content: &str, base_domain: &str) -> Vec<InternalLink> {
    let mut links: Vec<InternalLink> = LINKABLE_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(content).take(MAX_INTERNAL_LINKS))
        .map(|m| m.as_str().trim().to_string())
        .filter(|phrase| !phrase.is_empty())
        .take(MAX_INTERNAL_LINKS)
        .map(|phrase| InternalLink {
            url: format!("https://{}/{}", base_domain, slugify(&phrase)),
            text: phrase,
        })
        .collect();

    for link in generic_links(keyword, base_domain) {
        if links.len() >= MAX_INTERNAL_LINKS {
            break;
        }
        if !links.iter().any(|existing| existing.url == link.url) {
            links.push(link);
        }
    }

    links
}
