//! Keyword-list heuristics over free text: niche buckets, company names and
//! growth metrics. Everything here is best-effort substring and pattern matching.

use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_NICHE: &str = "tecnologia";

/// Ordered niche table; the first bucket with a matching keyword wins.
pub const NICHE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "e-commerce",
        &["e-commerce", "loja online", "vendas online", "marketplace", "varejo"],
    ),
    (
        "marketing",
        &["marketing digital", "publicidade", "seo", "redes sociais", "inbound"],
    ),
    (
        "fintech",
        &["fintech", "banco digital", "pagamentos", "financeiro", "investimentos"],
    ),
    (
        "saúde",
        &["saúde", "medicina", "telemedicina", "farmácia", "clínica"],
    ),
    (
        "educação",
        &["educação", "ensino", "curso online", "escola", "aprendizado"],
    ),
    (
        "tecnologia",
        &["tecnologia", "software", "app", "aplicativo", "desenvolvimento"],
    ),
    (
        "alimentação",
        &["restaurante", "delivery", "comida", "alimentação", "gastronomia"],
    ),
    (
        "imóveis",
        &["imóveis", "proptech", "construção", "apartamento", "casa"],
    ),
    (
        "logística",
        &["logística", "transporte", "entrega", "frete", "distribuição"],
    ),
    (
        "beleza",
        &["beleza", "cosméticos", "estética", "skincare", "maquiagem"],
    ),
];

pub fn detect_niche(keyword: &str, content: &str) -> &'static str {
    let text = format!("{} {}", keyword, content).to_lowercase();

    NICHE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(niche, _)| *niche)
        .unwrap_or(DEFAULT_NICHE)
}

static EXPLICIT_COMPANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:empresa|startup|companhia)\s+(\p{Lu}\w+(?:\s+\p{Lu}\w+)*)").unwrap()
});

static CAPITALIZED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Lu}\p{Ll}+(?:\s+\p{Lu}\p{Ll}+)*").unwrap());

const NOT_COMPANIES: &[&str] = &[
    "Brasil", "Como", "Para", "Quando", "Onde", "Caso", "Casos", "Sucesso", "Empresa",
    "Empresas", "Estudo", "Startup",
];

/// Guesses a company name from a search result.
pub fn extract_company_name(title: &str, snippet: &str) -> Option<String> {
    let text = format!("{} {}", title, snippet);

    if let Some(caps) = EXPLICIT_COMPANY.captures(&text) {
        return Some(caps[1].trim().to_string());
    }

    CAPITALIZED_RUN
        .find_iter(&text)
        .map(|m| m.as_str().trim())
        .find(|candidate| !NOT_COMPANIES.contains(candidate))
        .map(str::to_string)
}

static GROWTH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(\d+%)\s*(?:de\s*)?(?:crescimento|aumento|alta)",
        r"(?i)cresceu\s+(\d+%|\d+x)",
        r"(?i)aumentou\s+(?:em\s+)?(\d+%|\d+x)",
        r"(?i)faturamento\s+de\s+(R\$\s*[\d,]+\s*(?:milhões?|bilhões?))",
        r"(?i)vendas\s+de\s+(R\$\s*[\d,]+\s*(?:milhões?|bilhões?))",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Finds the first growth figure ("150%", "3x", "R$ 10 milhões") in a snippet.
pub fn extract_growth_metric(text: &str) -> Option<String> {
    GROWTH_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seo_keyword_lands_in_marketing() {
        assert_eq!(detect_niche("estratégia de seo para blog", ""), "marketing");
        assert_eq!(detect_niche("estratégia de seo para blog", ""), "marketing");
    }

    #[test]
    fn detection_is_case_insensitive() {
        assert_eq!(detect_niche("FINTECH", ""), "fintech");
    }

    #[test]
    fn content_is_considered() {
        assert_eq!(
            detect_niche("crescimento", "nossa clínica atende em São Paulo"),
            "saúde"
        );
    }

    #[test]
    fn first_bucket_in_table_order_wins() {
        // matches both e-commerce ("marketplace") and marketing ("seo")
        assert_eq!(detect_niche("seo para marketplace", ""), "e-commerce");
    }

    #[test]
    fn unmatched_text_defaults_to_technology() {
        assert_eq!(detect_niche("jardinagem", "plantas e flores"), DEFAULT_NICHE);
        assert_eq!(detect_niche("", ""), DEFAULT_NICHE);
    }

    #[test]
    fn company_after_marker_word() {
        let company = extract_company_name("", "A startup Loggi cresceu 200%");
        assert_eq!(company.as_deref(), Some("Loggi"));
    }

    #[test]
    fn company_from_capitalized_run_skips_common_words() {
        let company = extract_company_name(
            "Caso de Sucesso: Magazine Luiza",
            "em todo o Brasil",
        );
        assert_eq!(company.as_deref(), Some("Magazine Luiza"));
    }

    #[test]
    fn no_company_in_lowercase_text() {
        assert!(extract_company_name("resultado sem nomes", "apenas texto").is_none());
    }

    #[test]
    fn growth_metric_percentages() {
        assert_eq!(
            extract_growth_metric("empresa cresceu 150% em dois anos").as_deref(),
            Some("150%")
        );
        assert_eq!(
            extract_growth_metric("registrou 40% de crescimento").as_deref(),
            Some("40%")
        );
        assert_eq!(
            extract_growth_metric("a receita aumentou em 3x").as_deref(),
            Some("3x")
        );
    }

    #[test]
    fn growth_metric_revenue() {
        let metric = extract_growth_metric("atingiu faturamento de R$ 12 milhões").unwrap();
        assert!(metric.starts_with("R$"));
    }

    #[test]
    fn growth_metric_absent() {
        assert!(extract_growth_metric("sem números aqui").is_none());
    }
}
