use serde::Serialize;

use crate::markup::strip_tags;

/// Metrics derived from the final rewritten text, never from the model's own claims.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetrics {
    pub word_count: usize,
    pub keyword_occurrences: usize,
    pub keyword_density: String,
    pub seo_score: u32,
    pub readability: String,
}

impl ContentMetrics {
    /// Markup tags count as whitespace; the keyword is matched case-insensitively
    /// as a plain substring.
    pub fn compute(text: &str, keyword: &str) -> Self {
        let visible = strip_tags(text);
        let word_count = visible.split_whitespace().count();
        let keyword_occurrences = count_occurrences(&visible, keyword);

        Self {
            word_count,
            keyword_occurrences,
            keyword_density: format_density(keyword_occurrences, word_count),
            seo_score: seo_score(keyword_occurrences, word_count),
            readability: readability(word_count).to_string(),
        }
    }
}

pub fn count_occurrences(text: &str, keyword: &str) -> usize {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(needle.as_str()).count()
}

pub fn density_ratio(occurrences: usize, word_count: usize) -> f64 {
    if word_count == 0 {
        0.0
    } else {
        occurrences as f64 / word_count as f64
    }
}

pub fn format_density(occurrences: usize, word_count: usize) -> String {
    if word_count == 0 {
        "0%".to_string()
    } else {
        format!("{:.1}%", density_ratio(occurrences, word_count) * 100.0)
    }
}

/// `min(100, max(1, occurrences * 10 + (20 if words > 300 else 10)))`
pub fn seo_score(occurrences: usize, word_count: usize) -> u32 {
    let length_bonus = if word_count > 300 { 20 } else { 10 };
    let raw = occurrences.saturating_mul(10).saturating_add(length_bonus);
    raw.clamp(1, 100) as u32
}

pub fn readability(word_count: usize) -> &'static str {
    if word_count > 500 {
        "Boa"
    } else {
        "Regular"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words_with_keyword(total: usize, keyword_hits: usize) -> String {
        let mut words = vec!["seo"; keyword_hits];
        words.extend(std::iter::repeat("palavra").take(total - keyword_hits));
        words.join(" ")
    }

    #[test]
    fn three_hundred_words_two_hits() {
        let metrics = ContentMetrics::compute(&words_with_keyword(300, 2), "seo");
        assert_eq!(metrics.word_count, 300);
        assert_eq!(metrics.keyword_occurrences, 2);
        assert_eq!(metrics.seo_score, 30);
        assert_eq!(metrics.keyword_density, "0.7%");
    }

    #[test]
    fn long_text_gets_length_bonus() {
        let metrics = ContentMetrics::compute(&words_with_keyword(301, 2), "seo");
        assert_eq!(metrics.seo_score, 40);
    }

    #[test]
    fn score_is_capped_at_100() {
        assert_eq!(seo_score(50, 1000), 100);
    }

    #[test]
    fn empty_text() {
        let metrics = ContentMetrics::compute("", "seo");
        assert_eq!(metrics.word_count, 0);
        assert_eq!(metrics.keyword_density, "0%");
        assert_eq!(metrics.seo_score, 10);
        assert_eq!(metrics.readability, "Regular");
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        assert_eq!(count_occurrences("SEO local e seo técnico; SEOs", "Seo"), 3);
    }

    #[test]
    fn keyword_is_not_a_regex() {
        assert_eq!(count_occurrences("c++ e c++", "c++"), 2);
        assert_eq!(count_occurrences("abc", "a.c"), 0);
    }

    #[test]
    fn empty_keyword_never_matches() {
        assert_eq!(count_occurrences("qualquer texto", "  "), 0);
    }

    #[test]
    fn tags_are_not_words() {
        let metrics = ContentMetrics::compute("<h1>SEO</h1><p>guia de seo</p>", "seo");
        assert_eq!(metrics.word_count, 4);
        assert_eq!(metrics.keyword_occurrences, 2);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let text = "<p>Marketing <strong>digital</strong> para pequenas empresas</p><br>marketing";
        assert_eq!(
            ContentMetrics::compute(text, "marketing"),
            ContentMetrics::compute(text, "marketing")
        );
    }

    #[test]
    fn readability_threshold() {
        assert_eq!(readability(500), "Regular");
        assert_eq!(readability(501), "Boa");
    }
}
