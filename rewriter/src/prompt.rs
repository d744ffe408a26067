use crate::models::{CaseStudy, InternalLink, InternalLinkSuggestion, RewriteRequest};

const REWRITING_RULES: &str = r#"Você é um especialista em conteúdo que segue as regras do SEO moderno: Google E-E-A-T, SEO GEO (IA/SGE), RankMath e Quality Analyzers.

REGRAS OBRIGATÓRIAS:
1. Utilidade: responda a intenção de busca de forma direta e com valor prático.
2. Qualidade: conteúdo atualizado, preciso, original e sem erros factuais.
3. E-E-A-T: experiência real, fontes confiáveis (.gov, .edu, empresas estabelecidas), especialistas e dados verificáveis.
4. Estrutura: UM ÚNICO H1 com a palavra-chave, H2/H3 hierárquicos (alguns em forma de pergunta), parágrafos de no máximo 4 linhas, listas para snippets.
5. Palavra-chave: densidade entre 1% e 3%, presente no H1, na primeira frase, nos primeiros 10% do texto e em pelo menos um H2. Mínimo de 900 palavras.
6. Meta: meta description de até 160 caracteres com a palavra-chave e sugestão de slug.
7. Blocos independentes, resumo executivo no início, conclusão em 2 parágrafos, FAQ com 8 ou mais perguntas e glossário.
8. Conteúdo rico: sugestões de gráficos, imagens com alt text e elementos visuais.
9. Citações: use os estudos de caso fornecidos e instituições confiáveis (IBGE, FGV, Sebrae, universidades).
10. Links internos: use os links internos fornecidos com texto âncora otimizado.
11. Entidades: marcas, pessoas, locais e conceitos relevantes no Brasil.
12. Schema: estrutura compatível com Article, Author, FAQ e Organization.

LINGUAGEM: palavras simples, frases de até 15 palavras, tom de conversa, exemplos do dia a dia, nenhum jargão sem explicação."#;

fn optional_line(label: &str, value: &str) -> String {
    if value.trim().is_empty() {
        String::new()
    } else {
        format!("- {}: \"{}\"\n", label, value.trim())
    }
}

/// Assembles the single prompt sent to the provider.
pub fn build_prompt(
    request: &RewriteRequest,
    case_studies: &[CaseStudy],
    internal_links: &[InternalLink],
) -> String {
    let keyword = request.target_keyword.trim();

    let mut project = format!("- Palavra-chave principal: \"{}\"\n- Densidade ideal: 1-3%\n", keyword);
    if let Some(link) = request.link() {
        project.push_str(&format!(
            "- Link obrigatório: \"{}\" (apenas na primeira menção da palavra-chave)\n",
            link
        ));
    }
    project.push_str(&optional_line("Empresa", &request.company_name));
    project.push_str(&optional_line("Autor", &request.author_name));
    project.push_str(&optional_line("Bio do autor", &request.author_description));

    let case_studies_json = serde_json::to_string(case_studies).unwrap_or_else(|_| "[]".to_string());
    let suggestions: Vec<InternalLinkSuggestion> = internal_links.iter().map(Into::into).collect();
    let links_json = serde_json::to_string(&suggestions).unwrap_or_else(|_| "[]".to_string());

    let mut optional_fields = String::new();
    if !request.author_name.trim().is_empty() {
        optional_fields.push_str(&format!(
            ",\n  \"authorBio\": \"bio profissional de {} baseada em: {}\"",
            request.author_name.trim(),
            request.author_description.trim()
        ));
    }
    if !request.company_name.trim().is_empty() {
        optional_fields.push_str(&format!(
            ",\n  \"ctaSection\": {{\"title\": \"chamada para {company}\", \"text\": \"texto conectando {keyword} aos serviços da {company}\", \"buttonText\": \"Fale com especialistas\"}}",
            company = request.company_name.trim(),
            keyword = keyword
        ));
    }

    format!(
        r#"{rules}

TAREFA: reescreva o conteúdo abaixo seguindo todas as regras.

DADOS DO PROJETO:
{project}
CONTEÚDO ORIGINAL:
{content}

Use SOMENTE os estudos de caso e links internos fornecidos no JSON abaixo; não invente outros.

Responda APENAS com um objeto JSON com esta estrutura:
{{
  "executiveSummary": "resumo de 3 a 5 linhas",
  "rewrittenContent": "conteúdo completo em HTML puro (<h1>, <h2>, <p>, <strong>, <ul>, <li>), nunca markdown, terminando com uma seção <h2>Glossário</h2>",
  "slugSuggestion": "slug-com-a-palavra-chave",
  "userInstructions": ["instrução 1", "instrução 2"],
  "glossary": [{{"term": "termo", "definition": "explicação simples"}}],
  "metaDescription": "até 160 caracteres com a palavra-chave",
  "helpfulnessScore": 98,
  "qualityScore": 96,
  "eatScore": 94,
  "structureScore": 95,
  "aiOptimizationScore": 97,
  "geoSeoScore": 93,
  "rankMathScore": 92,
  "featuredImage": {{"title": "título", "altText": "alt text com a palavra-chave", "keywords": ["palavra1", "palavra2"]}},
  "faq": [{{"question": "pergunta otimizada para voz", "answer": "resposta direta"}}],
  "caseStudies": {case_studies},
  "richContent": {{
    "suggestedGraphics": [{{"type": "chart", "title": "título", "description": "descrição", "dataPoints": ["dado"]}}],
    "suggestedImages": [{{"position": "início do artigo", "description": "descrição", "altText": "alt text", "caption": "legenda"}}],
    "visualElements": [{{"type": "callout", "content": "destaque", "position": "após o segundo parágrafo"}}]
  }},
  "citations": [{{"type": "study", "text": "estudo da instituição", "suggestedLink": "https://exemplo.gov.br", "credibility": "high"}}],
  "internalLinking": {links},
  "entities": {{"brands": [], "people": [], "locations": [], "concepts": []}},
  "schemaMarkup": {{"articleSchema": true, "authorSchema": true, "faqSchema": true, "organizationSchema": true, "reviewSchema": false}}{optional_fields}
}}"#,
        rules = REWRITING_RULES,
        project = project,
        content = request.original_content,
        case_studies = case_studies_json,
        links = links_json,
        optional_fields = optional_fields,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RewriteRequest {
        RewriteRequest {
            original_content: "Texto original sobre marketing.".to_string(),
            target_keyword: "marketing digital".to_string(),
            keyword_link: Some("https://acme.com.br/marketing".to_string()),
            company_name: "Acme".to_string(),
            author_name: "Ana".to_string(),
            author_description: "consultora".to_string(),
        }
    }

    #[test]
    fn prompt_embeds_request_fields() {
        let prompt = build_prompt(&request(), &[], &[]);
        assert!(prompt.contains("\"marketing digital\""));
        assert!(prompt.contains("https://acme.com.br/marketing"));
        assert!(prompt.contains("Empresa: \"Acme\""));
        assert!(prompt.contains("Texto original sobre marketing."));
        assert!(prompt.contains("\"authorBio\""));
        assert!(prompt.contains("\"ctaSection\""));
    }

    #[test]
    fn score_template_has_no_zero_placeholders() {
        let prompt = build_prompt(&request(), &[], &[]);
        assert!(prompt.contains("\"qualityScore\": 96"));
        assert!(!prompt.contains("Score\": 0"));
    }

    #[test]
    fn prompt_embeds_evidence_json() {
        let studies = vec![CaseStudy {
            title: "Caso X".to_string(),
            description: "d".to_string(),
            results: "150%".to_string(),
            external_link: "https://x.com.br".to_string(),
        }];
        let links = vec![InternalLink {
            text: "guia".to_string(),
            url: "https://acme.com.br/guia".to_string(),
        }];
        let prompt = build_prompt(&request(), &studies, &links);
        assert!(prompt.contains(r#""externalLink":"https://x.com.br""#));
        assert!(prompt.contains(r#""targetPage":"https://acme.com.br/guia""#));
    }

    #[test]
    fn absent_metadata_is_omitted() {
        let bare = RewriteRequest {
            original_content: "conteúdo simples".to_string(),
            target_keyword: "seo".to_string(),
            ..Default::default()
        };
        let prompt = build_prompt(&bare, &[], &[]);
        assert!(!prompt.contains("Link obrigatório"));
        assert!(!prompt.contains("Empresa:"));
        assert!(!prompt.contains("\"authorBio\""));
        assert!(!prompt.contains("\"ctaSection\""));
    }
}
