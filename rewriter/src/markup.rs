use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.*)$").unwrap());
static H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.*)$").unwrap());
static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.*)$").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Converts the small markdown subset models tend to emit into HTML.
///
/// Bold runs before italic so `**` is not consumed as two italics, and
/// headings run before newline conversion so their lines stay intact.
pub fn markdown_to_html(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");
    let text = H3.replace_all(&text, "<h3>$1</h3>");
    let text = H2.replace_all(&text, "<h2>$1</h2>");
    let text = H1.replace_all(&text, "<h1>$1</h1>");
    let text = newlines_to_breaks(&text);
    text.replace("<br><br>", "<br>")
}

/// Replaces each newline with `<br>` unless the next character is `<` or `>`.
fn newlines_to_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' && !matches!(chars.peek(), Some('<') | Some('>')) {
            out.push_str("<br>");
        } else {
            out.push(c);
        }
    }
    out
}

/// Text with every markup tag replaced by a space.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_and_italic() {
        assert_eq!(
            markdown_to_html("**forte** e *leve*"),
            "<strong>forte</strong> e <em>leve</em>"
        );
    }

    #[test]
    fn headings_by_level() {
        let html = markdown_to_html("# Um\n## Dois\n### Três");
        assert_eq!(html, "<h1>Um</h1>\n<h2>Dois</h2>\n<h3>Três</h3>");
    }

    #[test]
    fn newlines_become_breaks() {
        assert_eq!(markdown_to_html("linha um\nlinha dois"), "linha um<br>linha dois");
    }

    #[test]
    fn newline_before_tag_is_kept() {
        assert_eq!(markdown_to_html("<p>a</p>\n<p>b</p>"), "<p>a</p>\n<p>b</p>");
    }

    #[test]
    fn doubled_breaks_collapse() {
        assert_eq!(markdown_to_html("um\n\ndois"), "um<br>dois");
    }

    #[test]
    fn trailing_newline_becomes_break() {
        assert_eq!(markdown_to_html("fim\n"), "fim<br>");
    }

    #[test]
    fn crlf_is_normalized() {
        assert_eq!(markdown_to_html("## Título\r\ntexto"), "<h2>Título</h2><br>texto");
    }

    #[test]
    fn plain_html_is_untouched() {
        let html = "<h1>Título</h1><p>Parágrafo com <strong>ênfase</strong>.</p>";
        assert_eq!(markdown_to_html(html), html);
    }

    #[test]
    fn strip_tags_leaves_words() {
        assert_eq!(strip_tags("<p>um</p><p>dois</p>").split_whitespace().count(), 2);
    }
}
