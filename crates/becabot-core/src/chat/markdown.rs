//! Markdown subset for bot replies: `**bold**` spans and `* ` bullet lines.
//! Consecutive bullets form one list; every other non-blank line becomes a
//! paragraph. Text is escaped before markup is applied.

use regex::Regex;
use std::sync::OnceLock;

use crate::utils::escape_html;

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is valid"))
}

/// Render bot-authored text to HTML
pub fn render_markdown(text: &str) -> String {
    let mut html = String::new();
    let mut in_list = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            // Blank lines neither start nor end a list
            continue;
        }

        if let Some(item) = line.strip_prefix("* ") {
            if !in_list {
                html.push_str("<ul>");
                in_list = true;
            }
            html.push_str("<li>");
            html.push_str(&render_inline(item.trim()));
            html.push_str("</li>");
        } else {
            if in_list {
                html.push_str("</ul>");
                in_list = false;
            }
            html.push_str("<p>");
            html.push_str(&render_inline(line));
            html.push_str("</p>");
        }
    }

    if in_list {
        html.push_str("</ul>");
    }

    html
}

fn render_inline(text: &str) -> String {
    bold_pattern()
        .replace_all(&escape_html(text), "<strong>$1</strong>")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_one_paragraph() {
        assert_eq!(render_markdown("Hola, ¿cómo estás?"), "<p>Hola, ¿cómo estás?</p>");
    }

    #[test]
    fn test_interleaved_bullets_form_one_list() {
        assert_eq!(
            render_markdown("a\n* b\n* c\nd"),
            "<p>a</p><ul><li>b</li><li>c</li></ul><p>d</p>"
        );
    }

    #[test]
    fn test_unterminated_list_is_closed() {
        assert_eq!(render_markdown("Requisitos:\n* cédula\n* récord"), "<p>Requisitos:</p><ul><li>cédula</li><li>récord</li></ul>");
    }

    #[test]
    fn test_bold_spans() {
        assert_eq!(
            render_markdown("La **Beca Excelencia** cubre el **100%**"),
            "<p>La <strong>Beca Excelencia</strong> cubre el <strong>100%</strong></p>"
        );
        assert_eq!(
            render_markdown("* **Plazo:** marzo"),
            "<ul><li><strong>Plazo:</strong> marzo</li></ul>"
        );
    }

    #[test]
    fn test_unmatched_bold_left_alone() {
        assert_eq!(render_markdown("2 ** 3"), "<p>2 ** 3</p>");
    }

    #[test]
    fn test_markup_in_bot_text_is_escaped() {
        assert_eq!(
            render_markdown("<script>x</script>"),
            "<p>&lt;script&gt;x&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn test_blank_lines_skipped() {
        assert_eq!(render_markdown("a\n\n* b\n\n* c"), "<p>a</p><ul><li>b</li><li>c</li></ul>");
        assert_eq!(render_markdown(""), "");
    }

    #[test]
    fn test_star_without_space_is_text() {
        assert_eq!(render_markdown("*nota"), "<p>*nota</p>");
    }
}
