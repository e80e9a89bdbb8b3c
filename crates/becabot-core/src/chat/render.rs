use becabot_types::{ChatMessage, Sender, Sources};

use super::markdown::render_markdown;
use crate::utils::{escape_html, escape_multiline};

/// Inner HTML of a transcript bubble. User text is inserted literally; bot
/// text goes through the markdown subset.
pub fn render_message(message: &ChatMessage, sources: Option<&Sources>) -> String {
    let body = match message.sender {
        Sender::User => escape_multiline(&message.text),
        Sender::Bot => render_markdown(&message.text),
    };
    let footer = sources.map(render_sources).unwrap_or_default();
    format!(
        r#"<div class="message-content">{}{}</div><div class="message-time">{}</div>"#,
        body,
        footer,
        escape_html(&message.timestamp)
    )
}

/// Footer listing the documents a reply was drawn from
pub fn render_sources(sources: &Sources) -> String {
    if sources.is_empty() {
        return String::new();
    }

    let mut items = String::new();
    for (file, pages) in &sources.pdf_sources {
        if pages.is_empty() {
            items.push_str(&format!("<li>📄 {}</li>", escape_html(file)));
        } else {
            items.push_str(&format!(
                "<li>📄 {} (pág. {})</li>",
                escape_html(file),
                escape_html(&pages.join(", "))
            ));
        }
    }
    for (site, titles) in &sources.web_sources {
        if titles.is_empty() {
            items.push_str(&format!("<li>🌐 {}</li>", escape_html(site)));
        } else {
            items.push_str(&format!(
                "<li>🌐 {} ({})</li>",
                escape_html(site),
                escape_html(&titles.join(", "))
            ));
        }
    }

    format!(
        r#"<div class="message-sources"><span class="sources-title">Fuentes:</span><ul>{}</ul></div>"#,
        items
    )
}
