/// Escape HTML to prevent XSS
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape text and keep its line breaks
pub fn escape_multiline(s: &str) -> String {
    escape_html(s).replace('\n', "<br>")
}
