pub fn mask_api_key(key: &str) -> String {
    let visible: String = key.chars().take(5).collect();
    let hidden = key.chars().count().saturating_sub(5);
    if hidden > 0 {
        format!("{}{}", visible, "*".repeat(hidden))
    } else {
        key.to_string()
    }
}

/// Escapes text for interpolation into HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Request ids are timestamps, matching what ends up in the log file.
pub fn request_id() -> String {
    chrono::Utc::now().format("%Y%m%d%H%M%S%f").to_string()
}
