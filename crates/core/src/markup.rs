//! HTML escaping for backend-supplied text.
//!
//! Trial fields come from a semi-trusted backend and end up inside `innerHTML`. Every value is
//! passed through [`escape`] before it is interpolated; markup in this crate is otherwise built
//! from literals only.

use std::borrow::Cow;

/// Escape `&`, `<`, `>`, `"` and `'` so `text` is inert in element content and quoted
/// attribute values.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Escape `text` and turn line breaks into `<br>` so paragraphs survive rendering.
pub fn escape_with_breaks(text: &str) -> String {
    escape(&text.replace("\r\n", "\n")).replace('\n', "<br>")
}

/// The value, or `fallback` when it is absent or empty.
pub fn or_fallback<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

/// Escaped value or escaped fallback.
pub fn text_or<'a>(value: Option<&'a str>, fallback: &'a str) -> Cow<'a, str> {
    escape(or_fallback(value, fallback))
}
