//! Server-side rendering of the widget page.
//!
//! The page is plain HTML. Every localized element carries the key it was
//! rendered from (`data-i18n` / `data-i18n-placeholder`) so the browser
//! controller can re-apply another language in place.
//!
//! # Structure
//!
//! - [`page`]: Document shell and widget sections
//! - [`icons`]: Inline SVG icons

pub mod icons;
pub mod page;

pub use page::render_page;

/// Escape text for use in HTML content or a double-quoted attribute.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
