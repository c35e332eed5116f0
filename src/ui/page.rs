//! Widget page.

use crate::ui::{escape_html, icons};
use crate::widget::i18n::{Language, LanguagePack, keys};
use crate::widget::markup::{
    CHAT_CONTAINER_ID, CHAT_MESSAGES_ID, CHAT_SECTION_ID, I18N_PLACEHOLDER_ATTR, I18N_TEXT_ATTR,
    LANGUAGE_SELECTOR_ID, QUERY_ATTR, SEND_BUTTON_ID, START_CHAT_BUTTON_ID, SUGGESTION_CHIP_CLASS,
    THINKING_TEMPLATE_ID, USER_INPUT_ID,
};

/// Path of the wasm-bindgen JS shim under `/static`.
pub const WIDGET_BUNDLE: &str = "/static/pkg/mind_soothe.js";

/// Suggestion chips, in display order. Each chip's query is also its text key.
const CHIPS: [&str; 3] = [keys::CHIP_ANXIETY, keys::CHIP_STRESS, keys::CHIP_MINDFULNESS];

/// Localized, escaped text for `key`.
fn text(pack: &LanguagePack, key: &str) -> String {
    escape_html(pack.get(key).unwrap_or_default())
}

/// Render the complete page with `language` pre-applied.
pub fn render_page(language: Language) -> String {
    let pack = language.pack();
    let lang = language.code();
    let dir = language.direction().as_str();

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}" dir="{dir}">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1, interactive-widget=resizes-content">
    <meta name="description" content="{description}">
    <title {I18N_TEXT_ATTR}="{title_key}">{title}</title>
    <link rel="stylesheet" href="/static/app.css">
    <script type="module">
        import init from "{WIDGET_BUNDLE}";
        init();
    </script>
</head>
<body>
{header}
<main>
{hero}
{chat}
</main>
{template}
</body>
</html>"#,
        description = text(pack, keys::DESCRIPTION),
        title_key = keys::TITLE,
        title = text(pack, keys::TITLE),
        header = header(language),
        hero = hero(pack),
        chat = chat_section(pack),
        template = thinking_template(),
    )
}

fn header(active: Language) -> String {
    let options: String = Language::ALL
        .into_iter()
        .map(|lang| {
            let selected = if lang == active { " selected" } else { "" };
            format!(
                r#"<option value="{code}"{selected}>{name}</option>"#,
                code = lang.code(),
                name = lang.native_name(),
            )
        })
        .collect();

    format!(
        r#"<header class="site-header">
    <a href="/" class="brand">{logo}<span>Mind-Soothe</span></a>
    <label class="language-picker">{globe}
        <select id="{LANGUAGE_SELECTOR_ID}" aria-label="Language">{options}</select>
    </label>
</header>"#,
        logo = icons::sparkles("icon brand-icon"),
        globe = icons::globe("icon"),
    )
}

fn hero(pack: &LanguagePack) -> String {
    format!(
        r#"<section class="hero">
    <h1>
        <span {I18N_TEXT_ATTR}="{h1_key}">{h1}</span>
        <span class="accent" {I18N_TEXT_ATTR}="{h2_key}">{h2}</span>
    </h1>
    <p class="subheadline" {I18N_TEXT_ATTR}="{sub_key}">{sub}</p>
    <button id="{START_CHAT_BUTTON_ID}" type="button" class="cta" {I18N_TEXT_ATTR}="{cta_key}">{cta}</button>
</section>"#,
        h1_key = keys::HEADLINE_1,
        h1 = text(pack, keys::HEADLINE_1),
        h2_key = keys::HEADLINE_2,
        h2 = text(pack, keys::HEADLINE_2),
        sub_key = keys::SUBHEADLINE,
        sub = text(pack, keys::SUBHEADLINE),
        cta_key = keys::CTA_BUTTON,
        cta = text(pack, keys::CTA_BUTTON),
    )
}

fn chat_section(pack: &LanguagePack) -> String {
    let chips: String = CHIPS
        .into_iter()
        .map(|key| {
            format!(
                r#"<button type="button" class="{SUGGESTION_CHIP_CLASS}" {QUERY_ATTR}="{key}" {I18N_TEXT_ATTR}="{key}">{label}</button>"#,
                label = text(pack, key),
            )
        })
        .collect();

    format!(
        r#"<section id="{CHAT_SECTION_ID}" class="chat-section">
    <div id="{CHAT_CONTAINER_ID}" class="chat-container">
        <div id="{CHAT_MESSAGES_ID}" class="chat-messages" aria-live="polite"></div>
        <div class="suggestions">{chips}</div>
        <div class="composer">
            <textarea id="{USER_INPUT_ID}" rows="1" placeholder="{placeholder}" {I18N_PLACEHOLDER_ATTR}="{placeholder_key}"></textarea>
            <button id="{SEND_BUTTON_ID}" type="button" class="send" aria-label="Send">{send}</button>
        </div>
    </div>
</section>"#,
        placeholder = text(pack, keys::PLACEHOLDER_INPUT),
        placeholder_key = keys::PLACEHOLDER_INPUT,
        send = icons::send("icon"),
    )
}

/// Hidden source of the animated placeholder; its first child is cloned into
/// every thinking bubble.
fn thinking_template() -> String {
    format!(
        r#"<div id="{THINKING_TEMPLATE_ID}" hidden>
    <div class="thinking-dots"><span></span><span></span><span></span></div>
</div>"#
    )
}
