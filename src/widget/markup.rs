//! Element ids, attributes and class names shared by the server-rendered page
//! and the browser host.

pub const CHAT_CONTAINER_ID: &str = "chat-container";
pub const CHAT_SECTION_ID: &str = "chat-section";
pub const CHAT_MESSAGES_ID: &str = "chat-messages";
pub const LANGUAGE_SELECTOR_ID: &str = "language-selector";
pub const SEND_BUTTON_ID: &str = "send-button";
pub const USER_INPUT_ID: &str = "user-input";
pub const START_CHAT_BUTTON_ID: &str = "start-chat-button";
pub const THINKING_TEMPLATE_ID: &str = "thinking-animation-template";

/// Attribute naming the text key of an element.
pub const I18N_TEXT_ATTR: &str = "data-i18n";
/// Attribute naming the placeholder key of an input.
pub const I18N_PLACEHOLDER_ATTR: &str = "data-i18n-placeholder";
/// Attribute carrying a suggestion chip's query key.
pub const QUERY_ATTR: &str = "data-query";

pub const SUGGESTION_CHIP_CLASS: &str = "suggestion-chip";
pub const MESSAGE_CLASS: &str = "message";
pub const MESSAGE_CONTENT_CLASS: &str = "message-content";
pub const THINKING_CLASS: &str = "is-thinking";
pub const LOADING_CLASS: &str = "is-loading";
pub const CHAT_ACTIVE_CLASS: &str = "chat-active";

/// CSS custom property holding the on-screen keyboard height.
pub const KEYBOARD_OFFSET_VAR: &str = "--keyboard-offset";
