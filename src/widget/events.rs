//! UI events consumed by the controller and the subscriptions that produce them.

use super::controller::PendingAsk;

/// A DOM listener the controller owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscription {
    /// `change` on the language selector.
    LanguageChange,
    /// `click` on the send button.
    SendClick,
    /// `keydown` on the message input.
    InputKeyDown,
    /// `input` on the message input.
    InputChange,
    /// `click` on the start-chat button.
    StartChatClick,
    /// `click` on every suggestion chip.
    ChipClick,
    /// Intersection of the chat section with the viewport.
    ChatVisibility,
    /// `focus` on the message input.
    InputFocus,
    /// `blur` on the message input.
    InputBlur,
    /// `resize` on the visual viewport.
    ViewportResize,
}

impl Subscription {
    /// Listeners installed at startup on every device.
    pub const BASE: [Subscription; 7] = [
        Subscription::LanguageChange,
        Subscription::SendClick,
        Subscription::InputKeyDown,
        Subscription::InputChange,
        Subscription::StartChatClick,
        Subscription::ChipClick,
        Subscription::ChatVisibility,
    ];

    /// Listeners installed at startup on touch devices only.
    pub const TOUCH: [Subscription; 2] = [Subscription::InputFocus, Subscription::InputBlur];
}

/// Something that happened on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// The selector now shows `code`.
    LanguageSelected(String),
    SendClicked,
    KeyDown { key: String, shift: bool },
    InputChanged,
    StartChatClicked,
    /// A suggestion chip carrying `query` was clicked.
    ChipClicked { query: String },
    ChatVisibility { intersecting: bool },
    /// The input gained focus; `viewport_height` is the layout viewport height.
    InputFocused { viewport_height: f64 },
    InputBlurred,
    /// The visual viewport resized.
    ViewportResized { visual_height: f64, input_focused: bool },
}

/// What the host must do after the controller handled an event.
#[derive(Debug, Default)]
pub struct Dispatch {
    /// Suppress the browser default action (e.g. newline on Enter).
    pub prevent_default: bool,
    /// A send was started; run it through an [`AskClient`](super::AskClient).
    pub ask: Option<PendingAsk>,
}

impl Dispatch {
    pub(crate) fn ask(ask: Option<PendingAsk>) -> Self {
        Self {
            prevent_default: false,
            ask,
        }
    }
}
