//! The seam between the controller and the page.
//!
//! [`WidgetHost`] exposes exactly the DOM operations the controller needs. The
//! browser implementation lives in the wasm32-only `web` module; tests drive the
//! controller with an in-memory host.

use std::fmt;
use std::time::Duration;

use super::events::Subscription;
use super::i18n::{Language, TextDirection};

/// Who authored a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// CSS class for the bubble, e.g. `user-message`.
    pub fn class(self) -> &'static str {
        match self {
            Self::User => "user-message",
            Self::Bot => "bot-message",
        }
    }
}

/// Element id of a rendered bubble.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BubbleId(String);

impl BubbleId {
    /// Time-derived id; `seq` keeps ids unique within the same millisecond.
    pub(crate) fn message(millis: i64, seq: u64) -> Self {
        Self(format!("msg-{millis}-{seq}"))
    }

    pub(crate) fn thinking(millis: i64, seq: u64) -> Self {
        Self(format!("msg-thinking-{millis}-{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a new bubble initially shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BubbleContent {
    /// Already-rendered HTML.
    Html(String),
    /// The animated placeholder cloned from the page template.
    Thinking,
}

/// A conversation entry to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub id: BubbleId,
    pub sender: Sender,
    pub content: BubbleContent,
}

/// Which attribute a localized element is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSlot {
    /// `data-i18n`: replaces the element text.
    Text,
    /// `data-i18n-placeholder`: replaces the placeholder.
    Placeholder,
}

/// Work the controller asks the host to run later on the same event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Post the welcome message for the language selection `generation`.
    /// Only the latest selection's welcome is posted; older ones are dropped.
    Welcome { language: Language, generation: u64 },
    /// Swap the placeholder content for the final answer.
    Reveal { bubble: BubbleId, html: String },
    /// Move focus to the message input.
    FocusInput,
}

/// Read-only facts about the runtime, sampled once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Runtime-reported locale (e.g. `navigator.language`).
    pub locale: Option<String>,
    /// Whether the primary pointer is coarse (touch).
    pub coarse_pointer: bool,
}

/// DOM operations used by the controller.
///
/// Methods returning `bool` report whether the target element existed; a missing
/// target is never an error.
pub trait WidgetHost {
    fn environment(&self) -> Environment;

    /// Start delivering events for `subscription`.
    fn subscribe(&mut self, subscription: Subscription);
    /// Stop delivering events for `subscription`.
    fn unsubscribe(&mut self, subscription: Subscription);

    /// Set `<html lang>` and `<html dir>`.
    fn set_document_language(&mut self, code: &str, direction: TextDirection);
    /// Reflect the active language in the selector.
    fn set_selected_language(&mut self, code: &str);
    /// Distinct keys tagged on the page for `slot`.
    fn tagged_keys(&self, slot: TextSlot) -> Vec<String>;
    /// Apply `value` to every element tagged with `key` in `slot`.
    fn set_tagged(&mut self, slot: TextSlot, key: &str, value: &str);

    /// Remove every bubble.
    fn clear_messages(&mut self);
    fn append_bubble(&mut self, bubble: &Bubble);
    /// Drop the thinking marker and fade the bubble content out.
    fn begin_reveal(&mut self, id: &BubbleId) -> bool;
    /// Replace the bubble content and fade it back in.
    fn finish_reveal(&mut self, id: &BubbleId, html: &str) -> bool;
    fn scroll_to_latest(&mut self);

    /// Toggle the loading style and disable or enable input controls.
    fn set_loading(&mut self, loading: bool);
    fn input_value(&self) -> String;
    fn set_input_value(&mut self, value: &str);
    fn focus_input(&mut self);
    /// Fit the input height to its content.
    fn fit_input_height(&mut self);

    /// Smooth-scroll the chat section into view.
    fn reveal_chat_section(&mut self);
    /// Toggle the `chat-active` page class.
    fn set_chat_active(&mut self, active: bool);
    /// Publish the keyboard offset, in CSS pixels.
    fn set_keyboard_offset(&mut self, px: f64);

    /// Hand `task` back through [`ChatController::run_deferred`] after `delay`.
    ///
    /// [`ChatController::run_deferred`]: super::ChatController::run_deferred
    fn schedule(&mut self, delay: Duration, task: Deferred);
}
