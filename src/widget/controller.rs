//! The chat widget controller.
//!
//! Owns the loading flag, the active language and the subscription list, and
//! drives the page exclusively through a [`WidgetHost`]. The controller never
//! awaits: a send is split into [`ChatController::send_message`], which creates
//! every bubble synchronously, and [`ChatController::finish_send`], which applies
//! the outcome once the request settles.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::events::{Dispatch, Subscription, WidgetEvent};
use super::exchange::AskError;
use super::host::{Bubble, BubbleContent, BubbleId, Deferred, Sender, TextSlot, WidgetHost};
use super::i18n::{Language, detect_language};
use super::markdown;
use super::viewport::{KeyboardAdapter, ResizeAction};

/// Delay before the welcome message appears after a language switch.
pub const WELCOME_DELAY: Duration = Duration::from_secs(1);
/// Duration of the fade between placeholder and answer.
pub const REVEAL_DELAY: Duration = Duration::from_millis(300);
/// Delay between the start-chat scroll and focusing the input.
pub const FOCUS_DELAY: Duration = Duration::from_millis(500);

/// Shown in place of an answer whenever an exchange fails.
pub const APOLOGY: &str = "I'm sorry, but I encountered an error. Please try again.";

/// A send that is waiting for its answer.
#[derive(Debug)]
pub struct PendingAsk {
    message: String,
    placeholder: BubbleId,
}

impl PendingAsk {
    /// The text to post to `/ask`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The placeholder bubble that will receive the answer.
    pub fn placeholder(&self) -> &BubbleId {
        &self.placeholder
    }
}

/// Chat widget state machine.
#[derive(Debug)]
pub struct ChatController<H> {
    host: H,
    language: Language,
    /// Bumped on every language switch; stale welcome messages are dropped.
    language_generation: u64,
    loading: bool,
    next_seq: u64,
    /// Present on touch devices only.
    keyboard: Option<KeyboardAdapter>,
    subscriptions: Vec<Subscription>,
}

impl<H: WidgetHost> ChatController<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            language: Language::default(),
            language_generation: 0,
            loading: false,
            next_seq: 0,
            keyboard: None,
            subscriptions: Vec::new(),
        }
    }

    /// Install listeners, size the input and apply the detected language.
    pub fn start(&mut self) {
        let env = self.host.environment();

        for subscription in Subscription::BASE {
            self.subscribe(subscription);
        }
        if env.coarse_pointer {
            self.keyboard = Some(KeyboardAdapter::new());
            for subscription in Subscription::TOUCH {
                self.subscribe(subscription);
            }
        }

        self.host.fit_input_height();

        let language = detect_language(env.locale.as_deref());
        info!(
            name: "widget.started",
            locale = ?env.locale,
            language = %language,
            touch = env.coarse_pointer,
            "Chat widget started"
        );
        self.change_language(language);
    }

    /// Tear down every listener the controller installed.
    pub fn dispose(&mut self) {
        for subscription in std::mem::take(&mut self.subscriptions) {
            self.host.unsubscribe(subscription);
        }
        if let Some(keyboard) = self.keyboard.as_mut() {
            keyboard.on_blur();
        }
        debug!(name: "widget.disposed", "Chat widget disposed");
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Switch the page to `language` and restart the conversation.
    pub fn change_language(&mut self, language: Language) {
        self.language = language;
        self.language_generation += 1;

        self.host
            .set_document_language(language.code(), language.direction());
        self.host.set_selected_language(language.code());

        let pack = language.pack();
        for slot in [TextSlot::Text, TextSlot::Placeholder] {
            for key in self.host.tagged_keys(slot) {
                if let Some(value) = pack.get(&key) {
                    self.host.set_tagged(slot, &key, value);
                }
            }
        }

        self.host.clear_messages();
        self.host.schedule(
            WELCOME_DELAY,
            Deferred::Welcome {
                language,
                generation: self.language_generation,
            },
        );

        info!(name: "widget.language.changed", language = %language, "Language applied");
    }

    /// Send whatever the input currently holds.
    pub fn submit_input(&mut self) -> Option<PendingAsk> {
        let text = self.host.input_value();
        self.send_message(&text)
    }

    /// Start sending `text`.
    ///
    /// Returns `None` without touching the page when `text` is blank or a request
    /// is already in flight. Otherwise the user bubble and the placeholder are on
    /// the page when this returns, and the caller must post the ticket's message
    /// and pass the outcome to [`finish_send`](Self::finish_send).
    pub fn send_message(&mut self, text: &str) -> Option<PendingAsk> {
        let message = text.trim();
        if message.is_empty() {
            return None;
        }
        if self.loading {
            debug!(name: "widget.send.ignored", "Send ignored while a request is in flight");
            return None;
        }

        self.set_loading(true);
        self.append_message(Sender::User, &markdown::render(message));

        let placeholder = self.next_thinking_id();
        self.host.append_bubble(&Bubble {
            id: placeholder.clone(),
            sender: Sender::Bot,
            content: BubbleContent::Thinking,
        });
        self.host.scroll_to_latest();

        self.host.set_input_value("");
        self.host.fit_input_height();

        debug!(
            name: "widget.send.started",
            placeholder = %placeholder,
            chars = message.chars().count(),
            "Message sent"
        );

        Some(PendingAsk {
            message: message.to_string(),
            placeholder,
        })
    }

    /// Apply the outcome of a send. Always clears the loading flag.
    pub fn finish_send(&mut self, pending: PendingAsk, outcome: Result<String, AskError>) {
        let html = match outcome {
            Ok(answer) => markdown::render(&answer),
            Err(err) => {
                error!(
                    name: "widget.ask.failed",
                    placeholder = %pending.placeholder,
                    error = %err,
                    "Ask request failed"
                );
                markdown::render(APOLOGY)
            }
        };

        if self.host.begin_reveal(&pending.placeholder) {
            self.host.schedule(
                REVEAL_DELAY,
                Deferred::Reveal {
                    bubble: pending.placeholder,
                    html,
                },
            );
        } else {
            debug!(
                name: "widget.reveal.skipped",
                placeholder = %pending.placeholder,
                "Placeholder no longer on the page"
            );
        }

        self.set_loading(false);
    }

    /// Run a task previously handed to [`WidgetHost::schedule`].
    pub fn run_deferred(&mut self, task: Deferred) {
        match task {
            Deferred::Welcome {
                language,
                generation,
            } => {
                if generation != self.language_generation {
                    debug!(name: "widget.welcome.stale", language = %language, "Stale welcome dropped");
                    return;
                }
                let welcome = language.pack().welcome_message();
                self.append_message(Sender::Bot, &markdown::render(welcome));
            }
            Deferred::Reveal { bubble, html } => {
                if self.host.finish_reveal(&bubble, &html) {
                    self.host.scroll_to_latest();
                }
            }
            Deferred::FocusInput => self.host.focus_input(),
        }
    }

    /// React to a page event.
    pub fn handle(&mut self, event: WidgetEvent) -> Dispatch {
        match event {
            WidgetEvent::LanguageSelected(code) => match Language::from_code(&code) {
                Some(language) => self.change_language(language),
                None => warn!(name: "widget.language.unknown", code = %code, "Unsupported language selected"),
            },
            WidgetEvent::SendClicked => return Dispatch::ask(self.submit_input()),
            WidgetEvent::KeyDown { key, shift } => {
                if key == "Enter" && !shift {
                    return Dispatch {
                        prevent_default: true,
                        ask: self.submit_input(),
                    };
                }
            }
            WidgetEvent::InputChanged => self.host.fit_input_height(),
            WidgetEvent::StartChatClicked => {
                self.host.reveal_chat_section();
                self.host.schedule(FOCUS_DELAY, Deferred::FocusInput);
            }
            WidgetEvent::ChipClicked { query } => {
                let prompt = self.language.pack().resolve_query(&query).to_string();
                self.host.set_input_value(&prompt);
                self.host.focus_input();
                return Dispatch::ask(self.submit_input());
            }
            WidgetEvent::ChatVisibility { intersecting } => self.host.set_chat_active(intersecting),
            WidgetEvent::InputFocused { viewport_height } => {
                let started = self
                    .keyboard
                    .as_mut()
                    .is_some_and(|keyboard| keyboard.on_focus(viewport_height));
                if started {
                    self.subscribe(Subscription::ViewportResize);
                }
            }
            WidgetEvent::InputBlurred => {
                if let Some(keyboard) = self.keyboard.as_mut() {
                    if keyboard.on_blur() {
                        self.unsubscribe(Subscription::ViewportResize);
                    }
                    self.host.set_keyboard_offset(0.0);
                }
            }
            WidgetEvent::ViewportResized {
                visual_height,
                input_focused,
            } => {
                let action = self
                    .keyboard
                    .as_ref()
                    .map(|keyboard| keyboard.on_resize(visual_height, input_focused));
                match action {
                    Some(ResizeAction::Reset) => self.host.set_keyboard_offset(0.0),
                    Some(ResizeAction::Follow { offset }) => {
                        if let Some(offset) = offset {
                            self.host.set_keyboard_offset(offset);
                        }
                        self.host.scroll_to_latest();
                    }
                    None => {}
                }
            }
        }
        Dispatch::default()
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.host.set_loading(loading);
    }

    fn append_message(&mut self, sender: Sender, html: &str) {
        let id = BubbleId::message(Utc::now().timestamp_millis(), self.bump_seq());
        self.host.append_bubble(&Bubble {
            id,
            sender,
            content: BubbleContent::Html(html.to_string()),
        });
        self.host.scroll_to_latest();
    }

    fn next_thinking_id(&mut self) -> BubbleId {
        BubbleId::thinking(Utc::now().timestamp_millis(), self.bump_seq())
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn subscribe(&mut self, subscription: Subscription) {
        if !self.subscriptions.contains(&subscription) {
            self.host.subscribe(subscription);
            self.subscriptions.push(subscription);
        }
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        if let Some(index) = self.subscriptions.iter().position(|s| *s == subscription) {
            self.subscriptions.remove(index);
            self.host.unsubscribe(subscription);
        }
    }
}
