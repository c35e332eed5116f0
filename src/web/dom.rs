//! [`WidgetHost`] over the live DOM.

use std::collections::HashMap;
use std::time::Duration;

use gloo_timers::future::sleep;
use thiserror::Error;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlButtonElement, HtmlElement, HtmlSelectElement,
    HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    KeyboardEvent, ScrollBehavior, ScrollIntoViewOptions, ScrollToOptions, Window,
};

use crate::widget::events::Subscription;
use crate::widget::host::{
    Bubble, BubbleContent, BubbleId, Deferred, Environment, TextSlot, WidgetHost,
};
use crate::widget::i18n::TextDirection;
use crate::widget::markup::{
    CHAT_ACTIVE_CLASS, CHAT_CONTAINER_ID, CHAT_MESSAGES_ID, CHAT_SECTION_ID, I18N_PLACEHOLDER_ATTR,
    I18N_TEXT_ATTR, KEYBOARD_OFFSET_VAR, LANGUAGE_SELECTOR_ID, LOADING_CLASS, MESSAGE_CLASS,
    MESSAGE_CONTENT_CLASS, QUERY_ATTR, SEND_BUTTON_ID, START_CHAT_BUTTON_ID, SUGGESTION_CHIP_CLASS,
    THINKING_CLASS, THINKING_TEMPLATE_ID, USER_INPUT_ID,
};
use crate::widget::{AskError, WidgetEvent};

use super::{dispatch_deferred, dispatch_event};

const COARSE_POINTER_QUERY: &str = "(pointer: coarse)";
const CHAT_VISIBILITY_THRESHOLD: f64 = 0.5;

/// Why the widget could not attach to the page.
#[derive(Error, Debug)]
pub(crate) enum DomError {
    #[error("no window or document available")]
    NoDocument,

    #[error("missing element #{0}")]
    MissingElement(&'static str),

    #[error("element #{id} is a <{tag}>, not the expected kind")]
    WrongElement { id: &'static str, tag: String },

    #[error("DOM call failed: {0}")]
    Js(String),

    #[error(transparent)]
    Ask(#[from] AskError),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// An installed listener or observer.
#[derive(Debug)]
enum Binding {
    Listener {
        targets: Vec<EventTarget>,
        kind: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    },
    Observer {
        observer: IntersectionObserver,
        _callback: Closure<dyn FnMut(js_sys::Array)>,
    },
}

/// Handles to the widget's elements plus the listeners installed on them.
#[derive(Debug)]
pub(crate) struct DomHost {
    window: Window,
    document: Document,
    root: HtmlElement,
    container: Element,
    messages: Element,
    selector: HtmlSelectElement,
    send_button: HtmlButtonElement,
    input: HtmlTextAreaElement,
    start_button: Element,
    chat_section: Element,
    template: Element,
    bindings: HashMap<Subscription, Binding>,
}

fn element(document: &Document, id: &'static str) -> Result<Element, DomError> {
    document
        .get_element_by_id(id)
        .ok_or(DomError::MissingElement(id))
}

fn typed<T: JsCast>(document: &Document, id: &'static str) -> Result<T, DomError> {
    element(document, id)?
        .dyn_into::<T>()
        .map_err(|el| DomError::WrongElement {
            id,
            tag: el.tag_name().to_lowercase(),
        })
}

/// Every element matching `selector`, in document order.
fn select_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn slot_attr(slot: TextSlot) -> &'static str {
    match slot {
        TextSlot::Text => I18N_TEXT_ATTR,
        TextSlot::Placeholder => I18N_PLACEHOLDER_ATTR,
    }
}

impl DomHost {
    /// Look up every required element.
    pub(crate) fn attach() -> Result<Self, DomError> {
        let window = web_sys::window().ok_or(DomError::NoDocument)?;
        let document = window.document().ok_or(DomError::NoDocument)?;
        let root = document
            .document_element()
            .ok_or(DomError::NoDocument)?
            .dyn_into::<HtmlElement>()
            .map_err(|el| DomError::WrongElement {
                id: "documentElement",
                tag: el.tag_name().to_lowercase(),
            })?;

        Ok(Self {
            container: element(&document, CHAT_CONTAINER_ID)?,
            messages: element(&document, CHAT_MESSAGES_ID)?,
            selector: typed(&document, LANGUAGE_SELECTOR_ID)?,
            send_button: typed(&document, SEND_BUTTON_ID)?,
            input: typed(&document, USER_INPUT_ID)?,
            start_button: element(&document, START_CHAT_BUTTON_ID)?,
            chat_section: element(&document, CHAT_SECTION_ID)?,
            template: element(&document, THINKING_TEMPLATE_ID)?,
            bindings: HashMap::new(),
            root,
            document,
            window,
        })
    }

    /// Page origin, used to address `/ask`.
    pub(crate) fn origin(&self) -> Result<String, DomError> {
        self.window.location().origin().map_err(DomError::from)
    }

    fn listen(
        &mut self,
        subscription: Subscription,
        targets: Vec<EventTarget>,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) {
        let callback = Closure::<dyn FnMut(Event)>::wrap(Box::new(handler));
        for target in &targets {
            if let Err(err) =
                target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            {
                warn!(name: "widget.listen.failed", event = kind, error = ?err, "addEventListener failed");
            }
        }
        self.bindings.insert(
            subscription,
            Binding::Listener {
                targets,
                kind,
                callback,
            },
        );
    }

    fn observe_chat_section(&mut self) -> Result<(), DomError> {
        let callback = Closure::<dyn FnMut(js_sys::Array)>::wrap(Box::new(
            |entries: js_sys::Array| {
                for entry in entries.iter() {
                    if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                        dispatch_event(WidgetEvent::ChatVisibility {
                            intersecting: entry.is_intersecting(),
                        });
                    }
                }
            },
        ));
        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(CHAT_VISIBILITY_THRESHOLD));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
        observer.observe(&self.chat_section);
        self.bindings.insert(
            Subscription::ChatVisibility,
            Binding::Observer {
                observer,
                _callback: callback,
            },
        );
        Ok(())
    }

    fn build_bubble(&self, bubble: &Bubble) -> Result<Element, DomError> {
        let thinking = matches!(bubble.content, BubbleContent::Thinking);
        let outer = self.document.create_element("div")?;
        outer.set_id(bubble.id.as_str());
        outer.set_class_name(&if thinking {
            format!("{MESSAGE_CLASS} {} {THINKING_CLASS}", bubble.sender.class())
        } else {
            format!("{MESSAGE_CLASS} {}", bubble.sender.class())
        });

        let content = self.document.create_element("div")?;
        content.set_class_name(MESSAGE_CONTENT_CLASS);
        match &bubble.content {
            BubbleContent::Html(html) => content.set_inner_html(html),
            BubbleContent::Thinking => {
                if let Some(animation) = self.template.first_element_child() {
                    content.append_child(&animation.clone_node_with_deep(true)?)?;
                }
            }
        }
        outer.append_child(&content)?;
        Ok(outer)
    }

    /// The content element of bubble `id`, if it is still on the page.
    fn bubble_content(&self, id: &BubbleId) -> Option<(Element, HtmlElement)> {
        let bubble = self.document.get_element_by_id(id.as_str())?;
        let content = bubble
            .query_selector(&format!(".{MESSAGE_CONTENT_CLASS}"))
            .ok()
            .flatten()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        Some((bubble, content))
    }

    fn input_has_focus(document: &Document) -> bool {
        document
            .active_element()
            .is_some_and(|el| el.id() == USER_INPUT_ID)
    }
}

impl WidgetHost for DomHost {
    fn environment(&self) -> Environment {
        Environment {
            locale: self.window.navigator().language(),
            coarse_pointer: self
                .window
                .match_media(COARSE_POINTER_QUERY)
                .ok()
                .flatten()
                .is_some_and(|query| query.matches()),
        }
    }

    fn subscribe(&mut self, subscription: Subscription) {
        match subscription {
            Subscription::LanguageChange => {
                let selector = self.selector.clone();
                self.listen(subscription, vec![self.selector.clone().into()], "change", move |_| {
                    dispatch_event(WidgetEvent::LanguageSelected(selector.value()));
                });
            }
            Subscription::SendClick => {
                self.listen(subscription, vec![self.send_button.clone().into()], "click", |_| {
                    dispatch_event(WidgetEvent::SendClicked);
                });
            }
            Subscription::InputKeyDown => {
                self.listen(subscription, vec![self.input.clone().into()], "keydown", |event| {
                    let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };
                    let prevent = dispatch_event(WidgetEvent::KeyDown {
                        key: key_event.key(),
                        shift: key_event.shift_key(),
                    });
                    if prevent {
                        event.prevent_default();
                    }
                });
            }
            Subscription::InputChange => {
                self.listen(subscription, vec![self.input.clone().into()], "input", |_| {
                    dispatch_event(WidgetEvent::InputChanged);
                });
            }
            Subscription::StartChatClick => {
                self.listen(subscription, vec![self.start_button.clone().into()], "click", |_| {
                    dispatch_event(WidgetEvent::StartChatClicked);
                });
            }
            Subscription::ChipClick => {
                let chips = select_all(&self.document, &format!(".{SUGGESTION_CHIP_CLASS}"))
                    .into_iter()
                    .map(EventTarget::from)
                    .collect();
                self.listen(subscription, chips, "click", |event| {
                    let query = event
                        .current_target()
                        .and_then(|target| target.dyn_into::<Element>().ok())
                        .and_then(|chip| chip.get_attribute(QUERY_ATTR));
                    if let Some(query) = query {
                        dispatch_event(WidgetEvent::ChipClicked { query });
                    }
                });
            }
            Subscription::ChatVisibility => {
                if let Err(err) = self.observe_chat_section() {
                    warn!(name: "widget.observe.failed", error = %err, "IntersectionObserver unavailable");
                }
            }
            Subscription::InputFocus => {
                let window = self.window.clone();
                self.listen(subscription, vec![self.input.clone().into()], "focus", move |_| {
                    let viewport_height = window
                        .inner_height()
                        .ok()
                        .and_then(|height| height.as_f64())
                        .unwrap_or_default();
                    dispatch_event(WidgetEvent::InputFocused { viewport_height });
                });
            }
            Subscription::InputBlur => {
                self.listen(subscription, vec![self.input.clone().into()], "blur", |_| {
                    dispatch_event(WidgetEvent::InputBlurred);
                });
            }
            Subscription::ViewportResize => {
                let Some(viewport) = self.window.visual_viewport() else {
                    return;
                };
                let document = self.document.clone();
                let target: EventTarget = viewport.clone().into();
                self.listen(subscription, vec![target], "resize", move |_| {
                    dispatch_event(WidgetEvent::ViewportResized {
                        visual_height: viewport.height(),
                        input_focused: Self::input_has_focus(&document),
                    });
                });
            }
        }
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        match self.bindings.remove(&subscription) {
            Some(Binding::Listener {
                targets,
                kind,
                callback,
            }) => {
                for target in targets {
                    let _ = target
                        .remove_event_listener_with_callback(kind, callback.as_ref().unchecked_ref());
                }
            }
            Some(Binding::Observer { observer, .. }) => observer.disconnect(),
            None => {}
        }
    }

    fn set_document_language(&mut self, code: &str, direction: TextDirection) {
        let _ = self.root.set_attribute("lang", code);
        let _ = self.root.set_attribute("dir", direction.as_str());
    }

    fn set_selected_language(&mut self, code: &str) {
        self.selector.set_value(code);
    }

    fn tagged_keys(&self, slot: TextSlot) -> Vec<String> {
        let attr = slot_attr(slot);
        let mut keys: Vec<String> = Vec::new();
        for el in select_all(&self.document, &format!("[{attr}]")) {
            if let Some(key) = el.get_attribute(attr) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    fn set_tagged(&mut self, slot: TextSlot, key: &str, value: &str) {
        let attr = slot_attr(slot);
        for el in select_all(&self.document, &format!("[{attr}]")) {
            if el.get_attribute(attr).as_deref() != Some(key) {
                continue;
            }
            match slot {
                TextSlot::Text => el.set_text_content(Some(value)),
                TextSlot::Placeholder => {
                    let _ = el.set_attribute("placeholder", value);
                }
            }
        }
    }

    fn clear_messages(&mut self) {
        self.messages.set_inner_html("");
    }

    fn append_bubble(&mut self, bubble: &Bubble) {
        match self.build_bubble(bubble) {
            Ok(el) => {
                if let Err(err) = self.messages.append_child(&el) {
                    warn!(name: "widget.bubble.failed", error = ?err, "Could not append bubble");
                }
            }
            Err(err) => warn!(name: "widget.bubble.failed", error = %err, "Could not build bubble"),
        }
    }

    fn begin_reveal(&mut self, id: &BubbleId) -> bool {
        let Some((bubble, content)) = self.bubble_content(id) else {
            return false;
        };
        let _ = bubble.class_list().remove_1(THINKING_CLASS);
        let _ = content.style().set_property("opacity", "0");
        true
    }

    fn finish_reveal(&mut self, id: &BubbleId, html: &str) -> bool {
        let Some((_, content)) = self.bubble_content(id) else {
            return false;
        };
        content.set_inner_html(html);
        let _ = content.style().set_property("opacity", "1");
        true
    }

    fn scroll_to_latest(&mut self) {
        let options = ScrollToOptions::new();
        options.set_top(f64::from(self.messages.scroll_height()));
        options.set_behavior(ScrollBehavior::Smooth);
        self.messages.scroll_to_with_scroll_to_options(&options);
    }

    fn set_loading(&mut self, loading: bool) {
        let _ = self
            .container
            .class_list()
            .toggle_with_force(LOADING_CLASS, loading);
        self.input.set_disabled(loading);
        self.send_button.set_disabled(loading);
    }

    fn input_value(&self) -> String {
        self.input.value()
    }

    fn set_input_value(&mut self, value: &str) {
        self.input.set_value(value);
    }

    fn focus_input(&mut self) {
        let _ = self.input.focus();
    }

    fn fit_input_height(&mut self) {
        let style = self.input.style();
        let _ = style.set_property("height", "auto");
        let _ = style.set_property("height", &format!("{}px", self.input.scroll_height()));
    }

    fn reveal_chat_section(&mut self) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        self.chat_section
            .scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn set_chat_active(&mut self, active: bool) {
        if let Some(body) = self.document.body() {
            let _ = body.class_list().toggle_with_force(CHAT_ACTIVE_CLASS, active);
        }
    }

    fn set_keyboard_offset(&mut self, px: f64) {
        let _ = self
            .root
            .style()
            .set_property(KEYBOARD_OFFSET_VAR, &format!("{px}px"));
    }

    fn schedule(&mut self, delay: Duration, task: Deferred) {
        spawn_local(async move {
            sleep(delay).await;
            dispatch_deferred(task);
        });
    }
}
