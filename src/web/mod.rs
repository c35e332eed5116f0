//! Browser entry point.
//!
//! Boots the controller against the live DOM and funnels every DOM event,
//! timer and network completion through one queue. Handlers can fire
//! synchronously while the controller is mid-update (focusing the input raises
//! `focus`, for instance); those are queued and handled right after, in order,
//! so the controller is never re-entered.

mod console;
mod dom;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::widget::{AskClient, AskError, ChatController, Deferred, HttpAskClient, PendingAsk, WidgetEvent};

use dom::{DomError, DomHost};

/// Work for the controller.
#[derive(Debug)]
enum Inbound {
    Start,
    Event(WidgetEvent),
    Deferred(Deferred),
    Settled(PendingAsk, Result<String, AskError>),
}

#[derive(Debug)]
struct Widget {
    controller: RefCell<ChatController<DomHost>>,
    client: HttpAskClient,
}

thread_local! {
    static WIDGET: RefCell<Option<Rc<Widget>>> = const { RefCell::new(None) };
    static QUEUE: RefCell<VecDeque<Inbound>> = const { RefCell::new(VecDeque::new()) };
    static DRAINING: std::cell::Cell<bool> = const { std::cell::Cell::new(false) };
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console::init_tracing();
    if let Err(err) = boot() {
        error!(name: "widget.boot.failed", error = %err, "Chat widget failed to start");
    }
}

/// Remove every listener and release the controller.
#[wasm_bindgen]
pub fn dispose() {
    if let Some(widget) = WIDGET.with(|slot| slot.borrow_mut().take()) {
        widget.controller.borrow_mut().dispose();
    }
    QUEUE.with(|queue| queue.borrow_mut().clear());
}

fn boot() -> Result<(), DomError> {
    let host = DomHost::attach()?;
    let client = HttpAskClient::new(host.origin()?)?;
    let widget = Rc::new(Widget {
        controller: RefCell::new(ChatController::new(host)),
        client,
    });
    WIDGET.with(|slot| *slot.borrow_mut() = Some(widget));
    dispatch(Inbound::Start);
    Ok(())
}

/// Handle a page event. Returns whether the browser default should be
/// suppressed; queued events always report `false`.
pub(crate) fn dispatch_event(event: WidgetEvent) -> bool {
    dispatch(Inbound::Event(event))
}

pub(crate) fn dispatch_deferred(task: Deferred) {
    dispatch(Inbound::Deferred(task));
}

fn dispatch(inbound: Inbound) -> bool {
    QUEUE.with(|queue| queue.borrow_mut().push_back(inbound));
    if DRAINING.replace(true) {
        return false;
    }

    let Some(widget) = WIDGET.with(|slot| slot.borrow().clone()) else {
        QUEUE.with(|queue| queue.borrow_mut().clear());
        DRAINING.set(false);
        return false;
    };

    let mut prevent_default = None;
    while let Some(next) = QUEUE.with(|queue| queue.borrow_mut().pop_front()) {
        let mut controller = widget.controller.borrow_mut();
        match next {
            Inbound::Start => controller.start(),
            Inbound::Event(event) => {
                let dispatch = controller.handle(event);
                prevent_default.get_or_insert(dispatch.prevent_default);
                if let Some(pending) = dispatch.ask {
                    spawn_ask(Rc::clone(&widget), pending);
                }
            }
            Inbound::Deferred(task) => controller.run_deferred(task),
            Inbound::Settled(pending, outcome) => controller.finish_send(pending, outcome),
        }
    }

    DRAINING.set(false);
    prevent_default.unwrap_or(false)
}

fn spawn_ask(widget: Rc<Widget>, pending: PendingAsk) {
    spawn_local(async move {
        let outcome = widget.client.ask(pending.message()).await;
        dispatch(Inbound::Settled(pending, outcome));
    });
}
