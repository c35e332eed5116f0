//! Chat widget controller.
//!
//! Target-independent logic for the conversational page: localization, the
//! `/ask` exchange, Markdown-lite rendering and keyboard compensation. The page
//! itself is reached only through [`WidgetHost`], so everything here runs (and
//! is tested) natively as well as in the browser.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::cell::RefCell;
//! use mind_soothe::widget::{ChatController, HttpAskClient, exchange};
//!
//! let controller = RefCell::new(ChatController::new(host));
//! controller.borrow_mut().start();
//!
//! let client = HttpAskClient::new("http://localhost:3000")?;
//! let pending = controller.borrow_mut().send_message("I feel tense today");
//! if let Some(pending) = pending {
//!     exchange(&controller, &client, pending).await;
//! }
//! ```

pub mod controller;
pub mod events;
pub mod exchange;
pub mod host;
pub mod i18n;
pub mod markdown;
pub mod markup;
pub mod viewport;

pub use controller::{APOLOGY, ChatController, PendingAsk};
pub use events::{Dispatch, Subscription, WidgetEvent};
pub use exchange::{AskClient, AskError, AskRequest, AskResponse, HttpAskClient, exchange};
pub use host::{Bubble, BubbleContent, BubbleId, Deferred, Environment, Sender, TextSlot, WidgetHost};
pub use i18n::{Language, LanguagePack, TextDirection, detect_language};
