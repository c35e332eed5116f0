//! Mind-Soothe chat widget
//!
//! A multilingual reflective chat widget. The controller runs in the browser as
//! WebAssembly; a small axum server renders the page and relays questions to the
//! answering service.
//!
//! # Architecture
//!
//! - **Widget**: Target-independent controller driving the page through the
//!   [`widget::WidgetHost`] seam
//! - **Web** (wasm32): `web-sys` host, event wiring and boot
//! - **Server** (native): Axum router for the page, static assets and `/ask` relay
//!
//! # Modules
//!
//! - [`widget`]: Controller, localization, Markdown rendering, message exchange
//! - [`ui`]: Server-side page rendering
//! - [`server`]: HTTP routes
//! - [`config`]: Layered configuration

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod widget;

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;
#[cfg(not(target_arch = "wasm32"))]
pub mod ui;

#[cfg(target_arch = "wasm32")]
mod web;
