//! FAQ Chat Widget
//!
//! An expandable chat panel that forwards each question to a remote FAQ
//! answer service and renders the reply.
//!
//! # Architecture
//!
//! - **Widget**: open/closed state, an append-only message list and the
//!   typing-placeholder lifecycle, driven against a [`widget::WidgetView`]
//! - **Client**: [`client::AnswerService`] trait with a reqwest-backed
//!   `POST /api/faq` implementation
//! - **Runtime**: single-owner event loop binding UI events to widget
//!   operations while answers are fetched in spawned tasks
//! - **Terminal**: line-oriented view used by the `faq-chat` binary
//!
//! # Modules
//!
//! - [`widget`]: state machine, element roles, views
//! - [`client`]: answer service abstraction and HTTP client
//! - [`runtime`]: event loop and handle
//! - [`terminal`]: terminal view
//! - [`config`]: CLI and layered configuration
//! - [`message`]: chat messages
//! - [`error`]: error type

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod runtime;
pub mod terminal;
pub mod widget;

pub use error::{Error, Result};
