#![forbid(unsafe_code)]

//! # emojidex
//!
//! A terminal emoji browser: search and filter a bundled catalog, keep
//! favorites and recents, organize emoji into named collections and ask an
//! AI model for suggestions that fit a piece of text.
//!
//! ## Overview
//!
//! - **Catalog and filtering**: an immutable dataset queried by text and
//!   category ([`catalog`], [`filter`])
//! - **Persisted user state**: favorites, recents and collections stored as
//!   JSON values behind the [`KvStore`] seam ([`store`], [`collections`])
//! - **View routing**: one active [`View`] changed only through [`Action`]s
//! - **AI suggestions**: prompt building and strict reply validation around
//!   an injected [`CompletionClient`] ([`ai`])
//! - **Terminal front end**: snapshot-based rendering on `ratatui`, with
//!   input and background results flowing through one event channel
//!
//! ## Core Components
//!
//! - [`App`]: event loop coordinating state, events and rendering
//! - [`Tui`]: terminal setup, cleanup and frame rendering
//! - [`EventHandler`]: terminal polling and custom event delivery
//! - [`AtomicState`] / [`StateSnapshot`]: the state contract the loop drives
//! - [`Session`]: everything the interactive UI mutates
//! - [`UserStore`]: cached, write-through access to persisted slices
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use emojidex::{
//!     ui, App, Catalog, FileStore, KvStore, Session, SessionState, UserStore, View,
//! };
//! use std::time::Duration;
//!
//! fn main() -> emojidex::EmojidexResult<()> {
//!     let kv: Box<dyn KvStore> = Box::new(FileStore::new("/tmp/emojidex"));
//!     let session = Session::new(Catalog::builtin(), UserStore::open(kv), View::Landing);
//!
//!     smol::block_on(async {
//!         let mut app = App::new(SessionState::new(session), Duration::from_millis(50))?;
//!         app.run(ui::render).await
//!     })
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`EmojidexResult`], a `miette::Result` over
//! [`EmojidexError`] diagnostics. Inside the interactive loop failures become
//! notices in the footer instead of aborting.

pub use ai::{AiReply, CompletionClient, HttpCompletionClient, Mode, SuggestionAdapter};
pub use app::App;
pub use catalog::{Catalog, Category, Emoji};
pub use colors::{Color, ThemeColorize};
pub use config::Config;
pub use error::{EmojidexError, EmojidexResult};
pub use event::{Event, EventHandler};
pub use router::{Action, Router, View};
pub use session::{Session, SessionSnapshot};
pub use state::{AtomicState, SessionState, StateSnapshot};
pub use store::{FileStore, KvStore, MemoryStore, UserStore};
pub use tui::Tui;

/// AI suggestion adapter and worker
pub mod ai;
/// Application orchestration
pub mod app;
/// Static emoji dataset
pub mod catalog;
/// User-defined collections
pub mod collections;
/// Color system and theme
pub mod colors;
/// Runtime configuration
pub mod config;
/// Error types
pub mod error;
/// Event processing
pub mod event;
/// Search and category filtering
pub mod filter;
/// View routing
pub mod router;
/// Interactive session
pub mod session;
/// State traits and the shared session state
pub mod state;
/// Persisted user state
pub mod store;
/// Terminal management
pub mod tui;
/// Rendering
pub mod ui;
