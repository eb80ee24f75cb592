//! # tapestry-tui
//!
//! The styling, layout and compositing core of a terminal UI framework.
//!
//! Applications hand the core a tree of widgets and a set of CSS-like style
//! sheets; each tick the core resolves styles for the nodes that changed,
//! lays out the boxes whose inputs changed, paints the dirty nodes into a
//! cell buffer and emits only the cells that differ from the last frame.
//!
//! ## Core Systems
//!
//! - **[`css`]** — Tokenizer, parser, style values, specificity, cascade
//! - **[`dom`]** — Slotmap-backed node arena, dirty flags and queries
//! - **[`reactive`]** — Per-node attributes with validation, watchers, computed values and bindings
//! - **[`layout`]** — Vertical, horizontal, grid and dock layout with incremental caching
//! - **[`render`]** — Cells, strips, frame buffers, the compositor and terminal sinks
//! - **[`widget`]** / **[`widgets`]** — Node behaviour trait and the built-in Static and Container
//! - **[`screen`]** / **[`app`]** — The application context and the tick loop
//! - **[`worker`]** — Generation tokens and the background handoff channel
//! - **[`diagnostics`]** — Recoverable problems collected instead of aborting a frame
//! - **[`testing`]** — Headless pilot and snapshot helpers
//! - **[`geometry`]** — Size, Region, Spacing primitives

// Foundation
pub mod diagnostics;
pub mod geometry;

// Core systems
pub mod css;
pub mod dom;
pub mod layout;
pub mod reactive;

// Widget system
pub mod widget;
pub mod widgets;

// Rendering
pub mod render;

// Application
pub mod app;
pub mod screen;
pub mod worker;

// Test support
pub mod testing;

pub use app::{App, AppConfig};
pub use screen::Screen;
