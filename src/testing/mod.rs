//! Headless testing helpers: Pilot, snapshot rendering.
//!
//! Use the [`Pilot`] to drive an [`App`](crate::app::App) without a terminal
//! and [`screen_to_string`] and friends to capture output as plain text.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{frame_to_string, render_to_string, screen_to_string, strips_to_string};
