//! Layout: box model, docking, linear and grid arrangement, incremental
//! passes over the DOM.

pub mod arrange;
pub mod engine;
pub mod grid;
pub mod resolve;

pub use arrange::{Measure, NoContent, Placement};
pub use engine::{LayoutBox, LayoutEngine};
