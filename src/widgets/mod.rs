//! Built-in widgets: Static, Container.

pub mod container;
pub mod static_widget;

pub use container::Container;
pub use static_widget::Static;
