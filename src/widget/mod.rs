//! Widget system: the per-node behaviour trait and its builder.

pub mod traits;

pub use traits::{Widget, WidgetBuilder, WidgetContext, WidgetExt};
