//! DOM arena: slotmap-backed node tree with selector queries.

pub mod node;
pub mod query;
pub mod tree;

pub use node::{DirtyFlags, NodeData, NodeId, PseudoState};
pub use query::{DomQuery, QueryError};
pub use tree::{Dom, DomError};
