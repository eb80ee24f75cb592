//! Reactive attributes: per-node typed values with validation, watchers,
//! computed derivations and bindings.

pub mod store;
pub mod value;

pub use store::{
    AttrFlags, AttrOptions, AttrReader, AttrRef, ReactiveError, ReactiveStore, SetOutcome, WatchContext,
};
pub use value::AttrValue;
