//! Type-erased attribute values with equality.

use std::any::{Any, TypeId};
use std::fmt;

/// A value that can live in a reactive slot.
///
/// Implemented for every `Clone + PartialEq + Debug + 'static` type, so slots
/// can hold any plain data while the store compares, clones and downcasts
/// without knowing the concrete type.
pub trait AttrValue: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    /// Equality across the erased boundary; `false` for different types.
    fn eq_dyn(&self, other: &dyn AttrValue) -> bool;
    fn clone_boxed(&self) -> Box<dyn AttrValue>;
    fn value_type_id(&self) -> TypeId;
    fn value_type_name(&self) -> &'static str;
}

impl<T> AttrValue for T
where
    T: Any + fmt::Debug + Clone + PartialEq,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn eq_dyn(&self, other: &dyn AttrValue) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|other| other == self)
    }

    fn clone_boxed(&self) -> Box<dyn AttrValue> {
        Box::new(self.clone())
    }

    fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Downcast a slot value.
pub fn downcast<T: 'static>(value: &dyn AttrValue) -> Option<&T> {
    value.as_any().downcast_ref::<T>()
}
