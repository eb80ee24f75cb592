//! Specificity, sheet origin, and the cascade ranking key.
//!
//! A declaration's rank is the tuple
//!
//! ```text
//! (important, origin, specificity, order)     CascadeOrder::OriginFirst
//! (important, specificity, origin, order)     CascadeOrder::SpecificityFirst
//! ```
//!
//! compared lexicographically; the highest rank wins. `Inline` declarations
//! always beat sheet declarations of the same importance, whichever order is
//! configured.

use std::cmp::Ordering;

use crate::css::model::{Selector, SelectorComponent};

/// Structural selector specificity `(ids, classes, types)`.
///
/// Pseudo-classes count as classes. `*` and `&` count for nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity {
    pub ids: u16,
    pub classes: u16,
    pub types: u16,
}

impl Specificity {
    pub const ZERO: Specificity = Specificity { ids: 0, classes: 0, types: 0 };

    pub const fn new(ids: u16, classes: u16, types: u16) -> Self {
        Self { ids, classes, types }
    }

    /// Count the simple selectors of every compound in `selector`.
    pub fn from_selector(selector: &Selector) -> Self {
        let mut spec = Specificity::ZERO;
        for component in selector.compounds.iter().flat_map(|c| &c.components) {
            match component {
                SelectorComponent::Id(_) => spec.ids += 1,
                SelectorComponent::Class(_) | SelectorComponent::PseudoClass(_) => spec.classes += 1,
                SelectorComponent::Type(_) => spec.types += 1,
                SelectorComponent::Universal | SelectorComponent::Nesting => {}
            }
        }
        spec
    }
}

/// Where a declaration came from, lowest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    /// Framework-wide defaults.
    Builtin,
    /// A widget type's `default_css`.
    ComponentDefault,
    Theme,
    /// The application's own style sheets.
    User,
    /// Per-node inline declarations.
    Inline,
}

/// Which of origin and specificity is compared first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CascadeOrder {
    #[default]
    OriginFirst,
    SpecificityFirst,
}

/// Everything needed to rank one declaration against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeKey {
    pub important: bool,
    pub origin: Origin,
    pub specificity: Specificity,
    /// Global declaration order; later loads and later lines are larger.
    pub order: u32,
}

impl CascadeKey {
    /// Rank `self` against `other` under `order`.
    pub fn compare(&self, other: &CascadeKey, order: CascadeOrder) -> Ordering {
        let inline = |k: &CascadeKey| k.origin == Origin::Inline;
        self.important
            .cmp(&other.important)
            .then_with(|| {
                if inline(self) || inline(other) {
                    return self.origin.cmp(&other.origin);
                }
                match order {
                    CascadeOrder::OriginFirst => self
                        .origin
                        .cmp(&other.origin)
                        .then(self.specificity.cmp(&other.specificity)),
                    CascadeOrder::SpecificityFirst => self
                        .specificity
                        .cmp(&other.specificity)
                        .then(self.origin.cmp(&other.origin)),
                }
            })
            .then(self.order.cmp(&other.order))
    }
}
