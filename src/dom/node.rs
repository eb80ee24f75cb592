//! Node types: NodeId, NodeData, pseudo-state and dirty flags.

use bitflags::bitflags;
use slotmap::new_key_type;

use crate::css::model::Declaration;
use crate::css::styles::Styles;

new_key_type! {
    /// Stable identity of a DOM node. Copy, lightweight (u64).
    pub struct NodeId;
}

bitflags! {
    /// Interaction state consulted by pseudo-class selectors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PseudoState: u8 {
        const FOCUS    = 1 << 0;
        const HOVER    = 1 << 1;
        const ACTIVE   = 1 << 2;
        const DISABLED = 1 << 3;
    }
}

bitflags! {
    /// Work that must happen before the next frame is valid.
    ///
    /// `CHILD_LAYOUT` is set on every ancestor of a node flagged `LAYOUT` so
    /// the layout walk can find it without visiting clean subtrees.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u8 {
        const STYLE        = 1 << 0;
        const LAYOUT       = 1 << 1;
        const CHILD_LAYOUT = 1 << 2;
        const PAINT        = 1 << 3;
    }
}

/// Data associated with a single DOM node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Type tag used for type selectors and default-style lookup.
    pub widget_type: String,
    /// Optional id (`#id` selector). Uniqueness is not enforced.
    pub id: Option<String>,
    /// CSS classes, deduplicated; order carries no meaning.
    pub classes: Vec<String>,
    /// Pseudo-class state.
    pub pseudo: PseudoState,
    /// Whether this node can take focus.
    pub focusable: bool,
    /// True while the node is attached below the tree root.
    pub(crate) mounted: bool,
    /// Inline declarations (highest non-important origin).
    pub(crate) inline: Vec<Declaration>,
    /// Cascade result, valid while `STYLE` is clear.
    pub(crate) resolved: Option<Styles>,
    pub(crate) dirty: DirtyFlags,
}

impl NodeData {
    /// Create detached node data with the given type tag.
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            id: None,
            classes: Vec::new(),
            pseudo: PseudoState::empty(),
            focusable: false,
            mounted: false,
            inline: Vec::new(),
            resolved: None,
            dirty: DirtyFlags::all(),
        }
    }

    /// Set the id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        self.add_class(&class);
        self
    }

    /// Add several classes (builder).
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for class in classes {
            let class = class.into();
            self.add_class(&class);
        }
        self
    }

    /// Mark the node focusable (builder).
    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    /// Start in the disabled state (builder).
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.pseudo.set(PseudoState::DISABLED, disabled);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a class. Returns `false` if it was already present.
    pub(crate) fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        self.classes.push(class.to_owned());
        true
    }

    /// Remove a class. Returns `false` if it was absent.
    pub(crate) fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        self.classes.len() != before
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_disabled(&self) -> bool {
        self.pseudo.contains(PseudoState::DISABLED)
    }

    /// The cached cascade result, if one has been computed.
    pub fn resolved_styles(&self) -> Option<&Styles> {
        self.resolved.as_ref()
    }

    pub fn inline_declarations(&self) -> &[Declaration] {
        &self.inline
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }
}
