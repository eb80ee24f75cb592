//! Tree operations: create, mount, unmount, remove, walk, invalidate.

use std::collections::HashMap;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{DirtyFlags, NodeData, NodeId, PseudoState};
use crate::css::model::Declaration;
use crate::css::styles::Styles;

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];
const EMPTY_IDS: &[NodeId] = &[];

/// Errors from structural tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0:?} is already attached to a parent")]
    AlreadyAttached(NodeId),
    #[error("mounting {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("the tree already has a root")]
    RootExists,
}

/// The node graph, backed by a slotmap arena.
///
/// Children are owned, ordered lists; the parent link is a plain key. The id
/// index only covers mounted nodes and is kept current on mount, unmount and
/// id changes.
pub struct Dom {
    nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
    ids: HashMap<String, Vec<NodeId>>,
}

impl Dom {
    /// Create an empty DOM.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
            ids: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Create a detached node. It takes part in nothing until mounted.
    pub fn create(&mut self, mut data: NodeData) -> NodeId {
        data.mounted = false;
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Create the root node and mount it.
    pub fn create_root(&mut self, data: NodeData) -> Result<NodeId, DomError> {
        if self.root.is_some() {
            return Err(DomError::RootExists);
        }
        let id = self.create(data);
        self.root = Some(id);
        self.mark_subtree_mounted(id);
        Ok(id)
    }

    /// Append `child` (and its subtree) to `parent`.
    pub fn mount(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let index = self.children(parent).len();
        self.mount_at(parent, index, child)
    }

    /// Insert `child` at `index` among `parent`'s children (clamped to the end).
    ///
    /// If `parent` is mounted, the child subtree becomes mounted: ids are
    /// indexed and every node is flagged for cascade, layout and paint.
    pub fn mount_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<(), DomError> {
        self.require(parent)?;
        self.require(child)?;
        if self.parent.contains_key(child) || self.root == Some(child) {
            return Err(DomError::AlreadyAttached(child));
        }
        if parent == child || self.is_descendant_of(parent, child) {
            return Err(DomError::Cycle { parent, child });
        }

        self.parent.insert(child, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            let at = index.min(siblings.len());
            siblings.insert(at, child);
        }

        if self.nodes[parent].mounted {
            self.mark_subtree_mounted(child);
            self.invalidate_siblings(child);
            self.mark_layout(parent);
        }
        Ok(())
    }

    /// Detach `node` from its parent.
    ///
    /// Returns the nodes that stopped being mounted, children before parents.
    /// The node data stays in the arena so it can be mounted again.
    pub fn unmount(&mut self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        self.require(node)?;
        let was_mounted = self.nodes[node].mounted;
        let old_parent = self.parent.remove(node);
        if let Some(parent) = old_parent {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.retain(|&c| c != node);
            }
        }
        if self.root == Some(node) {
            self.root = None;
        }

        let mut unmounted = Vec::new();
        if was_mounted {
            for id in self.walk_post_order(node) {
                self.unindex_id(id);
                if let Some(data) = self.nodes.get_mut(id) {
                    data.mounted = false;
                    data.resolved = None;
                    data.dirty = DirtyFlags::all();
                }
                unmounted.push(id);
            }
            if let Some(parent) = old_parent {
                self.mark_layout(parent);
                for sibling in self.children(parent).to_vec() {
                    self.invalidate_style(sibling);
                }
            }
            tracing::debug!(count = unmounted.len(), "unmounted subtree");
        }
        Ok(unmounted)
    }

    /// Unmount `node` and drop it and its descendants from the arena.
    ///
    /// Returns every removed id, children before parents.
    pub fn remove(&mut self, node: NodeId) -> Vec<NodeId> {
        if !self.contains(node) {
            return Vec::new();
        }
        if let Err(err) = self.unmount(node) {
            tracing::warn!(%err, "remove could not unmount node");
        }
        let order = self.walk_post_order(node);
        for &id in &order {
            self.children.remove(id);
            self.parent.remove(id);
            self.nodes.remove(id);
        }
        order
    }

    fn mark_subtree_mounted(&mut self, node: NodeId) {
        for id in self.walk_depth_first(node) {
            if let Some(data) = self.nodes.get_mut(id) {
                data.mounted = true;
                data.dirty = DirtyFlags::all();
            }
            self.index_id(id);
        }
        self.mark_layout(node);
    }

    fn require(&self, id: NodeId) -> Result<(), DomError> {
        if self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(DomError::UnknownNode(id))
        }
    }

    // -----------------------------------------------------------------------
    // Id index
    // -----------------------------------------------------------------------

    fn index_id(&mut self, node: NodeId) {
        if let Some(id) = self.nodes.get(node).and_then(|d| d.id.clone()) {
            let entry = self.ids.entry(id).or_default();
            if !entry.contains(&node) {
                entry.push(node);
            }
        }
    }

    fn unindex_id(&mut self, node: NodeId) {
        if let Some(id) = self.nodes.get(node).and_then(|d| d.id.clone()) {
            if let Some(entry) = self.ids.get_mut(&id) {
                entry.retain(|&n| n != node);
                if entry.is_empty() {
                    self.ids.remove(&id);
                }
            }
        }
    }

    /// Mounted nodes carrying `id`, in mount order.
    pub fn by_id(&self, id: &str) -> &[NodeId] {
        self.ids.get(id).map(Vec::as_slice).unwrap_or(EMPTY_IDS)
    }

    // -----------------------------------------------------------------------
    // Cascade-affecting mutations
    // -----------------------------------------------------------------------

    /// Change a node's id. Returns whether anything changed.
    pub fn set_id(&mut self, node: NodeId, id: Option<String>) -> Result<bool, DomError> {
        self.require(node)?;
        if self.nodes[node].id == id {
            return Ok(false);
        }
        let mounted = self.nodes[node].mounted;
        if mounted {
            self.unindex_id(node);
        }
        self.nodes[node].id = id;
        if mounted {
            self.index_id(node);
        }
        self.invalidate_style(node);
        Ok(true)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<bool, DomError> {
        self.require(node)?;
        let changed = self.nodes[node].add_class(class);
        if changed {
            self.invalidate_style(node);
        }
        Ok(changed)
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<bool, DomError> {
        self.require(node)?;
        let changed = self.nodes[node].remove_class(class);
        if changed {
            self.invalidate_style(node);
        }
        Ok(changed)
    }

    /// Add the class if absent, remove it if present.
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> Result<bool, DomError> {
        self.require(node)?;
        if self.nodes[node].has_class(class) {
            self.remove_class(node, class)
        } else {
            self.add_class(node, class)
        }
    }

    /// Turn pseudo-state bits on or off. Returns whether anything changed.
    ///
    /// Focus changes re-style the whole mounted tree because `:focus-within`
    /// can flip on any ancestor.
    pub fn set_pseudo(&mut self, node: NodeId, state: PseudoState, on: bool) -> Result<bool, DomError> {
        self.require(node)?;
        let before = self.nodes[node].pseudo;
        self.nodes[node].pseudo.set(state, on);
        let after = self.nodes[node].pseudo;
        if before == after {
            return Ok(false);
        }
        if (before ^ after).contains(PseudoState::FOCUS) {
            if let Some(root) = self.root {
                self.invalidate_style(root);
            }
        }
        self.invalidate_style(node);
        Ok(true)
    }

    /// Replace the node's inline declarations.
    pub fn set_inline(&mut self, node: NodeId, declarations: Vec<Declaration>) -> Result<(), DomError> {
        self.require(node)?;
        self.nodes[node].inline = declarations;
        self.mark_dirty(node, DirtyFlags::STYLE);
        Ok(())
    }

    /// Store a cascade result and clear `STYLE`. Returns whether it differed
    /// from the previous cache.
    pub(crate) fn set_resolved(&mut self, node: NodeId, styles: Styles) -> bool {
        let Some(data) = self.nodes.get_mut(node) else {
            return false;
        };
        data.dirty.remove(DirtyFlags::STYLE);
        if data.resolved.as_ref() == Some(&styles) {
            return false;
        }
        data.resolved = Some(styles);
        true
    }

    /// The cached resolved style of a node.
    pub fn styles(&self, node: NodeId) -> Option<&Styles> {
        self.nodes.get(node).and_then(|d| d.resolved.as_ref())
    }

    // -----------------------------------------------------------------------
    // Dirty flags
    // -----------------------------------------------------------------------

    pub fn mark_dirty(&mut self, node: NodeId, flags: DirtyFlags) {
        if flags.contains(DirtyFlags::LAYOUT) {
            self.mark_layout(node);
        }
        if let Some(data) = self.nodes.get_mut(node) {
            data.dirty |= flags;
        }
    }

    /// Flag `node` for layout and paint, and its ancestors for child layout.
    pub fn mark_layout(&mut self, node: NodeId) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.dirty |= DirtyFlags::LAYOUT | DirtyFlags::PAINT;
        }
        let mut current = node;
        while let Some(p) = self.parent.get(current).copied() {
            if let Some(data) = self.nodes.get_mut(p) {
                data.dirty |= DirtyFlags::CHILD_LAYOUT;
            }
            current = p;
        }
    }

    /// Flag `node` and its descendants for re-resolution.
    pub fn invalidate_style(&mut self, node: NodeId) {
        for id in self.walk_depth_first(node) {
            if let Some(data) = self.nodes.get_mut(id) {
                data.dirty |= DirtyFlags::STYLE;
            }
        }
    }

    fn invalidate_siblings(&mut self, node: NodeId) {
        if let Some(parent) = self.parent(node) {
            for sibling in self.children(parent).to_vec() {
                if sibling != node {
                    self.invalidate_style(sibling);
                }
            }
        }
    }

    /// Flag every node for re-resolution (sheet added or replaced).
    pub fn invalidate_all_styles(&mut self) {
        for (_, data) in self.nodes.iter_mut() {
            data.dirty |= DirtyFlags::STYLE;
        }
    }

    pub fn is_dirty(&self, node: NodeId, flags: DirtyFlags) -> bool {
        self.nodes.get(node).is_some_and(|d| d.dirty.intersects(flags))
    }

    pub fn clear_dirty(&mut self, node: NodeId, flags: DirtyFlags) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.dirty.remove(flags);
        }
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Children in insertion order; empty for unknown nodes.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Parent first, root last.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether `node` sits somewhere below `ancestor`.
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = node;
        while let Some(p) = self.parent.get(current).copied() {
            if p == ancestor {
                return true;
            }
            current = p;
        }
        false
    }

    /// Position among the parent's children.
    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access bypasses invalidation; prefer the typed mutators.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order (document order) traversal starting at and including `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Descendants of `node` in document order, excluding `node`.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut all = self.walk_depth_first(node);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    /// Post-order traversal: children before their parent.
    pub fn walk_post_order(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = self.walk_depth_first(start);
        // Reversed pre-order visits every child before its parent.
        result.reverse();
        result
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}
