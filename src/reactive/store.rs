//! Per-node reactive attributes: validation, change detection, watchers,
//! computed values and bindings.
//!
//! A write goes through the same steps whatever its source (caller, watcher,
//! binding or recomputation):
//!
//! 1. the validator may transform or reject the candidate;
//! 2. an equal value stops here unless the write is forced;
//! 3. the value is stored and watchers run in registration order;
//! 4. layout/paint flags mark the node dirty;
//! 5. bound targets and dependent computed attributes are queued.
//!
//! Follow-up work sits in a FIFO queue drained to a fixpoint, so a watcher
//! that writes other attributes never recurses on the call stack. Dependency
//! cycles between computed attributes and bindings are refused when they are
//! registered.

use std::any::TypeId;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use bitflags::bitflags;

use super::value::{downcast, AttrValue};
use crate::diagnostics::Diagnostic;
use crate::dom::node::{DirtyFlags, NodeId};
use crate::dom::tree::Dom;

/// Upper bound on queued work items processed by one write.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

bitflags! {
    /// What a change to an attribute invalidates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttrFlags: u8 {
        /// Relayout the node (implies repaint).
        const LAYOUT        = 1 << 0;
        /// Repaint the node.
        const PAINT         = 1 << 1;
        /// Notify watchers even when the new value equals the old one.
        const ALWAYS_UPDATE = 1 << 2;
    }
}

/// Address of an attribute: node plus attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrRef {
    pub node: NodeId,
    pub name: String,
}

impl AttrRef {
    pub fn new(node: NodeId, name: impl Into<String>) -> Self {
        Self { node, name: name.into() }
    }
}

impl fmt::Display for AttrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}.{}", self.node, self.name)
    }
}

/// Errors from attribute registration and typed access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReactiveError {
    #[error("unknown attribute {0}")]
    UnknownAttribute(AttrRef),
    #[error("attribute {0} already defined")]
    AlreadyDefined(AttrRef),
    #[error("attribute {attr} holds {expected}, not {found}")]
    TypeMismatch {
        attr: AttrRef,
        expected: &'static str,
        found: &'static str,
    },
    #[error("dependency cycle: {}", .path.join(" -> "))]
    DependencyCycle { path: Vec<String> },
    #[error("attribute {0} is computed and cannot be set directly")]
    ComputedReadOnly(AttrRef),
}

/// Result of a write that was accepted for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Stored; watchers and dependents were notified.
    Changed,
    /// Equal to the current value; nothing happened.
    Unchanged,
    /// The validator refused the value; the previous value stands.
    Rejected,
}

type Validator = Box<dyn Fn(&dyn AttrValue, Box<dyn AttrValue>) -> Option<Box<dyn AttrValue>>>;
type Watcher = Box<dyn FnMut(&mut WatchContext<'_>, &dyn AttrValue, &dyn AttrValue)>;
type Compute = Box<dyn Fn(&AttrReader<'_>) -> Box<dyn AttrValue>>;

/// Options for [`ReactiveStore::define`].
pub struct AttrOptions<T> {
    flags: AttrFlags,
    validator: Option<Box<dyn Fn(&T, T) -> Option<T>>>,
}

impl<T: 'static> AttrOptions<T> {
    pub fn new() -> Self {
        Self { flags: AttrFlags::empty(), validator: None }
    }

    pub fn flags(mut self, flags: AttrFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Shorthand for `flags(AttrFlags::LAYOUT | AttrFlags::PAINT)`.
    pub fn layout(self) -> Self {
        self.flags(AttrFlags::LAYOUT | AttrFlags::PAINT)
    }

    pub fn paint(self) -> Self {
        self.flags(AttrFlags::PAINT)
    }

    /// Validator called with `(current, candidate)`. Return the value to
    /// store, possibly clamped, or `None` to reject.
    pub fn validator(mut self, f: impl Fn(&T, T) -> Option<T> + 'static) -> Self {
        self.validator = Some(Box::new(f));
        self
    }
}

impl<T: 'static> Default for AttrOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

struct Slot {
    value: Box<dyn AttrValue>,
    flags: AttrFlags,
    validator: Option<Validator>,
    watchers: Vec<Watcher>,
    compute: Option<Compute>,
    /// Targets mirrored from this attribute.
    bindings: Vec<AttrRef>,
}

enum Work {
    Write { target: AttrRef, value: Box<dyn AttrValue>, forced: bool },
    Recompute(AttrRef),
}

/// Read-only view handed to computed functions.
pub struct AttrReader<'a> {
    store: &'a ReactiveStore,
}

impl AttrReader<'_> {
    pub fn get<T: 'static>(&self, node: NodeId, name: &str) -> Option<&T> {
        self.store.get(node, name).ok()
    }
}

/// Handed to watchers: read any attribute, queue writes.
///
/// Queued writes run after the current watcher list finishes, through the
/// full validation and notification path.
pub struct WatchContext<'a> {
    store: &'a ReactiveStore,
    queue: &'a mut VecDeque<Work>,
}

impl WatchContext<'_> {
    pub fn get<T: 'static>(&self, node: NodeId, name: &str) -> Option<&T> {
        self.store.get(node, name).ok()
    }

    pub fn set<T: AttrValue>(&mut self, node: NodeId, name: &str, value: T) {
        self.queue.push_back(Work::Write {
            target: AttrRef::new(node, name),
            value: Box::new(value),
            forced: false,
        });
    }

    pub fn set_forced<T: AttrValue>(&mut self, node: NodeId, name: &str, value: T) {
        self.queue.push_back(Work::Write {
            target: AttrRef::new(node, name),
            value: Box::new(value),
            forced: true,
        });
    }
}

/// All reactive attributes of all nodes.
pub struct ReactiveStore {
    slots: HashMap<AttrRef, Slot>,
    /// Dependency → computed attributes that read it.
    dependents: HashMap<AttrRef, Vec<AttrRef>>,
    max_steps: usize,
    diagnostics: Vec<Diagnostic>,
}

impl ReactiveStore {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            dependents: HashMap::new(),
            max_steps: DEFAULT_MAX_STEPS,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Define a plain attribute with an initial value.
    pub fn define<T: AttrValue>(
        &mut self,
        node: NodeId,
        name: &str,
        initial: T,
        options: AttrOptions<T>,
    ) -> Result<(), ReactiveError> {
        let attr = AttrRef::new(node, name);
        if self.slots.contains_key(&attr) {
            return Err(ReactiveError::AlreadyDefined(attr));
        }
        let validator = options.validator.map(|f| -> Validator {
            Box::new(move |current: &dyn AttrValue, candidate: Box<dyn AttrValue>| {
                let current = downcast::<T>(current)?;
                let candidate = *candidate.into_any().downcast::<T>().ok()?;
                f(current, candidate).map(|v| Box::new(v) as Box<dyn AttrValue>)
            })
        });
        self.slots.insert(
            attr,
            Slot {
                value: Box::new(initial),
                flags: options.flags,
                validator,
                watchers: Vec::new(),
                compute: None,
                bindings: Vec::new(),
            },
        );
        Ok(())
    }

    /// Register a watcher called with `(old, new)` after each change.
    pub fn watch<T, F>(&mut self, node: NodeId, name: &str, mut f: F) -> Result<(), ReactiveError>
    where
        T: 'static,
        F: FnMut(&mut WatchContext<'_>, &T, &T) + 'static,
    {
        let attr = AttrRef::new(node, name);
        self.check_type::<T>(&attr)?;
        let watcher: Watcher = Box::new(move |ctx: &mut WatchContext<'_>, old: &dyn AttrValue, new: &dyn AttrValue| {
            if let (Some(old), Some(new)) = (downcast::<T>(old), downcast::<T>(new)) {
                f(ctx, old, new);
            }
        });
        if let Some(slot) = self.slots.get_mut(&attr) {
            slot.watchers.push(watcher);
        }
        Ok(())
    }

    /// Make `name` a computed attribute of `deps`.
    ///
    /// A new attribute is created if `name` is not defined; an existing
    /// attribute of the same type becomes computed and keeps its watchers.
    /// The initial value is computed immediately without notifications.
    /// Refuses registrations that would close a dependency cycle.
    pub fn computed<T, F>(
        &mut self,
        node: NodeId,
        name: &str,
        deps: &[AttrRef],
        flags: AttrFlags,
        f: F,
    ) -> Result<(), ReactiveError>
    where
        T: AttrValue,
        F: Fn(&AttrReader<'_>) -> T + 'static,
    {
        let attr = AttrRef::new(node, name);
        for dep in deps {
            if !self.slots.contains_key(dep) {
                return Err(ReactiveError::UnknownAttribute(dep.clone()));
            }
            if let Some(path) = self.find_path(&attr, dep) {
                return Err(cycle_error(dep, path));
            }
        }
        if self.slots.contains_key(&attr) {
            self.check_type::<T>(&attr)?;
        }

        let compute: Compute = Box::new(move |reader: &AttrReader<'_>| Box::new(f(reader)) as Box<dyn AttrValue>);
        let initial = compute(&AttrReader { store: &*self });
        match self.slots.get_mut(&attr) {
            Some(slot) => {
                slot.value = initial;
                slot.compute = Some(compute);
                slot.validator = None;
                slot.flags |= flags;
            }
            None => {
                self.slots.insert(
                    attr.clone(),
                    Slot {
                        value: initial,
                        flags,
                        validator: None,
                        watchers: Vec::new(),
                        compute: Some(compute),
                        bindings: Vec::new(),
                    },
                );
            }
        }
        for dep in deps {
            let entry = self.dependents.entry(dep.clone()).or_default();
            if !entry.contains(&attr) {
                entry.push(attr.clone());
            }
        }
        Ok(())
    }

    /// Mirror writes of `source` into `target` (possibly under another name).
    ///
    /// The target receives the source's current value right away, through
    /// its own validation and notification path.
    pub fn bind(&mut self, dom: &mut Dom, source: AttrRef, target: AttrRef) -> Result<SetOutcome, ReactiveError> {
        let source_slot = self
            .slots
            .get(&source)
            .ok_or_else(|| ReactiveError::UnknownAttribute(source.clone()))?;
        let current = source_slot.value.clone_boxed();
        let target_slot = self
            .slots
            .get(&target)
            .ok_or_else(|| ReactiveError::UnknownAttribute(target.clone()))?;
        if target_slot.compute.is_some() {
            return Err(ReactiveError::ComputedReadOnly(target));
        }
        if target_slot.value.value_type_id() != current.value_type_id() {
            return Err(ReactiveError::TypeMismatch {
                attr: target,
                expected: target_slot.value.value_type_name(),
                found: current.value_type_name(),
            });
        }
        if let Some(path) = self.find_path(&target, &source) {
            return Err(cycle_error(&source, path));
        }
        if let Some(slot) = self.slots.get_mut(&source) {
            slot.bindings.push(target.clone());
        }
        self.run(dom, target, current, false)
    }

    /// Drop every attribute of `node` and every edge pointing at them.
    pub fn remove_node(&mut self, node: NodeId) {
        self.slots.retain(|attr, _| attr.node != node);
        self.dependents.retain(|attr, _| attr.node != node);
        for targets in self.dependents.values_mut() {
            targets.retain(|t| t.node != node);
        }
        for slot in self.slots.values_mut() {
            slot.bindings.retain(|t| t.node != node);
        }
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    pub fn get<T: 'static>(&self, node: NodeId, name: &str) -> Result<&T, ReactiveError> {
        let attr = AttrRef::new(node, name);
        let slot = self.slots.get(&attr).ok_or_else(|| ReactiveError::UnknownAttribute(attr.clone()))?;
        downcast::<T>(&*slot.value).ok_or_else(|| ReactiveError::TypeMismatch {
            expected: slot.value.value_type_name(),
            found: std::any::type_name::<T>(),
            attr,
        })
    }

    pub fn get_cloned<T: Clone + 'static>(&self, node: NodeId, name: &str) -> Result<T, ReactiveError> {
        self.get::<T>(node, name).cloned()
    }

    pub fn contains(&self, node: NodeId, name: &str) -> bool {
        self.slots.contains_key(&AttrRef::new(node, name))
    }

    /// Names of the attributes defined on `node`, sorted.
    pub fn names(&self, node: NodeId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .slots
            .keys()
            .filter(|attr| attr.node == node)
            .map(|attr| attr.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Diagnostics from propagation runs that hit the step limit.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Write a value and propagate to a fixpoint.
    pub fn set<T: AttrValue>(&mut self, dom: &mut Dom, node: NodeId, name: &str, value: T) -> Result<SetOutcome, ReactiveError> {
        self.set_inner(dom, AttrRef::new(node, name), Box::new(value), false)
    }

    /// Like [`set`](Self::set) but notifies even when the value is equal.
    pub fn set_forced<T: AttrValue>(
        &mut self,
        dom: &mut Dom,
        node: NodeId,
        name: &str,
        value: T,
    ) -> Result<SetOutcome, ReactiveError> {
        self.set_inner(dom, AttrRef::new(node, name), Box::new(value), true)
    }

    fn set_inner(
        &mut self,
        dom: &mut Dom,
        target: AttrRef,
        value: Box<dyn AttrValue>,
        forced: bool,
    ) -> Result<SetOutcome, ReactiveError> {
        let slot = self.slots.get(&target).ok_or_else(|| ReactiveError::UnknownAttribute(target.clone()))?;
        if slot.compute.is_some() {
            return Err(ReactiveError::ComputedReadOnly(target));
        }
        if slot.value.value_type_id() != value.value_type_id() {
            return Err(ReactiveError::TypeMismatch {
                expected: slot.value.value_type_name(),
                found: value.value_type_name(),
                attr: target,
            });
        }
        self.run(dom, target, value, forced)
    }

    /// Apply the first write, then drain the queue it produced.
    fn run(
        &mut self,
        dom: &mut Dom,
        target: AttrRef,
        value: Box<dyn AttrValue>,
        forced: bool,
    ) -> Result<SetOutcome, ReactiveError> {
        let mut queue = VecDeque::new();
        let outcome = self.apply(dom, &target, value, forced, &mut queue)?;

        let mut steps = 0;
        while let Some(work) = queue.pop_front() {
            steps += 1;
            if steps > self.max_steps {
                let diagnostic = Diagnostic::PropagationLimit { steps: self.max_steps, dropped: queue.len() + 1 };
                tracing::warn!(%diagnostic, "reactive propagation truncated");
                self.diagnostics.push(diagnostic);
                break;
            }
            let result = match work {
                Work::Write { target, value, forced } => self.apply_queued_write(dom, &target, value, forced, &mut queue),
                Work::Recompute(target) => self.recompute(dom, &target, &mut queue),
            };
            if let Err(err) = result {
                tracing::warn!(%err, "queued reactive write skipped");
            }
        }
        Ok(outcome)
    }

    fn apply_queued_write(
        &mut self,
        dom: &mut Dom,
        target: &AttrRef,
        value: Box<dyn AttrValue>,
        forced: bool,
        queue: &mut VecDeque<Work>,
    ) -> Result<SetOutcome, ReactiveError> {
        let slot = self.slots.get(target).ok_or_else(|| ReactiveError::UnknownAttribute(target.clone()))?;
        if slot.compute.is_some() {
            return Err(ReactiveError::ComputedReadOnly(target.clone()));
        }
        if slot.value.value_type_id() != value.value_type_id() {
            return Err(ReactiveError::TypeMismatch {
                attr: target.clone(),
                expected: slot.value.value_type_name(),
                found: value.value_type_name(),
            });
        }
        self.apply(dom, target, value, forced, queue)
    }

    fn recompute(&mut self, dom: &mut Dom, target: &AttrRef, queue: &mut VecDeque<Work>) -> Result<SetOutcome, ReactiveError> {
        let slot = self.slots.get(target).ok_or_else(|| ReactiveError::UnknownAttribute(target.clone()))?;
        let Some(compute) = slot.compute.as_ref() else {
            return Ok(SetOutcome::Unchanged);
        };
        let value = compute(&AttrReader { store: &*self });
        self.apply(dom, target, value, false, queue)
    }

    /// Steps 1-5 for one write. Type and read-only checks are done by the
    /// caller.
    fn apply(
        &mut self,
        dom: &mut Dom,
        target: &AttrRef,
        value: Box<dyn AttrValue>,
        forced: bool,
        queue: &mut VecDeque<Work>,
    ) -> Result<SetOutcome, ReactiveError> {
        let slot = self
            .slots
            .get_mut(target)
            .ok_or_else(|| ReactiveError::UnknownAttribute(target.clone()))?;

        let candidate = match &slot.validator {
            Some(validate) => match validate(&*slot.value, value) {
                Some(accepted) => accepted,
                None => {
                    tracing::debug!(attr = %target, "validator rejected value");
                    return Ok(SetOutcome::Rejected);
                }
            },
            None => value,
        };

        let notify_equal = forced || slot.flags.contains(AttrFlags::ALWAYS_UPDATE);
        if slot.value.eq_dyn(&*candidate) && !notify_equal {
            return Ok(SetOutcome::Unchanged);
        }

        let old = std::mem::replace(&mut slot.value, candidate);
        let new = slot.value.clone_boxed();
        let flags = slot.flags;
        let bindings = slot.bindings.clone();
        let mut watchers = std::mem::take(&mut slot.watchers);

        {
            let mut ctx = WatchContext { store: &*self, queue: &mut *queue };
            for watcher in watchers.iter_mut() {
                watcher(&mut ctx, &*old, &*new);
            }
        }
        if let Some(slot) = self.slots.get_mut(target) {
            watchers.append(&mut slot.watchers);
            slot.watchers = watchers;
        }

        if flags.contains(AttrFlags::LAYOUT) {
            dom.mark_layout(target.node);
        } else if flags.contains(AttrFlags::PAINT) {
            dom.mark_dirty(target.node, DirtyFlags::PAINT);
        }

        for bound in bindings {
            queue.push_back(Work::Write { target: bound, value: new.clone_boxed(), forced: false });
        }
        if let Some(dependents) = self.dependents.get(target) {
            queue.extend(dependents.iter().cloned().map(Work::Recompute));
        }

        Ok(SetOutcome::Changed)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn check_type<T: 'static>(&self, attr: &AttrRef) -> Result<(), ReactiveError> {
        let slot = self.slots.get(attr).ok_or_else(|| ReactiveError::UnknownAttribute(attr.clone()))?;
        if slot.value.value_type_id() != TypeId::of::<T>() {
            return Err(ReactiveError::TypeMismatch {
                attr: attr.clone(),
                expected: slot.value.value_type_name(),
                found: std::any::type_name::<T>(),
            });
        }
        Ok(())
    }

    /// Attributes a change to `attr` propagates to directly.
    fn edges(&self, attr: &AttrRef) -> Vec<AttrRef> {
        let mut next = self.dependents.get(attr).cloned().unwrap_or_default();
        if let Some(slot) = self.slots.get(attr) {
            next.extend(slot.bindings.iter().cloned());
        }
        next
    }

    /// A propagation path `from → … → to`, if one exists.
    fn find_path(&self, from: &AttrRef, to: &AttrRef) -> Option<Vec<AttrRef>> {
        let mut stack = vec![vec![from.clone()]];
        let mut seen = HashSet::new();
        while let Some(path) = stack.pop() {
            let current = path.last()?.clone();
            if &current == to {
                return Some(path);
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            for next in self.edges(&current) {
                let mut extended = path.clone();
                extended.push(next);
                stack.push(extended);
            }
        }
        None
    }
}

impl Default for ReactiveStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Cycle closed by a new edge `start → path[0]` where `path` ends at `start`.
fn cycle_error(start: &AttrRef, path: Vec<AttrRef>) -> ReactiveError {
    let mut names = vec![start.to_string()];
    names.extend(path.iter().map(ToString::to_string));
    ReactiveError::DependencyCycle { path: names }
}
