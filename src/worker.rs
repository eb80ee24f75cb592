//! Background work handoff: generation tokens, cancellation flags and the
//! channel that carries results back to the single-threaded core.
//!
//! Work runs wherever the application puts it (a tokio task, a thread). It
//! never touches the screen directly: it sends a [`Completion`] through a
//! [`HandoffSender`], and the app applies it at the next tick boundary if
//! its [`TaskToken`] is still current.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::dom::node::NodeId;
use crate::screen::Screen;

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Identity of one request: the node and slot it belongs to plus the
/// generation it was issued at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskToken {
    pub node: NodeId,
    pub key: String,
    pub generation: u64,
}

/// Cooperative cancellation flag shared with the background work.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// TaskRegistry
// ---------------------------------------------------------------------------

/// Latest generation per `(node, key)` slot.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    slots: HashMap<(NodeId, String), (u64, CancelFlag)>,
    next_generation: u64,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request for a slot. The previous request for the same
    /// slot is cancelled and its token becomes stale.
    pub fn begin(&mut self, node: NodeId, key: &str) -> (TaskToken, CancelFlag) {
        self.next_generation += 1;
        let flag = CancelFlag::new();
        if let Some((_, previous)) = self.slots.insert((node, key.to_owned()), (self.next_generation, flag.clone())) {
            previous.cancel();
        }
        let token = TaskToken { node, key: key.to_owned(), generation: self.next_generation };
        (token, flag)
    }

    /// Whether `token` is the latest request for its slot.
    pub fn is_current(&self, token: &TaskToken) -> bool {
        self.slots
            .get(&(token.node, token.key.clone()))
            .is_some_and(|(generation, _)| *generation == token.generation)
    }

    /// Mark a request finished. Returns `false` for stale tokens.
    pub fn finish(&mut self, token: &TaskToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.slots.remove(&(token.node, token.key.clone()));
        true
    }

    /// Cancel the request for one slot.
    pub fn cancel(&mut self, node: NodeId, key: &str) -> bool {
        match self.slots.remove(&(node, key.to_owned())) {
            Some((_, flag)) => {
                flag.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every request belonging to `node`.
    pub fn cancel_node(&mut self, node: NodeId) -> usize {
        let mut cancelled = 0;
        self.slots.retain(|(owner, _), (_, flag)| {
            if *owner == node {
                flag.cancel();
                cancelled += 1;
                false
            } else {
                true
            }
        });
        cancelled
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Handoff
// ---------------------------------------------------------------------------

type Apply = Box<dyn FnOnce(&mut Screen) + Send>;

/// A finished piece of background work, applied on the core's thread.
pub struct Completion {
    pub token: TaskToken,
    apply: Apply,
}

impl Completion {
    pub fn new(token: TaskToken, apply: impl FnOnce(&mut Screen) + Send + 'static) -> Self {
        Self { token, apply: Box::new(apply) }
    }

    pub fn apply(self, screen: &mut Screen) {
        (self.apply)(screen)
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion").field("token", &self.token).finish_non_exhaustive()
    }
}

/// Sending half, cloneable and `Send`.
#[derive(Debug, Clone)]
pub struct HandoffSender(UnboundedSender<Completion>);

impl HandoffSender {
    /// Queue a result. Returns `false` once the app has shut down.
    pub fn complete(&self, token: TaskToken, apply: impl FnOnce(&mut Screen) + Send + 'static) -> bool {
        self.0.send(Completion::new(token, apply)).is_ok()
    }
}

/// Receiving half, owned by the app.
#[derive(Debug)]
pub struct Handoff {
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl Handoff {
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> HandoffSender {
        HandoffSender(self.tx.clone())
    }

    /// Everything queued so far, without waiting.
    pub fn drain(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            completions.push(completion);
        }
        completions
    }

    /// Wait for the next completion.
    pub async fn recv(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }
}

impl Default for Handoff {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
