//! Developer-facing diagnostics.
//!
//! Recoverable problems found while loading sheets, resolving styles, laying
//! out or propagating reactive writes are recorded here instead of failing
//! the frame. Each record is also emitted as a `tracing` warning.

use crate::dom::node::NodeId;

/// One recoverable problem.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Diagnostic {
    /// A rule in a style sheet failed to parse and was skipped.
    #[error("{sheet}: {message}")]
    Parse { sheet: String, message: String },
    /// A declaration matched a node but was dropped during the cascade.
    #[error("{node:?}: dropped '{property}': {message}")]
    InvalidDeclaration {
        node: NodeId,
        property: String,
        message: String,
    },
    /// Auto sizing did not settle; the node fell back to zero size.
    #[error("{node:?}: layout did not converge after {iterations} iterations")]
    LayoutNonConvergence { node: NodeId, iterations: usize },
    /// Reactive propagation hit its step limit; remaining work was dropped.
    #[error("reactive propagation stopped after {steps} steps ({dropped} pending items dropped)")]
    PropagationLimit { steps: usize, dropped: usize },
}

/// Ordered collection of diagnostics.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(%diagnostic, "diagnostic");
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.record(diagnostic);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
