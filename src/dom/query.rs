//! Selector queries over a subtree, with bulk class helpers.

use super::node::NodeId;
use super::tree::Dom;
use crate::css::model::{Selector, SelectorComponent};
use crate::css::parser::{parse_selector_list, ParseError};
use crate::css::selector::matches;

/// Errors returned by queries. Callers must handle "nothing found" explicitly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid selector: {0}")]
    InvalidSelector(#[from] ParseError),
    #[error("no node matches '{selector}'")]
    NotFound { selector: String },
    #[error("'{selector}' matched a {found} node, expected {expected}")]
    TypeMismatch {
        selector: String,
        expected: String,
        found: String,
    },
}

/// An ordered result set of a selector query.
///
/// Nodes are descendants of the query scope, in document order. The set is a
/// snapshot: later tree changes are not reflected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomQuery {
    selector: String,
    nodes: Vec<NodeId>,
}

impl Dom {
    /// Every descendant of `scope` matching the comma-separated `selector`.
    pub fn query(&self, scope: NodeId, selector: &str) -> Result<DomQuery, QueryError> {
        let selectors = parse_selector_list(selector)?;
        let nodes = match single_id(&selectors) {
            Some(id) if self.by_id(id).len() <= 1 => self
                .by_id(id)
                .iter()
                .copied()
                .filter(|&n| self.is_descendant_of(n, scope))
                .collect(),
            _ => self
                .descendants(scope)
                .into_iter()
                .filter(|&n| selectors.iter().any(|s| matches(s, n, self)))
                .collect(),
        };
        Ok(DomQuery { selector: selector.to_string(), nodes })
    }

    /// The first descendant of `scope` matching `selector`.
    pub fn query_one(&self, scope: NodeId, selector: &str) -> Result<NodeId, QueryError> {
        self.query(scope, selector)?.first()
    }
}

/// `Some(id)` when the list is exactly one bare `#id` selector.
fn single_id(selectors: &[Selector]) -> Option<&str> {
    match selectors {
        [selector] if selector.compounds.len() == 1 => match selector.compounds[0].components.as_slice() {
            [SelectorComponent::Id(id)] => Some(id),
            _ => None,
        },
        _ => None,
    }
}

impl DomQuery {
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The first match, or [`QueryError::NotFound`].
    pub fn first(&self) -> Result<NodeId, QueryError> {
        self.nodes.first().copied().ok_or_else(|| QueryError::NotFound {
            selector: self.selector.clone(),
        })
    }

    /// The last match, or [`QueryError::NotFound`].
    pub fn last(&self) -> Result<NodeId, QueryError> {
        self.nodes.last().copied().ok_or_else(|| QueryError::NotFound {
            selector: self.selector.clone(),
        })
    }

    /// The first match, which must have type tag `expected`.
    pub fn first_of_type(&self, dom: &Dom, expected: &str) -> Result<NodeId, QueryError> {
        let node = self.first()?;
        let found = dom.get(node).map(|d| d.widget_type.as_str()).unwrap_or_default();
        if found != expected {
            return Err(QueryError::TypeMismatch {
                selector: self.selector.clone(),
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(node)
    }

    /// All matches in document order.
    pub fn all(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Keep only the nodes that also match `selector`.
    pub fn filter(self, dom: &Dom, selector: &str) -> Result<DomQuery, QueryError> {
        self.refine(dom, selector, true)
    }

    /// Drop the nodes that match `selector`.
    pub fn exclude(self, dom: &Dom, selector: &str) -> Result<DomQuery, QueryError> {
        self.refine(dom, selector, false)
    }

    fn refine(self, dom: &Dom, selector: &str, keep: bool) -> Result<DomQuery, QueryError> {
        let selectors = parse_selector_list(selector)?;
        let nodes = self
            .nodes
            .into_iter()
            .filter(|&n| selectors.iter().any(|s| matches(s, n, dom)) == keep)
            .collect();
        Ok(DomQuery { selector: format!("{} / {selector}", self.selector), nodes })
    }

    /// Add `class` to every node. Returns how many changed.
    pub fn add_class(&self, dom: &mut Dom, class: &str) -> usize {
        self.nodes.iter().filter(|&&n| dom.add_class(n, class).unwrap_or(false)).count()
    }

    /// Remove `class` from every node. Returns how many changed.
    pub fn remove_class(&self, dom: &mut Dom, class: &str) -> usize {
        self.nodes.iter().filter(|&&n| dom.remove_class(n, class).unwrap_or(false)).count()
    }

    /// Toggle `class` on every node.
    pub fn toggle_class(&self, dom: &mut Dom, class: &str) -> usize {
        self.nodes.iter().filter(|&&n| dom.toggle_class(n, class).is_ok()).count()
    }
}

impl<'a> IntoIterator for &'a DomQuery {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
