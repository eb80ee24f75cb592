//! Selector matching against live DOM nodes.
//!
//! Matching is stateless: every call re-reads node type, id, classes and
//! pseudo-state from the tree, so state changes are visible on the next
//! resolution without any cache invalidation here.

use crate::css::model::{Combinator, CompoundSelector, PseudoClass, Selector, SelectorComponent};
use crate::css::specificity::Specificity;
use crate::dom::node::{NodeData, NodeId, PseudoState};
use crate::dom::tree::Dom;

/// Whether `selector` matches `node`. Empty selectors never match.
///
/// The subject compound is checked against `node`, then the chain is walked
/// right to left. Descendant combinators backtrack: if the nearest matching
/// ancestor leads to a dead end, farther ancestors are tried.
pub fn matches(selector: &Selector, node: NodeId, dom: &Dom) -> bool {
    if selector.is_empty() || selector.combinators.len() + 1 != selector.compounds.len() {
        return false;
    }
    match_from(selector, selector.compounds.len() - 1, node, dom)
}

fn match_from(selector: &Selector, index: usize, node: NodeId, dom: &Dom) -> bool {
    if !matches_compound(&selector.compounds[index], node, dom) {
        return false;
    }
    if index == 0 {
        return true;
    }
    match selector.combinators[index - 1] {
        Combinator::Child => dom
            .parent(node)
            .is_some_and(|parent| match_from(selector, index - 1, parent, dom)),
        Combinator::Descendant => {
            let mut current = dom.parent(node);
            while let Some(ancestor) = current {
                if match_from(selector, index - 1, ancestor, dom) {
                    return true;
                }
                current = dom.parent(ancestor);
            }
            false
        }
    }
}

/// Whether every simple selector of `compound` holds for `node`.
pub fn matches_compound(compound: &CompoundSelector, node: NodeId, dom: &Dom) -> bool {
    let Some(data) = dom.get(node) else {
        return false;
    };
    compound.components.iter().all(|component| match component {
        SelectorComponent::Type(name) => data.widget_type == *name,
        SelectorComponent::Universal => true,
        SelectorComponent::Class(name) => data.has_class(name),
        SelectorComponent::Id(name) => data.id.as_deref() == Some(name.as_str()),
        SelectorComponent::PseudoClass(pseudo) => matches_pseudo(*pseudo, node, data, dom),
        // Unresolved nesting never matches.
        SelectorComponent::Nesting => false,
    })
}

fn matches_pseudo(pseudo: PseudoClass, node: NodeId, data: &NodeData, dom: &Dom) -> bool {
    match pseudo {
        PseudoClass::Focus => data.pseudo.contains(PseudoState::FOCUS),
        PseudoClass::Hover => data.pseudo.contains(PseudoState::HOVER),
        PseudoClass::Active => data.pseudo.contains(PseudoState::ACTIVE),
        PseudoClass::Disabled => data.is_disabled(),
        PseudoClass::Enabled => !data.is_disabled(),
        PseudoClass::FocusWithin => dom
            .walk_depth_first(node)
            .into_iter()
            .any(|id| dom.get(id).is_some_and(|d| d.pseudo.contains(PseudoState::FOCUS))),
        PseudoClass::FirstChild => dom.index_in_parent(node) == Some(0),
        PseudoClass::LastChild => match (dom.parent(node), dom.index_in_parent(node)) {
            (Some(parent), Some(index)) => index + 1 == dom.children(parent).len(),
            _ => false,
        },
        PseudoClass::Even => dom.index_in_parent(node).is_some_and(|i| (i + 1) % 2 == 0),
        PseudoClass::Odd => dom.index_in_parent(node).is_some_and(|i| (i + 1) % 2 == 1),
    }
}

/// Highest specificity among the selectors of a list that match `node`, or
/// `None` if none matches.
pub fn match_specificity(selectors: &[Selector], node: NodeId, dom: &Dom) -> Option<Specificity> {
    selectors
        .iter()
        .filter(|selector| matches(selector, node, dom))
        .map(Specificity::from_selector)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_selector_list;
    use crate::dom::node::NodeData;

    /// ```text
    /// Screen#root
    /// ├── Container#main.content
    /// │   ├── Button.primary
    /// │   ├── Static#title
    /// │   └── Button#stop
    /// └── Container#side.nav
    /// ```
    struct Fixture {
        dom: Dom,
        root: NodeId,
        main: NodeId,
        side: NodeId,
        primary: NodeId,
        title: NodeId,
        stop: NodeId,
    }

    fn fixture() -> Fixture {
        let mut dom = Dom::new();
        let root = dom.create_root(NodeData::new("Screen").with_id("root")).unwrap();
        let main = dom.create(NodeData::new("Container").with_id("main").with_class("content"));
        let side = dom.create(NodeData::new("Container").with_id("side").with_class("nav"));
        let primary = dom.create(NodeData::new("Button").with_class("primary"));
        let title = dom.create(NodeData::new("Static").with_id("title"));
        let stop = dom.create(NodeData::new("Button").with_id("stop"));
        dom.mount(root, main).unwrap();
        dom.mount(root, side).unwrap();
        for child in [primary, title, stop] {
            dom.mount(main, child).unwrap();
        }
        Fixture { dom, root, main, side, primary, title, stop }
    }

    fn sel(input: &str) -> Selector {
        parse_selector_list(input).unwrap().remove(0)
    }

    // ── Simple selectors ─────────────────────────────────────────────

    #[test]
    fn type_class_id() {
        let f = fixture();
        assert!(matches(&sel("Button"), f.primary, &f.dom));
        assert!(!matches(&sel("Button"), f.title, &f.dom));
        assert!(matches(&sel(".primary"), f.primary, &f.dom));
        assert!(matches(&sel("#title"), f.title, &f.dom));
        assert!(matches(&sel("Button.primary"), f.primary, &f.dom));
        assert!(!matches(&sel("Button.primary"), f.stop, &f.dom));
        assert!(matches(&sel("*"), f.side, &f.dom));
    }

    #[test]
    fn empty_selector_never_matches() {
        let f = fixture();
        assert!(!matches(&Selector::default(), f.root, &f.dom));
    }

    // ── Combinators ──────────────────────────────────────────────────

    #[test]
    fn descendant_and_child() {
        let f = fixture();
        assert!(matches(&sel("Screen Button"), f.primary, &f.dom));
        assert!(!matches(&sel("Screen > Button"), f.primary, &f.dom));
        assert!(matches(&sel("#main > Button"), f.primary, &f.dom));
        assert!(!matches(&sel(".nav Button"), f.primary, &f.dom));
    }

    #[test]
    fn descendant_backtracks_past_nearest_ancestor() {
        // The nearest `Container` above the leaf is not a child of `Screen`.
        let mut f = fixture();
        let inner = f.dom.create(NodeData::new("Container").with_class("inner"));
        let leaf = f.dom.create(NodeData::new("Static"));
        f.dom.mount(f.main, inner).unwrap();
        f.dom.mount(inner, leaf).unwrap();
        assert!(matches(&sel("Screen > Container Static"), leaf, &f.dom));
        assert!(matches(&sel(".content Container > Static"), leaf, &f.dom));
        assert!(!matches(&sel(".nav Static"), leaf, &f.dom));
    }

    // ── Pseudo-classes ───────────────────────────────────────────────

    #[test]
    fn state_pseudo_classes() {
        let mut f = fixture();
        assert!(!matches(&sel("Button:hover"), f.primary, &f.dom));
        f.dom.set_pseudo(f.primary, PseudoState::HOVER, true).unwrap();
        assert!(matches(&sel("Button:hover"), f.primary, &f.dom));

        assert!(matches(&sel(":enabled"), f.stop, &f.dom));
        f.dom.set_pseudo(f.stop, PseudoState::DISABLED, true).unwrap();
        assert!(matches(&sel(":disabled"), f.stop, &f.dom));
        assert!(!matches(&sel(":enabled"), f.stop, &f.dom));
    }

    #[test]
    fn focus_within_looks_down() {
        let mut f = fixture();
        f.dom.set_pseudo(f.title, PseudoState::FOCUS, true).unwrap();
        assert!(matches(&sel("#main:focus-within"), f.main, &f.dom));
        assert!(matches(&sel(":focus-within"), f.root, &f.dom));
        assert!(!matches(&sel(":focus-within"), f.side, &f.dom));
        assert!(matches(&sel("#title:focus"), f.title, &f.dom));
    }

    #[test]
    fn positional_pseudo_classes() {
        let f = fixture();
        assert!(matches(&sel(":first-child"), f.primary, &f.dom));
        assert!(matches(&sel(":last-child"), f.stop, &f.dom));
        assert!(!matches(&sel(":last-child"), f.title, &f.dom));
        assert!(matches(&sel(":odd"), f.primary, &f.dom));
        assert!(matches(&sel(":even"), f.title, &f.dom));
        assert!(!matches(&sel(":first-child"), f.root, &f.dom));
    }

    // ── Specificity of lists ─────────────────────────────────────────

    #[test]
    fn list_specificity_uses_best_matching_selector() {
        let f = fixture();
        let list = parse_selector_list("#side, Button, .content Button.primary").unwrap();
        assert_eq!(match_specificity(&list, f.primary, &f.dom), Some(Specificity::new(0, 2, 1)));
        assert_eq!(match_specificity(&list, f.stop, &f.dom), Some(Specificity::new(0, 0, 1)));
        assert_eq!(match_specificity(&list, f.title, &f.dom), None);
    }
}
