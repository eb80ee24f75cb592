//! Cascade resolution: loaded sheets + node → resolved [`Styles`].
//!
//! Sheets are kept in load order, each tagged with an [`Origin`]. Every
//! declaration gets a global order number from its sheet's position and its
//! place in the sheet, so replacing a sheet in place (hot reload) keeps its
//! rank relative to the others.

use crate::css::model::{Declaration, Selector, StyleSheet};
use crate::css::parser::{parse_stylesheet, ParseError};
use crate::css::properties::apply_declaration;
use crate::css::selector::match_specificity;
use crate::css::specificity::{CascadeKey, CascadeOrder, Origin, Specificity};
use crate::css::styles::Styles;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::dom::node::{DirtyFlags, NodeId};
use crate::dom::tree::Dom;

/// Framework defaults loaded with [`Origin::Builtin`].
pub const BUILTIN_CSS: &str = "* { display: block; visibility: visible; }";

/// A rule ready for matching: selectors, declarations, origin and the order
/// number of its first declaration.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
    pub origin: Origin,
    pub order: u32,
}

#[derive(Debug, Clone)]
struct Sheet {
    name: String,
    origin: Origin,
    rules: Vec<CompiledRule>,
}

/// Output of [`Cascade::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub styles: Styles,
    /// Matched declarations that were dropped (unknown property or bad value).
    pub diagnostics: Vec<Diagnostic>,
}

/// All loaded style sheets plus the ranking policy.
#[derive(Debug, Clone, Default)]
pub struct Cascade {
    sheets: Vec<Sheet>,
    order: CascadeOrder,
}

impl Cascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty cascade ranking with `order`.
    pub fn with_order(order: CascadeOrder) -> Self {
        Self { sheets: Vec::new(), order }
    }

    pub fn order(&self) -> CascadeOrder {
        self.order
    }

    pub fn set_order(&mut self, order: CascadeOrder) {
        self.order = order;
    }

    // -----------------------------------------------------------------------
    // Sheets
    // -----------------------------------------------------------------------

    /// Append a parsed sheet. A sheet with the same name is replaced in place.
    pub fn add_sheet(&mut self, name: impl Into<String>, origin: Origin, sheet: &StyleSheet) {
        let name = name.into();
        let rules = sheet
            .rules
            .iter()
            .map(|rule| CompiledRule {
                selectors: rule.selectors.clone(),
                declarations: rule.declarations.clone(),
                origin,
                order: 0,
            })
            .collect();
        let compiled = Sheet { name, origin, rules };
        match self.sheets.iter_mut().find(|s| s.name == compiled.name) {
            Some(existing) => *existing = compiled,
            None => self.sheets.push(compiled),
        }
        self.renumber();
    }

    /// Parse `css` and add it. Rules that fail to parse are skipped; their
    /// errors are returned.
    pub fn add_source(&mut self, name: impl Into<String>, origin: Origin, css: &str) -> Vec<ParseError> {
        let name = name.into();
        let (sheet, errors) = parse_stylesheet(css);
        tracing::debug!(sheet = %name, rules = sheet.len(), errors = errors.len(), "loaded style sheet");
        self.add_sheet(name, origin, &sheet);
        errors
    }

    /// Replace the rules of an existing sheet, keeping its origin and
    /// position. Returns `false` if no sheet has that name.
    pub fn replace_sheet(&mut self, name: &str, sheet: &StyleSheet) -> bool {
        let Some(origin) = self.sheets.iter().find(|s| s.name == name).map(|s| s.origin) else {
            return false;
        };
        self.add_sheet(name, origin, sheet);
        true
    }

    pub fn remove_sheet(&mut self, name: &str) -> bool {
        let before = self.sheets.len();
        self.sheets.retain(|s| s.name != name);
        let removed = self.sheets.len() != before;
        if removed {
            self.renumber();
        }
        removed
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    /// Sheet names in load order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    pub fn rule_count(&self) -> usize {
        self.sheets.iter().map(|s| s.rules.len()).sum()
    }

    fn renumber(&mut self) {
        let mut next = 0u32;
        for rule in self.sheets.iter_mut().flat_map(|s| s.rules.iter_mut()) {
            rule.order = next;
            next += rule.declarations.len() as u32;
        }
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Resolve the style of one node.
    ///
    /// Declarations of every rule with a matching selector are ranked by
    /// [`CascadeKey`] and applied lowest first, so the highest-ranked valid
    /// declaration of each property is the one left standing. The node's
    /// inline declarations rank above every sheet of the same importance.
    pub fn resolve(&self, node: NodeId, dom: &Dom) -> Resolution {
        let mut ranked: Vec<(CascadeKey, &Declaration)> = Vec::new();

        for rule in self.sheets.iter().flat_map(|s| &s.rules) {
            let Some(specificity) = match_specificity(&rule.selectors, node, dom) else {
                continue;
            };
            for (i, declaration) in rule.declarations.iter().enumerate() {
                let key = CascadeKey {
                    important: declaration.important,
                    origin: rule.origin,
                    specificity,
                    order: rule.order + i as u32,
                };
                ranked.push((key, declaration));
            }
        }

        if let Some(data) = dom.get(node) {
            for (i, declaration) in data.inline.iter().enumerate() {
                let key = CascadeKey {
                    important: declaration.important,
                    origin: Origin::Inline,
                    specificity: Specificity::ZERO,
                    order: i as u32,
                };
                ranked.push((key, declaration));
            }
        }

        let order = self.order;
        ranked.sort_by(|a, b| a.0.compare(&b.0, order));

        let mut styles = Styles::new();
        let mut diagnostics = Vec::new();
        for (_, declaration) in ranked {
            if let Err(err) = apply_declaration(&mut styles, &declaration.property, &declaration.values) {
                diagnostics.push(Diagnostic::InvalidDeclaration {
                    node,
                    property: declaration.property.clone(),
                    message: err.to_string(),
                });
            }
        }

        Resolution { styles, diagnostics }
    }

    /// Re-resolve every mounted node flagged `STYLE`, in document order.
    ///
    /// Stores each result in the node's cache. Nodes whose style actually
    /// changed are flagged for layout and paint. Returns the number of nodes
    /// resolved.
    pub fn resolve_dirty(&self, dom: &mut Dom, diagnostics: &mut Diagnostics) -> usize {
        let Some(root) = dom.root() else {
            return 0;
        };
        let mut resolved = 0;
        for node in dom.walk_depth_first(root) {
            if !dom.is_dirty(node, DirtyFlags::STYLE) {
                continue;
            }
            let Resolution { styles, diagnostics: dropped } = self.resolve(node, dom);
            diagnostics.extend(dropped);
            if dom.set_resolved(node, styles) {
                dom.mark_dirty(node, DirtyFlags::LAYOUT | DirtyFlags::PAINT);
            }
            resolved += 1;
        }
        if resolved > 0 {
            tracing::debug!(nodes = resolved, "cascade pass");
        }
        resolved
    }
}
