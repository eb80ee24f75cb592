//! Style sheet AST: selectors, declarations, rule sets.

use std::fmt;

/// Boolean node-state predicates usable after `:` in a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    Focus,
    Hover,
    Active,
    Disabled,
    Enabled,
    /// The node or one of its descendants has focus.
    FocusWithin,
    FirstChild,
    LastChild,
    /// Even 1-based position among siblings.
    Even,
    /// Odd 1-based position among siblings.
    Odd,
}

impl PseudoClass {
    /// Look up a pseudo-class by name (without the leading `:`).
    pub fn from_name(name: &str) -> Option<PseudoClass> {
        Some(match name {
            "focus" => PseudoClass::Focus,
            "hover" => PseudoClass::Hover,
            "active" => PseudoClass::Active,
            "disabled" => PseudoClass::Disabled,
            "enabled" => PseudoClass::Enabled,
            "focus-within" => PseudoClass::FocusWithin,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "even" => PseudoClass::Even,
            "odd" => PseudoClass::Odd,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            PseudoClass::Focus => "focus",
            PseudoClass::Hover => "hover",
            PseudoClass::Active => "active",
            PseudoClass::Disabled => "disabled",
            PseudoClass::Enabled => "enabled",
            PseudoClass::FocusWithin => "focus-within",
            PseudoClass::FirstChild => "first-child",
            PseudoClass::LastChild => "last-child",
            PseudoClass::Even => "even",
            PseudoClass::Odd => "odd",
        }
    }
}

/// A single simple selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorComponent {
    /// Type selector: matches the node's type tag (e.g. `Static`).
    Type(String),
    /// `*`
    Universal,
    /// `.classname`
    Class(String),
    /// `#id`
    Id(String),
    /// `:focus`, `:first-child`, ...
    PseudoClass(PseudoClass),
    /// `&` inside a nested rule; replaced by the parent selector while parsing.
    Nesting,
}

/// Relationship between two adjacent compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Whitespace: `A B`.
    Descendant,
    /// `A > B`.
    Child,
}

/// Simple selectors that all apply to one node, e.g. `Static.title:hover`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    pub fn new(components: Vec<SelectorComponent>) -> Self {
        Self { components }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// A chain of compound selectors joined by combinators.
///
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`; the
/// last compound is the subject the selector matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

impl Selector {
    /// A selector consisting of one compound.
    pub fn single(compound: CompoundSelector) -> Self {
        Self { compounds: vec![compound], combinators: Vec::new() }
    }

    /// Extend the chain with `combinator` and `compound` (builder).
    pub fn then(mut self, combinator: Combinator, compound: CompoundSelector) -> Self {
        if !self.compounds.is_empty() {
            self.combinators.push(combinator);
        }
        self.compounds.push(compound);
        self
    }

    /// True when there is nothing to match. Empty selectors never match.
    pub fn is_empty(&self) -> bool {
        self.compounds.iter().all(CompoundSelector::is_empty)
    }

    /// The compound that must match the candidate node itself.
    pub fn subject(&self) -> Option<&CompoundSelector> {
        self.compounds.last()
    }
}

impl fmt::Display for SelectorComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorComponent::Type(name) => write!(f, "{name}"),
            SelectorComponent::Universal => write!(f, "*"),
            SelectorComponent::Class(name) => write!(f, ".{name}"),
            SelectorComponent::Id(name) => write!(f, "#{name}"),
            SelectorComponent::PseudoClass(pc) => write!(f, ":{}", pc.name()),
            SelectorComponent::Nesting => write!(f, "&"),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, compound) in self.compounds.iter().enumerate() {
            if i > 0 {
                match self.combinators.get(i - 1) {
                    Some(Combinator::Child) => write!(f, " > ")?,
                    _ => write!(f, " ")?,
                }
            }
            for component in &compound.components {
                write!(f, "{component}")?;
            }
        }
        Ok(())
    }
}

/// A value token within a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationValue {
    /// `red`, `bold`, `center`, `auto`.
    Ident(String),
    /// Bare number: `10`, `0.5`.
    Number(f32),
    /// Number with unit: `1fr`, `50%`, `80vh`, `25w`.
    Dimension(f32, String),
    /// Hex colour without the `#`: `"ff00aa"`.
    Color(String),
    /// Quoted string contents.
    String(String),
}

impl fmt::Display for DeclarationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationValue::Ident(s) => write!(f, "{s}"),
            DeclarationValue::Number(n) => write!(f, "{n}"),
            DeclarationValue::Dimension(n, unit) => write!(f, "{n}{unit}"),
            DeclarationValue::Color(hex) => write!(f, "#{hex}"),
            DeclarationValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// `property: value1 value2 [!important]`
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub values: Vec<DeclarationValue>,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, values: Vec<DeclarationValue>, important: bool) -> Self {
        Self { property: property.into(), values, important }
    }
}

/// Selectors paired with declarations. Nested rules are flattened into
/// separate rule sets by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// A parsed sheet: rule sets in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    pub rules: Vec<RuleSet>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compound(components: Vec<SelectorComponent>) -> CompoundSelector {
        CompoundSelector::new(components)
    }

    #[test]
    fn pseudo_class_names_round_trip() {
        for name in ["focus", "hover", "focus-within", "first-child", "odd"] {
            let pc = PseudoClass::from_name(name).expect(name);
            assert_eq!(pc.name(), name);
        }
        assert_eq!(PseudoClass::from_name("visited"), None);
    }

    #[test]
    fn selector_display() {
        let sel = Selector::single(compound(vec![SelectorComponent::Class("started".into())]))
            .then(Combinator::Descendant, compound(vec![SelectorComponent::Id("stop".into())]))
            .then(
                Combinator::Child,
                compound(vec![
                    SelectorComponent::Type("Static".into()),
                    SelectorComponent::PseudoClass(PseudoClass::Hover),
                ]),
            );
        assert_eq!(sel.to_string(), ".started #stop > Static:hover");
        assert_eq!(sel.combinators.len(), 2);
    }

    #[test]
    fn empty_selector_detection() {
        assert!(Selector::default().is_empty());
        assert!(Selector::single(CompoundSelector::default()).is_empty());
        assert!(!Selector::single(compound(vec![SelectorComponent::Universal])).is_empty());
    }

    #[test]
    fn declaration_value_display() {
        assert_eq!(DeclarationValue::Dimension(1.0, "fr".into()).to_string(), "1fr");
        assert_eq!(DeclarationValue::Color("ff0000".into()).to_string(), "#ff0000");
    }
}
