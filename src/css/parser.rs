//! Recursive descent style sheet parser.
//!
//! Parses text into a [`StyleSheet`] using the logos tokenizer from
//! [`crate::css::tokenizer`]. Beyond plain rule sets the grammar covers
//! `$name: value;` variables (substituted at parse time), nested rules with
//! `&`, and per-rule error recovery: a malformed rule is skipped up to its
//! matching `}` and the rest of the sheet still loads.

use std::collections::HashMap;
use std::ops::Range;

use crate::css::model::*;
use crate::css::tokenizer::{lex, Token};

/// Errors from style sheet parsing. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{line}:{column}: unexpected token: {message}")]
    UnexpectedToken {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("{line}:{column}: unrecognised input {text:?}")]
    InvalidToken {
        line: usize,
        column: usize,
        text: String,
    },
    #[error("{line}:{column}: invalid selector: {message}")]
    Selector {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("{line}:{column}: undefined variable ${name}")]
    UndefinedVariable {
        line: usize,
        column: usize,
        name: String,
    },
}

/// A token with source span. `token` is `None` for input logos rejected.
#[derive(Debug, Clone)]
struct PToken {
    token: Option<Token>,
    text: String,
    span: Range<usize>,
}

/// Replace `/* ... */` comments with spaces, keeping newlines and byte
/// offsets intact so error positions still point into the original text.
fn blank_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            result.push_str("  ");
            let mut prev = '\0';
            for inner in chars.by_ref() {
                if inner == '\n' {
                    result.push('\n');
                } else {
                    result.extend(std::iter::repeat(' ').take(inner.len_utf8()));
                }
                if prev == '*' && inner == '/' {
                    break;
                }
                prev = inner;
            }
        } else {
            result.push(c);
        }
    }
    result
}

impl PToken {
    /// Input logos rejected that opens a string never closed on its line.
    fn is_broken_string(&self) -> bool {
        self.token.is_none() && self.text.starts_with(['"', '\''])
    }
}

fn tokenize_with_spans(input: &str) -> Vec<PToken> {
    let (lexemes, invalid) = lex(input);
    let mut tokens: Vec<PToken> = lexemes
        .into_iter()
        .map(|l| PToken { token: Some(l.token), text: l.text, span: l.span })
        .collect();
    tokens.extend(invalid.into_iter().map(|span| PToken {
        token: None,
        text: input[span.clone()].to_string(),
        span,
    }));
    tokens.sort_by_key(|t| t.span.start);
    tokens
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse a sheet, skipping malformed rules.
///
/// Returns every rule that parsed together with the errors for the ones that
/// did not. Never fails as a whole.
pub fn parse_stylesheet(input: &str) -> (StyleSheet, Vec<ParseError>) {
    let mut parser = Parser::new(input);
    let mut rules = Vec::new();

    while !parser.is_eof() {
        let start = parser.cursor;
        match parser.parse_top_level() {
            Ok(parsed) => rules.extend(parsed),
            Err(err) => {
                parser.errors.push(err);
                parser.recover(start);
            }
        }
    }

    (StyleSheet { rules }, parser.errors)
}

/// Parse a sheet, failing on the first error.
pub fn parse_css(input: &str) -> Result<StyleSheet, ParseError> {
    let (sheet, mut errors) = parse_stylesheet(input);
    if errors.is_empty() {
        Ok(sheet)
    } else {
        Err(errors.remove(0))
    }
}

/// Parse a comma-separated selector list such as `"#stop, .x > Static"`.
///
/// Used by the query interface. `&` is rejected outside nested rules.
pub fn parse_selector_list(input: &str) -> Result<Vec<Selector>, ParseError> {
    let mut parser = Parser::new(input);
    let selectors = parser.parse_selector_list(None)?;
    if let Some(tok) = parser.peek() {
        return Err(parser.selector_error(tok.span.start, format!("unexpected '{}'", tok.text)));
    }
    Ok(selectors)
}

/// Parse a bare declaration list such as `"color: red; width: 10"`.
pub fn parse_declarations(input: &str) -> Result<Vec<Declaration>, ParseError> {
    let mut parser = Parser::new(input);
    let mut declarations = Vec::new();
    while let Some(tok) = parser.peek() {
        if tok.token == Some(Token::Semicolon) {
            parser.advance();
            continue;
        }
        if let Some(decl) = parser.parse_declaration()? {
            declarations.push(decl);
        }
    }
    if let Some(err) = parser.errors.into_iter().next() {
        return Err(err);
    }
    Ok(declarations)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Recursive descent parser state.
struct Parser {
    source: String,
    tokens: Vec<PToken>,
    cursor: usize,
    variables: HashMap<String, Vec<DeclarationValue>>,
    /// Errors recovered from without aborting the current rule.
    errors: Vec<ParseError>,
}

impl Parser {
    fn new(input: &str) -> Self {
        let source = blank_comments(input);
        let tokens = tokenize_with_spans(&source);
        Self { source, tokens, cursor: 0, variables: HashMap::new(), errors: Vec::new() }
    }

    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn peek_kind(&self) -> Option<Token> {
        self.peek().and_then(|t| t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&PToken> {
        self.tokens.get(self.cursor + offset)
    }

    fn advance(&mut self) -> Option<PToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    /// Whether the current token starts exactly where the previous one ended.
    fn is_adjacent(&self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = &self.tokens[self.cursor - 1];
        self.peek().is_some_and(|curr| curr.span.start == prev.span.end)
    }

    fn position(&self, byte: usize) -> (usize, usize) {
        let byte = byte.min(self.source.len());
        let before = &self.source[..byte];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => byte - nl,
            None => byte + 1,
        };
        (line, column)
    }

    fn unexpected(&self, tok: &PToken, message: impl Into<String>) -> ParseError {
        let (line, column) = self.position(tok.span.start);
        match tok.token {
            None => ParseError::InvalidToken { line, column, text: tok.text.clone() },
            Some(_) => ParseError::UnexpectedToken { line, column, message: message.into() },
        }
    }

    fn selector_error(&self, byte: usize, message: impl Into<String>) -> ParseError {
        let (line, column) = self.position(byte);
        ParseError::Selector { line, column, message: message.into() }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<PToken, ParseError> {
        match self.advance() {
            Some(tok) if tok.token == Some(expected) => Ok(tok),
            Some(tok) => Err(self.unexpected(&tok, format!("expected {what}, got '{}'", tok.text))),
            None => Err(ParseError::UnexpectedEof(format!("expected {what}"))),
        }
    }

    /// Skip the remainder of a malformed item that started at token `start`.
    ///
    /// A rule is skipped through its matching `}`; a statement without a block
    /// is skipped through its `;`. Always makes progress.
    ///
    /// A string cut off at the end of its line may have swallowed the `}`
    /// closing the rule, in which case the rule is skipped through that
    /// string only.
    fn recover(&mut self, start: usize) {
        if let Some(resume) = self.broken_string_end(start) {
            self.cursor = resume;
            return;
        }
        let mut i = start;
        let mut depth = 0usize;
        while let Some(tok) = self.tokens.get(i) {
            i += 1;
            match tok.token {
                Some(Token::BraceOpen) => depth += 1,
                Some(Token::BraceClose) => {
                    if depth <= 1 {
                        break;
                    }
                    depth -= 1;
                }
                Some(Token::Semicolon) if depth == 0 => break,
                _ => {}
            }
        }
        self.cursor = i.max(start + 1);
    }

    /// Index just past the first unterminated string between `start` and
    /// the cursor.
    fn broken_string_end(&self, start: usize) -> Option<usize> {
        let end = (self.cursor + 1).min(self.tokens.len());
        self.tokens
            .get(start..end)?
            .iter()
            .position(PToken::is_broken_string)
            .map(|i| start + i + 1)
    }

    // -----------------------------------------------------------------------
    // Top level
    // -----------------------------------------------------------------------

    fn parse_top_level(&mut self) -> Result<Vec<RuleSet>, ParseError> {
        if self.at_variable_definition() {
            self.parse_variable_definition()?;
            return Ok(Vec::new());
        }
        self.parse_rule(None)
    }

    fn at_variable_definition(&self) -> bool {
        self.peek_kind() == Some(Token::Variable)
            && matches!(
                self.peek_at(1).and_then(|t| t.token),
                Some(Token::Colon) | Some(Token::PseudoClass)
            )
    }

    /// `$name: value ...;`
    fn parse_variable_definition(&mut self) -> Result<(), ParseError> {
        let name_tok = self.expect(Token::Variable, "variable name")?;
        let name = name_tok.text.trim_start_matches('$').to_string();
        let mut values = Vec::new();
        self.parse_colon_into(&mut values)?;

        loop {
            match self.peek_kind() {
                None if self.is_eof() => break,
                Some(Token::Semicolon) => {
                    self.advance();
                    break;
                }
                Some(Token::BraceClose) => break,
                _ => {
                    if let Some(tok) = self.peek().cloned() {
                        if tok.token == Some(Token::Variable) {
                            self.advance();
                            values.extend(self.lookup_variable(&tok)?);
                        } else {
                            values.push(self.parse_declaration_value()?);
                        }
                    }
                }
            }
        }

        if values.is_empty() {
            return Err(ParseError::UnexpectedEof(format!("expected a value for ${name}")));
        }
        self.variables.insert(name, values);
        Ok(())
    }

    fn lookup_variable(&self, tok: &PToken) -> Result<Vec<DeclarationValue>, ParseError> {
        let name = tok.text.trim_start_matches('$');
        self.variables.get(name).cloned().ok_or_else(|| {
            let (line, column) = self.position(tok.span.start);
            ParseError::UndefinedVariable { line, column, name: name.to_string() }
        })
    }

    /// Consume the `:` after a property or variable name.
    ///
    /// `color:red` lexes the colon and the first value as one pseudo-class
    /// token; that value is pushed onto `values`.
    fn parse_colon_into(&mut self, values: &mut Vec<DeclarationValue>) -> Result<(), ParseError> {
        match self.advance() {
            Some(tok) if tok.token == Some(Token::Colon) => Ok(()),
            Some(tok) if tok.token == Some(Token::PseudoClass) => {
                values.push(DeclarationValue::Ident(tok.text[1..].to_string()));
                Ok(())
            }
            Some(tok) => Err(self.unexpected(&tok, format!("expected ':', got '{}'", tok.text))),
            None => Err(ParseError::UnexpectedEof("expected ':'".into())),
        }
    }

    // -----------------------------------------------------------------------
    // Rules
    // -----------------------------------------------------------------------

    /// Parse `selectors { body }`. Returns the rule followed by any rules
    /// nested inside it, flattened.
    fn parse_rule(&mut self, parents: Option<&[Selector]>) -> Result<Vec<RuleSet>, ParseError> {
        let selectors = self.parse_selector_list(parents)?;
        self.expect(Token::BraceOpen, "'{'")?;
        let (declarations, nested) = self.parse_block(&selectors)?;

        let mut rules = Vec::with_capacity(1 + nested.len());
        rules.push(RuleSet { selectors, declarations });
        rules.extend(nested);
        Ok(rules)
    }

    /// Parse the inside of a `{ ... }` block, consuming the closing brace.
    fn parse_block(&mut self, selectors: &[Selector]) -> Result<(Vec<Declaration>, Vec<RuleSet>), ParseError> {
        let mut declarations = Vec::new();
        let mut nested = Vec::new();

        loop {
            match self.peek_kind() {
                None if self.is_eof() => {
                    return Err(ParseError::UnexpectedEof("expected '}'".into()));
                }
                Some(Token::BraceClose) => {
                    self.advance();
                    break;
                }
                Some(Token::Semicolon) => {
                    self.advance();
                }
                _ if self.at_variable_definition() => self.parse_variable_definition()?,
                _ if self.block_item_is_rule() => {
                    let start = self.cursor;
                    match self.parse_rule(Some(selectors)) {
                        Ok(rules) => nested.extend(rules),
                        Err(err) => {
                            self.errors.push(err);
                            self.recover(start);
                        }
                    }
                }
                _ => {
                    if let Some(decl) = self.parse_declaration()? {
                        declarations.push(decl);
                    }
                }
            }
        }

        Ok((declarations, nested))
    }

    /// A block item is a nested rule when `{` comes before `;` or `}`.
    fn block_item_is_rule(&self) -> bool {
        for tok in &self.tokens[self.cursor..] {
            match tok.token {
                Some(Token::BraceOpen) => return true,
                Some(Token::Semicolon) | Some(Token::BraceClose) => return false,
                None if tok.is_broken_string() => return false,
                _ => {}
            }
        }
        false
    }

    // -----------------------------------------------------------------------
    // Selectors
    // -----------------------------------------------------------------------

    fn parse_selector_list(&mut self, parents: Option<&[Selector]>) -> Result<Vec<Selector>, ParseError> {
        let mut selectors = Vec::new();
        loop {
            let start = self.peek().map(|t| t.span.start).unwrap_or(self.source.len());
            let selector = self.parse_selector()?;
            match parents {
                Some(parents) => {
                    for parent in parents {
                        let combined = nest_selector(parent, &selector)
                            .map_err(|message| self.selector_error(start, message))?;
                        selectors.push(combined);
                    }
                }
                None => {
                    if contains_nesting(&selector) {
                        return Err(self.selector_error(start, "'&' outside a nested rule"));
                    }
                    selectors.push(selector);
                }
            }
            if self.peek_kind() == Some(Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(selectors)
    }

    /// A chain of compound selectors joined by `>` or whitespace.
    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let mut selector = Selector::single(self.parse_compound_selector()?);

        loop {
            match self.peek_kind() {
                Some(Token::GreaterThan) => {
                    self.advance();
                    if !self.at_selector_start() {
                        let byte = self.peek().map(|t| t.span.start).unwrap_or(self.source.len());
                        return Err(self.selector_error(byte, "expected a selector after '>'"));
                    }
                    let compound = self.parse_compound_selector()?;
                    selector = selector.then(Combinator::Child, compound);
                }
                _ if self.at_selector_start() => {
                    let compound = self.parse_compound_selector()?;
                    selector = selector.then(Combinator::Descendant, compound);
                }
                Some(Token::Comma) | Some(Token::BraceOpen) => break,
                None if self.is_eof() => break,
                _ => {
                    let tok = self.peek().cloned();
                    if let Some(tok) = tok {
                        return Err(self.selector_error(
                            tok.span.start,
                            format!("unexpected '{}' in selector", tok.text),
                        ));
                    }
                    break;
                }
            }
        }

        Ok(selector)
    }

    fn at_selector_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(
                Token::Ident
                    | Token::Star
                    | Token::Dot
                    | Token::Hash
                    | Token::HexColor
                    | Token::PseudoClass
                    | Token::Ampersand
            )
        )
    }

    /// Simple selectors with no whitespace between them: `Static.title:hover`.
    fn parse_compound_selector(&mut self) -> Result<CompoundSelector, ParseError> {
        let mut components = vec![self.parse_simple_selector(true)?];
        while self.is_adjacent()
            && matches!(
                self.peek_kind(),
                Some(Token::Dot | Token::Hash | Token::HexColor | Token::PseudoClass | Token::Ampersand)
            )
        {
            components.push(self.parse_simple_selector(false)?);
        }
        Ok(CompoundSelector::new(components))
    }

    fn parse_simple_selector(&mut self, first: bool) -> Result<SelectorComponent, ParseError> {
        let Some(tok) = self.advance() else {
            return Err(ParseError::UnexpectedEof("expected a selector".into()));
        };
        match tok.token {
            Some(Token::Ident) if first => Ok(SelectorComponent::Type(tok.text)),
            Some(Token::Star) if first => Ok(SelectorComponent::Universal),
            Some(Token::Ampersand) => Ok(SelectorComponent::Nesting),
            Some(Token::Dot) => match self.peek() {
                Some(name) if name.token == Some(Token::Ident) && self.is_adjacent() => {
                    let name = name.text.clone();
                    self.advance();
                    Ok(SelectorComponent::Class(name))
                }
                _ => Err(self.selector_error(tok.span.start, "expected a class name after '.'")),
            },
            Some(Token::Hash) | Some(Token::HexColor) => {
                let name = self.take_raw_name(tok.span.start + 1);
                if name.is_empty() {
                    return Err(self.selector_error(tok.span.start, "expected an id after '#'"));
                }
                Ok(SelectorComponent::Id(name))
            }
            Some(Token::PseudoClass) => {
                let name = &tok.text[1..];
                PseudoClass::from_name(name)
                    .map(SelectorComponent::PseudoClass)
                    .ok_or_else(|| self.selector_error(tok.span.start, format!("unknown pseudo-class ':{name}'")))
            }
            _ => Err(self.selector_error(tok.span.start, format!("unexpected '{}' in selector", tok.text))),
        }
    }

    /// Read an id name straight from the source starting at byte `from`.
    ///
    /// Ids such as `add` or `a1-b` lex as hex colours or split tokens, so the
    /// name is taken from the text and every token inside it is consumed.
    fn take_raw_name(&mut self, from: usize) -> String {
        let rest = &self.source[from.min(self.source.len())..];
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let name = rest[..len].to_string();
        let end = from + len;
        while self.peek().is_some_and(|t| t.span.start < end) {
            self.cursor += 1;
        }
        name
    }

    // -----------------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------------

    /// `property: value1 value2 [!important];`
    ///
    /// Returns `Ok(None)` when the declaration referenced an undefined
    /// variable: the error is recorded and the declaration dropped.
    fn parse_declaration(&mut self) -> Result<Option<Declaration>, ParseError> {
        let prop_tok = match self.advance() {
            Some(tok) if tok.token == Some(Token::Ident) => tok,
            Some(tok) => {
                return Err(self.unexpected(&tok, format!("expected property name, got '{}'", tok.text)));
            }
            None => return Err(ParseError::UnexpectedEof("expected property name".into())),
        };

        let mut values = Vec::new();
        self.parse_colon_into(&mut values)?;
        let mut important = false;
        let mut undefined = None;

        loop {
            match self.peek_kind() {
                None if self.is_eof() => break,
                Some(Token::Semicolon) | Some(Token::BraceClose) => break,
                Some(Token::Important) => {
                    self.advance();
                    important = true;
                    match self.peek_kind() {
                        Some(Token::Semicolon) | Some(Token::BraceClose) => {}
                        None if self.is_eof() => {}
                        _ => {
                            let tok = self.peek().cloned();
                            if let Some(tok) = tok {
                                return Err(self.unexpected(&tok, "expected ';' after !important"));
                            }
                        }
                    }
                    break;
                }
                Some(Token::Variable) => {
                    if let Some(tok) = self.advance() {
                        match self.lookup_variable(&tok) {
                            Ok(substituted) => values.extend(substituted),
                            Err(err) => {
                                undefined.get_or_insert(err);
                            }
                        }
                    }
                }
                _ => values.push(self.parse_declaration_value()?),
            }
        }

        if self.peek_kind() == Some(Token::Semicolon) {
            self.advance();
        }

        if let Some(err) = undefined {
            self.errors.push(err);
            return Ok(None);
        }
        if values.is_empty() {
            return Err(self.unexpected(&prop_tok, format!("missing value for '{}'", prop_tok.text)));
        }

        Ok(Some(Declaration { property: prop_tok.text, values, important }))
    }

    /// Parse one value token into a [`DeclarationValue`].
    fn parse_declaration_value(&mut self) -> Result<DeclarationValue, ParseError> {
        let Some(tok) = self.advance() else {
            return Err(ParseError::UnexpectedEof("expected declaration value".into()));
        };

        match tok.token {
            Some(Token::Number) => tok
                .text
                .parse::<f32>()
                .map(DeclarationValue::Number)
                .map_err(|_| self.unexpected(&tok, format!("invalid number '{}'", tok.text))),
            Some(Token::Dimension) => {
                let (number, unit) = split_dimension(&tok.text)
                    .ok_or_else(|| self.unexpected(&tok, format!("invalid dimension '{}'", tok.text)))?;
                let n = number
                    .parse::<f32>()
                    .map_err(|_| self.unexpected(&tok, format!("invalid dimension '{}'", tok.text)))?;
                Ok(DeclarationValue::Dimension(n, unit.to_string()))
            }
            Some(Token::Ident) => Ok(DeclarationValue::Ident(tok.text)),
            Some(Token::HexColor) => Ok(DeclarationValue::Color(tok.text[1..].to_string())),
            Some(Token::StringLiteral) | Some(Token::StringLiteralSingle) => {
                Ok(DeclarationValue::String(tok.text[1..tok.text.len() - 1].to_string()))
            }
            _ => Err(self.unexpected(&tok, format!("unexpected '{}' in declaration value", tok.text))),
        }
    }
}

/// Combine a nested selector with its parent.
///
/// Every compound holding `&` is replaced by the parent selector, with the
/// compound's other components joined onto the parent's subject. Without any
/// `&` the nested selector is scoped as a descendant of the parent.
fn nest_selector(parent: &Selector, nested: &Selector) -> Result<Selector, String> {
    if nested.compounds.is_empty() {
        return Err("empty nested selector".into());
    }
    if !contains_nesting(nested) {
        return Ok(nested
            .combinators
            .iter()
            .zip(nested.compounds.iter().skip(1))
            .fold(parent.clone().then(Combinator::Descendant, nested.compounds[0].clone()), |acc, (c, compound)| {
                acc.then(*c, compound.clone())
            }));
    }

    let mut combined: Option<Selector> = None;
    for (i, compound) in nested.compounds.iter().enumerate() {
        let piece = if compound.components.contains(&SelectorComponent::Nesting) {
            let mut scoped = parent.clone();
            let extra = compound.components.iter().filter(|c| **c != SelectorComponent::Nesting).cloned();
            if let Some(subject) = scoped.compounds.last_mut() {
                subject.components.extend(extra);
            }
            scoped
        } else {
            Selector::single(compound.clone())
        };
        combined = Some(match combined {
            None => piece,
            Some(head) => {
                let combinator = nested.combinators.get(i - 1).copied().unwrap_or(Combinator::Descendant);
                join_selectors(head, combinator, piece)
            }
        });
    }
    combined.ok_or_else(|| "empty nested selector".into())
}

/// `head combinator tail`, keeping the combinators inside `tail`.
fn join_selectors(head: Selector, combinator: Combinator, tail: Selector) -> Selector {
    let mut compounds = tail.compounds.into_iter();
    let Some(first) = compounds.next() else {
        return head;
    };
    tail.combinators
        .into_iter()
        .zip(compounds)
        .fold(head.then(combinator, first), |acc, (c, compound)| acc.then(c, compound))
}

fn contains_nesting(selector: &Selector) -> bool {
    selector
        .compounds
        .iter()
        .any(|c| c.components.contains(&SelectorComponent::Nesting))
}

/// Split `"50%"` or `"1.5fr"` into number and unit.
fn split_dimension(s: &str) -> Option<(&str, &str)> {
    let unit_start = s
        .char_indices()
        .find(|(i, c)| !c.is_ascii_digit() && *c != '.' && !(*c == '-' && *i == 0))
        .map(|(i, _)| i)?;
    if unit_start == 0 || unit_start >= s.len() {
        return None;
    }
    Some((&s[..unit_start], &s[unit_start..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Helpers ──────────────────────────────────────────────────────

    fn parse(input: &str) -> StyleSheet {
        parse_css(input).unwrap_or_else(|e| panic!("parse failed: {e}"))
    }

    fn selector_text(rule: &RuleSet) -> Vec<String> {
        rule.selectors.iter().map(ToString::to_string).collect()
    }

    // ── Basic rules ──────────────────────────────────────────────────

    #[test]
    fn simple_rule() {
        let sheet = parse("Static { color: red; }");
        assert_eq!(sheet.len(), 1);
        let decl = &sheet.rules[0].declarations[0];
        assert_eq!(decl.property, "color");
        assert_eq!(decl.values, vec![DeclarationValue::Ident("red".into())]);
        assert!(!decl.important);
    }

    #[test]
    fn compound_and_combinators() {
        let sheet = parse("Screen > Container Static.title:hover, #stop { width: 10; }");
        assert_eq!(
            selector_text(&sheet.rules[0]),
            vec!["Screen > Container Static.title:hover", "#stop"]
        );
        let sel = &sheet.rules[0].selectors[0];
        assert_eq!(sel.combinators, vec![Combinator::Child, Combinator::Descendant]);
    }

    #[test]
    fn hex_like_ids_are_ids() {
        let sheet = parse("#add, #a1-b { color: red; }");
        assert_eq!(selector_text(&sheet.rules[0]), vec!["#add", "#a1-b"]);
    }

    #[test]
    fn colon_without_space_is_a_declaration() {
        let sheet = parse("Static{display:none;width:50%}");
        let decls = &sheet.rules[0].declarations;
        assert_eq!(decls[0].values, vec![DeclarationValue::Ident("none".into())]);
        assert_eq!(decls[1].values, vec![DeclarationValue::Dimension(50.0, "%".into())]);
    }

    #[test]
    fn value_kinds() {
        let sheet = parse("A { x: 1 2.5 1fr #ff0000 \"quoted\" auto 3w !important; }");
        let decl = &sheet.rules[0].declarations[0];
        assert!(decl.important);
        assert_eq!(
            decl.values,
            vec![
                DeclarationValue::Number(1.0),
                DeclarationValue::Number(2.5),
                DeclarationValue::Dimension(1.0, "fr".into()),
                DeclarationValue::Color("ff0000".into()),
                DeclarationValue::String("quoted".into()),
                DeclarationValue::Ident("auto".into()),
                DeclarationValue::Dimension(3.0, "w".into()),
            ]
        );
    }

    #[test]
    fn comments_are_ignored() {
        let sheet = parse("/* header */ Static { /* inline */ color: red; }");
        assert_eq!(sheet.rules[0].declarations.len(), 1);
    }

    // ── Variables ────────────────────────────────────────────────────

    #[test]
    fn variables_substitute_at_parse_time() {
        let sheet = parse("$accent: #00ff00; $edge: heavy $accent;\nStatic { color: $accent; border: $edge; }");
        let decls = &sheet.rules[0].declarations;
        assert_eq!(decls[0].values, vec![DeclarationValue::Color("00ff00".into())]);
        assert_eq!(
            decls[1].values,
            vec![DeclarationValue::Ident("heavy".into()), DeclarationValue::Color("00ff00".into())]
        );
    }

    #[test]
    fn undefined_variable_drops_only_that_declaration() {
        let (sheet, errors) = parse_stylesheet("Static { color: $missing; width: 4; }");
        assert_eq!(sheet.rules[0].declarations.len(), 1);
        assert_eq!(sheet.rules[0].declarations[0].property, "width");
        assert!(matches!(&errors[0], ParseError::UndefinedVariable { name, .. } if name == "missing"));
    }

    // ── Nesting ──────────────────────────────────────────────────────

    #[test]
    fn nested_rules_flatten_after_parent() {
        let sheet = parse(
            "Container { height: 1fr; &:focus-within { color: red; } .title { width: 3; } & > Static { width: 1; } }",
        );
        assert_eq!(sheet.len(), 4);
        assert_eq!(selector_text(&sheet.rules[0]), vec!["Container"]);
        assert_eq!(selector_text(&sheet.rules[1]), vec!["Container:focus-within"]);
        assert_eq!(selector_text(&sheet.rules[2]), vec!["Container .title"]);
        assert_eq!(selector_text(&sheet.rules[3]), vec!["Container > Static"]);
    }

    #[test]
    fn ampersand_scopes_from_any_compound() {
        let sheet = parse("Static.x { .dark & { color: red; } Container > &:focus Static { width: 1; } }");
        assert_eq!(selector_text(&sheet.rules[1]), vec![".dark Static.x"]);
        assert_eq!(selector_text(&sheet.rules[2]), vec!["Container > Static.x:focus Static"]);
        let sel = &sheet.rules[2].selectors[0];
        assert_eq!(sel.combinators, vec![Combinator::Child, Combinator::Descendant]);
    }

    #[test]
    fn nesting_multiplies_selector_lists() {
        let sheet = parse("A, B { &.x { color: red; } }");
        assert_eq!(selector_text(&sheet.rules[1]), vec!["A.x", "B.x"]);
    }

    #[test]
    fn ampersand_at_top_level_is_selector_error() {
        let (sheet, errors) = parse_stylesheet("&.x { color: red; } Static { color: blue; }");
        assert_eq!(sheet.len(), 1);
        assert!(matches!(errors[0], ParseError::Selector { .. }));
    }

    // ── Recovery ─────────────────────────────────────────────────────

    #[test]
    fn malformed_rule_is_skipped() {
        let css = "Static { color red; }\n#ok { width: 3; }\n.bad { : ; }\n.good { height: 2; }";
        let (sheet, errors) = parse_stylesheet(css);
        assert_eq!(sheet.len(), 2);
        assert_eq!(selector_text(&sheet.rules[0]), vec!["#ok"]);
        assert_eq!(selector_text(&sheet.rules[1]), vec![".good"]);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn unknown_pseudo_class_is_selector_error() {
        let (sheet, errors) = parse_stylesheet("Static:visited { color: red; }\nStatic { color: blue; }");
        assert_eq!(sheet.len(), 1);
        match &errors[0] {
            ParseError::Selector { line, message, .. } => {
                assert_eq!(*line, 1);
                assert!(message.contains("visited"), "message: {message}");
            }
            other => panic!("expected selector error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_characters_skip_the_rule() {
        let (sheet, errors) = parse_stylesheet("A { color: ~red; }\nB { color: red; }");
        assert_eq!(sheet.len(), 1);
        assert!(matches!(errors[0], ParseError::InvalidToken { line: 1, .. }));
    }

    #[test]
    fn unterminated_string_skips_only_its_rule() {
        let (sheet, errors) = parse_stylesheet("A { color: \"bad; }\nB { width: 2; }\nC { width: 3; }");
        assert_eq!(sheet.len(), 2);
        assert_eq!(selector_text(&sheet.rules[0]), vec!["B"]);
        assert_eq!(selector_text(&sheet.rules[1]), vec!["C"]);
        assert_eq!(
            errors,
            vec![ParseError::InvalidToken { line: 1, column: 12, text: "\"bad; }".into() }]
        );
    }

    #[test]
    fn nested_error_keeps_parent() {
        let (sheet, errors) = parse_stylesheet("A { width: 1; .x:bogus { color: red; } height: 2; }");
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.rules[0].declarations.len(), 2);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn error_positions_are_line_and_column() {
        let err = parse_css("A { width: 1; }\nB {\n  color: red\n  ; x }").unwrap_err();
        match err {
            ParseError::UnexpectedToken { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unterminated_block_is_eof_error() {
        let (sheet, errors) = parse_stylesheet("A { width: 1;");
        assert!(sheet.is_empty());
        assert!(matches!(errors[0], ParseError::UnexpectedEof(_)));
    }

    // ── Standalone entry points ──────────────────────────────────────

    #[test]
    fn selector_list_entry_point() {
        let list = parse_selector_list(".x > #y, Static").unwrap();
        assert_eq!(list.len(), 2);
        assert!(parse_selector_list("Static {").is_err());
        assert!(parse_selector_list(":nope").is_err());
    }

    #[test]
    fn declarations_entry_point() {
        let decls = parse_declarations("color: red; width: 10 !important").unwrap();
        assert_eq!(decls.len(), 2);
        assert!(decls[1].important);
    }

    #[test]
    fn split_dimension_cases() {
        assert_eq!(split_dimension("50%"), Some(("50", "%")));
        assert_eq!(split_dimension("-1.5fr"), Some(("-1.5", "fr")));
        assert_eq!(split_dimension("10"), None);
    }
}
