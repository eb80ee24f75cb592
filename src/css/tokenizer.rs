//! logos-based style sheet tokenizer.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `#fff` as HexColor beats `#` as Hash)
//! 2. For equal length matches, earlier-defined variants win
//!
//! Consequences the parser has to live with:
//! - `#add` lexes as [`Token::HexColor`] even in selector position
//! - `color:red` lexes as `Ident` + [`Token::PseudoClass`]
//! - `1fr` and `3w` lex as [`Token::Dimension`], not `Number` + `Ident`

use std::ops::Range;

use logos::Logos;

/// Style sheet token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Compound tokens ──────────────────────────────────────────────

    /// `!important` flag.
    #[regex(r"![ \t]*important")]
    Important,

    /// Hex color: `#fff`, `#ff00aa`, `#ff00aa80` (3-8 hex digits).
    #[regex(r"#[0-9a-fA-F]{3,8}")]
    HexColor,

    /// Number with a unit suffix: `1fr`, `50%`, `10vw`, `80vh`, `25w`, `50h`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?(fr|%|vw|vh|w|h)")]
    Dimension,

    /// Pseudo-class: `:hover`, `:focus-within`.
    #[regex(r":[a-zA-Z][a-zA-Z0-9_-]*")]
    PseudoClass,

    /// Double-quoted string literal. Strings never span lines.
    #[regex(r#""[^"\n]*""#)]
    StringLiteral,

    /// Single-quoted string literal.
    #[regex(r"'[^'\n]*'")]
    StringLiteralSingle,

    /// A string cut off by the end of its line. [`lex`] reports it as invalid
    /// input so the damage stops at the newline.
    #[regex(r#""[^"\n]*|'[^'\n]*"#)]
    UnterminatedString,

    /// Variable reference or definition: `$primary`, `$bg-color`.
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_-]*")]
    Variable,

    /// Integer or float, possibly negative.
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    /// Property names, type selectors, keywords, colour names.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    // ── Single-character punctuation ─────────────────────────────────

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("#")]
    Hash,

    #[token("*")]
    Star,

    #[token(">")]
    GreaterThan,

    /// Nesting selector.
    #[token("&")]
    Ampersand,
}

/// A token with its source text and byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub text: String,
    pub span: Range<usize>,
}

/// Lex `input` into lexemes, collecting the byte ranges logos could not match.
pub fn lex(input: &str) -> (Vec<Lexeme>, Vec<Range<usize>>) {
    let mut lexemes = Vec::new();
    let mut invalid = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(Token::UnterminatedString) | Err(()) => invalid.push(span),
            Ok(token) => lexemes.push(Lexeme {
                token,
                text: input[span.clone()].to_string(),
                span,
            }),
        }
    }
    (lexemes, invalid)
}

/// Tokenize into `(Token, text)` pairs, dropping anything unrecognised.
pub fn tokenize(input: &str) -> Vec<(Token, String)> {
    lex(input)
        .0
        .into_iter()
        .map(|l| (l.token, l.text))
        .collect()
}
