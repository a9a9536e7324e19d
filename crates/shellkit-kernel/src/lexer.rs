//! Lexer for the expression language.
//!
//! Converts expression text into a stream of tokens using the logos
//! lexer generator. Expressions are the right-hand side of `set`, the
//! argument of `echo`, and the guard of `if`/`elif`/`while`.
//!
//! # Token categories
//!
//! - **Literals**: integers, reals, `True`/`False`, single- or
//!   double-quoted strings with backslash escaping
//! - **Variable references**: `$name` or `${name}`
//! - **Operators**: `**`, unary `-`, `* / // %`, `+ -`, comparisons,
//!   `not`, `and`, `or`
//! - **Parentheses**
//!
//! Numbers are lexed unsigned; negative literals are built by the
//! parser from the prefix `-` operator.

use logos::{Logos, Span};
use std::fmt;

/// A token with its span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub token: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(token: T, span: Span) -> Self {
        Self { token, span }
    }
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexError {
    #[default]
    UnexpectedCharacter,
    UnterminatedString,
    /// `${name` with no closing brace. Carries the name for the error
    /// message.
    UnterminatedVarRef(String),
    InvalidNumber,
    /// Float without a leading digit (like `.5`).
    InvalidFloatNoLeading,
    /// Float without a trailing digit (like `5.`).
    InvalidFloatNoTrailing,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedCharacter => write!(f, "unexpected character"),
            LexError::UnterminatedString => write!(f, "unterminated string"),
            LexError::UnterminatedVarRef(name) => {
                write!(f, "missing '}}' after '${{{name}'")
            }
            LexError::InvalidNumber => write!(f, "invalid number"),
            LexError::InvalidFloatNoLeading => write!(f, "real must have a leading digit"),
            LexError::InvalidFloatNoTrailing => write!(f, "real must have a trailing digit"),
        }
    }
}

/// Tokens of the expression language.
///
/// Multi-character operators must come before their single-character
/// prefixes so logos resolves `**` and `//` by longest match. Tokens
/// that carry semantic values (numbers, strings, names) include the
/// parsed value directly.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t]+")]
pub enum Token {
    // Word operators and boolean keywords
    #[token("not")]
    Not,

    #[token("and")]
    And,

    #[token("or")]
    Or,

    #[token("True")]
    True,

    #[token("False")]
    False,

    // Multi-character operators
    #[token("**")]
    Pow,

    #[token("//")]
    SlashSlash,

    #[token(">=")]
    GtEq,

    #[token("<=")]
    LtEq,

    #[token("==")]
    EqEq,

    #[token("!=")]
    NotEq,

    // Single-character operators and punctuation
    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token(">")]
    Gt,

    #[token("<")]
    Lt,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    // Literals (with values)
    /// Double-quoted string — value is the content with escapes
    /// processed, quotes removed. `\$` is kept verbatim so the
    /// interpolation pass can see the suppression.
    #[regex(r#""([^"\\]|\\.)*""#, lex_string)]
    #[regex(r"'([^'\\]|\\.)*'", lex_string)]
    Str(String),

    /// Braced variable reference: `${name}` — value is the bare name.
    #[regex(r"\$\{[a-zA-Z_][a-zA-Z0-9_]*\}", lex_braced_var)]
    /// Simple variable reference: `$name` — value is the bare name.
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*", lex_simple_var)]
    Var(String),

    /// Real literal — value is the parsed f64.
    #[regex(r"[0-9]+\.[0-9]+", lex_float)]
    Float(f64),

    /// Integer literal — value is the parsed i64.
    #[regex(r"[0-9]+", lex_int, priority = 3)]
    Int(i64),

    // Invalid patterns (caught before valid tokens for better errors)
    /// `${name` with no closing brace.
    #[regex(r"\$\{[a-zA-Z_][a-zA-Z0-9_]*", lex_unterminated_var)]
    UnterminatedVar,

    /// Unterminated quoted string (no closing quote before end).
    #[regex(r#""([^"\\]|\\.)*"#, lex_unterminated_string)]
    #[regex(r"'([^'\\]|\\.)*", lex_unterminated_string)]
    UnterminatedStr,

    /// Float without leading digit (like `.5`).
    #[regex(r"\.[0-9]+", lex_invalid_float_no_leading, priority = 3)]
    InvalidFloatNoLeading,

    /// Float without trailing digit (like `5.`). Logos uses longest
    /// match, so valid reals like `5.5` win over this pattern.
    #[regex(r"[0-9]+\.", lex_invalid_float_no_trailing, priority = 2)]
    InvalidFloatNoTrailing,
}

/// Semantic category for syntax highlighting.
///
/// Consumers match on categories instead of individual tokens, which
/// insulates them from lexer evolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    /// Word operators and boolean literals: `not`, `and`, `or`,
    /// `True`, `False`.
    Keyword,
    /// Symbolic operators.
    Operator,
    /// Quoted strings.
    String,
    /// Integer and real literals.
    Number,
    /// `$name` / `${name}` references.
    Variable,
    /// Parentheses.
    Punctuation,
    /// Invalid tokens.
    Error,
}

impl Token {
    /// Returns the semantic category for syntax highlighting.
    pub fn category(&self) -> TokenCategory {
        match self {
            Token::Not | Token::And | Token::Or | Token::True | Token::False => {
                TokenCategory::Keyword
            }
            Token::Pow
            | Token::SlashSlash
            | Token::GtEq
            | Token::LtEq
            | Token::EqEq
            | Token::NotEq
            | Token::Star
            | Token::Slash
            | Token::Percent
            | Token::Plus
            | Token::Minus
            | Token::Gt
            | Token::Lt => TokenCategory::Operator,
            Token::Str(_) => TokenCategory::String,
            Token::Float(_) | Token::Int(_) => TokenCategory::Number,
            Token::Var(_) => TokenCategory::Variable,
            Token::LParen | Token::RParen => TokenCategory::Punctuation,
            Token::UnterminatedVar
            | Token::UnterminatedStr
            | Token::InvalidFloatNoLeading
            | Token::InvalidFloatNoTrailing => TokenCategory::Error,
        }
    }
}

/// Process backslash escapes in quoted-string content.
///
/// `\$` is preserved as-is: the evaluator's interpolation pass uses it
/// to suppress variable substitution and strips the backslash there.
fn unescape(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('$') => {
                out.push('\\');
                out.push('$');
            }
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            // Unknown escape: keep both characters
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Lex a quoted string literal, stripping quotes and processing escapes.
fn lex_string(lex: &mut logos::Lexer<Token>) -> String {
    let s = lex.slice();
    unescape(&s[1..s.len() - 1])
}

/// Lex `${name}` → `name`.
fn lex_braced_var(lex: &mut logos::Lexer<Token>) -> String {
    let s = lex.slice();
    s[2..s.len() - 1].to_string()
}

/// Lex `$name` → `name`.
fn lex_simple_var(lex: &mut logos::Lexer<Token>) -> String {
    lex.slice()[1..].to_string()
}

fn lex_int(lex: &mut logos::Lexer<Token>) -> Result<i64, LexError> {
    lex.slice().parse().map_err(|_| LexError::InvalidNumber)
}

fn lex_float(lex: &mut logos::Lexer<Token>) -> Result<f64, LexError> {
    lex.slice().parse().map_err(|_| LexError::InvalidNumber)
}

/// Always errors: `${name` never got its closing brace.
fn lex_unterminated_var(lex: &mut logos::Lexer<Token>) -> Result<(), LexError> {
    Err(LexError::UnterminatedVarRef(lex.slice()[2..].to_string()))
}

fn lex_unterminated_string(_lex: &mut logos::Lexer<Token>) -> Result<(), LexError> {
    Err(LexError::UnterminatedString)
}

fn lex_invalid_float_no_leading(_lex: &mut logos::Lexer<Token>) -> Result<(), LexError> {
    Err(LexError::InvalidFloatNoLeading)
}

fn lex_invalid_float_no_trailing(_lex: &mut logos::Lexer<Token>) -> Result<(), LexError> {
    Err(LexError::InvalidFloatNoTrailing)
}

/// Tokenize expression text.
///
/// Returns the token stream, or the first lexical error with its span.
pub fn tokenize(text: &str) -> Result<Vec<Spanned<Token>>, Spanned<LexError>> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(text).spanned() {
        match result {
            Ok(token) => tokens.push(Spanned::new(token, span)),
            Err(err) => return Err(Spanned::new(err, span)),
        }
    }
    Ok(tokens)
}

/// Best-effort tokenization for highlighting: lexical errors become
/// `Error`-category spans instead of aborting the scan.
pub fn scan_for_highlight(text: &str) -> Vec<(TokenCategory, Span)> {
    let mut spans = Vec::new();
    for (result, span) in Token::lexer(text).spanned() {
        match result {
            Ok(token) => spans.push((token.category(), span)),
            Err(_) => spans.push((TokenCategory::Error, span)),
        }
    }
    spans
}
