//! Lexer for SQL DDL using logos.
//!
//! Keywords are matched case-insensitively. Only the words the DDL parser
//! branches on are keywords; everything else (type names, `ASC`, `DEFERRABLE`
//! and so on) lexes as [`Token::Ident`]. Most keywords are non-reserved in
//! practice (`type`, `data` and `key` are common column names), so the parser
//! accepts them wherever a name is expected via [`Token::name_text`].

use crate::error::ParseError;
use crate::span::Span;
use logos::Logos;
use std::fmt;

/// Token types for SQL DDL.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"--[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token {
    // Statement keywords
    #[token("create", ignore(ascii_case))]
    Create,
    #[token("alter", ignore(ascii_case))]
    Alter,
    #[token("drop", ignore(ascii_case))]
    Drop,
    #[token("table", ignore(ascii_case))]
    Table,
    #[token("temp", ignore(ascii_case))]
    Temp,
    #[token("temporary", ignore(ascii_case))]
    Temporary,
    #[token("unlogged", ignore(ascii_case))]
    Unlogged,

    // Existence guards
    #[token("if", ignore(ascii_case))]
    If,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("exists", ignore(ascii_case))]
    Exists,

    // ALTER TABLE actions
    #[token("add", ignore(ascii_case))]
    Add,
    #[token("column", ignore(ascii_case))]
    Column,
    #[token("rename", ignore(ascii_case))]
    Rename,
    #[token("to", ignore(ascii_case))]
    To,
    #[token("type", ignore(ascii_case))]
    Type,
    #[token("set", ignore(ascii_case))]
    Set,
    #[token("data", ignore(ascii_case))]
    Data,
    #[token("using", ignore(ascii_case))]
    Using,
    #[token("only", ignore(ascii_case))]
    Only,
    #[token("cascade", ignore(ascii_case))]
    Cascade,
    #[token("restrict", ignore(ascii_case))]
    Restrict,

    // Column and table constraints
    #[token("null", ignore(ascii_case))]
    Null,
    #[token("primary", ignore(ascii_case))]
    Primary,
    #[token("key", ignore(ascii_case))]
    Key,
    #[token("foreign", ignore(ascii_case))]
    Foreign,
    #[token("references", ignore(ascii_case))]
    References,
    #[token("unique", ignore(ascii_case))]
    Unique,
    #[token("check", ignore(ascii_case))]
    Check,
    #[token("constraint", ignore(ascii_case))]
    Constraint,
    #[token("default", ignore(ascii_case))]
    Default,
    #[token("collate", ignore(ascii_case))]
    Collate,
    #[token("generated", ignore(ascii_case))]
    Generated,
    #[token("autoincrement", ignore(ascii_case))]
    Autoincrement,
    #[token("as", ignore(ascii_case))]
    As,
    #[token("like", ignore(ascii_case))]
    Like,
    #[token("on", ignore(ascii_case))]
    On,

    /// Unquoted identifier or non-keyword word.
    #[regex(r"[A-Za-z_][A-Za-z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// Quoted identifier: `"name"`, `` `name` `` or `[name]`.
    #[regex(r#""([^"]|"")*""#, |lex| unquote(lex.slice(), '"'))]
    #[regex(r"`([^`]|``)*`", |lex| unquote(lex.slice(), '`'))]
    #[regex(r"\[[A-Za-z_][^\]]*\]", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    QuotedIdent(String),

    /// Single-quoted string literal.
    #[regex(r"'([^']|'')*'", |lex| unquote(lex.slice(), '\''))]
    String(String),

    /// Dollar-quoted string body: `$$...$$` or `$tag$...$tag$`.
    #[regex(r"\$([A-Za-z_][A-Za-z0-9_]*)?\$", dollar_quoted)]
    DollarString(String),

    /// Numeric literal, kept as written.
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,

    /// Any single operator character (`::` lexes as two `:`).
    #[regex(r"[-+*/%<>=!|&~^:?@#]", |lex| lex.slice().to_string())]
    Operator(String),
}

/// Strip the surrounding quote characters and collapse doubled quotes.
fn unquote(s: &str, quote: char) -> String {
    let inner = &s[1..s.len() - 1];
    let doubled: String = [quote, quote].iter().collect();
    inner.replace(&doubled, &quote.to_string())
}

/// Consume up to the closing tag; an unterminated body is a lex error.
fn dollar_quoted(lex: &mut logos::Lexer<'_, Token>) -> Option<String> {
    let tag = lex.slice();
    let end = lex.remainder().find(tag)?;
    let body = lex.remainder()[..end].to_string();
    lex.bump(end + tag.len());
    Some(body)
}

impl Token {
    /// The lower-case spelling of a keyword token.
    pub fn keyword(&self) -> Option<&'static str> {
        let kw = match self {
            Token::Create => "create",
            Token::Alter => "alter",
            Token::Drop => "drop",
            Token::Table => "table",
            Token::Temp => "temp",
            Token::Temporary => "temporary",
            Token::Unlogged => "unlogged",
            Token::If => "if",
            Token::Not => "not",
            Token::Exists => "exists",
            Token::Add => "add",
            Token::Column => "column",
            Token::Rename => "rename",
            Token::To => "to",
            Token::Type => "type",
            Token::Set => "set",
            Token::Data => "data",
            Token::Using => "using",
            Token::Only => "only",
            Token::Cascade => "cascade",
            Token::Restrict => "restrict",
            Token::Null => "null",
            Token::Primary => "primary",
            Token::Key => "key",
            Token::Foreign => "foreign",
            Token::References => "references",
            Token::Unique => "unique",
            Token::Check => "check",
            Token::Constraint => "constraint",
            Token::Default => "default",
            Token::Collate => "collate",
            Token::Generated => "generated",
            Token::Autoincrement => "autoincrement",
            Token::As => "as",
            Token::Like => "like",
            Token::On => "on",
            _ => return None,
        };
        Some(kw)
    }

    /// The identifier this token names, if it can stand in a name position.
    ///
    /// Unquoted identifiers and keywords fold to lower case; quoted
    /// identifiers keep their exact spelling.
    pub fn name_text(&self) -> Option<String> {
        match self {
            Token::Ident(s) => Some(s.to_ascii_lowercase()),
            Token::QuotedIdent(s) => Some(s.clone()),
            other => other.keyword().map(str::to_string),
        }
    }

    /// Check whether this is an unquoted word equal to `word`, ignoring case.
    pub fn is_word(&self, word: &str) -> bool {
        match self {
            Token::Ident(s) => s.eq_ignore_ascii_case(word),
            other => other.keyword() == Some(word),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kw) = self.keyword() {
            return write!(f, "'{}'", kw.to_ascii_uppercase());
        }
        match self {
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::QuotedIdent(s) => write!(f, "quoted identifier \"{}\"", s),
            Token::String(s) => write!(f, "string '{}'", s),
            Token::DollarString(_) => write!(f, "dollar-quoted string"),
            Token::Number(n) => write!(f, "number {}", n),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Comma => write!(f, "','"),
            Token::Dot => write!(f, "'.'"),
            Token::Semicolon => write!(f, "';'"),
            Token::Operator(op) => write!(f, "'{}'", op),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lenient lexer that skips characters it cannot tokenize.
///
/// Used for classification, where a statement we do not care about (a
/// function body, an extension) must never produce an error.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
        }
    }

    /// Get the source string.
    pub fn source(&self) -> &'source str {
        self.inner.source()
    }
}

impl Iterator for Lexer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(token) => {
                    return Some(SpannedToken {
                        token,
                        span: self.inner.span().into(),
                    })
                }
                Err(()) => continue,
            }
        }
    }
}

/// Tokenize a statement, failing on the first character that is not valid SQL.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span: Span = lexer.span().into();
        match result {
            Ok(token) => tokens.push(SpannedToken { token, span }),
            Err(()) => {
                return Err(ParseError::new(
                    format!("unexpected character '{}'", lexer.slice()),
                    span,
                ))
            }
        }
    }

    Ok(tokens)
}
