//! Cheap keyword-prefix classification of raw SQL statements.
//!
//! Classification never fails: anything that is not a recognizable
//! CREATE/ALTER/DROP TABLE comes back as `None` and is skipped by replay.

use crate::ast::ObjectName;
use crate::lexer::{Lexer, SpannedToken, Token};

/// The kind of table-shaping DDL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdlKind {
    CreateTable,
    AlterTable,
    DropTable,
}

impl std::fmt::Display for DdlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DdlKind::CreateTable => write!(f, "CREATE TABLE"),
            DdlKind::AlterTable => write!(f, "ALTER TABLE"),
            DdlKind::DropTable => write!(f, "DROP TABLE"),
        }
    }
}

/// A classified statement: what it does and which table it targets.
///
/// For a multi-table `DROP TABLE` the target is the first table named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: DdlKind,
    pub table: ObjectName,
}

/// Classify a statement by its leading keywords.
pub fn classify(sql: &str) -> Option<Classification> {
    // Only the prefix matters; no statement needs more than a dozen tokens
    // before its table name.
    let tokens: Vec<SpannedToken> = Lexer::new(sql).take(16).collect();
    let mut scan = Scan { tokens, pos: 0 };

    let kind = match scan.next()? {
        Token::Create => {
            // CREATE [GLOBAL|LOCAL] [TEMP|TEMPORARY|UNLOGGED] TABLE
            while scan.peek_is_word("global") || scan.peek_is_word("local") {
                scan.pos += 1;
            }
            if matches!(scan.peek(), Some(Token::Temp | Token::Temporary | Token::Unlogged)) {
                scan.pos += 1;
            }
            scan.expect(&Token::Table)?;
            scan.skip_sequence(&[Token::If, Token::Not, Token::Exists]);
            DdlKind::CreateTable
        }
        Token::Alter => {
            scan.expect(&Token::Table)?;
            scan.skip_sequence(&[Token::If, Token::Exists]);
            if scan.peek() == Some(&Token::Only) {
                scan.pos += 1;
            }
            DdlKind::AlterTable
        }
        Token::Drop => {
            scan.expect(&Token::Table)?;
            scan.skip_sequence(&[Token::If, Token::Exists]);
            DdlKind::DropTable
        }
        _ => return None,
    };

    let table = scan.object_name()?;
    Some(Classification { kind, table })
}

struct Scan {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Scan {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_is_word(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.is_word(word))
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek()?.clone();
        self.pos += 1;
        Some(token)
    }

    fn expect(&mut self, expected: &Token) -> Option<()> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    /// Skip `seq` only if it appears in full.
    fn skip_sequence(&mut self, seq: &[Token]) {
        let matches = seq
            .iter()
            .enumerate()
            .all(|(i, t)| self.tokens.get(self.pos + i).map(|s| &s.token) == Some(t));
        if matches {
            self.pos += seq.len();
        }
    }

    fn name(&mut self) -> Option<String> {
        let name = self.peek()?.name_text()?;
        self.pos += 1;
        Some(name)
    }

    fn object_name(&mut self) -> Option<ObjectName> {
        let first = self.name()?;
        if self.peek() == Some(&Token::Dot) {
            self.pos += 1;
            let second = self.name()?;
            Some(ObjectName::qualified(first, second))
        } else {
            Some(ObjectName::bare(first))
        }
    }
}
