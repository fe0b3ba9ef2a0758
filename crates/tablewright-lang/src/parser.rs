//! Recursive descent parser for table DDL.
//!
//! Only the parts of a statement that shape a table are modelled. Expressions
//! (defaults, checks, generated columns) are captured as raw text or skipped
//! by balancing parentheses, so any dialect's expression syntax passes through.

use crate::ast::*;
use crate::classify::classify;
use crate::error::ParseError;
use crate::lexer::{tokenize, SpannedToken, Token};
use crate::span::{collapse_whitespace, Span, Spanned};

/// Parser for a single DDL statement.
pub struct Parser<'source> {
    tokens: Vec<SpannedToken>,
    pos: usize,
    source: &'source str,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            source,
        })
    }

    /// Parse a complete CREATE, ALTER or DROP TABLE statement.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let stmt = match self.peek() {
            Some(Token::Create) => Statement::CreateTable(self.parse_create_table()?),
            Some(Token::Alter) => Statement::AlterTable(self.parse_alter_table()?),
            Some(Token::Drop) => Statement::DropTable(self.parse_drop_table()?),
            _ => return Err(self.unexpected("CREATE, ALTER or DROP")),
        };
        self.expect_end()?;
        Ok(stmt)
    }

    // ---- CREATE TABLE ----

    fn parse_create_table(&mut self) -> Result<CreateTable, ParseError> {
        let start = self.expect(Token::Create, "CREATE")?;
        while self.peek_is_word("global") || self.peek_is_word("local") {
            self.pos += 1;
        }
        let temporary = self.eat(&Token::Temp) || self.eat(&Token::Temporary);
        self.eat(&Token::Unlogged);
        self.expect(Token::Table, "TABLE")?;
        let if_not_exists = self.eat_sequence(&[Token::If, Token::Not, Token::Exists]);
        let name = self.parse_object_name()?;

        let mut columns = Vec::new();
        let mut constraints = Vec::new();
        let mut source = TableSource::Definition;

        if self.check(&Token::As) {
            self.pos = self.tokens.len();
            source = TableSource::Query;
        } else {
            self.expect(Token::LParen, "'(' or AS")?;
            loop {
                if self.eat(&Token::Like) {
                    let like = self.parse_object_name()?;
                    source = TableSource::Like(like.value);
                    // INCLUDING / EXCLUDING options
                    self.skip_to_separator();
                } else if self.at_table_constraint() {
                    constraints.push(self.parse_table_constraint()?);
                } else {
                    columns.push(self.parse_column_def()?);
                }
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen, "',' or ')'")?;

            // WITHOUT ROWID, STRICT, INHERITS (..), WITH (..), ENGINE=..., AS SELECT
            loop {
                match self.peek() {
                    None | Some(Token::Semicolon) => break,
                    Some(Token::As) => {
                        self.pos = self.tokens.len();
                        source = TableSource::Query;
                    }
                    Some(Token::LParen) => self.skip_group()?,
                    Some(_) => self.pos += 1,
                }
            }
        }

        Ok(CreateTable {
            name,
            if_not_exists,
            temporary,
            columns,
            constraints,
            source,
            span: start.merge(self.prev_span()),
        })
    }

    fn at_table_constraint(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Constraint | Token::Primary | Token::Foreign | Token::Unique | Token::Check)
        )
    }

    fn parse_table_constraint(&mut self) -> Result<TableConstraint, ParseError> {
        let name = if self.eat(&Token::Constraint) {
            Some(self.expect_name("constraint name")?.value)
        } else {
            None
        };

        let constraint = if self.eat(&Token::Primary) {
            self.expect(Token::Key, "KEY")?;
            TableConstraint::PrimaryKey {
                name,
                columns: self.parse_name_list()?,
            }
        } else if self.eat(&Token::Foreign) {
            self.expect(Token::Key, "KEY")?;
            let columns = self.parse_name_list()?;
            self.expect(Token::References, "REFERENCES")?;
            let (table, referenced_columns) = self.parse_reference_target()?;
            TableConstraint::ForeignKey {
                name,
                columns,
                table,
                referenced_columns,
            }
        } else if self.eat(&Token::Unique) {
            self.eat(&Token::Key);
            TableConstraint::Unique {
                name,
                columns: self.parse_name_list()?,
            }
        } else if self.eat(&Token::Check) {
            self.skip_group()?;
            TableConstraint::Check { name }
        } else {
            return Err(self.unexpected("PRIMARY KEY, FOREIGN KEY, UNIQUE or CHECK"));
        };

        // ON CONFLICT, DEFERRABLE, USING INDEX TABLESPACE, ...
        self.skip_to_separator();
        Ok(constraint)
    }

    /// `table [(col, ...)] [ON DELETE action] [ON UPDATE action] [MATCH kind]`
    fn parse_reference_target(&mut self) -> Result<(ObjectName, Vec<String>), ParseError> {
        let table = self.parse_object_name()?.value;
        let columns = if self.check(&Token::LParen) {
            self.parse_name_list()?
        } else {
            Vec::new()
        };

        loop {
            if self.check(&Token::On)
                && (self.peek_at_is_word(1, "delete") || self.peek_at_is_word(1, "update"))
            {
                self.pos += 2;
                self.parse_referential_action()?;
            } else if self.peek_is_word("match") {
                self.pos += 2;
            } else {
                break;
            }
        }

        Ok((table, columns))
    }

    fn parse_referential_action(&mut self) -> Result<(), ParseError> {
        if self.eat(&Token::Cascade) || self.eat(&Token::Restrict) {
            return Ok(());
        }
        if self.eat(&Token::Set) {
            if !(self.eat(&Token::Null) || self.eat(&Token::Default)) {
                return Err(self.unexpected("NULL or DEFAULT"));
            }
            // PostgreSQL 15 column list: SET NULL (col)
            if self.check(&Token::LParen) {
                self.skip_group()?;
            }
            return Ok(());
        }
        if self.peek_is_word("no") && self.peek_at_is_word(1, "action") {
            self.pos += 2;
            return Ok(());
        }
        Err(self.unexpected("referential action"))
    }

    // ---- Column definitions ----

    fn parse_column_def(&mut self) -> Result<ColumnDef, ParseError> {
        let name = self.expect_name("column name")?;
        let data_type = self
            .raw_until(starts_column_constraint)
            .map(|span| collapse_whitespace(span.slice(self.source)))
            .unwrap_or_default();

        let mut constraints = Vec::new();
        while !self.at_separator() {
            if let Some(constraint) = self.parse_column_constraint()? {
                constraints.push(constraint);
            }
        }

        Ok(ColumnDef {
            span: name.span.merge(self.prev_span()),
            name,
            data_type,
            constraints,
        })
    }

    /// Parse one column constraint. Always consumes at least one token;
    /// returns `None` for clauses that carry nothing we track.
    fn parse_column_constraint(&mut self) -> Result<Option<ColumnConstraint>, ParseError> {
        if self.eat(&Token::Constraint) {
            self.expect_name("constraint name")?;
            return Ok(None);
        }
        if self.eat(&Token::Not) {
            if self.eat(&Token::Null) {
                return Ok(Some(ColumnConstraint::NotNull));
            }
            if self.peek_is_word("deferrable") {
                self.pos += 1;
                return Ok(None);
            }
            return Err(self
                .unexpected("NULL")
                .with_hint("write NOT NULL to make the column required"));
        }
        if self.eat(&Token::Null) {
            return Ok(Some(ColumnConstraint::Null));
        }
        if self.eat(&Token::Primary) {
            self.expect(Token::Key, "KEY")?;
            if self.peek_is_word("asc") || self.peek_is_word("desc") {
                self.pos += 1;
            }
            self.skip_on_conflict();
            let autoincrement = self.eat(&Token::Autoincrement);
            return Ok(Some(ColumnConstraint::PrimaryKey { autoincrement }));
        }
        if self.eat(&Token::Unique) {
            self.skip_on_conflict();
            return Ok(Some(ColumnConstraint::Unique));
        }
        if self.eat(&Token::References) {
            let (table, columns) = self.parse_reference_target()?;
            return Ok(Some(ColumnConstraint::References(ForeignKeyRef {
                table,
                column: columns.into_iter().next(),
            })));
        }
        if self.eat(&Token::Default) {
            let expr = self.parse_default_expr()?;
            return Ok(Some(ColumnConstraint::Default(expr)));
        }
        if self.eat(&Token::Check) {
            self.skip_group()?;
            return Ok(Some(ColumnConstraint::Check));
        }
        if self.eat(&Token::Collate) {
            let collation = self.expect_name("collation")?;
            return Ok(Some(ColumnConstraint::Collate(collation.value)));
        }
        if self.eat(&Token::Generated) {
            // ALWAYS | BY DEFAULT
            while self.peek_is_word("always") || self.peek_is_word("by") || self.check(&Token::Default)
            {
                self.pos += 1;
            }
            self.expect(Token::As, "AS")?;
            if self.peek_is_word("identity") {
                self.pos += 1;
                if self.check(&Token::LParen) {
                    self.skip_group()?;
                }
                return Ok(Some(ColumnConstraint::Generated { identity: true }));
            }
            self.skip_generated_expr()?;
            return Ok(Some(ColumnConstraint::Generated { identity: false }));
        }
        if self.eat(&Token::As) {
            // SQLite shorthand: AS (expr) [STORED|VIRTUAL]
            self.skip_generated_expr()?;
            return Ok(Some(ColumnConstraint::Generated { identity: false }));
        }
        if self.eat(&Token::On) {
            // ON CONFLICT clause / MySQL ON UPDATE expr
            self.skip_one();
            self.skip_one();
            return Ok(None);
        }

        // DEFERRABLE, INITIALLY DEFERRED, AUTOINCREMENT, COMMENT '..', IDENTITY(1,1)
        self.skip_one();
        Ok(None)
    }

    /// A default expression: the first token always belongs to it (so that
    /// `DEFAULT NULL` works), then everything up to the next constraint.
    fn parse_default_expr(&mut self) -> Result<String, ParseError> {
        if self.at_separator() {
            return Err(self.unexpected("default expression"));
        }
        let start = self.current_span();
        self.skip_one();
        self.raw_until(starts_column_constraint);
        let span = start.merge(self.prev_span());
        Ok(collapse_whitespace(span.slice(self.source)))
    }

    fn skip_generated_expr(&mut self) -> Result<(), ParseError> {
        if !self.check(&Token::LParen) {
            return Err(self.unexpected("'('"));
        }
        self.skip_group()?;
        if self.peek_is_word("stored") || self.peek_is_word("virtual") {
            self.pos += 1;
        }
        Ok(())
    }

    fn skip_on_conflict(&mut self) {
        if self.check(&Token::On) && self.peek_at_is_word(1, "conflict") {
            self.pos = (self.pos + 3).min(self.tokens.len());
        }
    }

    // ---- ALTER TABLE ----

    fn parse_alter_table(&mut self) -> Result<AlterTable, ParseError> {
        let start = self.expect(Token::Alter, "ALTER")?;
        self.expect(Token::Table, "TABLE")?;
        let if_exists = self.eat_sequence(&[Token::If, Token::Exists]);
        self.eat(&Token::Only);
        let name = self.parse_object_name()?;
        // ONLY name *
        if self.check(&Token::Operator("*".to_string())) {
            self.pos += 1;
        }

        let mut actions = Vec::new();
        loop {
            actions.push(self.parse_alter_action()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }

        Ok(AlterTable {
            name,
            if_exists,
            actions,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_alter_action(&mut self) -> Result<AlterAction, ParseError> {
        if self.eat(&Token::Add) {
            let column_keyword = self.eat(&Token::Column);
            if !column_keyword && self.at_table_constraint() {
                return Ok(AlterAction::AddConstraint(self.parse_table_constraint()?));
            }
            let if_not_exists = self.eat_sequence(&[Token::If, Token::Not, Token::Exists]);
            let column = self.parse_column_def()?;
            return Ok(AlterAction::AddColumn {
                if_not_exists,
                column,
            });
        }

        if self.eat(&Token::Drop) {
            return self.parse_drop_action();
        }

        if self.eat(&Token::Alter) {
            self.eat(&Token::Column);
            let name = self.expect_name("column name")?;
            let change = self.parse_column_change()?;
            return Ok(AlterAction::AlterColumn { name, change });
        }

        if self.eat(&Token::Rename) {
            if self.eat(&Token::To) {
                let to = self.parse_object_name()?.value;
                return Ok(AlterAction::RenameTable { to });
            }
            if self.check(&Token::Constraint) {
                return Ok(self.other_action());
            }
            self.eat(&Token::Column);
            let from = self.expect_name("column name")?;
            self.expect(Token::To, "TO")?;
            let to = self.expect_name("new column name")?.value;
            return Ok(AlterAction::RenameColumn { from, to });
        }

        if self.at_separator() {
            return Err(self.unexpected("ALTER TABLE action"));
        }
        Ok(self.other_action())
    }

    fn parse_drop_action(&mut self) -> Result<AlterAction, ParseError> {
        if self.eat(&Token::Constraint) {
            let if_exists = self.eat_sequence(&[Token::If, Token::Exists]);
            let name = self.expect_name("constraint name")?.value;
            self.eat_drop_behavior();
            return Ok(AlterAction::DropConstraint { if_exists, name });
        }
        if self.eat_sequence(&[Token::Primary, Token::Key]) {
            return Ok(AlterAction::DropPrimaryKey);
        }
        // MySQL: DROP FOREIGN KEY name
        if self.eat_sequence(&[Token::Foreign, Token::Key]) {
            let name = self.expect_name("constraint name")?.value;
            return Ok(AlterAction::DropConstraint {
                if_exists: false,
                name,
            });
        }

        let column_keyword = self.eat(&Token::Column);
        if !column_keyword
            && (self.check(&Token::Key)
                || self.peek_is_word("index")
                || self.peek_is_word("trigger")
                || self.peek_is_word("rule"))
        {
            return Ok(self.other_action());
        }
        let if_exists = self.eat_sequence(&[Token::If, Token::Exists]);
        let name = self.expect_name("column name")?;
        self.eat_drop_behavior();
        Ok(AlterAction::DropColumn { if_exists, name })
    }

    fn parse_column_change(&mut self) -> Result<ColumnChange, ParseError> {
        if self.eat(&Token::Type) || self.eat_sequence(&[Token::Set, Token::Data, Token::Type]) {
            let span = self
                .raw_until(|t| matches!(t, Token::Using | Token::Collate))
                .ok_or_else(|| self.unexpected("data type"))?;
            let data_type = collapse_whitespace(span.slice(self.source));
            // USING expr, COLLATE name
            self.skip_to_separator();
            return Ok(ColumnChange::SetType(data_type));
        }
        if self.eat_sequence(&[Token::Set, Token::Not, Token::Null]) {
            return Ok(ColumnChange::SetNotNull);
        }
        if self.eat_sequence(&[Token::Drop, Token::Not, Token::Null]) {
            return Ok(ColumnChange::DropNotNull);
        }
        if self.eat_sequence(&[Token::Set, Token::Default]) {
            return Ok(ColumnChange::SetDefault(self.parse_default_expr()?));
        }
        if self.eat_sequence(&[Token::Drop, Token::Default]) {
            return Ok(ColumnChange::DropDefault);
        }
        if (self.check(&Token::Set) || self.check(&Token::Drop))
            && self.tokens.get(self.pos + 1).map(|t| &t.token) == Some(&Token::Not)
        {
            self.pos += 2;
            return Err(self
                .unexpected("NULL")
                .with_hint("write SET NOT NULL or DROP NOT NULL"));
        }
        if self.at_separator() {
            return Err(self.unexpected("TYPE, SET or DROP"));
        }
        // SET STATISTICS, SET STORAGE, DROP IDENTITY, ...
        self.skip_to_separator();
        Ok(ColumnChange::Other)
    }

    /// Consume an action we do not model, keeping its leading keyword.
    fn other_action(&mut self) -> AlterAction {
        let keyword = self
            .peek()
            .and_then(Token::name_text)
            .unwrap_or_default();
        self.skip_one();
        self.skip_to_separator();
        AlterAction::Other { keyword }
    }

    fn eat_drop_behavior(&mut self) {
        if !self.eat(&Token::Cascade) {
            self.eat(&Token::Restrict);
        }
    }

    // ---- DROP TABLE ----

    fn parse_drop_table(&mut self) -> Result<DropTable, ParseError> {
        let start = self.expect(Token::Drop, "DROP")?;
        self.expect(Token::Table, "TABLE")?;
        let if_exists = self.eat_sequence(&[Token::If, Token::Exists]);

        let mut names = Vec::new();
        loop {
            names.push(self.parse_object_name()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.eat_drop_behavior();

        Ok(DropTable {
            names,
            if_exists,
            span: start.merge(self.prev_span()),
        })
    }

    // ---- Names ----

    fn parse_object_name(&mut self) -> Result<Spanned<ObjectName>, ParseError> {
        let first = self.expect_name("table name")?;
        if self.eat(&Token::Dot) {
            let second = self.expect_name("table name")?;
            let span = first.span.merge(second.span);
            Ok(Spanned::new(
                ObjectName::qualified(first.value, second.value),
                span,
            ))
        } else {
            Ok(first.map(ObjectName::bare))
        }
    }

    /// `(name [ASC|DESC|COLLATE x], ...)`
    fn parse_name_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(Token::LParen, "'('")?;
        let mut names = Vec::new();
        loop {
            names.push(self.expect_name("column name")?.value);
            self.skip_to_separator();
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, "')'")?;
        Ok(names)
    }

    fn expect_name(&mut self, what: &str) -> Result<Spanned<String>, ParseError> {
        let Some(tok) = self.tokens.get(self.pos) else {
            return Err(ParseError::unexpected_end(what, self.end_span()));
        };
        match tok.token.name_text() {
            Some(name) => {
                let span = tok.span;
                self.pos += 1;
                Ok(Spanned::new(name, span))
            }
            None => Err(ParseError::unexpected(what, &tok.token, tok.span)),
        }
    }

    // ---- Token cursor ----

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_is_word(&self, word: &str) -> bool {
        self.peek_at_is_word(0, word)
    }

    fn peek_at_is_word(&self, offset: usize, word: &str) -> bool {
        self.tokens
            .get(self.pos + offset)
            .is_some_and(|t| t.token.is_word(word))
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume `seq` only if it appears in full.
    fn eat_sequence(&mut self, seq: &[Token]) -> bool {
        let matches = seq.iter().enumerate().all(|(i, t)| {
            self.tokens
                .get(self.pos + i)
                .is_some_and(|s| &s.token == t)
        });
        if matches {
            self.pos += seq.len();
        }
        matches
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<Span, ParseError> {
        if self.check(&token) {
            let span = self.current_span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        self.eat(&Token::Semicolon);
        if self.pos < self.tokens.len() {
            return Err(self.unexpected("end of statement"));
        }
        Ok(())
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(tok) => ParseError::unexpected(expected, &tok.token, tok.span),
            None => ParseError::unexpected_end(expected, self.end_span()),
        }
    }

    fn at_separator(&self) -> bool {
        matches!(
            self.peek(),
            None | Some(Token::Comma | Token::RParen | Token::Semicolon)
        )
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_else(|| self.end_span())
    }

    fn prev_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    fn end_span(&self) -> Span {
        let end = self.tokens.last().map(|t| t.span.end).unwrap_or(0);
        Span::new(end, end)
    }

    /// Skip a balanced `( ... )` group starting at the current token.
    fn skip_group(&mut self) -> Result<(), ParseError> {
        self.expect(Token::LParen, "'('")?;
        let mut depth = 1usize;
        while let Some(tok) = self.tokens.get(self.pos) {
            match tok.token {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
            self.pos += 1;
            if depth == 0 {
                return Ok(());
            }
        }
        Err(ParseError::unexpected_end("')'", self.end_span()))
    }

    /// Skip one token, or one balanced group if the token opens one.
    fn skip_one(&mut self) {
        if self.check(&Token::LParen) {
            // An unbalanced group runs to the end; expect_end reports it.
            if self.skip_group().is_err() {
                self.pos = self.tokens.len();
            }
        } else if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        if self.check(&Token::LParen) {
            if self.skip_group().is_err() {
                self.pos = self.tokens.len();
            }
        }
    }

    /// Advance to the next `,`, `)` or `;` at the current nesting depth
    /// without consuming it.
    fn skip_to_separator(&mut self) {
        self.raw_until(|_| false);
    }

    /// Consume tokens until a separator or a token matching `stop` at depth
    /// zero. Returns the span of what was consumed, if anything.
    fn raw_until(&mut self, stop: impl Fn(&Token) -> bool) -> Option<Span> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(tok) = self.tokens.get(self.pos) {
            match &tok.token {
                Token::LParen | Token::LBracket => depth += 1,
                Token::RParen | Token::RBracket if depth > 0 => depth -= 1,
                Token::Comma | Token::RParen | Token::RBracket | Token::Semicolon
                    if depth == 0 =>
                {
                    break
                }
                t if depth == 0 && stop(t) => break,
                _ => {}
            }
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        let first = self.tokens[start].span;
        Some(first.merge(self.prev_span()))
    }
}

/// Tokens that end a column's data type and begin its constraints.
fn starts_column_constraint(token: &Token) -> bool {
    matches!(
        token,
        Token::Not
            | Token::Null
            | Token::Primary
            | Token::References
            | Token::Unique
            | Token::Check
            | Token::Constraint
            | Token::Default
            | Token::Collate
            | Token::Generated
            | Token::Autoincrement
            | Token::As
            | Token::On
    ) || token.is_word("auto_increment")
        || token.is_word("comment")
}

/// Parse one raw SQL statement.
///
/// Statements that are not CREATE/ALTER/DROP TABLE are returned as
/// [`Statement::Other`] without being tokenized strictly, so function bodies
/// and other dialect-specific syntax never produce errors.
pub fn parse(source: &str) -> Result<Statement, ParseError> {
    if classify(source).is_none() {
        return Ok(Statement::Other);
    }
    Parser::new(source)?.parse_statement()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create(sql: &str) -> CreateTable {
        match parse(sql).unwrap() {
            Statement::CreateTable(c) => c,
            other => panic!("expected CreateTable, got {:?}", other),
        }
    }

    fn alter(sql: &str) -> AlterTable {
        match parse(sql).unwrap() {
            Statement::AlterTable(a) => a,
            other => panic!("expected AlterTable, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_create() {
        let table = create("CREATE TABLE users (id uuid PRIMARY KEY, name text NOT NULL, bio text)");
        assert_eq!(table.name.value, ObjectName::bare("users"));
        assert_eq!(table.source, TableSource::Definition);
        assert_eq!(table.columns.len(), 3);

        let id = &table.columns[0];
        assert_eq!(id.name.value, "id");
        assert_eq!(id.data_type, "uuid");
        assert!(id.is_primary_key());
        assert!(id.is_not_null());

        assert!(table.columns[1].is_not_null());
        assert!(!table.columns[2].is_not_null());
    }

    #[test]
    fn test_multi_word_and_parameterized_types() {
        let table = create(
            "create table t (
                a double precision,
                b timestamp(3) with time zone NOT NULL,
                c character varying(255),
                d text[],
                e numeric(10, 2) DEFAULT 0
            )",
        );
        let types: Vec<_> = table.columns.iter().map(|c| c.data_type.as_str()).collect();
        assert_eq!(
            types,
            vec![
                "double precision",
                "timestamp(3) with time zone",
                "character varying(255)",
                "text[]",
                "numeric(10, 2)"
            ]
        );
        assert_eq!(table.columns[4].default_expr(), Some("0"));
    }

    #[test]
    fn test_dollar_quoted_default() {
        let table = create("CREATE TABLE t (body text DEFAULT $$a;b$$ NOT NULL, n int)");
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0].default_expr(), Some("$$a;b$$"));
        assert!(table.columns[0].is_not_null());
    }

    #[test]
    fn test_default_expressions() {
        let table = create(
            "CREATE TABLE t (
                id uuid DEFAULT gen_random_uuid() PRIMARY KEY,
                note text DEFAULT NULL,
                status text NOT NULL DEFAULT 'draft'::text,
                created_at timestamptz DEFAULT now() NOT NULL
            )",
        );
        assert_eq!(table.columns[0].default_expr(), Some("gen_random_uuid()"));
        assert!(table.columns[0].is_primary_key());
        assert_eq!(table.columns[1].default_expr(), Some("NULL"));
        assert!(!table.columns[1].is_not_null());
        assert_eq!(table.columns[2].default_expr(), Some("'draft'::text"));
        assert_eq!(table.columns[3].default_expr(), Some("now()"));
        assert!(table.columns[3].is_not_null());
    }

    #[test]
    fn test_inline_references() {
        let table = create(
            "CREATE TABLE posts (
                id uuid PRIMARY KEY,
                author_id uuid NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                editor_id uuid REFERENCES public.users ON UPDATE SET NULL
            )",
        );
        assert_eq!(
            table.columns[1].references(),
            Some(&ForeignKeyRef {
                table: ObjectName::bare("users"),
                column: Some("id".to_string()),
            })
        );
        assert!(table.columns[1].is_not_null());
        assert_eq!(
            table.columns[2].references(),
            Some(&ForeignKeyRef {
                table: ObjectName::qualified("public", "users"),
                column: None,
            })
        );
    }

    #[test]
    fn test_table_constraints() {
        let table = create(
            "CREATE TABLE memberships (
                user_id uuid,
                group_id uuid,
                CONSTRAINT memberships_pkey PRIMARY KEY (user_id, group_id),
                FOREIGN KEY (group_id) REFERENCES groups (id) ON DELETE CASCADE,
                UNIQUE (user_id),
                CHECK (user_id <> group_id)
            )",
        );
        assert_eq!(table.columns.len(), 2);
        assert_eq!(
            table.constraints,
            vec![
                TableConstraint::PrimaryKey {
                    name: Some("memberships_pkey".to_string()),
                    columns: vec!["user_id".to_string(), "group_id".to_string()],
                },
                TableConstraint::ForeignKey {
                    name: None,
                    columns: vec!["group_id".to_string()],
                    table: ObjectName::bare("groups"),
                    referenced_columns: vec!["id".to_string()],
                },
                TableConstraint::Unique {
                    name: None,
                    columns: vec!["user_id".to_string()],
                },
                TableConstraint::Check { name: None },
            ]
        );
    }

    #[test]
    fn test_sqlite_specifics() {
        let table = create(
            "CREATE TABLE IF NOT EXISTS `notes` (
                [id] TEXT PRIMARY KEY NOT NULL,
                seq INTEGER UNIQUE ON CONFLICT REPLACE,
                body TEXT COLLATE NOCASE,
                total REAL AS (seq * 2) STORED
            ) WITHOUT ROWID, STRICT",
        );
        assert!(table.if_not_exists);
        assert_eq!(table.name.value, ObjectName::bare("notes"));
        assert_eq!(table.columns[0].name.value, "id");
        assert_eq!(table.columns[0].data_type, "TEXT");
        assert!(table.columns[1].is_unique());
        assert_eq!(table.columns[2].data_type, "TEXT");
        assert_eq!(table.columns[3].data_type, "REAL");
    }

    #[test]
    fn test_quoted_names_keep_case() {
        let table = create(r#"CREATE TABLE "Accounts" ("Email" text, Name text)"#);
        assert_eq!(table.name.value.name, "Accounts");
        assert_eq!(table.columns[0].name.value, "Email");
        assert_eq!(table.columns[1].name.value, "name");
    }

    #[test]
    fn test_identity_columns() {
        let table = create(
            "CREATE TABLE t (id bigint GENERATED ALWAYS AS IDENTITY PRIMARY KEY, n int GENERATED BY DEFAULT AS IDENTITY (START WITH 10))",
        );
        assert_eq!(table.columns[0].data_type, "bigint");
        assert!(table.columns[0].is_primary_key());
        assert!(table.columns[1]
            .constraints
            .contains(&ColumnConstraint::Generated { identity: true }));
    }

    #[test]
    fn test_create_as_and_like() {
        assert_eq!(
            create("CREATE TABLE archive AS SELECT * FROM users").source,
            TableSource::Query
        );
        assert_eq!(
            create("CREATE TABLE copy (LIKE users INCLUDING ALL)").source,
            TableSource::Like(ObjectName::bare("users"))
        );
    }

    #[test]
    fn test_alter_add_and_drop_column() {
        let stmt = alter("ALTER TABLE users ADD COLUMN IF NOT EXISTS age integer NULL");
        assert_eq!(stmt.actions.len(), 1);
        match &stmt.actions[0] {
            AlterAction::AddColumn {
                if_not_exists,
                column,
            } => {
                assert!(*if_not_exists);
                assert_eq!(column.name.value, "age");
                assert_eq!(column.data_type, "integer");
            }
            other => panic!("expected AddColumn, got {:?}", other),
        }

        let stmt = alter("alter table users drop column if exists age cascade");
        match &stmt.actions[0] {
            AlterAction::DropColumn { if_exists, name } => {
                assert!(*if_exists);
                assert_eq!(name.value, "age");
            }
            other => panic!("expected DropColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_alter_column_changes() {
        let stmt = alter(
            "ALTER TABLE users
                ALTER COLUMN age TYPE bigint USING age::bigint,
                ALTER COLUMN name SET NOT NULL,
                ALTER bio DROP NOT NULL,
                ALTER COLUMN score SET DATA TYPE numeric(8, 2),
                ALTER COLUMN status SET DEFAULT 'active',
                ALTER COLUMN status DROP DEFAULT",
        );
        let changes: Vec<_> = stmt
            .actions
            .iter()
            .map(|a| match a {
                AlterAction::AlterColumn { name, change } => (name.value.clone(), change.clone()),
                other => panic!("expected AlterColumn, got {:?}", other),
            })
            .collect();
        assert_eq!(
            changes,
            vec![
                ("age".to_string(), ColumnChange::SetType("bigint".to_string())),
                ("name".to_string(), ColumnChange::SetNotNull),
                ("bio".to_string(), ColumnChange::DropNotNull),
                (
                    "score".to_string(),
                    ColumnChange::SetType("numeric(8, 2)".to_string())
                ),
                (
                    "status".to_string(),
                    ColumnChange::SetDefault("'active'".to_string())
                ),
                ("status".to_string(), ColumnChange::DropDefault),
            ]
        );
    }

    #[test]
    fn test_alter_renames_and_constraints() {
        let stmt = alter("ALTER TABLE users RENAME COLUMN mail TO email");
        assert!(matches!(
            &stmt.actions[0],
            AlterAction::RenameColumn { from, to } if from.value == "mail" && to == "email"
        ));

        let stmt = alter("ALTER TABLE users RENAME TO accounts");
        assert_eq!(
            stmt.actions[0],
            AlterAction::RenameTable {
                to: ObjectName::bare("accounts")
            }
        );

        let stmt = alter(
            "ALTER TABLE ONLY posts ADD CONSTRAINT posts_author_fk FOREIGN KEY (author_id) REFERENCES users(id)",
        );
        assert!(matches!(
            &stmt.actions[0],
            AlterAction::AddConstraint(TableConstraint::ForeignKey { name: Some(n), .. }) if n == "posts_author_fk"
        ));

        let stmt = alter("ALTER TABLE posts DROP CONSTRAINT IF EXISTS posts_author_fk");
        assert_eq!(
            stmt.actions[0],
            AlterAction::DropConstraint {
                if_exists: true,
                name: "posts_author_fk".to_string()
            }
        );
    }

    #[test]
    fn test_alter_other_actions() {
        let stmt = alter("ALTER TABLE users OWNER TO admin");
        assert_eq!(
            stmt.actions,
            vec![AlterAction::Other {
                keyword: "owner".to_string()
            }]
        );
        let stmt = alter("ALTER TABLE users ENABLE ROW LEVEL SECURITY, ADD COLUMN x int");
        assert_eq!(stmt.actions.len(), 2);
    }

    #[test]
    fn test_drop_table() {
        match parse("DROP TABLE IF EXISTS a, b.c CASCADE;").unwrap() {
            Statement::DropTable(d) => {
                assert!(d.if_exists);
                let names: Vec<_> = d.names.into_iter().map(|n| n.value).collect();
                assert_eq!(
                    names,
                    vec![ObjectName::bare("a"), ObjectName::qualified("b", "c")]
                );
            }
            other => panic!("expected DropTable, got {:?}", other),
        }
    }

    #[test]
    fn test_non_ddl_is_other() {
        assert_eq!(
            parse("CREATE INDEX users_email ON users (email)").unwrap(),
            Statement::Other
        );
        assert_eq!(
            parse("CREATE FUNCTION f() RETURNS trigger AS $$ BEGIN RETURN NEW; END $$ LANGUAGE plpgsql")
                .unwrap(),
            Statement::Other
        );
    }

    #[test]
    fn test_malformed_statements() {
        let err = parse("ALTER TABLE users ALTER COLUMN age SET NOT").unwrap_err();
        assert_eq!(err.message, "expected NULL, found end of statement");
        assert!(err
            .format_with_source("ALTER TABLE users ALTER COLUMN age SET NOT")
            .contains("hint: write SET NOT NULL"));

        let err = parse("CREATE TABLE t (id uuid").unwrap_err();
        assert!(err.message.contains("found end of statement"));

        let err = parse("CREATE TABLE t (id uuid NOT DEFAULT 1)").unwrap_err();
        assert_eq!(err.message, "expected NULL, found 'DEFAULT'");
        assert!(err.hint.is_some());

        let err = parse("DROP TABLE a b").unwrap_err();
        assert_eq!(err.message, "expected end of statement, found identifier 'b'");
    }
}
