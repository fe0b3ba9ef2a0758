//! Splitting migration text into individual statements.

use super::source::MigrationStatement;

/// Lexical context of the splitter.
#[derive(Debug, Clone, PartialEq)]
enum State {
    Normal,
    SingleQuote,
    DoubleQuote,
    Backtick,
    LineComment,
    /// Nesting depth (PostgreSQL allows nested block comments).
    BlockComment(usize),
    /// Inside a dollar-quoted body; holds the full `$tag$` delimiter.
    Dollar(String),
}

/// Split `sql` on `;` outside quotes, comments and dollar-quoted bodies.
///
/// `first_line` is the 1-based line of the first character of `sql` in its
/// file; each statement records the line of its first significant character.
/// Statements consisting only of whitespace and comments are dropped.
pub fn split_statements(sql: &str, first_line: usize) -> Vec<MigrationStatement> {
    let chars: Vec<(usize, char)> = sql.char_indices().collect();
    let mut statements = Vec::new();
    let mut state = State::Normal;
    let mut line = first_line;
    // (byte offset, line) of the first significant character of the current statement
    let mut current: Option<(usize, usize)> = None;

    let mut i = 0;
    while i < chars.len() {
        let (offset, c) = chars[i];
        let next = chars.get(i + 1).map(|&(_, n)| n);
        let mut mark = false;

        let transition = match &state {
            State::Normal => match c {
                ';' => {
                    if let Some((start, stmt_line)) = current.take() {
                        push_statement(&mut statements, &sql[start..offset], stmt_line);
                    }
                    None
                }
                '-' if next == Some('-') => {
                    i += 1;
                    Some(State::LineComment)
                }
                '/' if next == Some('*') => {
                    i += 1;
                    Some(State::BlockComment(1))
                }
                '\'' => {
                    mark = true;
                    Some(State::SingleQuote)
                }
                '"' => {
                    mark = true;
                    Some(State::DoubleQuote)
                }
                '`' => {
                    mark = true;
                    Some(State::Backtick)
                }
                '$' => {
                    mark = true;
                    dollar_tag(&sql[offset..]).map(|tag| {
                        i += tag.chars().count() - 1;
                        State::Dollar(tag)
                    })
                }
                c if c.is_whitespace() => None,
                _ => {
                    mark = true;
                    None
                }
            },
            State::SingleQuote => close_quote(c, next, '\'', &mut i),
            State::DoubleQuote => close_quote(c, next, '"', &mut i),
            State::Backtick => close_quote(c, next, '`', &mut i),
            State::LineComment => (c == '\n').then_some(State::Normal),
            State::BlockComment(depth) => {
                if c == '*' && next == Some('/') {
                    i += 1;
                    Some(if *depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    })
                } else if c == '/' && next == Some('*') {
                    i += 1;
                    Some(State::BlockComment(depth + 1))
                } else {
                    None
                }
            }
            State::Dollar(tag) => {
                if c == '$' && sql[offset..].starts_with(tag.as_str()) {
                    i += tag.chars().count() - 1;
                    Some(State::Normal)
                } else {
                    None
                }
            }
        };

        if mark && current.is_none() {
            current = Some((offset, line));
        }
        if let Some(next_state) = transition {
            state = next_state;
        }
        if c == '\n' {
            line += 1;
        }
        i += 1;
    }

    if let Some((start, stmt_line)) = current {
        push_statement(&mut statements, &sql[start..], stmt_line);
    }

    statements
}

fn close_quote(c: char, next: Option<char>, quote: char, i: &mut usize) -> Option<State> {
    if c != quote {
        return None;
    }
    if next == Some(quote) {
        // doubled quote is an escape
        *i += 1;
        return None;
    }
    Some(State::Normal)
}

/// Recognize a dollar-quote delimiter (`$$` or `$tag$`) at the start of `s`.
fn dollar_tag(s: &str) -> Option<String> {
    let rest = s.strip_prefix('$')?;
    let end = rest.find('$')?;
    let tag = &rest[..end];
    let valid = tag.is_empty()
        || (tag
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    valid.then(|| format!("${}$", tag))
}

fn push_statement(statements: &mut Vec<MigrationStatement>, text: &str, line: usize) {
    let sql = text.trim_end();
    if !sql.is_empty() {
        statements.push(MigrationStatement {
            sql: sql.to_string(),
            line,
        });
    }
}
