//! Migration file discovery and up-section extraction.

use super::error::DiscoveryError;
use super::split::split_statements;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One raw SQL statement from a migration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatement {
    /// Statement text without the terminating `;`.
    pub sql: String,
    /// 1-based line of the statement's first significant character.
    pub line: usize,
}

/// A discovered migration file with its "up" statements in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Path to the file.
    pub path: PathBuf,
    /// Sortable filename prefix.
    pub sequence_key: String,
    /// Up statements in file order.
    pub statements: Vec<MigrationStatement>,
}

impl Migration {
    /// Build a migration from file contents.
    pub fn from_source(path: impl Into<PathBuf>, contents: &str) -> Self {
        let path = path.into();
        let sequence_key = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(sequence_key)
            .unwrap_or_default();
        Self {
            path,
            sequence_key,
            statements: up_statements(contents),
        }
    }

    /// The file name, for logging.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Discover migrations in `dirs` and return them in replay order.
///
/// Directories are scanned non-recursively. Files from all directories are
/// merged and ordered by sequence key, then file name, then directory order.
pub fn discover<P: AsRef<Path>>(dirs: &[P]) -> Result<Vec<Migration>, DiscoveryError> {
    if dirs.is_empty() {
        return Err(DiscoveryError::NoDirectories);
    }

    let mut candidates = Vec::new();
    for (dir_index, dir) in dirs.iter().enumerate() {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(DiscoveryError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let entries = fs::read_dir(dir).map_err(|source| DiscoveryError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| DiscoveryError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                debug!(path = %path.display(), "Skipping file with non-UTF-8 name");
                continue;
            };
            if !is_up_migration_file(file_name) {
                continue;
            }
            candidates.push(Candidate {
                key: sequence_key(file_name),
                file_name: file_name.to_string(),
                dir_index,
                path,
            });
        }
    }

    candidates.sort_by(Candidate::replay_order);

    for pair in candidates.windows(2) {
        if pair[0].key == pair[1].key {
            warn!(
                sequence_key = %pair[0].key,
                first = %pair[0].path.display(),
                second = %pair[1].path.display(),
                "Duplicate migration sequence key"
            );
        }
    }

    let mut migrations = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let bytes = fs::read(&candidate.path).map_err(|source| DiscoveryError::ReadFile {
            path: candidate.path.clone(),
            source,
        })?;
        let contents = String::from_utf8(bytes).map_err(|_| DiscoveryError::InvalidUtf8 {
            path: candidate.path.clone(),
        })?;

        let migration = Migration {
            statements: up_statements(&contents),
            sequence_key: candidate.key,
            path: candidate.path,
        };
        debug!(
            file = migration.file_name(),
            statements = migration.statements.len(),
            "Discovered migration"
        );
        migrations.push(migration);
    }

    Ok(migrations)
}

struct Candidate {
    key: String,
    file_name: String,
    dir_index: usize,
    path: PathBuf,
}

impl Candidate {
    /// Keys compare as plain text: `10_b.sql` replays before `9_a.sql`.
    fn replay_order(a: &Candidate, b: &Candidate) -> Ordering {
        a.key
            .cmp(&b.key)
            .then_with(|| a.file_name.cmp(&b.file_name))
            .then_with(|| a.dir_index.cmp(&b.dir_index))
    }
}

/// Whether a file takes part in replay: `*.sql`, excluding `*.down.sql`.
fn is_up_migration_file(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    lower.ends_with(".sql") && !lower.ends_with(".down.sql")
}

/// The sortable prefix of a migration file name.
///
/// `001_create_users.sql` gives `001`, `20240101120000.up.sql` gives
/// `20240101120000`. A name with neither an underscore nor leading digits is
/// its own key.
pub fn sequence_key(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    if let Some((prefix, _)) = stem.split_once('_') {
        return prefix.to_string();
    }
    let digits: String = stem.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        stem.to_string()
    } else {
        digits
    }
}

/// Marker comments that delimit up/down sections and statement blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Up,
    Down,
    BlockBegin,
    BlockEnd,
}

fn parse_marker(line: &str) -> Option<Marker> {
    let rest = line.trim().strip_prefix("--")?.trim().to_ascii_lowercase();
    if let Some(goose) = rest.strip_prefix("+goose") {
        return match goose.split_whitespace().next().unwrap_or_default() {
            "up" => Some(Marker::Up),
            "down" => Some(Marker::Down),
            "statementbegin" => Some(Marker::BlockBegin),
            "statementend" => Some(Marker::BlockEnd),
            _ => None,
        };
    }
    // dbmate allows options after the marker, e.g. `-- migrate:up transaction:false`
    match rest.split_whitespace().next().unwrap_or_default() {
        "migrate:up" => Some(Marker::Up),
        "migrate:down" => Some(Marker::Down),
        _ => None,
    }
}

/// Extract the statements of the "up" direction from a migration file.
///
/// Files without an up or down marker are entirely "up". With markers, only
/// text after an up marker and before the next down marker participates.
/// `StatementBegin`/`StatementEnd` blocks are kept whole, semicolons included.
pub fn up_statements(contents: &str) -> Vec<MigrationStatement> {
    let has_sections = contents
        .lines()
        .any(|l| matches!(parse_marker(l), Some(Marker::Up | Marker::Down)));

    let mut in_up = !has_sections;
    let mut statements = Vec::new();
    // Plain text awaiting the splitter, with its first line number.
    let mut chunk = String::new();
    let mut chunk_line = 1;
    // A StatementBegin block, with its first line number.
    let mut block: Option<(String, usize)> = None;

    for (index, line) in contents.lines().enumerate() {
        let line_no = index + 1;
        match parse_marker(line) {
            Some(marker) => {
                statements.extend(split_statements(&chunk, chunk_line));
                chunk.clear();
                match marker {
                    Marker::Up => in_up = true,
                    Marker::Down => in_up = false,
                    Marker::BlockBegin => block = Some((String::new(), line_no + 1)),
                    Marker::BlockEnd => {
                        if let Some((text, first)) = block.take() {
                            if in_up {
                                statements.extend(block_statement(&text, first));
                            }
                        }
                    }
                }
                chunk_line = line_no + 1;
            }
            None => {
                if let Some((text, _)) = block.as_mut() {
                    text.push_str(line);
                    text.push('\n');
                } else if in_up {
                    chunk.push_str(line);
                    chunk.push('\n');
                } else {
                    chunk_line = line_no + 1;
                }
            }
        }
    }

    // An unterminated block is treated as plain text.
    if let Some((text, first)) = block {
        if in_up {
            statements.extend(split_statements(&chunk, chunk_line));
            chunk.clear();
            chunk_line = first;
            chunk.push_str(&text);
        }
    }
    statements.extend(split_statements(&chunk, chunk_line));
    statements
}

/// A StatementBegin block is one statement; only its trailing `;` is removed.
fn block_statement(text: &str, first_line: usize) -> Option<MigrationStatement> {
    let leading = text.len() - text.trim_start().len();
    let skipped_lines = text[..leading].matches('\n').count();
    let sql = text.trim().trim_end_matches(';').trim_end();
    (!sql.is_empty()).then(|| MigrationStatement {
        sql: sql.to_string(),
        line: first_line + skipped_lines,
    })
}
