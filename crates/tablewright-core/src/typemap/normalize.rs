//! Canonical spelling of SQL type names.

/// Synonyms accepted for each canonical type. Every canonical name maps to
/// itself so that normalization is idempotent.
const SYNONYMS: &[(&str, &str)] = &[
    ("int2", "smallint"),
    ("smallint", "smallint"),
    ("tinyint", "smallint"),
    ("int", "integer"),
    ("int4", "integer"),
    ("integer", "integer"),
    ("mediumint", "integer"),
    ("int8", "bigint"),
    ("bigint", "bigint"),
    ("serial2", "smallserial"),
    ("smallserial", "smallserial"),
    ("serial4", "serial"),
    ("serial", "serial"),
    ("serial8", "bigserial"),
    ("bigserial", "bigserial"),
    ("float4", "real"),
    ("real", "real"),
    ("float8", "double precision"),
    ("double", "double precision"),
    ("double precision", "double precision"),
    ("float", "double precision"),
    ("numeric", "numeric"),
    ("decimal", "numeric"),
    ("bool", "boolean"),
    ("boolean", "boolean"),
    ("varchar", "varchar"),
    ("character varying", "varchar"),
    ("nvarchar", "varchar"),
    ("varying character", "varchar"),
    ("char", "char"),
    ("character", "char"),
    ("bpchar", "char"),
    ("nchar", "char"),
    ("text", "text"),
    ("citext", "text"),
    ("clob", "text"),
    ("timestamptz", "timestamptz"),
    ("timestamp with time zone", "timestamptz"),
    ("timestamp", "timestamp"),
    ("timestamp without time zone", "timestamp"),
    ("datetime", "timestamp"),
    ("date", "date"),
    ("uuid", "uuid"),
    ("bytea", "bytea"),
    ("blob", "blob"),
    ("json", "json"),
    ("jsonb", "jsonb"),
];

/// Normalize a raw SQL type for mapping.
///
/// Lower-cases, strips parameter lists (`varchar(255)` becomes `varchar`,
/// `timestamp(3) with time zone` becomes `timestamptz`), collapses whitespace
/// and resolves synonyms. Arrays (`t[]`, `t[3]`, `t ARRAY`, PostgreSQL's
/// internal `_t`) become the normalized element followed by `[]`. Unknown
/// types are returned in their cleaned-up form.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_ascii_lowercase();
    let cleaned = collapse(&strip_parameters(&lowered));

    let mut element = cleaned.as_str();
    let mut is_array = false;
    loop {
        if let Some(open) = element.strip_suffix(']').and_then(|s| s.rfind('[')) {
            element = element[..open].trim_end();
            is_array = true;
        } else if let Some(stripped) = element.strip_suffix(" array") {
            element = stripped.trim_end();
            is_array = true;
        } else {
            break;
        }
    }
    if !is_array {
        if let Some(internal) = element.strip_prefix('_').filter(|e| is_identifier(e)) {
            return format!("{}[]", canonical(internal));
        }
    }

    if is_array {
        format!("{}[]", canonical(element))
    } else {
        canonical(element).to_string()
    }
}

/// Split a normalized type into its element and whether it is an array.
pub fn array_element(normalized: &str) -> Option<&str> {
    normalized.strip_suffix("[]")
}

/// A bare type name, as PostgreSQL prefixes with `_` for its array types.
fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn canonical(name: &str) -> &str {
    SYNONYMS
        .iter()
        .find(|(spelling, _)| *spelling == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Remove every parenthesized group, including unbalanced ones.
fn strip_parameters(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                out.push(' ');
            }
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
