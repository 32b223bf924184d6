//! FTS5 match-expression building.
//!
//! # Invariants
//! - Every user term is quoted, so FTS5 operators in user text are inert.
//! - Terms without any alphanumeric character are dropped; a query with no
//!   significant terms matches nothing.
//! - Terms are joined with `AND`: all significant terms must appear.

/// Builds an FTS5 expression from free text, or `None` for blank input.
pub fn build_match_expression(text: &str) -> Option<String> {
    let terms = text
        .split_whitespace()
        .filter(|term| term.chars().any(char::is_alphanumeric))
        .map(escape_fts_term)
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return None;
    }

    Some(terms.join(" AND "))
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

/// True when SQLite rejected a `MATCH` expression.
pub(crate) fn is_match_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
        }
        _ => false,
    }
}
