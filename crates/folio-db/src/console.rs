//! Ad-hoc SELECT execution for the admin console.
//!
//! The caller supplies everything after the `SELECT ` keyword, e.g.
//! `"id, email FROM admin WHERE id = 1"`. The text is executed verbatim:
//! this is reachable by the authenticated admin only and is not safe for
//! untrusted input. The only thing checked up front is that the projection,
//! the FROM target and the WHERE clause can be told apart, which is needed to
//! name the returned columns.

use anyhow::{Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::Database;

pub const EMPTY_TABLE_MESSAGE: &str = "Table exists but is empty";

pub type ResultRow = Map<String, Value>;

/// What the console shows for one query.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Rows(Vec<ResultRow>),
    /// The query ran but matched nothing.
    Empty,
    /// Parse or driver error, message passed through as-is.
    Failed(String),
}

impl SelectOutcome {
    /// HTTP-style status: 200 rows, 206 empty, 400 error.
    pub fn status(&self) -> u16 {
        match self {
            SelectOutcome::Rows(_) => 200,
            SelectOutcome::Empty => 206,
            SelectOutcome::Failed(_) => 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("query must name a table with FROM")]
    MissingFrom,
    #[error("no columns requested before FROM")]
    EmptyProjection,
    #[error("empty column name in the column list")]
    EmptyColumn,
    #[error("no table named after FROM")]
    MissingTable,
    #[error("{0} appears more than once")]
    RepeatedKeyword(&'static str),
    #[error("{0} inside a quoted literal is not supported")]
    KeywordInLiteral(&'static str),
    #[error("{0} inside parentheses (subquery) is not supported")]
    KeywordInSubquery(&'static str),
    #[error("unterminated quoted literal")]
    UnterminatedLiteral,
    #[error("unbalanced parentheses")]
    UnbalancedParens,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection<'a> {
    All,
    Columns(Vec<&'a str>),
}

/// The three segments of `<columns> FROM <target> [WHERE <filter>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectParts<'a> {
    pub projection: Projection<'a>,
    /// First identifier of the FROM segment, unquoted.
    pub table: &'a str,
    pub filter: Option<&'a str>,
}

const FROM: &str = "FROM";
const WHERE: &str = "WHERE";

pub fn split_select(query: &str) -> Result<SelectParts<'_>, ParseError> {
    let bytes = query.as_bytes();
    let mut quote: Option<u8> = None;
    let mut depth: usize = 0;
    let mut from_at: Option<usize> = None;
    let mut where_at: Option<usize> = None;
    let mut commas: Vec<usize> = Vec::new();

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];

        match quote {
            Some(close) if b == close => {
                // '' and "" escape the quote character
                if close != b']' && bytes.get(i + 1) == Some(&close) {
                    i += 2;
                } else {
                    quote = None;
                    i += 1;
                }
                continue;
            }
            Some(_) => {}
            None => match b {
                b'\'' | b'"' | b'`' => {
                    quote = Some(b);
                    i += 1;
                    continue;
                }
                b'[' => {
                    quote = Some(b']');
                    i += 1;
                    continue;
                }
                b'(' => {
                    depth += 1;
                    i += 1;
                    continue;
                }
                b')' => {
                    depth = depth.checked_sub(1).ok_or(ParseError::UnbalancedParens)?;
                    i += 1;
                    continue;
                }
                b',' if depth == 0 && from_at.is_none() => {
                    commas.push(i);
                    i += 1;
                    continue;
                }
                _ => {}
            },
        }

        if !is_word_byte(b) {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && is_word_byte(bytes[i]) {
            i += 1;
        }

        let Some(keyword) = keyword(&query[start..i]) else {
            continue;
        };
        if quote.is_some() {
            return Err(ParseError::KeywordInLiteral(keyword));
        }
        if depth > 0 {
            return Err(ParseError::KeywordInSubquery(keyword));
        }
        if keyword == WHERE && from_at.is_none() {
            return Err(ParseError::MissingFrom);
        }
        let slot = if keyword == FROM { &mut from_at } else { &mut where_at };
        if slot.is_some() {
            return Err(ParseError::RepeatedKeyword(keyword));
        }
        *slot = Some(start);
    }

    if quote.is_some() {
        return Err(ParseError::UnterminatedLiteral);
    }
    if depth != 0 {
        return Err(ParseError::UnbalancedParens);
    }

    let from_at = from_at.ok_or(ParseError::MissingFrom)?;

    let projection_text = query[..from_at].trim();
    if projection_text.is_empty() {
        return Err(ParseError::EmptyProjection);
    }
    let projection = if projection_text == "*" {
        Projection::All
    } else {
        let mut columns = Vec::with_capacity(commas.len() + 1);
        let mut begin = 0;
        for end in commas.iter().copied().chain(std::iter::once(from_at)) {
            let column = query[begin..end].trim();
            if column.is_empty() {
                return Err(ParseError::EmptyColumn);
            }
            columns.push(column);
            begin = end + 1;
        }
        Projection::Columns(columns)
    };

    let target_end = where_at.unwrap_or(query.len());
    let table = query[from_at + FROM.len()..target_end]
        .split_whitespace()
        .next()
        .map(|t| t.trim_matches(|c| matches!(c, '"' | '`' | '[' | ']' | ';')))
        .filter(|t| !t.is_empty())
        .ok_or(ParseError::MissingTable)?;

    let filter = where_at.map(|w| query[w + WHERE.len()..].trim());

    Ok(SelectParts { projection, table, filter })
}

// Non-ASCII bytes count as word bytes so slices always land on char boundaries.
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn keyword(word: &str) -> Option<&'static str> {
    if word.eq_ignore_ascii_case(FROM) {
        Some(FROM)
    } else if word.eq_ignore_ascii_case(WHERE) {
        Some(WHERE)
    } else {
        None
    }
}

impl Database {
    /// Run `SELECT <query>`. The outer `Result` only fails if the connection
    /// itself is unusable; query problems come back as `SelectOutcome::Failed`.
    pub fn execute_select(&self, query: &str) -> Result<SelectOutcome> {
        self.with_conn(|conn| Ok(run_select(conn, query)))
    }
}

fn run_select(conn: &Connection, query: &str) -> SelectOutcome {
    let parts = match split_select(query) {
        Ok(parts) => parts,
        Err(e) => {
            warn!("Rejected console query {:?}: {}", query, e);
            return SelectOutcome::Failed(e.to_string());
        }
    };

    match select_rows(conn, query, &parts) {
        Ok(rows) if rows.is_empty() => SelectOutcome::Empty,
        Ok(rows) => {
            debug!("Console query on {} returned {} rows", parts.table, rows.len());
            SelectOutcome::Rows(rows)
        }
        Err(e) => {
            warn!("Console query {:?} failed: {}", query, e);
            SelectOutcome::Failed(e.to_string())
        }
    }
}

fn select_rows(conn: &Connection, query: &str, parts: &SelectParts<'_>) -> Result<Vec<ResultRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {query}"))?;

    let names: Vec<String> = match &parts.projection {
        Projection::All => match parts.table.split_once('.') {
            Some((schema, table)) => {
                table_columns_in(conn, unquote(schema), unquote(table))?
            }
            None => table_columns(conn, parts.table)?,
        },
        Projection::Columns(columns) => columns.iter().map(|c| c.to_string()).collect(),
    };

    let count = stmt.column_count();
    if names.len() != count {
        bail!(
            "query returned {} columns but {} column names were resolved",
            count,
            names.len()
        );
    }

    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut mapped = Map::with_capacity(count);
        for (idx, name) in names.iter().enumerate() {
            if mapped.insert(name.clone(), to_json(row.get_ref(idx)?)).is_some() {
                bail!("column name {:?} is selected more than once", name);
            }
        }
        out.push(mapped);
    }

    Ok(out)
}

/// Declared column names of `table`, in schema order.
pub(crate) fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let names = stmt
        .query_map([table], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(names)
}

/// Same as `table_columns` for a table qualified with its schema.
fn table_columns_in(conn: &Connection, schema: &str, table: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM pragma_table_info(?1, ?2) ORDER BY cid")?;
    let names = stmt
        .query_map([table, schema], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(names)
}

fn unquote(ident: &str) -> &str {
    ident.trim_matches(|c| matches!(c, '"' | '`' | '[' | ']'))
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(B64.encode(b)),
    }
}
