use anyhow::Result;
use rusqlite::Connection;
use rusqlite::types::ValueRef;

use crate::Database;
use crate::console::table_columns;
use crate::models::LinkRow;

/// Tables whose URL columns are checked by the link report.
pub const LINK_TABLES: [&str; 4] = ["cert_and_license", "course", "education", "project_post"];

/// Columns of `table` whose name contains "url".
pub fn url_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    Ok(table_columns(conn, table)?
        .into_iter()
        .filter(|name| name.to_ascii_lowercase().contains("url"))
        .collect())
}

impl Database {
    /// Every non-empty URL stored in the link tables, grouped by table and
    /// then by row.
    pub fn collect_links(&self) -> Result<Vec<LinkRow>> {
        self.with_conn(|conn| {
            let mut links = Vec::new();
            for table in LINK_TABLES {
                let columns = url_columns(conn, table)?;
                if columns.is_empty() {
                    continue;
                }
                collect_table(conn, table, &columns, &mut links)?;
            }
            Ok(links)
        })
    }
}

fn collect_table(
    conn: &Connection,
    table: &'static str,
    columns: &[String],
    out: &mut Vec<LinkRow>,
) -> Result<()> {
    // Names come from pragma_table_info, not user input.
    let mut stmt = conn.prepare(&format!(
        "SELECT id, {} FROM {table} ORDER BY id",
        columns.join(", ")
    ))?;

    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let row_id: i64 = row.get(0)?;
        for (idx, column) in columns.iter().enumerate() {
            let url = match row.get_ref(idx + 1)? {
                ValueRef::Text(t) => String::from_utf8_lossy(t).trim().to_string(),
                _ => continue,
            };
            if url.is_empty() {
                continue;
            }
            out.push(LinkRow {
                table,
                column: column.clone(),
                row_id,
                url,
            });
        }
    }

    Ok(())
}
