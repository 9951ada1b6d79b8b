use anyhow::Result;
use chrono::Utc;

use folio_types::api::{ExperienceEdit, NewExperience};
use folio_types::models::Experience;

use super::OptionalExt;
use crate::{Database, display_timestamp};

impl Database {
    pub fn list_experience(&self) -> Result<Vec<Experience>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, type, position, start_date, end_date, description, created_at
                 FROM experience_post ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Experience {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        kind: row.get(2)?,
                        position: row.get(3)?,
                        start_date: row.get(4)?,
                        end_date: row.get(5)?,
                        description: row.get(6)?,
                        created_at: row.get(7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Dates are stored as given; callers normalise them first.
    pub fn insert_experience(&self, entry: &NewExperience) -> Result<i64> {
        let created_at = display_timestamp(Utc::now());
        let end_date = entry.end_date.as_deref().unwrap_or("present");
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO experience_post (name, type, position, start_date, end_date, description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    entry.name,
                    entry.kind,
                    entry.position,
                    entry.start_date,
                    end_date,
                    entry.description,
                    created_at
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn update_experience(&self, edit: &ExperienceEdit) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "UPDATE experience_post SET
                    name = COALESCE(?2, name),
                    type = COALESCE(?3, type),
                    position = COALESCE(?4, position),
                    start_date = COALESCE(?5, start_date),
                    end_date = COALESCE(?6, end_date),
                    description = COALESCE(?7, description)
                 WHERE id = ?1
                 RETURNING name",
                rusqlite::params![
                    edit.id,
                    edit.name,
                    edit.kind,
                    edit.position,
                    edit.start_date,
                    edit.end_date,
                    edit.description
                ],
                |row| row.get(0),
            )
            .optional()
        })
    }

    pub fn delete_experience(&self, id: i64) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("DELETE FROM experience_post WHERE id = ?1 RETURNING name", [id], |row| {
                row.get(0)
            })
            .optional()
        })
    }
}
