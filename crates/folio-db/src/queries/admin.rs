use anyhow::Result;
use rusqlite::Connection;

use super::OptionalExt;
use crate::Database;
use crate::models::AdminRow;

impl Database {
    pub fn get_admin_by_email(&self, email: &str) -> Result<Option<AdminRow>> {
        self.with_conn(|conn| query_admin_by_email(conn, email))
    }

    /// Insert the admin unless it would clash with an existing account.
    /// Returns true when a row was created.
    pub fn ensure_admin(&self, username: &str, email: &str, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO admin (username, email, password) VALUES (?1, ?2, ?3)
                 ON CONFLICT DO NOTHING",
                (username, email, password_hash),
            )?;
            Ok(inserted > 0)
        })
    }
}

fn query_admin_by_email(conn: &Connection, email: &str) -> Result<Option<AdminRow>> {
    let mut stmt = conn.prepare("SELECT id, username, email, password FROM admin WHERE email = ?1")?;

    let row = stmt
        .query_row([email], |row| {
            Ok(AdminRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_admin_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.ensure_admin("Administrator", "admin@admin.com", "$argon2id$x").unwrap());
        assert!(!db.ensure_admin("Administrator", "admin@admin.com", "$argon2id$x").unwrap());

        let admin = db.get_admin_by_email("admin@admin.com").unwrap().unwrap();
        assert_eq!(admin.id, 1);
        assert_eq!(admin.username, "Administrator");
        assert!(db.get_admin_by_email("nobody@admin.com").unwrap().is_none());
    }

    #[test]
    fn ensure_admin_skips_taken_username() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.ensure_admin("Administrator", "admin@admin.com", "$argon2id$x").unwrap());
        assert!(!db.ensure_admin("Administrator", "other@admin.com", "$argon2id$y").unwrap());
        assert!(db.get_admin_by_email("other@admin.com").unwrap().is_none());
    }
}
