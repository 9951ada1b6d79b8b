use anyhow::Result;

use folio_types::models::NewsletterDraft;

use super::OptionalExt;
use crate::Database;

impl Database {
    // -- Subscribers --

    /// Fails with a constraint violation if the address is already subscribed.
    pub fn subscribe(&self, email: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("INSERT INTO newsletter_list (email) VALUES (?1)", [email])?;
            Ok(())
        })
    }

    /// Returns false when the address was not on the list.
    pub fn unsubscribe(&self, email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM newsletter_list WHERE email = ?1", [email])?;
            Ok(removed > 0)
        })
    }

    pub fn subscribers(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT email FROM newsletter_list ORDER BY id")?;
            let emails = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(emails)
        })
    }

    // -- Draft --

    /// There is only ever one draft; saving replaces it.
    pub fn save_draft(&self, title: &str, content: &serde_json::Value) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO newsletter_draft (id, title, content) VALUES (1, ?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET title = excluded.title, content = excluded.content",
                (title, content.to_string()),
            )?;
            Ok(())
        })
    }

    pub fn get_draft(&self) -> Result<Option<NewsletterDraft>> {
        self.with_conn(|conn| {
            let row: Option<(i64, String, String)> = conn
                .query_row("SELECT id, title, content FROM newsletter_draft WHERE id = 1", [], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })
                .optional()?;

            match row {
                Some((id, title, content)) => Ok(Some(NewsletterDraft {
                    id,
                    title,
                    content: serde_json::from_str(&content)?,
                })),
                None => Ok(None),
            }
        })
    }

    pub fn delete_draft(&self) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM newsletter_draft", [])?;
            Ok(removed > 0)
        })
    }
}
