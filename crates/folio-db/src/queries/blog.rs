use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row};

use folio_types::api::{BlogPostEdit, NewBlogPost};

use super::OptionalExt;
use crate::models::BlogPostRow;
use crate::{Database, display_timestamp};

const BLOG_COLUMNS: &str = "id, title, created_at, content, description, is_draft";

impl Database {
    pub fn insert_blog_post(&self, post: &NewBlogPost) -> Result<i64> {
        let created_at = display_timestamp(Utc::now());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO blog_post (title, created_at, content, description, is_draft)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    post.title,
                    created_at,
                    post.content.to_string(),
                    post.description,
                    post.is_draft
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Partial update; returns the (possibly new) title, or `None` if no such post.
    pub fn update_blog_post(&self, edit: &BlogPostEdit) -> Result<Option<String>> {
        let content = edit.content.as_ref().map(|c| c.to_string());
        self.with_conn(|conn| {
            conn.query_row(
                "UPDATE blog_post SET
                    title = COALESCE(?2, title),
                    content = COALESCE(?3, content),
                    description = COALESCE(?4, description),
                    is_draft = COALESCE(?5, is_draft)
                 WHERE id = ?1
                 RETURNING title",
                rusqlite::params![edit.id, edit.title, content, edit.description, edit.is_draft],
                |row| row.get(0),
            )
            .optional()
        })
    }

    pub fn delete_blog_post(&self, id: i64) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("DELETE FROM blog_post WHERE id = ?1 RETURNING title", [id], |row| {
                row.get(0)
            })
            .optional()
        })
    }

    pub fn get_blog_post(&self, id: i64) -> Result<Option<BlogPostRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {BLOG_COLUMNS} FROM blog_post WHERE id = ?1"),
                [id],
                map_blog_row,
            )
            .optional()
        })
    }

    /// Total number of stored posts, drafts included.
    pub fn count_blog_posts(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM blog_post", [], |row| row.get(0))?)
        })
    }

    /// The first `limit` published posts.
    pub fn published_blog_posts(&self, limit: u32) -> Result<Vec<BlogPostRow>> {
        self.with_conn(|conn| query_published(conn, limit))
    }
}

fn query_published(conn: &Connection, limit: u32) -> Result<Vec<BlogPostRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BLOG_COLUMNS} FROM blog_post WHERE is_draft = 0 ORDER BY id LIMIT ?1"
    ))?;

    let rows = stmt
        .query_map([limit], map_blog_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_blog_row(row: &Row<'_>) -> rusqlite::Result<BlogPostRow> {
    Ok(BlogPostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: row.get(2)?,
        content: row.get(3)?,
        description: row.get(4)?,
        is_draft: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(title: &str, is_draft: bool) -> NewBlogPost {
        NewBlogPost {
            title: title.into(),
            content: json!([{"type": "p", "children": [{"text": title}]}]),
            description: format!("about {title}"),
            is_draft,
        }
    }

    #[test]
    fn drafts_are_hidden_but_counted() {
        let db = Database::open_in_memory().unwrap();
        db.insert_blog_post(&post("first", false)).unwrap();
        db.insert_blog_post(&post("draft", true)).unwrap();
        db.insert_blog_post(&post("second", false)).unwrap();

        assert_eq!(db.count_blog_posts().unwrap(), 3);

        let titles: Vec<String> =
            db.published_blog_posts(10).unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["first", "second"]);
        assert_eq!(db.published_blog_posts(1).unwrap().len(), 1);
    }

    #[test]
    fn edit_keeps_untouched_fields() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_blog_post(&post("first", true)).unwrap();

        let title = db
            .update_blog_post(&BlogPostEdit {
                id,
                title: None,
                content: None,
                description: None,
                is_draft: Some(false),
            })
            .unwrap();
        assert_eq!(title.as_deref(), Some("first"));

        let row = db.get_blog_post(id).unwrap().unwrap();
        assert!(!row.is_draft);
        let public = row.into_post(false);
        assert_eq!(public.content[0]["children"][0]["text"], "first");
        assert!(public.description.is_none());

        assert_eq!(db.delete_blog_post(id).unwrap().as_deref(), Some("first"));
        assert!(db.delete_blog_post(id).unwrap().is_none());
    }
}
