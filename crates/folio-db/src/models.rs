//! Database row types where the stored shape differs from the API model.
//! Tables whose rows map one-to-one are read straight into `folio_types::models`.

use folio_types::models::{AdminProfile, Awards, BlogPost, Institute};

pub struct AdminRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password: String,
}

impl From<AdminRow> for AdminProfile {
    fn from(row: AdminRow) -> Self {
        AdminProfile {
            id: row.id,
            username: row.username,
            email: row.email,
        }
    }
}

pub struct BlogPostRow {
    pub id: i64,
    pub title: String,
    pub created_at: String,
    pub content: String,
    pub description: String,
    pub is_draft: bool,
}

impl BlogPostRow {
    /// Public view: drafts flag and description stay private unless editing.
    pub fn into_post(self, editing: bool) -> BlogPost {
        // Content is written by us as JSON; fall back to a plain string if an
        // older row was stored raw.
        let content = serde_json::from_str(&self.content)
            .unwrap_or(serde_json::Value::String(self.content));

        BlogPost {
            id: self.id,
            title: self.title,
            created_at: self.created_at,
            content,
            description: editing.then_some(self.description),
            is_draft: editing.then_some(self.is_draft),
        }
    }
}

pub struct InstituteRow {
    pub id: i64,
    pub name: String,
    pub start_date: String,
    pub grad_date: String,
    pub expected_date: Option<String>,
    pub institute_type: String,
    pub awards: String,
    pub major: Option<String>,
    pub degree: String,
    pub logo_url: String,
    pub logo_id: String,
    pub institute_url: String,
    pub small_desc: String,
    pub created_at: String,
}

impl From<InstituteRow> for Institute {
    fn from(row: InstituteRow) -> Self {
        Institute {
            id: row.id,
            awards: Awards::from_stored(&row.awards),
            name: row.name,
            start_date: row.start_date,
            grad_date: row.grad_date,
            expected_date: row.expected_date,
            institute_type: row.institute_type,
            major: row.major,
            degree: row.degree,
            logo_url: row.logo_url,
            logo_id: row.logo_id,
            institute_url: row.institute_url,
            small_desc: row.small_desc,
            created_at: row.created_at,
        }
    }
}

/// One non-null value found in a URL-bearing column.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRow {
    pub table: &'static str,
    pub column: String,
    pub row_id: i64,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct OutboxRow {
    pub id: i64,
    pub recipient: String,
    pub subject: String,
    pub html: String,
    pub status: String,
    pub created_at: String,
}
