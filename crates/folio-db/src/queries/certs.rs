use anyhow::Result;
use chrono::Utc;

use folio_types::api::{CertificationEdit, NewCertification};
use folio_types::models::Certification;

use super::OptionalExt;
use crate::{Database, display_timestamp};

impl Database {
    pub fn list_certifications(&self) -> Result<Vec<Certification>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, issuing_org, issue_date, issue_exp, credential_id, credential_url, created_at
                 FROM cert_and_license ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Certification {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        issuing_org: row.get(2)?,
                        issue_date: row.get(3)?,
                        issue_exp: row.get(4)?,
                        credential_id: row.get(5)?,
                        credential_url: row.get(6)?,
                        created_at: row.get(7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_certification(&self, cert: &NewCertification) -> Result<i64> {
        let created_at = display_timestamp(Utc::now());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO cert_and_license (name, issuing_org, issue_date, issue_exp, credential_id, credential_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    cert.name,
                    cert.issuing_org,
                    cert.issue_date,
                    cert.issue_exp,
                    cert.credential_id,
                    cert.credential_url,
                    created_at
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn update_certification(&self, edit: &CertificationEdit) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "UPDATE cert_and_license SET
                    name = COALESCE(?2, name),
                    issuing_org = COALESCE(?3, issuing_org),
                    issue_date = COALESCE(?4, issue_date),
                    issue_exp = COALESCE(?5, issue_exp),
                    credential_id = COALESCE(?6, credential_id),
                    credential_url = COALESCE(?7, credential_url)
                 WHERE id = ?1
                 RETURNING name",
                rusqlite::params![
                    edit.id,
                    edit.name,
                    edit.issuing_org,
                    edit.issue_date,
                    edit.issue_exp,
                    edit.credential_id,
                    edit.credential_url
                ],
                |row| row.get(0),
            )
            .optional()
        })
    }

    pub fn delete_certification(&self, id: i64) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("DELETE FROM cert_and_license WHERE id = ?1 RETURNING name", [id], |row| {
                row.get(0)
            })
            .optional()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_update_keeps_other_fields() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .insert_certification(&NewCertification {
                name: "Security+".into(),
                issuing_org: "CompTIA".into(),
                issue_date: "March 2024".into(),
                issue_exp: Some("March 2027".into()),
                credential_id: None,
                credential_url: "https://example.com/verify/abc".into(),
            })
            .unwrap();

        let renamed = db
            .update_certification(&CertificationEdit {
                id,
                name: Some("Security+ ce".into()),
                issuing_org: None,
                issue_date: None,
                issue_exp: None,
                credential_id: Some("ABC-123".into()),
                credential_url: None,
            })
            .unwrap();
        assert_eq!(renamed.as_deref(), Some("Security+ ce"));

        let certs = db.list_certifications().unwrap();
        assert_eq!(certs[0].issuing_org, "CompTIA");
        assert_eq!(certs[0].credential_id.as_deref(), Some("ABC-123"));

        assert_eq!(db.delete_certification(id).unwrap().as_deref(), Some("Security+ ce"));
        assert!(db.delete_certification(id).unwrap().is_none());
    }
}
