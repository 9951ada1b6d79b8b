use anyhow::Result;

use crate::Database;
use crate::models::OutboxRow;

/// A message waiting in `mail_outbox` for the delivery transport.
#[derive(Debug, Clone)]
pub struct QueuedMail<'a> {
    pub recipient: &'a str,
    pub subject: &'a str,
    pub html: &'a str,
}

impl Database {
    /// Queue every message or none of them.
    pub fn enqueue_mail(&self, batch: &[QueuedMail<'_>]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt =
                    tx.prepare("INSERT INTO mail_outbox (recipient, subject, html) VALUES (?1, ?2, ?3)")?;
                for mail in batch {
                    stmt.execute((mail.recipient, mail.subject, mail.html))?;
                }
            }
            tx.commit()?;
            Ok(batch.len())
        })
    }

    /// Messages still marked `queued`, oldest first.
    pub fn queued_mail(&self) -> Result<Vec<OutboxRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, recipient, subject, html, status, created_at
                 FROM mail_outbox WHERE status = 'queued' ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(OutboxRow {
                        id: row.get(0)?,
                        recipient: row.get(1)?,
                        subject: row.get(2)?,
                        html: row.get(3)?,
                        status: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_is_queued_in_order() {
        let db = Database::open_in_memory().unwrap();
        let batch = [
            QueuedMail { recipient: "a@test.com", subject: "Hello", html: "<p>a</p>" },
            QueuedMail { recipient: "b@test.com", subject: "Hello", html: "<p>b</p>" },
        ];
        assert_eq!(db.enqueue_mail(&batch).unwrap(), 2);

        let queued = db.queued_mail().unwrap();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].recipient, "a@test.com");
        assert_eq!(queued[1].status, "queued");
    }
}
