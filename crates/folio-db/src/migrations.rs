use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE admin (
                id          INTEGER PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL UNIQUE
            );

            CREATE TABLE blog_post (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL UNIQUE,
                created_at  TEXT NOT NULL,
                content     TEXT NOT NULL,
                description TEXT NOT NULL UNIQUE,
                is_draft    INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE education (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL UNIQUE,
                start_date      TEXT NOT NULL,
                grad_date       TEXT NOT NULL DEFAULT 'present',
                expected_date   TEXT,
                institute_type  TEXT NOT NULL,
                awards          TEXT NOT NULL,
                major           TEXT,
                degree          TEXT NOT NULL,
                logo_url        TEXT NOT NULL,
                logo_id         TEXT NOT NULL,
                institute_url   TEXT NOT NULL UNIQUE,
                small_desc      TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE course (
                id                      INTEGER PRIMARY KEY AUTOINCREMENT,
                course_name             TEXT NOT NULL UNIQUE,
                course_id               TEXT NOT NULL UNIQUE,
                course_url              TEXT UNIQUE,
                associated_institute    TEXT NOT NULL,
                description             TEXT NOT NULL UNIQUE
            );

            CREATE INDEX idx_course_institute ON course(associated_institute);

            CREATE TABLE experience_post (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                type        TEXT NOT NULL,
                position    TEXT NOT NULL,
                start_date  TEXT NOT NULL,
                end_date    TEXT DEFAULT 'present',
                description TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE cert_and_license (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                issuing_org     TEXT NOT NULL,
                issue_date      TEXT NOT NULL,
                issue_exp       TEXT,
                credential_id   TEXT,
                credential_url  TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE project_post (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                name                TEXT NOT NULL UNIQUE,
                start_date          TEXT NOT NULL,
                end_date            TEXT DEFAULT 'present',
                description         TEXT UNIQUE,
                skills              TEXT NOT NULL,
                project_repo_url    TEXT NOT NULL UNIQUE,
                project_url         TEXT UNIQUE,
                created_at          TEXT NOT NULL
            );

            CREATE TABLE showcase (
                id  INTEGER PRIMARY KEY AUTOINCREMENT
            );

            CREATE TABLE project_showcase (
                project_id  INTEGER NOT NULL REFERENCES project_post(id) ON DELETE CASCADE,
                showcase_id INTEGER NOT NULL REFERENCES showcase(id),
                PRIMARY KEY (project_id, showcase_id)
            );

            CREATE TABLE newsletter_list (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                email   TEXT NOT NULL UNIQUE
            );

            CREATE TABLE newsletter_draft (
                id      INTEGER PRIMARY KEY CHECK (id = 1),
                title   TEXT NOT NULL,
                content TEXT NOT NULL
            );

            CREATE TABLE mail_outbox (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                recipient   TEXT NOT NULL,
                subject     TEXT NOT NULL,
                html        TEXT NOT NULL,
                status      TEXT NOT NULL DEFAULT 'queued',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- The site has exactly one showcase
            INSERT INTO showcase (id) VALUES (1);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
