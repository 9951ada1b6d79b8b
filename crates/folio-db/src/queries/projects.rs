use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row};

use folio_types::api::{NewProject, ProjectEdit};
use folio_types::models::{Project, Showcase};

use super::OptionalExt;
use crate::{Database, display_timestamp};

pub const PROJECTS_PER_PAGE: u32 = 4;

const SHOWCASE_ID: i64 = 1;

const PROJECT_COLUMNS: &str = "p.id, p.name, p.start_date, p.end_date, p.description, p.skills,
                               p.project_repo_url, p.project_url, p.created_at";

impl Database {
    /// Number of pages of `PROJECTS_PER_PAGE` needed to show every project.
    pub fn total_project_pages(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM project_post", [], |row| row.get(0))?;
            Ok((count + PROJECTS_PER_PAGE as i64 - 1) / PROJECTS_PER_PAGE as i64)
        })
    }

    /// One-based page of projects.
    pub fn project_page(&self, page: u32) -> Result<Vec<Project>> {
        let offset = (i64::from(page) - 1).max(0) * i64::from(PROJECTS_PER_PAGE);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROJECT_COLUMNS} FROM project_post p ORDER BY p.id LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt
                .query_map([i64::from(PROJECTS_PER_PAGE), offset], map_project)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn project_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT id FROM project_post WHERE name = ?1", [name], |row| row.get(0))
                .optional()
        })
    }

    pub fn insert_project(&self, project: &NewProject) -> Result<i64> {
        let created_at = display_timestamp(Utc::now());
        let end_date = project.end_date.as_deref().unwrap_or("present");
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO project_post (name, start_date, end_date, description, skills,
                                           project_repo_url, project_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    project.name,
                    project.start_date,
                    end_date,
                    project.description,
                    project.skills,
                    project.project_repo_url,
                    project.project_url,
                    created_at
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn update_project(&self, edit: &ProjectEdit) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "UPDATE project_post SET
                    name = COALESCE(?2, name),
                    start_date = COALESCE(?3, start_date),
                    end_date = COALESCE(?4, end_date),
                    description = COALESCE(?5, description),
                    skills = COALESCE(?6, skills),
                    project_repo_url = COALESCE(?7, project_repo_url),
                    project_url = COALESCE(?8, project_url)
                 WHERE id = ?1
                 RETURNING name",
                rusqlite::params![
                    edit.id,
                    edit.name,
                    edit.start_date,
                    edit.end_date,
                    edit.description,
                    edit.skills,
                    edit.project_repo_url,
                    edit.project_url
                ],
                |row| row.get(0),
            )
            .optional()
        })
    }

    /// Showcase links go with the project (ON DELETE CASCADE).
    pub fn delete_project(&self, id: i64) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("DELETE FROM project_post WHERE id = ?1 RETURNING name", [id], |row| {
                row.get(0)
            })
            .optional()
        })
    }

    // -- Showcase --

    pub fn showcase(&self) -> Result<Showcase> {
        self.with_conn(|conn| {
            Ok(Showcase {
                id: SHOWCASE_ID,
                project_posts: query_showcase_projects(conn)?,
            })
        })
    }

    /// Returns false when the project was already showcased.
    pub fn add_to_showcase(&self, project_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO project_showcase (project_id, showcase_id) VALUES (?1, ?2)",
                [project_id, SHOWCASE_ID],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn remove_from_showcase(&self, project_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM project_showcase WHERE project_id = ?1 AND showcase_id = ?2",
                [project_id, SHOWCASE_ID],
            )?;
            Ok(removed > 0)
        })
    }
}

fn query_showcase_projects(conn: &Connection) -> Result<Vec<Project>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS}
         FROM project_post p
         JOIN project_showcase ps ON ps.project_id = p.id
         WHERE ps.showcase_id = ?1
         ORDER BY p.id"
    ))?;

    let rows = stmt
        .query_map([SHOWCASE_ID], map_project)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        description: row.get(4)?,
        skills: row.get(5)?,
        project_repo_url: row.get(6)?,
        project_url: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(n: usize) -> NewProject {
        NewProject {
            name: format!("Project {n}"),
            start_date: "January 2024".into(),
            end_date: None,
            description: Some(format!("Project number {n}")),
            skills: "rust, sqlite".into(),
            project_repo_url: format!("https://github.com/example/project-{n}"),
            project_url: None,
        }
    }

    #[test]
    fn pages_hold_four_projects() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.total_project_pages().unwrap(), 0);

        for n in 1..=5 {
            db.insert_project(&project(n)).unwrap();
        }

        assert_eq!(db.total_project_pages().unwrap(), 2);
        assert_eq!(db.project_page(1).unwrap().len(), 4);

        let second = db.project_page(2).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "Project 5");

        assert!(db.project_page(3).unwrap().is_empty());
        assert!(db.project_page(u32::MAX).unwrap().is_empty());
        assert!(db.project_page(3).unwrap().is_empty());
    }

    #[test]
    fn showcase_follows_project_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_project(&project(1)).unwrap();

        assert_eq!(db.project_id_by_name("Project 1").unwrap(), Some(id));
        assert!(db.add_to_showcase(id).unwrap());
        assert!(!db.add_to_showcase(id).unwrap());

        let showcase = db.showcase().unwrap();
        assert_eq!(showcase.id, 1);
        assert_eq!(showcase.project_posts.len(), 1);
        assert_eq!(showcase.project_posts[0].end_date.as_deref(), Some("present"));

        db.delete_project(id).unwrap();
        assert!(db.showcase().unwrap().project_posts.is_empty());
    }
}
