use anyhow::Result;
use chrono::Utc;
use rusqlite::Row;

use folio_types::api::{CourseEdit, InstituteEdit, NewCourse, NewInstitute};
use folio_types::models::Course;

use super::OptionalExt;
use crate::models::InstituteRow;
use crate::{Database, display_timestamp};

impl Database {
    // -- Courses --

    pub fn courses_for_institute(&self, institute: &str) -> Result<Vec<Course>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, course_name, course_id, course_url, associated_institute, description
                 FROM course WHERE associated_institute = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([institute], map_course)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_course(&self, course: &NewCourse) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO course (course_name, course_id, course_url, associated_institute, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    course.course_name,
                    course.course_id,
                    course.course_url,
                    course.associated_institute,
                    course.description
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Returns the course name after the update, `None` if the id is unknown.
    pub fn update_course(&self, edit: &CourseEdit) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "UPDATE course SET
                    course_name = COALESCE(?2, course_name),
                    course_id = COALESCE(?3, course_id),
                    course_url = COALESCE(?4, course_url),
                    associated_institute = COALESCE(?5, associated_institute),
                    description = COALESCE(?6, description)
                 WHERE id = ?1
                 RETURNING course_name",
                rusqlite::params![
                    edit.id,
                    edit.course_name,
                    edit.course_id,
                    edit.course_url,
                    edit.associated_institute,
                    edit.description
                ],
                |row| row.get(0),
            )
            .optional()
        })
    }

    pub fn delete_course(&self, id: i64) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("DELETE FROM course WHERE id = ?1 RETURNING course_name", [id], |row| {
                row.get(0)
            })
            .optional()
        })
    }

    // -- Institutes --

    pub fn list_institutes(&self) -> Result<Vec<InstituteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, start_date, grad_date, expected_date, institute_type, awards,
                        major, degree, logo_url, logo_id, institute_url, small_desc, created_at
                 FROM education ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], map_institute)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_institute(&self, institute: &NewInstitute) -> Result<i64> {
        let created_at = display_timestamp(Utc::now());
        let grad_date = institute.grad_date.as_deref().unwrap_or("present");
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO education (name, start_date, grad_date, expected_date, institute_type,
                                        awards, major, degree, logo_url, logo_id, institute_url,
                                        small_desc, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                rusqlite::params![
                    institute.name,
                    institute.start_date,
                    grad_date,
                    institute.expected_date,
                    institute.institute_type,
                    institute.awards,
                    institute.major,
                    institute.degree,
                    institute.logo_url,
                    institute.logo_id,
                    institute.institute_url,
                    institute.small_desc,
                    created_at
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn update_institute(&self, edit: &InstituteEdit) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "UPDATE education SET
                    name = COALESCE(?2, name),
                    start_date = COALESCE(?3, start_date),
                    grad_date = COALESCE(?4, grad_date),
                    expected_date = COALESCE(?5, expected_date),
                    institute_type = COALESCE(?6, institute_type),
                    awards = COALESCE(?7, awards),
                    major = COALESCE(?8, major),
                    degree = COALESCE(?9, degree),
                    logo_url = COALESCE(?10, logo_url),
                    logo_id = COALESCE(?11, logo_id),
                    institute_url = COALESCE(?12, institute_url),
                    small_desc = COALESCE(?13, small_desc)
                 WHERE id = ?1
                 RETURNING name",
                rusqlite::params![
                    edit.id,
                    edit.name,
                    edit.start_date,
                    edit.grad_date,
                    edit.expected_date,
                    edit.institute_type,
                    edit.awards,
                    edit.major,
                    edit.degree,
                    edit.logo_url,
                    edit.logo_id,
                    edit.institute_url,
                    edit.small_desc
                ],
                |row| row.get(0),
            )
            .optional()
        })
    }

    pub fn delete_institute(&self, id: i64) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("DELETE FROM education WHERE id = ?1 RETURNING name", [id], |row| {
                row.get(0)
            })
            .optional()
        })
    }
}

fn map_course(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        course_name: row.get(1)?,
        course_id: row.get(2)?,
        course_url: row.get(3)?,
        associated_institute: row.get(4)?,
        description: row.get(5)?,
    })
}

fn map_institute(row: &Row<'_>) -> rusqlite::Result<InstituteRow> {
    Ok(InstituteRow {
        id: row.get(0)?,
        name: row.get(1)?,
        start_date: row.get(2)?,
        grad_date: row.get(3)?,
        expected_date: row.get(4)?,
        institute_type: row.get(5)?,
        awards: row.get(6)?,
        major: row.get(7)?,
        degree: row.get(8)?,
        logo_url: row.get(9)?,
        logo_id: row.get(10)?,
        institute_url: row.get(11)?,
        small_desc: row.get(12)?,
        created_at: row.get(13)?,
    })
}
