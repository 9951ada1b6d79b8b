use serde::{Deserialize, Serialize};

use crate::models::AdminProfile;

// -- Admin --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub bearer: String,
    pub user: AdminProfile,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqlQueryRequest {
    /// Everything after the `SELECT ` keyword.
    pub query: String,
}

// -- Newsletter --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscribeRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DraftRequest {
    pub title: String,
    pub content: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendNewsletterRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeQuery {
    pub t: Option<String>,
}

// -- Contact --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactRequest {
    pub name: String,
    pub contact_type: String,
    pub email: String,
    pub msg_subject: String,
    pub msg_body: String,
}

// -- Education --

#[derive(Debug, Deserialize)]
pub struct CourseListRequest {
    pub institute: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCourse {
    pub course_name: String,
    pub course_id: String,
    pub course_url: Option<String>,
    pub associated_institute: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CourseEdit {
    pub id: i64,
    pub course_name: Option<String>,
    pub course_id: Option<String>,
    pub course_url: Option<String>,
    pub associated_institute: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCourseRequest {
    pub course_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewInstitute {
    pub name: String,
    pub start_date: String,
    pub grad_date: Option<String>,
    pub expected_date: Option<String>,
    pub institute_type: String,
    pub awards: String,
    pub major: Option<String>,
    pub degree: String,
    pub logo_url: String,
    pub logo_id: String,
    pub institute_url: String,
    pub small_desc: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstituteEdit {
    pub id: i64,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub grad_date: Option<String>,
    pub expected_date: Option<String>,
    pub institute_type: Option<String>,
    pub awards: Option<String>,
    pub major: Option<String>,
    pub degree: Option<String>,
    pub logo_url: Option<String>,
    pub logo_id: Option<String>,
    pub institute_url: Option<String>,
    pub small_desc: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteInstituteRequest {
    pub institute_id: i64,
}

// -- Experience --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewExperience {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: String,
    /// `MM/YYYY`
    pub start_date: String,
    /// `MM/YYYY`, absent while ongoing.
    pub end_date: Option<String>,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperienceEdit {
    pub id: i64,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

// -- Certifications --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCertification {
    pub name: String,
    pub issuing_org: String,
    pub issue_date: String,
    pub issue_exp: Option<String>,
    pub credential_id: Option<String>,
    pub credential_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificationEdit {
    pub id: i64,
    pub name: Option<String>,
    pub issuing_org: Option<String>,
    pub issue_date: Option<String>,
    pub issue_exp: Option<String>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

// -- Projects --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProject {
    pub name: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub skills: String,
    pub project_repo_url: String,
    pub project_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectEdit {
    pub id: i64,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub skills: Option<String>,
    pub project_repo_url: Option<String>,
    pub project_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShowcaseRequest {
    pub project_name: String,
}

// -- Blog --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBlogPost {
    pub title: String,
    pub content: serde_json::Value,
    pub description: String,
    #[serde(default)]
    pub is_draft: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlogPostEdit {
    pub id: i64,
    pub title: Option<String>,
    pub content: Option<serde_json::Value>,
    pub description: Option<String>,
    pub is_draft: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct BlogListQuery {
    pub tp: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct BlogQuery {
    pub id: Option<i64>,
    pub edit: Option<String>,
}

// -- Shared --

#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub id: i64,
}
