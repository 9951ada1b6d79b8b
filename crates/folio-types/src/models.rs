use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub created_at: String,
    /// Rich-text editor document, stored as JSON.
    pub content: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_draft: Option<bool>,
}

/// Awards are stored `|`-separated; `N/A` is passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Awards {
    List(Vec<String>),
    Text(String),
}

impl Awards {
    pub fn from_stored(raw: &str) -> Self {
        if raw == "N/A" {
            Awards::Text(raw.to_string())
        } else {
            Awards::List(raw.split('|').map(|s| s.trim().to_string()).collect())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Institute {
    pub id: i64,
    pub name: String,
    pub start_date: String,
    pub grad_date: String,
    pub expected_date: Option<String>,
    pub institute_type: String,
    pub awards: Awards,
    pub major: Option<String>,
    pub degree: String,
    pub logo_url: String,
    pub logo_id: String,
    pub institute_url: String,
    pub small_desc: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: i64,
    pub course_name: String,
    pub course_id: String,
    pub course_url: Option<String>,
    pub associated_institute: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experience {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Certification {
    pub id: i64,
    pub name: String,
    pub issuing_org: String,
    pub issue_date: String,
    pub issue_exp: Option<String>,
    pub credential_id: Option<String>,
    pub credential_url: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub skills: String,
    pub project_repo_url: String,
    pub project_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Showcase {
    pub id: i64,
    pub project_posts: Vec<Project>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsletterDraft {
    pub id: i64,
    pub title: String,
    pub content: serde_json::Value,
}

// -- Link inspection --

/// Outcome of probing one stored URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum LinkVerdict {
    Live,
    Dead,
    /// Anti-automation infrastructure answered instead of the site.
    Inconclusive(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkRecord {
    pub table: String,
    pub row_id: i64,
    pub column: String,
    pub url: String,
    #[serde(flatten)]
    pub verdict: LinkVerdict,
    pub http_code: Option<u16>,
}
