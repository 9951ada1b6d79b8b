//! Field checks shared by the handlers. Each check records a message in a
//! `FieldErrors` instead of returning early so one response lists every
//! problem in the body.

use chrono::NaiveDate;
use reqwest::Url;

use crate::error::FieldErrors;

pub const INSTITUTE_TYPES: [&str; 5] = [
    "University",
    "College",
    "High School",
    "Community College",
    "Graduate School",
];

pub const EXPERIENCE_TYPES: [&str; 3] = ["Job", "Internship", "Volunteer"];

pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

/// Absolute http(s) URL with a dotted host name.
pub fn is_url(value: &str) -> bool {
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(|host| host.contains('.') && !host.ends_with('.'))
}

/// `MM/YYYY` to `Month YYYY`, e.g. `09/2024` to `September 2024`.
pub fn month_year(value: &str) -> Option<String> {
    let (month, year) = value.trim().split_once('/')?;
    if month.len() != 2 || year.len() != 4 {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)?;
    Some(date.format("%B %Y").to_string())
}

impl FieldErrors {
    pub fn check_email(&mut self, field: &str, value: &str) {
        if !is_email(value) {
            self.push(field, "Not a valid email address.");
        }
    }

    pub fn check_url(&mut self, field: &str, value: &str) {
        if !is_url(value) {
            self.push(field, "Not a valid URL.");
        }
    }

    pub fn check_optional_url(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.check_url(field, value);
        }
    }

    pub fn check_one_of(&mut self, field: &str, value: &str, choices: &[&str]) {
        if !choices.contains(&value) {
            self.push(field, format!("Must be one of: {}.", choices.join(", ")));
        }
    }

    pub fn check_length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min || len > max {
            self.push(field, format!("Length must be between {min} and {max}."));
        }
    }

    pub fn check_not_blank(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "Field may not be blank.");
        }
    }

    /// Rewrite an `MM/YYYY` field in place as `Month YYYY`.
    pub fn convert_month_year(&mut self, field: &str, value: &mut String) {
        match month_year(value) {
            Some(converted) => *value = converted,
            None => self.push(field, "Not a valid date. Expected MM/YYYY."),
        }
    }

    pub fn convert_optional_month_year(&mut self, field: &str, value: &mut Option<String>) {
        if let Some(value) = value {
            self.convert_month_year(field, value);
        }
    }
}
