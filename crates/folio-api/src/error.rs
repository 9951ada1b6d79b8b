use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

pub const NO_DATA: &str = "No data was provided!";

/// Per-field validation messages, serialized as `{field: [msg, ...]}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise a 403 validation error.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(StatusCode::FORBIDDEN, self))
        }
    }

    /// Best-effort field attribution for a body that failed to deserialize.
    pub fn from_serde(err: &serde_json::Error) -> Self {
        let mut errors = Self::default();
        let message = err.to_string();

        if let Some(field) = backticked_after(&message, "missing field ") {
            errors.push(field, "Missing data for required field.");
        } else if let Some(field) = backticked_after(&message, "unknown field ") {
            errors.push(field, "Unknown field.");
        } else {
            // Drop serde_json's " at line 1 column 12" suffix
            let detail = message.split(" at line ").next().unwrap_or(&message);
            errors.push("_schema", detail);
        }

        errors
    }
}

fn backticked_after<'a>(message: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = message.strip_prefix(prefix)?.strip_prefix('`')?;
    rest.split('`').next()
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, empty or non-JSON body.
    #[error("no data was provided")]
    NoData,
    #[error("validation failed")]
    Validation(StatusCode, FieldErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    /// Unsubscribe token that is expired or was signed with an older secret.
    #[error("{0}")]
    Expired(String),
    #[error("internal error: {0}")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if folio_db::is_constraint_violation(&err) {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NoData => (StatusCode::BAD_REQUEST, json!({ "error": NO_DATA })),
            ApiError::Validation(status, errors) => (status, json!({ "errors": errors })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            ApiError::Expired(msg) => (StatusCode::BAD_REQUEST, json!({ "expired": msg })),
            ApiError::Internal(err) => {
                error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    #[serde(deny_unknown_fields)]
    #[allow(dead_code)]
    struct Sample {
        email: String,
    }

    fn serde_error(body: &str) -> serde_json::Error {
        serde_json::from_str::<Sample>(body).unwrap_err()
    }

    #[test]
    fn missing_and_unknown_fields_are_attributed() {
        let errors = FieldErrors::from_serde(&serde_error("{}"));
        assert_eq!(errors.get("email"), Some(&["Missing data for required field.".to_string()][..]));

        let errors = FieldErrors::from_serde(&serde_error(r#"{"email": "a@b.co", "name": "x"}"#));
        assert_eq!(errors.get("name"), Some(&["Unknown field.".to_string()][..]));
    }

    #[test]
    fn type_errors_land_under_schema() {
        let errors = FieldErrors::from_serde(&serde_error(r#"{"email": 5}"#));
        let messages = errors.get("_schema").unwrap();
        assert!(messages[0].starts_with("invalid type"), "{messages:?}");
        assert!(!messages[0].contains("line"));
    }

    #[test]
    fn empty_errors_pass() {
        assert!(FieldErrors::default().into_result().is_ok());

        let mut errors = FieldErrors::default();
        errors.push("email", "Not a valid email address.");
        assert!(matches!(
            errors.into_result(),
            Err(ApiError::Validation(StatusCode::FORBIDDEN, _))
        ));
    }
}
