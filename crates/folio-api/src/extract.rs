use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, FieldErrors};

/// JSON body extractor with the site's error envelopes.
///
/// Unlike `axum::Json` it ignores the content type, treats an absent, empty,
/// `null` or `{}` body as "no data" (400) and reports fields that fail to
/// deserialize as validation errors (403).
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::NoData)?;

        let value: Value = serde_json::from_slice(&bytes).map_err(|_| ApiError::NoData)?;
        if is_blank(&value) {
            return Err(ApiError::NoData);
        }

        serde_json::from_value(value)
            .map(Payload)
            .map_err(|e| ApiError::Validation(StatusCode::FORBIDDEN, FieldErrors::from_serde(&e)))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Subscribe {
        email: String,
    }

    async fn extract(body: &'static str) -> Result<Payload<Subscribe>, ApiError> {
        let req = Request::builder().body(Body::from(body)).unwrap();
        Payload::<Subscribe>::from_request(req, &()).await
    }

    #[tokio::test]
    async fn blank_bodies_are_no_data() {
        for body in ["", "null", "{}", "not json"] {
            assert!(matches!(extract(body).await, Err(ApiError::NoData)), "{body:?}");
        }
    }

    #[tokio::test]
    async fn missing_fields_are_validation_errors() {
        let err = extract(r#"{"mail": "x"}"#).await.err().unwrap();
        let ApiError::Validation(status, errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(errors.get("email").is_some());
    }

    #[tokio::test]
    async fn decodes_without_content_type() {
        let Payload(body) = extract(r#"{"email": "reader@test.com"}"#).await.ok().unwrap();
        assert_eq!(body.email, "reader@test.com");
    }
}
