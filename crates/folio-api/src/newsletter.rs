use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{info, warn};

use folio_crypto::TokenError;
use folio_db::queries::QueuedMail;
use folio_types::api::{DraftRequest, SendNewsletterRequest, SubscribeRequest, UnsubscribeQuery};

use crate::error::{ApiError, FieldErrors};
use crate::extract::Payload;
use crate::state::{AppState, run_db};

pub async fn subscribe(
    State(state): State<AppState>,
    Payload(req): Payload<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    errors.check_email("email", &req.email);
    errors.into_result()?;

    let email = req.email.clone();
    run_db(&state, move |db| db.subscribe(&email))
        .await
        .map_err(|e| match e {
            ApiError::BadRequest(_) => ApiError::BadRequest(format!("{} is already subscribed", req.email)),
            other => other,
        })?;

    info!("New newsletter subscriber");
    Ok(Json(json!({ "success": "email subscribed to newsletter!" })))
}

pub async fn subscribers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let emails = run_db(&state, |db| db.subscribers()).await?;
    Ok(Json(json!({ "res": emails })))
}

pub async fn save_draft(
    State(state): State<AppState>,
    Payload(req): Payload<DraftRequest>,
) -> Result<impl IntoResponse, ApiError> {
    run_db(&state, move |db| db.save_draft(&req.title, &req.content)).await?;
    Ok(Json(json!({ "success": "Draft has been saved!" })))
}

/// 204 when there is no stored draft.
pub async fn get_draft(State(state): State<AppState>) -> Result<Response, ApiError> {
    let draft = run_db(&state, |db| db.get_draft()).await?;
    Ok(match draft {
        Some(draft) => Json(draft).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn delete_draft(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    run_db(&state, |db| db.delete_draft()).await?;
    Ok(Json(json!({ "success": "Draft has been deleted!" })))
}

/// Queue one copy per subscriber, each with its own unsubscribe link.
pub async fn send(
    State(state): State<AppState>,
    Payload(req): Payload<SendNewsletterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let recipients = run_db(&state, |db| db.subscribers()).await?;

    let mut bodies = Vec::with_capacity(recipients.len());
    for email in &recipients {
        let token = state
            .signer
            .generate_unsubscribe_token(email)
            .map_err(|e| ApiError::Internal(e.into()))?;
        bodies.push(with_unsubscribe_footer(&req.content, &state.mail.unsubscribe_url, &token));
    }

    let title = req.title;
    let queued = run_db(&state, move |db| {
        let batch: Vec<QueuedMail<'_>> = recipients
            .iter()
            .zip(&bodies)
            .map(|(recipient, html)| QueuedMail {
                recipient,
                subject: &title,
                html,
            })
            .collect();
        db.enqueue_mail(&batch)
    })
    .await?;

    info!("Queued newsletter for {} subscribers", queued);
    Ok(Json(json!({ "success": format!("Newsletter queued for {queued} subscribers") })))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    Query(query): Query<UnsubscribeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let token = query
        .t
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No unsubscribe token was provided!".into()))?;

    let payload = match state.signer.verify_token(&token) {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            return Err(ApiError::Expired(
                "This unsubscribe link has expired or is no longer valid".into(),
            ));
        }
        Err(TokenError::Malformed) => {
            warn!("Malformed unsubscribe token");
            return Err(ApiError::BadRequest("Malformed unsubscribe token".into()));
        }
        Err(e) => return Err(ApiError::Internal(e.into())),
    };

    let email = payload.email.clone();
    let removed = run_db(&state, move |db| db.unsubscribe(&email)).await?;
    if !removed {
        return Err(ApiError::NotFound(
            "Email is not subscribed to the newsletter".into(),
        ));
    }

    info!("Newsletter subscriber removed");
    Ok(Json(json!({ "success": format!("{} has been unsubscribed", payload.email) })))
}

fn with_unsubscribe_footer(content: &str, unsubscribe_url: &str, token: &str) -> String {
    format!(
        r#"{content}
<br /> <br />
<a href="{unsubscribe_url}?t={token}">Unsubscribe from newsletter</a>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_links_to_token() {
        let html = with_unsubscribe_footer(
            "<p>test content</p>",
            "http://localhost:5173/newsletter/unsubscribe",
            "abc.def.ghi",
        );
        assert!(html.starts_with("<p>test content</p>"));
        assert!(html.contains(r#"href="http://localhost:5173/newsletter/unsubscribe?t=abc.def.ghi""#));
    }
}
