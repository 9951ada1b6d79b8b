use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use folio_crypto::keys::generate_session_token;

use crate::state::AppState;

/// The one active admin session. A new login replaces it.
#[derive(Default)]
pub struct SessionManager {
    token: Mutex<Option<String>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self) -> String {
        let token = generate_session_token();
        *self.lock() = Some(token.clone());
        token
    }

    pub fn logout(&self) {
        *self.lock() = None;
    }

    pub fn is_active(&self, presented: &str) -> bool {
        self.lock().as_deref() == Some(presented)
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reject requests whose `Authorization: Bearer` token is not the active
/// session with an empty 403.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(StatusCode::FORBIDDEN)?;

    if !state.session.is_active(token) {
        warn!("Rejected admin request to {}", req.uri().path());
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}
