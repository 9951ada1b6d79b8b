use std::sync::Arc;

use tracing::error;

use folio_crypto::TokenSigner;
use folio_db::Database;

use crate::error::ApiError;
use crate::links::LinkProber;
use crate::session::SessionManager;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session: SessionManager,
    pub signer: TokenSigner,
    pub prober: LinkProber,
    pub mail: MailSettings,
}

/// Addresses and links used when composing outgoing mail.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub sender_name: String,
    /// Sender address, and the inbox contact-form messages go to.
    pub address: String,
    /// Frontend page that takes `?t=<token>`.
    pub unsubscribe_url: String,
}

/// Run blocking DB work off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })?
        .map_err(ApiError::from)
}
