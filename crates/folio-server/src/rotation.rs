use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::info;

use folio_crypto::RotatingSecret;
use folio_crypto::keys::fingerprint;

/// Background task that keeps the unsubscribe signing secret fresh.
///
/// Ticks every `tick_secs` and regenerates the secret once it has aged past
/// the rotation interval. Tokens signed with the old secret stop verifying.
pub async fn run_rotation_loop(secret: Arc<RotatingSecret>, tick_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(tick_secs));

    loop {
        interval.tick().await;

        if secret.maybe_rotate(Utc::now()) {
            log_rotation(&secret);
        }
    }
}

pub fn log_rotation(secret: &RotatingSecret) {
    if let Some(current) = secret.current_secret() {
        info!("Signing secret rotated (fingerprint {})", fingerprint(&current));
    }
}
