mod config;
mod rotation;

use std::sync::Arc;

use chrono::Utc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use folio_api::{AppState, AppStateInner, MailSettings, auth, links::LinkProber, session::SessionManager};
use folio_crypto::{RotatingSecret, TokenSigner};
use folio_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=debug,folio_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {:#}", e);
            eprintln!("       Set it in your .env file and restart.");
            std::process::exit(1);
        }
    };

    let db = Database::open(&config.db_path)?;
    info!("Database opened at {}", config.db_path.display());

    if let Some(admin) = &config.admin {
        let hash = auth::hash_password(&admin.password)?;
        if db.ensure_admin(&admin.username, &admin.email, &hash)? {
            info!("Created admin account {}", admin.username);
        }
    }

    // Sign nothing until the first secret exists
    let secret = Arc::new(RotatingSecret::new());
    secret.maybe_rotate(Utc::now());
    rotation::log_rotation(&secret);
    tokio::spawn(rotation::run_rotation_loop(secret.clone(), config.rotation_tick_secs));

    let state: AppState = Arc::new(AppStateInner {
        db,
        session: SessionManager::new(),
        signer: TokenSigner::new(secret, config.secret_key.as_bytes()),
        prober: LinkProber::new(config.link_timeout)?,
        mail: MailSettings {
            sender_name: config.mail_sender_name.clone(),
            address: config.mail_address.clone(),
            unsubscribe_url: config.unsubscribe_url.clone(),
        },
    });

    let app = folio_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Folio server listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
