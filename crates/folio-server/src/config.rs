use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};

/// Placeholder secret keys that MUST NOT be used.
pub const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "your-secret-key",
];

/// Credentials for the admin account created on first start.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub mail_sender_name: String,
    pub mail_address: String,
    pub unsubscribe_url: String,
    pub rotation_tick_secs: u64,
    pub link_timeout: Duration,
    pub admin: Option<AdminBootstrap>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any variable source; unset and empty are the same.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let secret_key = var("FOLIO_SECRET_KEY").unwrap_or_default();
        if secret_key.is_empty() || PLACEHOLDER_SECRETS.contains(&secret_key.as_str()) {
            bail!("FOLIO_SECRET_KEY is unset or still a placeholder");
        }

        let mail_address = var("FOLIO_MAIL_ADDRESS").context("FOLIO_MAIL_ADDRESS is not set")?;

        let host = or("FOLIO_HOST", "0.0.0.0");
        let port: u16 = or("FOLIO_PORT", "5000")
            .parse()
            .context("FOLIO_PORT is not a valid port")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let rotation_tick_secs: u64 = or("FOLIO_ROTATION_TICK_SECS", "1")
            .parse()
            .context("FOLIO_ROTATION_TICK_SECS is not a number")?;
        if rotation_tick_secs == 0 {
            bail!("FOLIO_ROTATION_TICK_SECS must be at least 1");
        }

        let link_timeout_secs: u64 = or("FOLIO_LINK_TIMEOUT_SECS", "10")
            .parse()
            .context("FOLIO_LINK_TIMEOUT_SECS is not a number")?;

        let admin = match (
            var("FOLIO_ADMIN_USERNAME"),
            var("FOLIO_ADMIN_EMAIL"),
            var("FOLIO_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(AdminBootstrap {
                username,
                email,
                password,
            }),
            (None, None, None) => None,
            _ => bail!(
                "FOLIO_ADMIN_USERNAME, FOLIO_ADMIN_EMAIL and FOLIO_ADMIN_PASSWORD must be set together"
            ),
        };

        Ok(Self {
            secret_key,
            db_path: or("FOLIO_DB_PATH", "folio.db").into(),
            addr,
            mail_sender_name: or("FOLIO_MAIL_SENDER_NAME", "Portfolio"),
            mail_address,
            unsubscribe_url: or(
                "FOLIO_UNSUBSCRIBE_URL",
                "http://localhost:5173/newsletter/unsubscribe",
            ),
            rotation_tick_secs,
            link_timeout: Duration::from_secs(link_timeout_secs),
            admin,
        })
    }
}
