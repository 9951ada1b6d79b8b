use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use reqwest::Client;
use tracing::{debug, warn};

use folio_db::models::LinkRow;
use folio_types::models::{LinkRecord, LinkVerdict};

/// HEAD-probes stored URLs one at a time.
pub struct LinkProber {
    client: Client,
}

impl LinkProber {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("folio-link-inspector/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Probe every link in order. A failed probe marks that link dead and
    /// moves on.
    pub async fn inspect(&self, links: Vec<LinkRow>) -> Vec<LinkRecord> {
        let mut report = Vec::with_capacity(links.len());

        for link in links {
            let (verdict, http_code) = self.probe(&link.url).await;
            report.push(LinkRecord {
                table: link.table.to_string(),
                row_id: link.row_id,
                column: link.column,
                url: link.url,
                verdict,
                http_code,
            });
        }

        report
    }

    pub async fn probe(&self, url: &str) -> (LinkVerdict, Option<u16>) {
        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status();
                let verdict = classify(status, response.headers());
                debug!("Probed {} -> {} ({:?})", url, status, verdict);
                (verdict, Some(status.as_u16()))
            }
            Err(e) => {
                warn!("Link probe failed for {}: {}", url, e);
                (LinkVerdict::Dead, None)
            }
        }
    }
}

/// Decide what a probe response says about the link.
///
/// Bot-protection layers answer on the site's behalf, so their responses say
/// nothing about whether the page exists.
pub fn classify(status: StatusCode, headers: &HeaderMap) -> LinkVerdict {
    if let Some(reason) = anti_bot_signature(status, headers) {
        return LinkVerdict::Inconclusive(reason.to_string());
    }

    if status.is_success() {
        LinkVerdict::Live
    } else {
        LinkVerdict::Dead
    }
}

fn anti_bot_signature(status: StatusCode, headers: &HeaderMap) -> Option<&'static str> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let server = header("server").unwrap_or_default();

    if headers.contains_key("cf-mitigated") {
        return Some("Cloudflare challenge page; the link could not be verified");
    }
    if server.eq_ignore_ascii_case("cloudflare")
        && matches!(status.as_u16(), 403 | 429 | 503)
    {
        return Some("Cloudflare blocked the request; the link could not be verified");
    }
    if headers.contains_key("x-datadome") {
        return Some("DataDome bot protection; the link could not be verified");
    }
    if headers.contains_key("x-sucuri-id") {
        return Some("Sucuri firewall; the link could not be verified");
    }
    if headers.contains_key("x-iinfo")
        || header("x-cdn").is_some_and(|v| v.eq_ignore_ascii_case("imperva"))
    {
        return Some("Imperva bot protection; the link could not be verified");
    }
    if server.eq_ignore_ascii_case("akamaighost") && status == StatusCode::FORBIDDEN {
        return Some("Akamai denied the request; the link could not be verified");
    }

    None
}
