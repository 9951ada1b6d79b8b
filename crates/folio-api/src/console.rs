use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::info;

use folio_db::{EMPTY_TABLE_MESSAGE, SelectOutcome};
use folio_types::api::SqlQueryRequest;

use crate::error::ApiError;
use crate::extract::Payload;
use crate::state::{AppState, run_db};

pub const NO_LINKS_MESSAGE: &str = "No links were found to inspect";

/// POST /admin/sql: run `SELECT <query>` and return the rows.
pub async fn execute_sql(
    State(state): State<AppState>,
    Payload(req): Payload<SqlQueryRequest>,
) -> Result<Response, ApiError> {
    let outcome = run_db(&state, move |db| db.execute_select(&req.query)).await?;
    let status = StatusCode::from_u16(outcome.status()).unwrap_or(StatusCode::BAD_REQUEST);

    let body = match outcome {
        SelectOutcome::Rows(rows) => json!({ "res": rows }),
        SelectOutcome::Empty => json!({ "res": EMPTY_TABLE_MESSAGE }),
        SelectOutcome::Failed(msg) => json!({ "err_msg": msg }),
    };

    Ok((status, Json(body)).into_response())
}

/// GET /admin/links: probe every stored URL and report on each.
pub async fn inspect_links(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let links = run_db(&state, |db| db.collect_links()).await?;
    if links.is_empty() {
        return Ok(Json(json!({ "report": NO_LINKS_MESSAGE })));
    }

    info!("Inspecting {} stored links", links.len());
    let report = state.prober.inspect(links).await;

    Ok(Json(json!({ "report": report })))
}
