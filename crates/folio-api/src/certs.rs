use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use folio_types::api::{CertificationEdit, IdRequest, NewCertification};

use crate::error::{ApiError, FieldErrors};
use crate::extract::Payload;
use crate::state::{AppState, run_db};

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let certs = run_db(&state, |db| db.list_certifications()).await?;
    Ok(Json(certs))
}

pub async fn add(
    State(state): State<AppState>,
    Payload(mut cert): Payload<NewCertification>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    errors.check_url("credential_url", &cert.credential_url);
    errors.convert_month_year("issue_date", &mut cert.issue_date);
    errors.convert_optional_month_year("issue_exp", &mut cert.issue_exp);
    errors.into_result()?;

    let name = cert.name.clone();
    run_db(&state, move |db| db.insert_certification(&cert)).await?;

    Ok(Json(json!({ "success": format!("{name} was successfully added!") })))
}

pub async fn edit(
    State(state): State<AppState>,
    Payload(mut edit): Payload<CertificationEdit>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    errors.check_optional_url("credential_url", edit.credential_url.as_deref());
    errors.convert_optional_month_year("issue_date", &mut edit.issue_date);
    errors.convert_optional_month_year("issue_exp", &mut edit.issue_exp);
    errors.into_result()?;

    let id = edit.id;
    let name = run_db(&state, move |db| db.update_certification(&edit))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No certification with id {id}")))?;

    Ok(Json(json!({ "success": format!("{name} has been successfully edited!") })))
}

pub async fn remove(
    State(state): State<AppState>,
    Payload(req): Payload<IdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = req.id;
    let name = run_db(&state, move |db| db.delete_certification(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No certification with id {id}")))?;

    Ok(Json(json!({ "success": format!("{name} was successfully deleted!") })))
}
