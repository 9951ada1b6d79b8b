use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use folio_types::api::{ExperienceEdit, IdRequest, NewExperience};

use crate::error::{ApiError, FieldErrors};
use crate::extract::Payload;
use crate::state::{AppState, run_db};
use crate::validate::EXPERIENCE_TYPES;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let entries = run_db(&state, |db| db.list_experience()).await?;
    Ok(Json(entries))
}

pub async fn add(
    State(state): State<AppState>,
    Payload(mut entry): Payload<NewExperience>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    errors.check_one_of("type", &entry.kind, &EXPERIENCE_TYPES);
    errors.convert_month_year("start_date", &mut entry.start_date);
    errors.convert_optional_month_year("end_date", &mut entry.end_date);
    errors.into_result()?;

    let name = entry.name.clone();
    run_db(&state, move |db| db.insert_experience(&entry)).await?;

    Ok(Json(json!({ "success": format!("{name} was successfully added") })))
}

pub async fn edit(
    State(state): State<AppState>,
    Payload(mut edit): Payload<ExperienceEdit>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    if let Some(kind) = edit.kind.as_deref() {
        errors.check_one_of("type", kind, &EXPERIENCE_TYPES);
    }
    errors.convert_optional_month_year("start_date", &mut edit.start_date);
    errors.convert_optional_month_year("end_date", &mut edit.end_date);
    errors.into_result()?;

    let id = edit.id;
    let name = run_db(&state, move |db| db.update_experience(&edit))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No experience entry with id {id}")))?;

    Ok(Json(json!({ "success": format!("{name} was successfully edited!") })))
}

pub async fn remove(
    State(state): State<AppState>,
    Payload(req): Payload<IdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = req.id;
    let name = run_db(&state, move |db| db.delete_experience(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No experience entry with id {id}")))?;

    Ok(Json(json!({ "success": format!("{name} was successfully deleted!") })))
}
