use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde_json::json;

use folio_types::api::{IdRequest, NewProject, PageQuery, ProjectEdit, ShowcaseRequest};

use crate::error::{ApiError, FieldErrors};
use crate::extract::Payload;
use crate::state::{AppState, run_db};

/// GET /projects?page=N, one-based.
pub async fn page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query
        .page
        .filter(|&p| p > 0)
        .ok_or_else(|| ApiError::BadRequest("No page data was provided!".into()))?;

    let projects = run_db(&state, move |db| db.project_page(page)).await?;
    Ok(Json(projects))
}

pub async fn total_pages(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let pages = run_db(&state, |db| db.total_project_pages()).await?;
    Ok(Json(json!({ "payload": pages })))
}

pub async fn add(
    State(state): State<AppState>,
    Payload(mut project): Payload<NewProject>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    errors.check_url("project_repo_url", &project.project_repo_url);
    errors.check_optional_url("project_url", project.project_url.as_deref());
    errors.convert_month_year("start_date", &mut project.start_date);
    errors.convert_optional_month_year("end_date", &mut project.end_date);
    errors.into_result()?;

    let name = project.name.clone();
    run_db(&state, move |db| db.insert_project(&project)).await?;

    Ok(Json(json!({ "success": format!("{name} was successfully added!") })))
}

pub async fn edit(
    State(state): State<AppState>,
    Payload(mut edit): Payload<ProjectEdit>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    errors.check_optional_url("project_repo_url", edit.project_repo_url.as_deref());
    errors.check_optional_url("project_url", edit.project_url.as_deref());
    errors.convert_optional_month_year("start_date", &mut edit.start_date);
    errors.convert_optional_month_year("end_date", &mut edit.end_date);
    errors.into_result()?;

    let id = edit.id;
    let name = run_db(&state, move |db| db.update_project(&edit))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No project with id {id}")))?;

    Ok(Json(json!({ "success": format!("{name} has been successfully updated!") })))
}

/// Deleting a project also drops it from the showcase.
pub async fn remove(
    State(state): State<AppState>,
    Payload(req): Payload<IdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = req.id;
    let name = run_db(&state, move |db| db.delete_project(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No project with id {id}")))?;

    Ok(Json(json!({ "success": format!("{name} has been successfully deleted") })))
}

// -- Showcase --

pub async fn showcase(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let showcase = run_db(&state, |db| db.showcase()).await?;
    Ok(Json(showcase))
}

pub async fn add_to_showcase(
    State(state): State<AppState>,
    Payload(req): Payload<ShowcaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.project_name;
    let id = project_id(&state, &name).await?;

    let added = run_db(&state, move |db| db.add_to_showcase(id)).await?;
    if !added {
        return Err(ApiError::BadRequest(format!("{name} is already in the Showcase")));
    }

    Ok(Json(json!({ "success": format!("{name} was successfully added to Showcase") })))
}

pub async fn remove_from_showcase(
    State(state): State<AppState>,
    Payload(req): Payload<ShowcaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.project_name;
    let id = project_id(&state, &name).await?;

    let removed = run_db(&state, move |db| db.remove_from_showcase(id)).await?;
    if !removed {
        return Err(ApiError::NotFound(format!("{name} is not in the Showcase")));
    }

    Ok(Json(json!({ "success": format!("{name} was removed from Showcase") })))
}

async fn project_id(state: &AppState, name: &str) -> Result<i64, ApiError> {
    let lookup = name.to_string();
    run_db(state, move |db| db.project_id_by_name(&lookup))
        .await?
        .ok_or_else(|| ApiError::BadRequest(format!("{name} is not an existing project")))
}
