use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use folio_types::api::{
    CourseEdit, CourseListRequest, DeleteCourseRequest, DeleteInstituteRequest, InstituteEdit,
    NewCourse, NewInstitute,
};
use folio_types::models::Institute;

use crate::error::{ApiError, FieldErrors};
use crate::extract::Payload;
use crate::state::{AppState, run_db};
use crate::validate::INSTITUTE_TYPES;

// -- Courses --

/// POST /education/courses: courses taken at one institute.
pub async fn list_courses(
    State(state): State<AppState>,
    Payload(req): Payload<CourseListRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let courses = run_db(&state, move |db| db.courses_for_institute(&req.institute)).await?;
    Ok(Json(courses))
}

pub async fn add_course(
    State(state): State<AppState>,
    Payload(course): Payload<NewCourse>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    errors.check_optional_url("course_url", course.course_url.as_deref());
    errors.into_result()?;

    let course_id = course.course_id.clone();
    run_db(&state, move |db| db.insert_course(&course)).await?;

    Ok(Json(json!({
        "success": format!("Entry: \"{course_id}\" has been successfully added!")
    })))
}

pub async fn edit_course(
    State(state): State<AppState>,
    Payload(edit): Payload<CourseEdit>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    errors.check_optional_url("course_url", edit.course_url.as_deref());
    errors.into_result()?;

    let id = edit.id;
    let name = run_db(&state, move |db| db.update_course(&edit))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No course with id {id}")))?;

    Ok(Json(json!({ "success": format!("{name} has been successfully updated!") })))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Payload(req): Payload<DeleteCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = req.course_id;
    let name = run_db(&state, move |db| db.delete_course(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No course with id {id}")))?;

    Ok(Json(json!({ "success": format!("{name} has been deleted!") })))
}

// -- Institutes --

/// GET /education/institute: awards come back as a list unless `N/A`.
pub async fn list_institutes(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = run_db(&state, |db| db.list_institutes()).await?;
    let institutes: Vec<Institute> = rows.into_iter().map(Institute::from).collect();
    Ok(Json(institutes))
}

pub async fn add_institute(
    State(state): State<AppState>,
    Payload(mut institute): Payload<NewInstitute>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    errors.check_one_of("institute_type", &institute.institute_type, &INSTITUTE_TYPES);
    errors.check_url("institute_url", &institute.institute_url);
    errors.check_url("logo_url", &institute.logo_url);
    errors.convert_month_year("start_date", &mut institute.start_date);

    // A graduation date wins over an expected one
    if institute.grad_date.is_some() {
        errors.convert_optional_month_year("grad_date", &mut institute.grad_date);
        institute.expected_date = None;
    } else if institute.expected_date.is_some() {
        errors.convert_optional_month_year("expected_date", &mut institute.expected_date);
    } else {
        errors.push("grad_date", "Either grad_date or expected_date is required.");
    }
    errors.into_result()?;

    if institute.major.as_deref().is_some_and(|m| m.trim().is_empty()) {
        institute.major = None;
    }

    let name = institute.name.clone();
    run_db(&state, move |db| db.insert_institute(&institute)).await?;

    Ok(Json(json!({
        "success": format!("Entry: \"{name}\" has been successfully added!")
    })))
}

pub async fn edit_institute(
    State(state): State<AppState>,
    Payload(mut edit): Payload<InstituteEdit>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    if let Some(kind) = edit.institute_type.as_deref() {
        errors.check_one_of("institute_type", kind, &INSTITUTE_TYPES);
    }
    errors.check_optional_url("institute_url", edit.institute_url.as_deref());
    errors.check_optional_url("logo_url", edit.logo_url.as_deref());
    errors.convert_optional_month_year("start_date", &mut edit.start_date);
    errors.convert_optional_month_year("grad_date", &mut edit.grad_date);
    errors.convert_optional_month_year("expected_date", &mut edit.expected_date);
    errors.into_result()?;

    let id = edit.id;
    let name = run_db(&state, move |db| db.update_institute(&edit))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No institute with id {id}")))?;

    Ok(Json(json!({ "success": format!("{name} was successfully edited!") })))
}

pub async fn delete_institute(
    State(state): State<AppState>,
    Payload(req): Payload<DeleteInstituteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = req.institute_id;
    let name = run_db(&state, move |db| db.delete_institute(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No institute with id {id}")))?;

    Ok(Json(json!({ "success": format!("{name} has been deleted!") })))
}
