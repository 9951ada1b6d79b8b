use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde_json::json;

use folio_types::api::{BlogListQuery, BlogPostEdit, BlogQuery, IdRequest, NewBlogPost};
use folio_types::models::BlogPost;

use crate::error::{ApiError, FieldErrors};
use crate::extract::Payload;
use crate::state::{AppState, run_db};

/// GET /blog?tp=N: the first N published posts plus the total post count.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<BlogListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.tp.filter(|&n| n > 0).ok_or(ApiError::NoData)?;

    let (rows, count) = run_db(&state, move |db| {
        Ok((db.published_blog_posts(limit)?, db.count_blog_posts()?))
    })
    .await?;

    let blogs: Vec<BlogPost> = rows.into_iter().map(|row| row.into_post(false)).collect();
    Ok(Json(json!({ "blogs": blogs, "blog_count": count })))
}

/// GET /blog/singular?id=N[&edit=true]. Draft flag and description are only
/// included when editing.
pub async fn single(
    State(state): State<AppState>,
    Query(query): Query<BlogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id = query
        .id
        .filter(|&id| id > 0)
        .ok_or_else(|| ApiError::BadRequest("No id was provided".into()))?;
    let editing = query.edit.as_deref() == Some("true");

    let post = run_db(&state, move |db| db.get_blog_post(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No blog post with id {id}")))?;

    Ok(Json(post.into_post(editing)))
}

pub async fn add(
    State(state): State<AppState>,
    Payload(post): Payload<NewBlogPost>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    errors.check_not_blank("title", &post.title);
    errors.check_not_blank("description", &post.description);
    if post.content.is_null() {
        errors.push("content", "Field may not be null.");
    }
    errors.into_result()?;

    run_db(&state, move |db| db.insert_blog_post(&post)).await?;
    Ok(Json(json!({ "success": "Blog was successfully posted!" })))
}

pub async fn edit(
    State(state): State<AppState>,
    Payload(edit): Payload<BlogPostEdit>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = FieldErrors::default();
    if let Some(title) = edit.title.as_deref() {
        errors.check_not_blank("title", title);
    }
    if let Some(description) = edit.description.as_deref() {
        errors.check_not_blank("description", description);
    }
    errors.into_result()?;

    let id = edit.id;
    run_db(&state, move |db| db.update_blog_post(&edit))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No blog post with id {id}")))?;

    Ok(Json(json!({ "success": "Blog has been successfully updated!" })))
}

pub async fn remove(
    State(state): State<AppState>,
    Payload(req): Payload<IdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = req.id;
    run_db(&state, move |db| db.delete_blog_post(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No blog post with id {id}")))?;

    Ok(Json(json!({ "success": "Blog was successfully deleted!" })))
}
