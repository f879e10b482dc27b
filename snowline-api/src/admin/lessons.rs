use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use snowline_core::{services, LessonFilter};
use snowline_order::Lesson;

use super::{parse_status, DateRange, StatusRequest};
use crate::extract::{ApiPath, ApiQuery, ValidatedJson};
use crate::lessons::LessonRequest;
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct LessonsQuery {
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub teacher_id: Option<Uuid>,
    pub q: Option<String>,
}

/// `{"teacher_id": null}` unassigns
#[derive(Debug, Deserialize, Validate)]
pub struct AssignTeacherRequest {
    pub teacher_id: Option<Uuid>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/lessons", get(list_lessons))
        .route("/lessons/{id}", get(get_lesson).put(update_lesson).delete(delete_lesson))
        .route("/lessons/{id}/status", patch(update_status))
        .route("/lessons/{id}/teacher", patch(assign_teacher))
}

async fn list_lessons(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LessonsQuery>,
) -> Result<Json<Vec<Lesson>>, AppError> {
    DateRange { from: query.from, to: query.to }.check()?;
    let filter = LessonFilter {
        status: parse_status(query.status.as_deref())?,
        from: query.from,
        to: query.to,
        teacher_id: query.teacher_id,
        q: query.q.filter(|q| !q.trim().is_empty()),
    };

    Ok(Json(state.repos.lessons.list_lessons(&filter).await?))
}

async fn get_lesson(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Lesson>, AppError> {
    Ok(Json(services::find_lesson(&state.repos, id).await?))
}

async fn update_lesson(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<LessonRequest>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = services::revise_lesson(&state.repos, id, req.into_draft(), &state.policy).await?;
    tracing::info!(lesson_id = %id, total_cents = lesson.total_price_cents, "Lesson updated");
    Ok(Json(lesson))
}

async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<StatusRequest>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = services::change_lesson_status(&state.repos, id, req.status).await?;
    tracing::info!(lesson_id = %id, status = %lesson.status, "Lesson status changed");
    Ok(Json(lesson))
}

async fn assign_teacher(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<AssignTeacherRequest>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = services::assign_teacher(&state.repos, id, req.teacher_id).await?;
    tracing::info!(lesson_id = %id, teacher_id = ?lesson.teacher_id, "Lesson teacher assigned");
    Ok(Json(lesson))
}

async fn delete_lesson(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> Result<StatusCode, AppError> {
    if !state.repos.lessons.delete_lesson(id).await? {
        return Err(AppError::NotFoundError(format!("lesson {id}")));
    }
    tracing::info!(lesson_id = %id, "Lesson deleted");
    Ok(StatusCode::NO_CONTENT)
}
