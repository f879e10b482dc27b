use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use snowline_order::Teacher;

use crate::extract::{not_blank, ApiPath, ValidatedJson};
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct TeacherRequest {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/teachers", get(list_teachers).post(create_teacher))
        .route("/teachers/{id}", put(update_teacher).delete(delete_teacher))
}

async fn ensure_name_free(state: &AppState, name: &str, except: Option<Uuid>) -> Result<(), AppError> {
    match state.repos.teachers.find_teacher_by_name(name).await? {
        Some(existing) if Some(existing.id) != except => {
            Err(AppError::ConflictError(format!("teacher '{}' already exists", existing.name)))
        }
        _ => Ok(()),
    }
}

async fn list_teachers(State(state): State<AppState>) -> Result<Json<Vec<Teacher>>, AppError> {
    Ok(Json(state.repos.teachers.list_teachers().await?))
}

async fn create_teacher(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TeacherRequest>,
) -> Result<(StatusCode, Json<Teacher>), AppError> {
    ensure_name_free(&state, &req.name, None).await?;

    let teacher = Teacher::new(req.name);
    state.repos.teachers.create_teacher(&teacher).await?;

    tracing::info!(teacher_id = %teacher.id, "Teacher created");
    Ok((StatusCode::CREATED, Json(teacher)))
}

async fn update_teacher(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<TeacherRequest>,
) -> Result<Json<Teacher>, AppError> {
    let mut teacher = state
        .repos
        .teachers
        .get_teacher(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("teacher {id}")))?;
    ensure_name_free(&state, &req.name, Some(id)).await?;

    teacher.rename(req.name);
    if !state.repos.teachers.update_teacher(&teacher).await? {
        return Err(AppError::NotFoundError(format!("teacher {id}")));
    }
    Ok(Json(teacher))
}

async fn delete_teacher(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> Result<StatusCode, AppError> {
    if !state.repos.teachers.delete_teacher(id).await? {
        return Err(AppError::NotFoundError(format!("teacher {id}")));
    }
    tracing::info!(teacher_id = %id, "Teacher deleted, lessons unassigned");
    Ok(StatusCode::NO_CONTENT)
}
