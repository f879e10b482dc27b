use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use snowline_catalog::{LessonPricing, PriceListEntry};

use crate::extract::{not_blank, ApiPath, ValidatedJson};
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct PriceListRequest {
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub category: String,
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub item: String,
    #[validate(custom(function = "not_blank"), length(max = 50))]
    pub duration_label: String,
    #[validate(range(min = 0, max = 100_000_000))]
    pub price_cents: i64,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LessonPricingRequest {
    #[validate(range(min = 1, max = 50))]
    pub people: u32,
    #[validate(range(min = 1, max = 12))]
    pub duration_hours: u32,
    #[validate(range(min = 0, max = 100_000_000))]
    pub price_cents: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/price-list", get(list_entries).post(create_entry))
        .route("/price-list/{id}", put(update_entry).delete(delete_entry))
        .route("/lesson-pricing", get(list_lesson_pricing).put(upsert_lesson_pricing))
        .route("/lesson-pricing/{id}", delete(delete_lesson_pricing))
}

async fn list_entries(State(state): State<AppState>) -> Result<Json<Vec<PriceListEntry>>, AppError> {
    Ok(Json(state.repos.price_list.list_entries().await?))
}

async fn create_entry(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PriceListRequest>,
) -> Result<(StatusCode, Json<PriceListEntry>), AppError> {
    let entry = PriceListEntry::new(
        req.category.trim(),
        req.item.trim(),
        req.duration_label.trim(),
        req.price_cents,
        req.position,
    );
    state.repos.price_list.create_entry(&entry).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update_entry(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<PriceListRequest>,
) -> Result<Json<PriceListEntry>, AppError> {
    let entry = PriceListEntry {
        id,
        category: req.category.trim().to_string(),
        item: req.item.trim().to_string(),
        duration_label: req.duration_label.trim().to_string(),
        price_cents: req.price_cents,
        position: req.position,
    };
    if !state.repos.price_list.update_entry(&entry).await? {
        return Err(AppError::NotFoundError(format!("price list entry {id}")));
    }
    Ok(Json(entry))
}

async fn delete_entry(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> Result<StatusCode, AppError> {
    if !state.repos.price_list.delete_entry(id).await? {
        return Err(AppError::NotFoundError(format!("price list entry {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_lesson_pricing(State(state): State<AppState>) -> Result<Json<Vec<LessonPricing>>, AppError> {
    Ok(Json(state.repos.lesson_pricing.list_pricing().await?))
}

async fn upsert_lesson_pricing(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LessonPricingRequest>,
) -> Result<Json<LessonPricing>, AppError> {
    let stored = state
        .repos
        .lesson_pricing
        .upsert_pricing(&LessonPricing::new(req.people, req.duration_hours, req.price_cents))
        .await?;

    tracing::info!(
        people = stored.people,
        duration_hours = stored.duration_hours,
        price_cents = stored.price_cents,
        "Lesson price set"
    );
    Ok(Json(stored))
}

async fn delete_lesson_pricing(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.repos.lesson_pricing.delete_pricing(id).await? {
        return Err(AppError::NotFoundError(format!("lesson price {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}
