use axum::{extract::State, routing::get, Json, Router};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use snowline_catalog::{LessonPricing, PriceListEntry, Product, ProductType};
use snowline_core::{services, ProductFilter};
use snowline_order::{Discipline, LessonLevel};

use crate::extract::ApiQuery;
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub product_type: Option<String>,
    pub professional: Option<bool>,
}

impl ProductsQuery {
    pub fn into_filter(self) -> Result<ProductFilter, AppError> {
        let product_type = self
            .product_type
            .filter(|t| !t.trim().is_empty())
            .map(|t| t.trim().parse::<ProductType>())
            .transpose()?;

        Ok(ProductFilter {
            product_type,
            professional: self.professional,
        })
    }
}

/// Everything the lesson form needs to render its choices
#[derive(Debug, Serialize, Deserialize)]
pub struct LessonOptions {
    pub languages: Vec<String>,
    pub levels: Vec<LessonLevel>,
    pub disciplines: Vec<Discipline>,
    pub durations: Vec<u32>,
    pub max_participants: u32,
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub currency: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/products", get(list_products))
        .route("/api/price-list", get(price_list))
        .route("/api/lesson-pricing", get(lesson_pricing))
        .route("/api/lessons/options", get(lesson_options))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductsQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let filter = query.into_filter()?;
    Ok(Json(state.repos.products.list_products(&filter).await?))
}

async fn price_list(State(state): State<AppState>) -> Result<Json<Vec<PriceListEntry>>, AppError> {
    Ok(Json(state.repos.price_list.list_entries().await?))
}

async fn lesson_pricing(State(state): State<AppState>) -> Result<Json<Vec<LessonPricing>>, AppError> {
    Ok(Json(state.repos.lesson_pricing.list_pricing().await?))
}

async fn lesson_options(State(state): State<AppState>) -> Result<Json<LessonOptions>, AppError> {
    let prices = services::load_price_table(&state.repos).await?;
    let rules = &state.policy.lesson;

    Ok(Json(LessonOptions {
        languages: rules.languages.clone(),
        levels: LessonLevel::ALL.to_vec(),
        disciplines: Discipline::ALL.to_vec(),
        durations: prices.durations(),
        max_participants: rules.max_participants.min(prices.max_people()),
        day_start: rules.day_start,
        day_end: rules.day_end,
        currency: state.business_rules.currency.clone(),
    }))
}
