use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use snowline_catalog::{Product, ProductTier, ProductType};

use crate::catalog::ProductsQuery;
use crate::extract::{not_blank, ApiPath, ApiQuery, ValidatedJson};
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    pub product_type: ProductType,
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: String,
    #[validate(range(min = 0, max = 100_000_000))]
    pub price_cents: i64,
    #[validate(length(max = 40))]
    pub size: Option<String>,
    #[serde(default)]
    pub professional: bool,
}

impl ProductRequest {
    fn tier(&self) -> ProductTier {
        if self.professional {
            ProductTier::Professional
        } else {
            ProductTier::Standard
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product).put(update_product).delete(delete_product))
}

async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductsQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let filter = query.into_filter()?;
    Ok(Json(state.repos.products.list_products(&filter).await?))
}

async fn find_product(state: &AppState, id: Uuid) -> Result<Product, AppError> {
    state
        .repos
        .products
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("product {id}")))
}

async fn get_product(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Product>, AppError> {
    Ok(Json(find_product(&state, id).await?))
}

async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let tier = req.tier();
    let product = Product::new(req.product_type, req.name.trim(), req.price_cents, req.size, tier)?;
    state.repos.products.create_product(&product).await?;

    tracing::info!(product_id = %product.id, product_type = %product.product_type, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<ProductRequest>,
) -> Result<Json<Product>, AppError> {
    let mut product = find_product(&state, id).await?;
    let tier = req.tier();

    product.product_type = req.product_type;
    product.name = req.name.trim().to_string();
    product.price_cents = req.price_cents;
    product.set_size(req.size);
    product.set_tier(tier);
    product.validate()?;
    product.touch();

    if !state.repos.products.update_product(&product).await? {
        return Err(AppError::NotFoundError(format!("product {id}")));
    }
    tracing::info!(product_id = %id, "Product updated");
    Ok(Json(product))
}

async fn delete_product(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> Result<StatusCode, AppError> {
    if !state.repos.products.delete_product(id).await? {
        return Err(AppError::NotFoundError(format!("product {id}")));
    }
    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
