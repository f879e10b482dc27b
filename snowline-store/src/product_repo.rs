use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use snowline_catalog::Product;
use snowline_core::repository::{ProductFilter, ProductRepository, RepoResult};

pub struct StoreProductRepository {
    pool: PgPool,
}

impl StoreProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, product_type, name, price_cents, size, is_standard, is_professional, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    product_type: String,
    name: String,
    price_cents: i64,
    size: Option<String>,
    is_standard: bool,
    is_professional: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = snowline_catalog::ProductError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            product_type: row.product_type.parse()?,
            name: row.name,
            price_cents: row.price_cents,
            size: row.size,
            is_standard: row.is_standard,
            is_professional: row.is_professional,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> RepoResult<Vec<Product>> {
    rows.into_iter()
        .map(|row| Product::try_from(row).map_err(Into::into))
        .collect()
}

#[async_trait]
impl ProductRepository for StoreProductRepository {
    async fn create_product(&self, product: &Product) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, product_type, name, price_cents, size, is_standard, is_professional, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product.id)
        .bind(product.product_type.as_str())
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(&product.size)
        .bind(product.is_standard)
        .bind(product.is_professional)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> RepoResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose().map_err(Into::into)
    }

    async fn get_products(&self, ids: &[Uuid]) -> RepoResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        into_products(rows)
    }

    async fn list_products(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE ($1::TEXT IS NULL OR product_type = $1)
              AND ($2::BOOLEAN IS NULL OR is_professional = $2)
            ORDER BY product_type, name, size
            "#
        ))
        .bind(filter.product_type.map(|t| t.as_str()))
        .bind(filter.professional)
        .fetch_all(&self.pool)
        .await?;

        into_products(rows)
    }

    async fn update_product(&self, product: &Product) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET product_type = $1, name = $2, price_cents = $3, size = $4,
                is_standard = $5, is_professional = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(product.product_type.as_str())
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(&product.size)
        .bind(product.is_standard)
        .bind(product.is_professional)
        .bind(product.updated_at)
        .bind(product.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_product(&self, id: Uuid) -> RepoResult<bool> {
        // booking_items.product_id is ON DELETE SET NULL; the item snapshot stays
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
