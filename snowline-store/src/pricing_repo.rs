use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use snowline_catalog::{LessonPricing, PriceListEntry};
use snowline_core::repository::{LessonPricingRepository, PriceListRepository, RepoResult};

pub struct StorePriceListRepository {
    pool: PgPool,
}

impl StorePriceListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PriceListRow {
    id: Uuid,
    category: String,
    item: String,
    duration_label: String,
    price_cents: i64,
    position: i32,
}

impl From<PriceListRow> for PriceListEntry {
    fn from(row: PriceListRow) -> Self {
        PriceListEntry {
            id: row.id,
            category: row.category,
            item: row.item,
            duration_label: row.duration_label,
            price_cents: row.price_cents,
            position: row.position,
        }
    }
}

#[async_trait]
impl PriceListRepository for StorePriceListRepository {
    async fn list_entries(&self) -> RepoResult<Vec<PriceListEntry>> {
        let rows = sqlx::query_as::<_, PriceListRow>(
            r#"
            SELECT id, category, item, duration_label, price_cents, position
            FROM price_list
            ORDER BY position, category, item
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PriceListEntry::from).collect())
    }

    async fn create_entry(&self, entry: &PriceListEntry) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO price_list (id, category, item, duration_label, price_cents, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.category)
        .bind(&entry.item)
        .bind(&entry.duration_label)
        .bind(entry.price_cents)
        .bind(entry.position)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_entry(&self, entry: &PriceListEntry) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE price_list
            SET category = $1, item = $2, duration_label = $3, price_cents = $4, position = $5
            WHERE id = $6
            "#,
        )
        .bind(&entry.category)
        .bind(&entry.item)
        .bind(&entry.duration_label)
        .bind(entry.price_cents)
        .bind(entry.position)
        .bind(entry.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_entry(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM price_list WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct StoreLessonPricingRepository {
    pool: PgPool,
}

impl StoreLessonPricingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LessonPricingRow {
    id: Uuid,
    people: i32,
    duration_hours: i32,
    price_cents: i64,
}

impl TryFrom<LessonPricingRow> for LessonPricing {
    type Error = std::num::TryFromIntError;

    fn try_from(row: LessonPricingRow) -> Result<Self, Self::Error> {
        Ok(LessonPricing {
            id: row.id,
            people: u32::try_from(row.people)?,
            duration_hours: u32::try_from(row.duration_hours)?,
            price_cents: row.price_cents,
        })
    }
}

#[async_trait]
impl LessonPricingRepository for StoreLessonPricingRepository {
    async fn list_pricing(&self) -> RepoResult<Vec<LessonPricing>> {
        let rows = sqlx::query_as::<_, LessonPricingRow>(
            "SELECT id, people, duration_hours, price_cents FROM lesson_pricing ORDER BY people, duration_hours",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| LessonPricing::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn upsert_pricing(&self, pricing: &LessonPricing) -> RepoResult<LessonPricing> {
        let row = sqlx::query_as::<_, LessonPricingRow>(
            r#"
            INSERT INTO lesson_pricing (id, people, duration_hours, price_cents)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (people, duration_hours) DO UPDATE SET price_cents = EXCLUDED.price_cents
            RETURNING id, people, duration_hours, price_cents
            "#,
        )
        .bind(pricing.id)
        .bind(i32::try_from(pricing.people)?)
        .bind(i32::try_from(pricing.duration_hours)?)
        .bind(pricing.price_cents)
        .fetch_one(&self.pool)
        .await?;

        Ok(LessonPricing::try_from(row)?)
    }

    async fn delete_pricing(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM lesson_pricing WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
