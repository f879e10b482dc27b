use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use snowline_core::repository::{BookingFilter, BookingRepository, RepoResult};
use snowline_order::{Booking, BookingItem};
use snowline_shared::CustomerContact;

use crate::database::contains_pattern;

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    customer_name: String,
    email: String,
    phone: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
    total_price_cents: i64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct BookingItemRow {
    booking_id: Uuid,
    product_id: Option<Uuid>,
    product_type: String,
    name: String,
    size: Option<String>,
    daily_price_cents: i64,
}

const BOOKING_COLUMNS: &str = "id, customer_name, email, phone, start_date, end_date, status, \
     total_price_cents, notes, created_at, updated_at";

impl BookingRow {
    fn into_booking(self, items: Vec<BookingItem>) -> RepoResult<Booking> {
        Ok(Booking {
            id: self.id,
            contact: CustomerContact::new(self.customer_name, self.email, self.phone),
            items,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status.parse()?,
            total_price_cents: self.total_price_cents,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<BookingItemRow> for BookingItem {
    type Error = snowline_catalog::ProductError;

    fn try_from(row: BookingItemRow) -> Result<Self, Self::Error> {
        Ok(BookingItem {
            product_id: row.product_id,
            product_type: row.product_type.parse()?,
            name: row.name,
            size: row.size,
            daily_price_cents: row.daily_price_cents,
        })
    }
}

impl StoreBookingRepository {
    async fn load_items(&self, booking_ids: &[Uuid]) -> RepoResult<HashMap<Uuid, Vec<BookingItem>>> {
        let rows = sqlx::query_as::<_, BookingItemRow>(
            r#"
            SELECT booking_id, product_id, product_type, name, size, daily_price_cents
            FROM booking_items
            WHERE booking_id = ANY($1)
            ORDER BY booking_id, position
            "#,
        )
        .bind(booking_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<Uuid, Vec<BookingItem>> = HashMap::new();
        for row in rows {
            let booking_id = row.booking_id;
            items.entry(booking_id).or_default().push(BookingItem::try_from(row)?);
        }
        Ok(items)
    }

    async fn assemble(&self, rows: Vec<BookingRow>) -> RepoResult<Vec<Booking>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = self.load_items(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let booking_items = items.remove(&row.id).unwrap_or_default();
                row.into_booking(booking_items)
            })
            .collect()
    }

    async fn insert_items(tx: &mut Transaction<'_, Postgres>, booking: &Booking) -> Result<(), sqlx::Error> {
        for (position, item) in booking.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO booking_items (id, booking_id, position, product_id, product_type, name, size, daily_price_cents)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(booking.id)
            .bind(position as i32)
            .bind(item.product_id)
            .bind(item.product_type.as_str())
            .bind(&item.name)
            .bind(&item.size)
            .bind(item.daily_price_cents)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create_booking(&self, booking: &Booking) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO bookings (id, customer_name, email, phone, start_date, end_date, status, total_price_cents, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.contact.name)
        .bind(booking.contact.email())
        .bind(booking.contact.phone())
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.status.as_str())
        .bind(booking.total_price_cents)
        .bind(&booking.notes)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await?;

        Self::insert_items(&mut tx, booking).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> RepoResult<Vec<Booking>> {
        let search = filter
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(contains_pattern);

        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::DATE IS NULL OR end_date >= $2)
              AND ($3::DATE IS NULL OR start_date <= $3)
              AND ($4::TEXT IS NULL OR LOWER(customer_name) LIKE $4 ESCAPE '\' OR email LIKE $4 ESCAPE '\' OR phone LIKE $4 ESCAPE '\')
            ORDER BY start_date DESC, created_at DESC
            "#
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .bind(search)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    async fn update_booking(&self, booking: &Booking) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET customer_name = $1, email = $2, phone = $3, start_date = $4, end_date = $5,
                status = $6, total_price_cents = $7, notes = $8, updated_at = $9
            WHERE id = $10
            "#,
        )
        .bind(&booking.contact.name)
        .bind(booking.contact.email())
        .bind(booking.contact.phone())
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.status.as_str())
        .bind(booking.total_price_cents)
        .bind(&booking.notes)
        .bind(booking.updated_at)
        .bind(booking.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM booking_items WHERE booking_id = $1")
            .bind(booking.id)
            .execute(&mut *tx)
            .await?;
        Self::insert_items(&mut tx, booking).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_booking(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
