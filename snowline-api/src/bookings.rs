use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use snowline_core::services::{self, BookingDraft};
use snowline_order::{Booking, BookingItem};
use snowline_shared::CustomerContact;

use crate::extract::{not_blank, ValidatedJson};
use crate::{error::AppError, state::AppState};

/// Rental form body, also used by the back office to edit a booking
#[derive(Debug, Deserialize, Validate)]
pub struct BookingRequest {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 5, max = 40))]
    pub phone: String,
    #[validate(length(min = 1, message = "select at least one product"))]
    pub product_ids: Vec<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl BookingRequest {
    pub fn into_draft(self) -> BookingDraft {
        BookingDraft {
            contact: CustomerContact::new(self.name, self.email, self.phone),
            product_ids: self.product_ids,
            start_date: self.start_date,
            end_date: self.end_date,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct BookingQuoteRequest {
    #[validate(length(min = 1, message = "select at least one product"))]
    pub product_ids: Vec<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingQuoteResponse {
    pub days: u32,
    pub daily_total_cents: i64,
    pub total_cents: i64,
    pub currency: String,
    pub items: Vec<BookingItem>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings/quote", post(quote_booking))
        .route("/api/bookings", post(create_booking))
}

async fn quote_booking(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<BookingQuoteRequest>,
) -> Result<Json<BookingQuoteResponse>, AppError> {
    let quote = services::quote_booking(
        &state.repos,
        &req.product_ids,
        req.start_date,
        req.end_date,
        &state.policy,
        Some(state.today()),
    )
    .await?;

    Ok(Json(BookingQuoteResponse {
        days: quote.quote.days,
        daily_total_cents: quote.quote.daily_total_cents,
        total_cents: quote.quote.total_cents,
        currency: state.business_rules.currency.clone(),
        items: quote.products.iter().map(BookingItem::from).collect(),
    }))
}

async fn create_booking(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = services::submit_booking(&state.repos, req.into_draft(), &state.policy, state.today()).await?;

    tracing::info!(
        booking_id = %booking.id,
        email = ?booking.contact.email,
        days = booking.days(),
        total_cents = booking.total_price_cents,
        "Rental booking submitted"
    );
    Ok((StatusCode::CREATED, Json(booking)))
}
