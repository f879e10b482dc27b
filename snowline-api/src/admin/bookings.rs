use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use snowline_core::{services, BookingFilter};
use snowline_order::Booking;

use super::{parse_status, DateRange, StatusRequest};
use crate::bookings::BookingRequest;
use crate::extract::{ApiPath, ApiQuery, ValidatedJson};
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub q: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings))
        .route("/bookings/{id}", get(get_booking).put(update_booking).delete(delete_booking))
        .route("/bookings/{id}/status", patch(update_status))
}

async fn list_bookings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    DateRange { from: query.from, to: query.to }.check()?;
    let filter = BookingFilter {
        status: parse_status(query.status.as_deref())?,
        from: query.from,
        to: query.to,
        q: query.q.filter(|q| !q.trim().is_empty()),
    };

    Ok(Json(state.repos.bookings.list_bookings(&filter).await?))
}

async fn get_booking(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(services::find_booking(&state.repos, id).await?))
}

async fn update_booking(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<BookingRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = services::revise_booking(&state.repos, id, req.into_draft(), &state.policy).await?;
    tracing::info!(booking_id = %id, total_cents = booking.total_price_cents, "Booking updated");
    Ok(Json(booking))
}

async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<StatusRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = services::change_booking_status(&state.repos, id, req.status).await?;
    tracing::info!(booking_id = %id, status = %booking.status, "Booking status changed");
    Ok(Json(booking))
}

async fn delete_booking(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> Result<StatusCode, AppError> {
    if !state.repos.bookings.delete_booking(id).await? {
        return Err(AppError::NotFoundError(format!("booking {id}")));
    }
    tracing::info!(booking_id = %id, "Booking deleted");
    Ok(StatusCode::NO_CONTENT)
}
