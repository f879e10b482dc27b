use axum::{extract::State, routing::get, Json, Router};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use snowline_core::{BookingFilter, CoreError, LessonFilter};
use snowline_order::{month_calendar, CalendarDay, Granularity, RevenueReport};

use super::DateRange;
use crate::extract::ApiQuery;
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub granularity: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/revenue", get(revenue))
        .route("/calendar", get(calendar))
}

async fn revenue(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RevenueQuery>,
) -> Result<Json<RevenueReport>, AppError> {
    let (from, to) = DateRange { from: query.from, to: query.to }.resolve(state.today())?;
    let granularity = query
        .granularity
        .as_deref()
        .map(str::parse::<Granularity>)
        .transpose()
        .map_err(AppError::ValidationError)?
        .unwrap_or_default();

    // Bookings are attributed to their start date
    let bookings = state
        .repos
        .bookings
        .list_bookings(&BookingFilter::overlapping(from, to))
        .await?;
    let lessons = state.repos.lessons.list_lessons(&LessonFilter::between(from, to)).await?;

    let report = RevenueReport::build(from, to, granularity, &bookings, &lessons).map_err(CoreError::from)?;
    Ok(Json(report))
}

async fn calendar(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let today = state.today();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());
    let (first, last) = snowline_order::month_bounds(year, month)
        .ok_or_else(|| AppError::ValidationError(format!("invalid month {year}-{month}")))?;

    let bookings = state
        .repos
        .bookings
        .list_bookings(&BookingFilter::overlapping(first, last))
        .await?;
    let lessons = state.repos.lessons.list_lessons(&LessonFilter::between(first, last)).await?;

    let days = month_calendar(year, month, &bookings, &lessons)
        .ok_or_else(|| AppError::ValidationError(format!("invalid month {year}-{month}")))?;

    Ok(Json(CalendarResponse { year, month, days }))
}
