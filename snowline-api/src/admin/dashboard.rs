use axum::{extract::State, routing::get, Json, Router};

use snowline_core::{BookingFilter, CoreError, LessonFilter};
use snowline_order::DashboardSummary;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardSummary>, AppError> {
    let bookings = state.repos.bookings.list_bookings(&BookingFilter::default()).await?;
    let lessons = state.repos.lessons.list_lessons(&LessonFilter::default()).await?;

    let summary = DashboardSummary::build(state.today(), &bookings, &lessons).map_err(CoreError::from)?;
    Ok(Json(summary))
}
