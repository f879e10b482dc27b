use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use snowline_core::{BookingFilter, LessonFilter};
use snowline_store::export_workbook;

use super::DateRange;
use crate::extract::ApiQuery;
use crate::{error::AppError, state::AppState};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn routes() -> Router<AppState> {
    Router::new().route("/export", get(export))
}

/// Without a range every booking and lesson is exported
async fn export(State(state): State<AppState>, ApiQuery(range): ApiQuery<DateRange>) -> Result<Response, AppError> {
    range.check()?;

    let bookings = state
        .repos
        .bookings
        .list_bookings(&BookingFilter {
            from: range.from,
            to: range.to,
            ..Default::default()
        })
        .await?;
    let lessons = state
        .repos
        .lessons
        .list_lessons(&LessonFilter {
            from: range.from,
            to: range.to,
            ..Default::default()
        })
        .await?;
    let teachers = state.repos.teachers.list_teachers().await?;

    let bytes = export_workbook(&bookings, &lessons, &teachers)?;
    tracing::info!(bookings = bookings.len(), lessons = lessons.len(), "Exported workbook");

    let filename = format!("snowline-export-{}.xlsx", state.today());
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        bytes,
    )
        .into_response())
}
