//! Back office API. Every route except login requires an admin token.

use axum::{middleware::from_fn_with_state, Router};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use validator::Validate;

use snowline_core::CoreError;
use snowline_order::ReservationStatus;

use crate::error::AppError;
use crate::middleware::admin_auth_middleware;
use crate::state::AppState;

pub mod bookings;
pub mod dashboard;
pub mod export;
pub mod lessons;
pub mod pricing;
pub mod products;
pub mod reports;
pub mod teachers;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(dashboard::routes())
        .merge(bookings::routes())
        .merge(lessons::routes())
        .merge(products::routes())
        .merge(teachers::routes())
        .merge(pricing::routes())
        .merge(reports::routes())
        .merge(export::routes())
        .route_layer(from_fn_with_state(state, admin_auth_middleware));

    Router::new().nest("/api/admin", protected)
}

#[derive(Debug, Deserialize, Validate)]
pub struct StatusRequest {
    pub status: ReservationStatus,
}

/// Optional `?from=&to=` window shared by list, report and export endpoints
#[derive(Debug, Default, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn check(&self) -> Result<(), AppError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AppError::ValidationError(format!("'from' {from} is after 'to' {to}")));
            }
        }
        Ok(())
    }

    /// Both ends resolved. A missing end stays within the year of the given one;
    /// with neither end the range is the calendar year of `today`.
    pub fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
        let year_start = |d: NaiveDate| NaiveDate::from_ymd_opt(d.year(), 1, 1).unwrap_or(d);
        let year_end = |d: NaiveDate| NaiveDate::from_ymd_opt(d.year(), 12, 31).unwrap_or(d);

        let from = self.from.unwrap_or_else(|| year_start(self.to.unwrap_or(today)));
        let to = self.to.unwrap_or_else(|| year_end(self.from.unwrap_or(today)));
        DateRange { from: Some(from), to: Some(to) }.check()?;
        Ok((from, to))
    }
}

pub fn parse_status(raw: Option<&str>) -> Result<Option<ReservationStatus>, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ReservationStatus>().map_err(|e| AppError::from(CoreError::from(e))))
        .transpose()
}
