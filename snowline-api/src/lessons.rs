use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use snowline_core::services::{self, LessonDraft};
use snowline_order::{Discipline, Lesson, LessonDetails, LessonLevel, Participant};
use snowline_shared::CustomerContact;

use crate::extract::{not_blank, ValidatedJson};
use crate::{error::AppError, state::AppState};

/// Accepts `HH:MM` as well as `HH:MM:SS`
fn time_of_day<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ParticipantRequest {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: String,
    #[validate(range(max = 120))]
    pub age: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LessonDetailsRequest {
    pub date: NaiveDate,
    #[serde(deserialize_with = "time_of_day")]
    pub start_time: NaiveTime,
    #[validate(range(min = 1, max = 12))]
    pub duration_hours: u32,
    pub discipline: Discipline,
    pub level: LessonLevel,
    #[validate(length(min = 2, max = 8))]
    pub language: String,
    #[validate(length(min = 1, message = "at least one participant is required"), nested)]
    pub participants: Vec<ParticipantRequest>,
}

impl From<LessonDetailsRequest> for LessonDetails {
    fn from(req: LessonDetailsRequest) -> Self {
        LessonDetails {
            date: req.date,
            start_time: req.start_time,
            duration_hours: req.duration_hours,
            discipline: req.discipline,
            level: req.level,
            language: req.language.trim().to_string(),
            participants: req
                .participants
                .into_iter()
                .map(|p| Participant {
                    name: p.name.trim().to_string(),
                    age: p.age,
                })
                .collect(),
        }
    }
}

/// Lesson form body, also used by the back office to edit a lesson
#[derive(Debug, Deserialize, Validate)]
pub struct LessonRequest {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 5, max = 40))]
    pub phone: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub details: LessonDetailsRequest,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl LessonRequest {
    pub fn into_draft(self) -> LessonDraft {
        LessonDraft {
            contact: CustomerContact::new(self.name, self.email, self.phone),
            details: self.details.into(),
            notes: self.notes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LessonQuoteResponse {
    pub people: u32,
    pub duration_hours: u32,
    pub total_price_cents: i64,
    pub currency: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/lessons/quote", post(quote_lesson))
        .route("/api/lessons", post(create_lesson))
}

async fn quote_lesson(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LessonDetailsRequest>,
) -> Result<Json<LessonQuoteResponse>, AppError> {
    let details = LessonDetails::from(req);
    let total_price_cents = services::quote_lesson(&state.repos, &details, &state.policy, Some(state.today())).await?;

    Ok(Json(LessonQuoteResponse {
        people: details.people(),
        duration_hours: details.duration_hours,
        total_price_cents,
        currency: state.business_rules.currency.clone(),
    }))
}

async fn create_lesson(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LessonRequest>,
) -> Result<(StatusCode, Json<Lesson>), AppError> {
    let lesson = services::submit_lesson(&state.repos, req.into_draft(), &state.policy, state.today()).await?;

    tracing::info!(
        lesson_id = %lesson.id,
        email = ?lesson.contact.email,
        date = %lesson.date,
        people = lesson.people(),
        "Lesson reservation submitted"
    );
    Ok((StatusCode::CREATED, Json(lesson)))
}
