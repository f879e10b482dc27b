use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use snowline_catalog::LessonPriceTable;
use snowline_shared::CustomerContact;

use crate::booking::normalize_notes;
use crate::status::{ReservationStatus, StatusError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Discipline {
    Ski,
    Snowboard,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl Discipline {
    pub const ALL: [Discipline; 2] = [Discipline::Ski, Discipline::Snowboard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Discipline::Ski => "SKI",
            Discipline::Snowboard => "SNOWBOARD",
        }
    }
}

impl LessonLevel {
    pub const ALL: [LessonLevel; 3] = [LessonLevel::Beginner, LessonLevel::Intermediate, LessonLevel::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            LessonLevel::Beginner => "BEGINNER",
            LessonLevel::Intermediate => "INTERMEDIATE",
            LessonLevel::Advanced => "ADVANCED",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LessonLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Discipline {
    type Err = LessonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Discipline::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LessonError::UnknownValue(s.to_string()))
    }
}

impl FromStr for LessonLevel {
    type Err = LessonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LessonLevel::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LessonError::UnknownValue(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub age: Option<u32>,
}

/// Limits applied to every lesson request
#[derive(Debug, Clone)]
pub struct LessonRules {
    pub max_participants: u32,
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub languages: Vec<String>,
}

/// When a lesson takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonSlot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_hours: u32,
}

impl LessonSlot {
    /// `None` when the lesson would run past midnight
    pub fn end_time(&self) -> Option<NaiveTime> {
        let (end, wrapped) = self
            .start_time
            .overflowing_add_signed(Duration::hours(i64::from(self.duration_hours)));
        (wrapped == 0).then_some(end)
    }

    pub fn overlaps(&self, other: &LessonSlot) -> bool {
        if self.date != other.date {
            return false;
        }
        // A lesson running past midnight occupies the rest of its day
        let starts_before_end = |start: NaiveTime, slot: &LessonSlot| match slot.end_time() {
            Some(end) => start < end,
            None => true,
        };
        starts_before_end(other.start_time, self) && starts_before_end(self.start_time, other)
    }
}

/// Everything a customer chooses on the lesson form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDetails {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_hours: u32,
    pub discipline: Discipline,
    pub level: LessonLevel,
    pub language: String,
    pub participants: Vec<Participant>,
}

impl LessonDetails {
    pub fn slot(&self) -> LessonSlot {
        LessonSlot {
            date: self.date,
            start_time: self.start_time,
            duration_hours: self.duration_hours,
        }
    }

    pub fn people(&self) -> u32 {
        u32::try_from(self.participants.len()).unwrap_or(u32::MAX)
    }

    /// Validate against the rules and look the price up in the matrix
    pub fn quote(&self, rules: &LessonRules, prices: &LessonPriceTable) -> Result<i64, LessonError> {
        let people = self.people();
        if people == 0 {
            return Err(LessonError::NoParticipants);
        }
        if people > rules.max_participants {
            return Err(LessonError::TooManyParticipants {
                count: people,
                max: rules.max_participants,
            });
        }
        if self.participants.iter().any(|p| p.name.trim().is_empty()) {
            return Err(LessonError::BlankParticipantName);
        }
        if self.duration_hours == 0 {
            return Err(LessonError::ZeroDuration);
        }
        if !rules.languages.iter().any(|l| l.eq_ignore_ascii_case(&self.language)) {
            return Err(LessonError::UnsupportedLanguage(self.language.clone()));
        }

        let slot = self.slot();
        let within_hours = slot
            .end_time()
            .map(|end| self.start_time >= rules.day_start && end <= rules.day_end)
            .unwrap_or(false);
        if !within_hours {
            return Err(LessonError::OutsideHours {
                start: rules.day_start,
                end: rules.day_end,
            });
        }

        prices
            .lookup(people, self.duration_hours)
            .ok_or(LessonError::NoPrice {
                people,
                duration_hours: self.duration_hours,
            })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LessonError {
    #[error("At least one participant is required")]
    NoParticipants,

    #[error("{count} participants exceed the maximum of {max}")]
    TooManyParticipants { count: u32, max: u32 },

    #[error("Participant name must not be empty")]
    BlankParticipantName,

    #[error("Lesson duration must be at least one hour")]
    ZeroDuration,

    #[error("Lessons are not offered in language '{0}'")]
    UnsupportedLanguage(String),

    #[error("Lessons must take place between {start} and {end}")]
    OutsideHours { start: NaiveTime, end: NaiveTime },

    #[error("No price defined for {people} people and {duration_hours} hours")]
    NoPrice { people: u32, duration_hours: u32 },

    #[error("Lesson date {0} is in the past")]
    InPast(NaiveDate),

    #[error("Unknown value: {0}")]
    UnknownValue(String),
}

/// A ski or snowboard lesson reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub contact: CustomerContact,
    pub participants: Vec<Participant>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_hours: u32,
    pub discipline: Discipline,
    pub level: LessonLevel,
    pub language: String,
    pub teacher_id: Option<Uuid>,
    pub status: ReservationStatus,
    pub total_price_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    pub fn new(
        contact: CustomerContact,
        details: LessonDetails,
        notes: Option<String>,
        rules: &LessonRules,
        prices: &LessonPriceTable,
    ) -> Result<Self, LessonError> {
        let total_price_cents = details.quote(rules, prices)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            contact,
            participants: details.participants,
            date: details.date,
            start_time: details.start_time,
            duration_hours: details.duration_hours,
            discipline: details.discipline,
            level: details.level,
            language: details.language.to_lowercase(),
            teacher_id: None,
            status: ReservationStatus::Pending,
            total_price_cents,
            notes: normalize_notes(notes),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the lesson details, revalidating and repricing
    pub fn update_details(
        &mut self,
        details: LessonDetails,
        rules: &LessonRules,
        prices: &LessonPriceTable,
    ) -> Result<(), LessonError> {
        self.total_price_cents = details.quote(rules, prices)?;
        self.participants = details.participants;
        self.date = details.date;
        self.start_time = details.start_time;
        self.duration_hours = details.duration_hours;
        self.discipline = details.discipline;
        self.level = details.level;
        self.language = details.language.to_lowercase();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = normalize_notes(notes);
        self.updated_at = Utc::now();
    }

    pub fn slot(&self) -> LessonSlot {
        LessonSlot {
            date: self.date,
            start_time: self.start_time,
            duration_hours: self.duration_hours,
        }
    }

    pub fn people(&self) -> u32 {
        u32::try_from(self.participants.len()).unwrap_or(u32::MAX)
    }

    pub fn ensure_not_past(&self, today: NaiveDate) -> Result<(), LessonError> {
        if self.date < today {
            return Err(LessonError::InPast(self.date));
        }
        Ok(())
    }

    pub fn set_status(&mut self, to: ReservationStatus) -> Result<(), StatusError> {
        self.status = self.status.transition(to)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn assign_teacher(&mut self, teacher_id: Option<Uuid>) {
        self.teacher_id = teacher_id;
        self.updated_at = Utc::now();
    }

    /// True when both lessons are active and their time spans overlap
    pub fn conflicts_with(&self, other: &Lesson) -> bool {
        self.id != other.id && self.status.is_active() && other.status.is_active() && self.slot().overlaps(&other.slot())
    }
}
