use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::booking::Booking;
use crate::lesson::Lesson;

/// Guest counts for a single calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Active bookings covering the day, each counted once
    pub rental_guests: u32,
    /// Participants of active lessons on the day
    pub lesson_guests: u32,
    pub total_guests: u32,
}

/// First and last day of a month, `None` for an invalid month
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// Build one entry per day of `[from, to]`.
///
/// Bookings are de-duplicated by id so a booking spanning several days adds
/// exactly one guest to each of them, no matter how ranges overlap.
pub fn guest_calendar(from: NaiveDate, to: NaiveDate, bookings: &[Booking], lessons: &[Lesson]) -> Vec<CalendarDay> {
    let mut seen = HashSet::new();
    let bookings: Vec<&Booking> = bookings
        .iter()
        .filter(|b| b.status.is_active() && seen.insert(b.id))
        .collect();

    let mut seen_lessons: HashSet<Uuid> = HashSet::new();
    let lessons: Vec<&Lesson> = lessons
        .iter()
        .filter(|l| l.status.is_active() && seen_lessons.insert(l.id))
        .collect();

    from.iter_days()
        .take_while(|day| *day <= to)
        .map(|day| {
            let rental_guests = bookings.iter().filter(|b| b.covers(day)).count() as u32;
            let lesson_guests = lessons
                .iter()
                .filter(|l| l.date == day)
                .map(|l| l.people())
                .sum::<u32>();
            CalendarDay {
                date: day,
                rental_guests,
                lesson_guests,
                total_guests: rental_guests + lesson_guests,
            }
        })
        .collect()
}

/// Convenience wrapper for a whole month
pub fn month_calendar(year: i32, month: u32, bookings: &[Booking], lessons: &[Lesson]) -> Option<Vec<CalendarDay>> {
    let (from, to) = month_bounds(year, month)?;
    Some(guest_calendar(from, to, bookings, lessons))
}
