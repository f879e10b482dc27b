use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::booking::Booking;
use crate::calendar::month_bounds;
use crate::finance::{Granularity, ReportError, RevenueReport};
use crate::lesson::Lesson;
use crate::status::ReservationStatus;

const UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u32,
    pub confirmed: u32,
    pub cancelled: u32,
    pub completed: u32,
}

impl StatusCounts {
    fn record(&mut self, status: ReservationStatus) {
        match status {
            ReservationStatus::Pending => self.pending += 1,
            ReservationStatus::Confirmed => self.confirmed += 1,
            ReservationStatus::Cancelled => self.cancelled += 1,
            ReservationStatus::Completed => self.completed += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.pending + self.confirmed + self.cancelled + self.completed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingBooking {
    pub id: Uuid,
    pub customer_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub items: usize,
    pub status: ReservationStatus,
    pub total_price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingLesson {
    pub id: Uuid,
    pub customer_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub participants: u32,
    pub teacher_id: Option<Uuid>,
    pub status: ReservationStatus,
}

/// Back office landing page figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub today: NaiveDate,
    pub bookings: StatusCounts,
    pub lessons: StatusCounts,
    pub active_rentals_today: u32,
    pub lessons_today: u32,
    pub unassigned_lessons: u32,
    pub revenue_this_month_cents: i64,
    pub upcoming_bookings: Vec<UpcomingBooking>,
    pub upcoming_lessons: Vec<UpcomingLesson>,
}

impl DashboardSummary {
    pub fn build(today: NaiveDate, bookings: &[Booking], lessons: &[Lesson]) -> Result<Self, ReportError> {
        let mut booking_counts = StatusCounts::default();
        bookings.iter().for_each(|b| booking_counts.record(b.status));
        let mut lesson_counts = StatusCounts::default();
        lessons.iter().for_each(|l| lesson_counts.record(l.status));

        let active_rentals_today = bookings
            .iter()
            .filter(|b| b.status.is_active() && b.covers(today))
            .count() as u32;
        let lessons_today = lessons
            .iter()
            .filter(|l| l.status.is_active() && l.date == today)
            .count() as u32;
        let unassigned_lessons = lessons
            .iter()
            .filter(|l| l.status.is_active() && l.teacher_id.is_none() && l.date >= today)
            .count() as u32;

        let revenue_this_month_cents = match month_bounds(today.year(), today.month()) {
            Some((from, to)) => RevenueReport::build(from, to, Granularity::Month, bookings, lessons)?.total_cents,
            None => 0,
        };

        let mut upcoming: Vec<&Booking> = bookings
            .iter()
            .filter(|b| b.status.is_active() && b.start_date >= today)
            .collect();
        upcoming.sort_by_key(|b| (b.start_date, b.created_at));
        let upcoming_bookings = upcoming
            .into_iter()
            .take(UPCOMING_LIMIT)
            .map(|b| UpcomingBooking {
                id: b.id,
                customer_name: b.contact.name.clone(),
                start_date: b.start_date,
                end_date: b.end_date,
                items: b.items.len(),
                status: b.status,
                total_price_cents: b.total_price_cents,
            })
            .collect();

        let mut upcoming: Vec<&Lesson> = lessons
            .iter()
            .filter(|l| l.status.is_active() && l.date >= today)
            .collect();
        upcoming.sort_by_key(|l| (l.date, l.start_time));
        let upcoming_lessons = upcoming
            .into_iter()
            .take(UPCOMING_LIMIT)
            .map(|l| UpcomingLesson {
                id: l.id,
                customer_name: l.contact.name.clone(),
                date: l.date,
                start_time: l.start_time,
                participants: l.people(),
                teacher_id: l.teacher_id,
                status: l.status,
            })
            .collect();

        Ok(Self {
            today,
            bookings: booking_counts,
            lessons: lesson_counts,
            active_rentals_today,
            lessons_today,
            unassigned_lessons,
            revenue_this_month_cents,
            upcoming_bookings,
            upcoming_lessons,
        })
    }
}
