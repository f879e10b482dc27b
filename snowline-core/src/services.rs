//! Reservation workflows shared by the public forms and the back office.
//!
//! Handlers pass `today` for customer submissions so past dates are rejected;
//! admin edits pass `None` and may touch reservations that already started.

use chrono::NaiveDate;
use uuid::Uuid;

use snowline_catalog::{LessonPriceTable, Product, ProductError, RentalQuote};
use snowline_order::{
    resolve_selection, Booking, BookingError, Lesson, LessonDetails, LessonError, LessonRules, PeriodError,
    RentalPeriod, ReportError, ReservationStatus, StatusError,
};
use snowline_shared::CustomerContact;

use crate::repository::{DuplicateKey, LessonFilter, RepoError, Repositories};
use crate::{CoreError, CoreResult};

impl From<RepoError> for CoreError {
    fn from(err: RepoError) -> Self {
        match err.downcast_ref::<DuplicateKey>() {
            Some(duplicate) => CoreError::Conflict(duplicate.to_string()),
            None => CoreError::InternalError(err.to_string()),
        }
    }
}

impl From<BookingError> for CoreError {
    fn from(err: BookingError) -> Self {
        CoreError::ValidationError(err.to_string())
    }
}

impl From<PeriodError> for CoreError {
    fn from(err: PeriodError) -> Self {
        CoreError::ValidationError(err.to_string())
    }
}

impl From<LessonError> for CoreError {
    fn from(err: LessonError) -> Self {
        CoreError::ValidationError(err.to_string())
    }
}

impl From<ProductError> for CoreError {
    fn from(err: ProductError) -> Self {
        CoreError::ValidationError(err.to_string())
    }
}

impl From<ReportError> for CoreError {
    fn from(err: ReportError) -> Self {
        CoreError::ValidationError(err.to_string())
    }
}

impl From<StatusError> for CoreError {
    fn from(err: StatusError) -> Self {
        match err {
            StatusError::InvalidTransition { .. } => CoreError::Conflict(err.to_string()),
            StatusError::Unknown(_) => CoreError::ValidationError(err.to_string()),
        }
    }
}

/// Limits applied to bookings and lessons
#[derive(Debug, Clone)]
pub struct ReservationPolicy {
    pub max_rental_days: u32,
    pub lesson: LessonRules,
}

/// What the rental form submits
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub contact: CustomerContact,
    pub product_ids: Vec<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
}

/// What the lesson form submits
#[derive(Debug, Clone)]
pub struct LessonDraft {
    pub contact: CustomerContact,
    pub details: LessonDetails,
    pub notes: Option<String>,
}

pub struct BookingQuote {
    pub products: Vec<Product>,
    pub period: RentalPeriod,
    pub quote: RentalQuote,
}

pub async fn quote_booking(
    repos: &Repositories,
    product_ids: &[Uuid],
    start_date: NaiveDate,
    end_date: NaiveDate,
    policy: &ReservationPolicy,
    today: Option<NaiveDate>,
) -> CoreResult<BookingQuote> {
    let period = RentalPeriod::new(start_date, end_date, policy.max_rental_days)?;
    if let Some(today) = today {
        period.ensure_not_past(today)?;
    }

    let found = repos.products.get_products(product_ids).await?;
    let products = resolve_selection(product_ids, found)?;
    let quote = snowline_catalog::quote_rental(&products, period.days()).map_err(BookingError::from)?;

    Ok(BookingQuote { products, period, quote })
}

pub async fn submit_booking(
    repos: &Repositories,
    draft: BookingDraft,
    policy: &ReservationPolicy,
    today: NaiveDate,
) -> CoreResult<Booking> {
    let BookingQuote { products, period, .. } =
        quote_booking(repos, &draft.product_ids, draft.start_date, draft.end_date, policy, Some(today)).await?;

    let booking = Booking::new(draft.contact, &products, period, draft.notes)?;
    repos.bookings.create_booking(&booking).await?;
    Ok(booking)
}

pub async fn revise_booking(
    repos: &Repositories,
    id: Uuid,
    draft: BookingDraft,
    policy: &ReservationPolicy,
) -> CoreResult<Booking> {
    let mut booking = find_booking(repos, id).await?;
    let BookingQuote { products, period, .. } =
        quote_booking(repos, &draft.product_ids, draft.start_date, draft.end_date, policy, None).await?;

    booking.reprice(&products, period)?;
    booking.contact = draft.contact;
    booking.set_notes(draft.notes);

    if !repos.bookings.update_booking(&booking).await? {
        return Err(CoreError::NotFound(format!("booking {id}")));
    }
    Ok(booking)
}

pub async fn change_booking_status(repos: &Repositories, id: Uuid, status: ReservationStatus) -> CoreResult<Booking> {
    let mut booking = find_booking(repos, id).await?;
    booking.set_status(status)?;
    if !repos.bookings.update_booking(&booking).await? {
        return Err(CoreError::NotFound(format!("booking {id}")));
    }
    Ok(booking)
}

pub async fn find_booking(repos: &Repositories, id: Uuid) -> CoreResult<Booking> {
    repos
        .bookings
        .get_booking(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("booking {id}")))
}

pub async fn load_price_table(repos: &Repositories) -> CoreResult<LessonPriceTable> {
    Ok(LessonPriceTable::new(repos.lesson_pricing.list_pricing().await?))
}

pub async fn quote_lesson(
    repos: &Repositories,
    details: &LessonDetails,
    policy: &ReservationPolicy,
    today: Option<NaiveDate>,
) -> CoreResult<i64> {
    if let Some(today) = today {
        if details.date < today {
            return Err(LessonError::InPast(details.date).into());
        }
    }
    let prices = load_price_table(repos).await?;
    Ok(details.quote(&policy.lesson, &prices)?)
}

pub async fn submit_lesson(
    repos: &Repositories,
    draft: LessonDraft,
    policy: &ReservationPolicy,
    today: NaiveDate,
) -> CoreResult<Lesson> {
    let prices = load_price_table(repos).await?;
    let lesson = Lesson::new(draft.contact, draft.details, draft.notes, &policy.lesson, &prices)?;
    lesson.ensure_not_past(today)?;

    repos.lessons.create_lesson(&lesson).await?;
    Ok(lesson)
}

pub async fn revise_lesson(
    repos: &Repositories,
    id: Uuid,
    draft: LessonDraft,
    policy: &ReservationPolicy,
) -> CoreResult<Lesson> {
    let mut lesson = find_lesson(repos, id).await?;
    let prices = load_price_table(repos).await?;

    lesson.update_details(draft.details, &policy.lesson, &prices)?;
    lesson.contact = draft.contact;
    lesson.set_notes(draft.notes);

    if let Some(teacher_id) = lesson.teacher_id {
        ensure_teacher_free(repos, &lesson, teacher_id).await?;
    }

    if !repos.lessons.update_lesson(&lesson).await? {
        return Err(CoreError::NotFound(format!("lesson {id}")));
    }
    Ok(lesson)
}

pub async fn change_lesson_status(repos: &Repositories, id: Uuid, status: ReservationStatus) -> CoreResult<Lesson> {
    let mut lesson = find_lesson(repos, id).await?;
    lesson.set_status(status)?;
    if !repos.lessons.update_lesson(&lesson).await? {
        return Err(CoreError::NotFound(format!("lesson {id}")));
    }
    Ok(lesson)
}

/// Assign (or with `None`, unassign) a teacher.
/// A teacher cannot hold two active lessons whose times overlap.
pub async fn assign_teacher(repos: &Repositories, lesson_id: Uuid, teacher_id: Option<Uuid>) -> CoreResult<Lesson> {
    let mut lesson = find_lesson(repos, lesson_id).await?;

    if let Some(teacher_id) = teacher_id {
        if repos.teachers.get_teacher(teacher_id).await?.is_none() {
            return Err(CoreError::NotFound(format!("teacher {teacher_id}")));
        }
        ensure_teacher_free(repos, &lesson, teacher_id).await?;
    }

    lesson.assign_teacher(teacher_id);
    if !repos.lessons.update_lesson(&lesson).await? {
        return Err(CoreError::NotFound(format!("lesson {lesson_id}")));
    }
    Ok(lesson)
}

async fn ensure_teacher_free(repos: &Repositories, lesson: &Lesson, teacher_id: Uuid) -> CoreResult<()> {
    let filter = LessonFilter {
        teacher_id: Some(teacher_id),
        ..LessonFilter::between(lesson.date, lesson.date)
    };
    let same_day = repos.lessons.list_lessons(&filter).await?;

    if let Some(clash) = same_day.iter().find(|other| lesson.conflicts_with(other)) {
        return Err(CoreError::Conflict(format!(
            "teacher is already assigned to lesson {} at {}",
            clash.id, clash.start_time
        )));
    }
    Ok(())
}

pub async fn find_lesson(repos: &Repositories, id: Uuid) -> CoreResult<Lesson> {
    repos
        .lessons
        .get_lesson(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("lesson {id}")))
}
