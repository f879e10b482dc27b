pub mod status;
pub mod booking;
pub mod lesson;
pub mod calendar;
pub mod finance;
pub mod dashboard;
pub mod teacher;

pub use status::{ReservationStatus, StatusError};
pub use booking::{resolve_selection, Booking, BookingError, BookingItem, PeriodError, RentalPeriod};
pub use lesson::{Discipline, Lesson, LessonDetails, LessonError, LessonLevel, LessonRules, LessonSlot, Participant};
pub use calendar::{guest_calendar, month_bounds, month_calendar, CalendarDay};
pub use finance::{Granularity, ReportError, RevenueBucket, RevenueReport};
pub use dashboard::{DashboardSummary, StatusCounts, UpcomingBooking, UpcomingLesson};
pub use teacher::Teacher;
