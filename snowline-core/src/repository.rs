use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use snowline_catalog::{LessonPricing, PriceListEntry, Product, ProductType};
use snowline_order::{Booking, Lesson, ReservationStatus, Teacher};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;
pub type RepoResult<T> = Result<T, RepoError>;

/// A write collided with a unique constraint
#[derive(Debug, thiserror::Error)]
#[error("{0} already exists")]
pub struct DuplicateKey(pub String);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub product_type: Option<ProductType>,
    pub professional: Option<bool>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        self.product_type.map_or(true, |t| product.product_type == t)
            && self.professional.map_or(true, |p| product.is_professional == p)
    }
}

/// Admin list filter. `from`/`to` select bookings whose range overlaps the window.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    pub status: Option<ReservationStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub q: Option<String>,
}

impl BookingFilter {
    pub fn overlapping(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        }
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        self.status.map_or(true, |s| booking.status == s)
            && self.from.map_or(true, |from| booking.end_date >= from)
            && self.to.map_or(true, |to| booking.start_date <= to)
            && self.q.as_deref().map_or(true, |q| booking.contact.matches(q))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LessonFilter {
    pub status: Option<ReservationStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub teacher_id: Option<Uuid>,
    pub q: Option<String>,
}

impl LessonFilter {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        }
    }

    pub fn matches(&self, lesson: &Lesson) -> bool {
        self.status.map_or(true, |s| lesson.status == s)
            && self.from.map_or(true, |from| lesson.date >= from)
            && self.to.map_or(true, |to| lesson.date <= to)
            && self.teacher_id.map_or(true, |t| lesson.teacher_id == Some(t))
            && self.q.as_deref().map_or(true, |q| lesson.contact.matches(q))
    }
}

/// Repository trait for the equipment catalog
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(&self, product: &Product) -> RepoResult<()>;

    async fn get_product(&self, id: Uuid) -> RepoResult<Option<Product>>;

    /// Products among `ids` that exist; unknown ids are skipped
    async fn get_products(&self, ids: &[Uuid]) -> RepoResult<Vec<Product>>;

    async fn list_products(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>>;

    /// Returns false when the product does not exist
    async fn update_product(&self, product: &Product) -> RepoResult<bool>;

    async fn delete_product(&self, id: Uuid) -> RepoResult<bool>;
}

/// Repository trait for rental bookings and their items
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, booking: &Booking) -> RepoResult<()>;

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<Booking>>;

    async fn list_bookings(&self, filter: &BookingFilter) -> RepoResult<Vec<Booking>>;

    /// Replaces the booking row and all of its items
    async fn update_booking(&self, booking: &Booking) -> RepoResult<bool>;

    async fn delete_booking(&self, id: Uuid) -> RepoResult<bool>;
}

/// Repository trait for lessons and their participants
#[async_trait]
pub trait LessonRepository: Send + Sync {
    async fn create_lesson(&self, lesson: &Lesson) -> RepoResult<()>;

    async fn get_lesson(&self, id: Uuid) -> RepoResult<Option<Lesson>>;

    async fn list_lessons(&self, filter: &LessonFilter) -> RepoResult<Vec<Lesson>>;

    /// Replaces the lesson row and all of its participants
    async fn update_lesson(&self, lesson: &Lesson) -> RepoResult<bool>;

    async fn delete_lesson(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait TeacherRepository: Send + Sync {
    async fn create_teacher(&self, teacher: &Teacher) -> RepoResult<()>;

    async fn get_teacher(&self, id: Uuid) -> RepoResult<Option<Teacher>>;

    async fn find_teacher_by_name(&self, name: &str) -> RepoResult<Option<Teacher>>;

    async fn list_teachers(&self) -> RepoResult<Vec<Teacher>>;

    async fn update_teacher(&self, teacher: &Teacher) -> RepoResult<bool>;

    /// Lessons assigned to the teacher are left unassigned
    async fn delete_teacher(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait PriceListRepository: Send + Sync {
    async fn list_entries(&self) -> RepoResult<Vec<PriceListEntry>>;

    async fn create_entry(&self, entry: &PriceListEntry) -> RepoResult<()>;

    async fn update_entry(&self, entry: &PriceListEntry) -> RepoResult<bool>;

    async fn delete_entry(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait LessonPricingRepository: Send + Sync {
    async fn list_pricing(&self) -> RepoResult<Vec<LessonPricing>>;

    /// Insert or replace the price of the `(people, duration_hours)` cell.
    /// Returns the stored row, which keeps the id of an existing cell.
    async fn upsert_pricing(&self, pricing: &LessonPricing) -> RepoResult<LessonPricing>;

    async fn delete_pricing(&self, id: Uuid) -> RepoResult<bool>;
}

/// All repositories behind one handle, shared by the API state
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub lessons: Arc<dyn LessonRepository>,
    pub teachers: Arc<dyn TeacherRepository>,
    pub price_list: Arc<dyn PriceListRepository>,
    pub lesson_pricing: Arc<dyn LessonPricingRepository>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowline_catalog::ProductTier;
    use snowline_order::RentalPeriod;
    use snowline_shared::CustomerContact;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2027, 3, d).unwrap()
    }

    fn booking(start: u32, end: u32) -> Booking {
        let ski = Product::new(ProductType::Ski, "Ski", 1000, None, ProductTier::Standard).unwrap();
        let period = RentalPeriod::new(date(start), date(end), 14).unwrap();
        Booking::new(CustomerContact::new("Janis Ozols", "janis@example.com", "+37129999999"), &[ski], period, None)
            .unwrap()
    }

    #[test]
    fn test_booking_filter_overlap() {
        let b = booking(10, 12);
        assert!(BookingFilter::overlapping(date(12), date(20)).matches(&b));
        assert!(BookingFilter::overlapping(date(1), date(10)).matches(&b));
        assert!(!BookingFilter::overlapping(date(13), date(20)).matches(&b));
    }

    #[test]
    fn test_booking_filter_status_and_search() {
        let b = booking(10, 12);
        let filter = BookingFilter {
            status: Some(ReservationStatus::Pending),
            q: Some("ozols".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&b));

        let filter = BookingFilter {
            status: Some(ReservationStatus::Confirmed),
            ..Default::default()
        };
        assert!(!filter.matches(&b));
    }

    #[test]
    fn test_product_filter() {
        let pro = Product::new(ProductType::Ski, "Race", 3000, None, ProductTier::Professional).unwrap();
        let filter = ProductFilter {
            product_type: Some(ProductType::Ski),
            professional: Some(true),
        };
        assert!(filter.matches(&pro));
        assert!(!ProductFilter { professional: Some(false), ..Default::default() }.matches(&pro));
    }
}
