//! In-process storage backend.
//!
//! Selected with `database.backend = "memory"`. Mirrors the ordering and
//! delete side effects of the Postgres repositories so the API behaves the
//! same against either backend. Data is lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use snowline_catalog::{sort_for_display, LessonPricing, PriceListEntry, Product, ProductTier, ProductType};
use snowline_core::repository::{
    BookingFilter, BookingRepository, DuplicateKey, LessonFilter, LessonPricingRepository, LessonRepository, PriceListRepository,
    ProductFilter, ProductRepository, RepoResult, Repositories, TeacherRepository,
};
use snowline_order::{Booking, Lesson, Teacher};

#[derive(Default)]
struct MemoryState {
    products: HashMap<Uuid, Product>,
    bookings: HashMap<Uuid, Booking>,
    lessons: HashMap<Uuid, Lesson>,
    teachers: HashMap<Uuid, Teacher>,
    price_list: HashMap<Uuid, PriceListEntry>,
    lesson_pricing: HashMap<Uuid, LessonPricing>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the same catalog, teachers and prices the initial
    /// migration seeds, so a fresh install looks alike on both backends.
    pub fn seeded() -> Self {
        let mut state = MemoryState::default();

        for (product_type, name, price_cents, size, tier) in demo_products() {
            if let Ok(product) = Product::new(product_type, name, price_cents, size.map(str::to_string), tier) {
                state.products.insert(product.id, product);
            }
        }

        for name in ["Anna Berzina", "Martins Kalnins", "Olga Petrova"] {
            let teacher = Teacher::new(name);
            state.teachers.insert(teacher.id, teacher);
        }

        for pricing in demo_lesson_pricing() {
            state.lesson_pricing.insert(pricing.id, pricing);
        }

        for (position, (category, item, label, price_cents)) in demo_price_list().into_iter().enumerate() {
            let entry = PriceListEntry::new(category, item, label, price_cents, position as i32 + 1);
            state.price_list.insert(entry.id, entry);
        }

        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn into_repositories(self) -> Repositories {
        Repositories {
            products: Arc::new(self.clone()),
            bookings: Arc::new(self.clone()),
            lessons: Arc::new(self.clone()),
            teachers: Arc::new(self.clone()),
            price_list: Arc::new(self.clone()),
            lesson_pricing: Arc::new(self),
        }
    }
}

fn demo_products() -> Vec<(ProductType, &'static str, i64, Option<&'static str>, ProductTier)> {
    use ProductTier::{Professional, Standard};
    use ProductType::*;

    vec![
        (Ski, "Atomic Redster", 1800, Some("160"), Standard),
        (Ski, "Atomic Redster", 1800, Some("170"), Standard),
        (Ski, "Rossignol Hero Elite", 3200, Some("165"), Professional),
        (Snowboard, "Burton Ripcord", 2000, Some("154"), Standard),
        (Snowboard, "Burton Custom X", 3500, Some("158"), Professional),
        (SkiBoots, "Salomon S/Pro", 900, Some("42"), Standard),
        (SkiBoots, "Lange RS 130", 1500, Some("43"), Professional),
        (SnowboardBoots, "Burton Moto", 800, Some("43"), Standard),
        (Helmet, "Smith Mission", 500, Some("M"), Standard),
        (Poles, "Leki Neolite", 300, Some("120"), Standard),
        (Goggles, "Oakley Flight Deck", 400, None, Standard),
    ]
}

/// Group prices for 1..=6 people and 1..=3 hour lessons
fn demo_lesson_pricing() -> Vec<LessonPricing> {
    let hours = [(1, 4000, 1500), (2, 7500, 2500), (3, 10500, 3500)];
    (1..=6)
        .flat_map(|people| {
            hours
                .iter()
                .map(move |&(duration, base, extra)| LessonPricing::new(people, duration, base + i64::from(people - 1) * extra))
        })
        .collect()
}

fn demo_price_list() -> Vec<(&'static str, &'static str, &'static str, i64)> {
    vec![
        ("Ski", "Skis + boots + poles", "1 day", 2500),
        ("Ski", "Skis + boots + poles", "3 days", 6500),
        ("Ski", "Skis + boots + poles", "7 days", 13000),
        ("Snowboard", "Board + boots", "1 day", 2800),
        ("Snowboard", "Board + boots", "3 days", 7500),
        ("Accessories", "Helmet", "1 day", 500),
        ("Accessories", "Goggles", "1 day", 400),
    ]
}

fn sort_products(products: &mut [Product]) {
    products.sort_by(|a, b| {
        a.product_type
            .as_str()
            .cmp(b.product_type.as_str())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.size.cmp(&b.size))
    });
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn create_product(&self, product: &Product) -> RepoResult<()> {
        self.state.write().await.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> RepoResult<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn get_products(&self, ids: &[Uuid]) -> RepoResult<Vec<Product>> {
        let state = self.state.read().await;
        Ok(ids.iter().filter_map(|id| state.products.get(id).cloned()).collect())
    }

    async fn list_products(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state.products.values().filter(|p| filter.matches(p)).cloned().collect();
        sort_products(&mut products);
        Ok(products)
    }

    async fn update_product(&self, product: &Product) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        match state.products.get_mut(&product.id) {
            Some(stored) => {
                *stored = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_product(&self, id: Uuid) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        if state.products.remove(&id).is_none() {
            return Ok(false);
        }
        for booking in state.bookings.values_mut() {
            for item in booking.items.iter_mut().filter(|i| i.product_id == Some(id)) {
                item.product_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create_booking(&self, booking: &Booking) -> RepoResult<()> {
        self.state.write().await.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<Booking>> {
        Ok(self.state.read().await.bookings.get(&id).cloned())
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> RepoResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state.bookings.values().filter(|b| filter.matches(b)).cloned().collect();
        bookings.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(bookings)
    }

    async fn update_booking(&self, booking: &Booking) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        match state.bookings.get_mut(&booking.id) {
            Some(stored) => {
                *stored = booking.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_booking(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.state.write().await.bookings.remove(&id).is_some())
    }
}

#[async_trait]
impl LessonRepository for MemoryStore {
    async fn create_lesson(&self, lesson: &Lesson) -> RepoResult<()> {
        self.state.write().await.lessons.insert(lesson.id, lesson.clone());
        Ok(())
    }

    async fn get_lesson(&self, id: Uuid) -> RepoResult<Option<Lesson>> {
        Ok(self.state.read().await.lessons.get(&id).cloned())
    }

    async fn list_lessons(&self, filter: &LessonFilter) -> RepoResult<Vec<Lesson>> {
        let state = self.state.read().await;
        let mut lessons: Vec<Lesson> = state.lessons.values().filter(|l| filter.matches(l)).cloned().collect();
        lessons.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.start_time.cmp(&b.start_time)));
        Ok(lessons)
    }

    async fn update_lesson(&self, lesson: &Lesson) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        match state.lessons.get_mut(&lesson.id) {
            Some(stored) => {
                *stored = lesson.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_lesson(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.state.write().await.lessons.remove(&id).is_some())
    }
}

impl MemoryState {
    /// Same rule as the `LOWER(name)` unique index
    fn ensure_teacher_name_free(&self, teacher: &Teacher) -> RepoResult<()> {
        let name = teacher.name.to_lowercase();
        if self.teachers.values().any(|t| t.id != teacher.id && t.name.to_lowercase() == name) {
            return Err(Box::new(DuplicateKey(format!("teacher '{}'", teacher.name))));
        }
        Ok(())
    }
}

#[async_trait]
impl TeacherRepository for MemoryStore {
    async fn create_teacher(&self, teacher: &Teacher) -> RepoResult<()> {
        let mut state = self.state.write().await;
        state.ensure_teacher_name_free(teacher)?;
        state.teachers.insert(teacher.id, teacher.clone());
        Ok(())
    }

    async fn get_teacher(&self, id: Uuid) -> RepoResult<Option<Teacher>> {
        Ok(self.state.read().await.teachers.get(&id).cloned())
    }

    async fn find_teacher_by_name(&self, name: &str) -> RepoResult<Option<Teacher>> {
        let name = name.trim().to_lowercase();
        let state = self.state.read().await;
        Ok(state.teachers.values().find(|t| t.name.to_lowercase() == name).cloned())
    }

    async fn list_teachers(&self) -> RepoResult<Vec<Teacher>> {
        let state = self.state.read().await;
        let mut teachers: Vec<Teacher> = state.teachers.values().cloned().collect();
        teachers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teachers)
    }

    async fn update_teacher(&self, teacher: &Teacher) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        state.ensure_teacher_name_free(teacher)?;
        match state.teachers.get_mut(&teacher.id) {
            Some(stored) => {
                *stored = teacher.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_teacher(&self, id: Uuid) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        if state.teachers.remove(&id).is_none() {
            return Ok(false);
        }
        for lesson in state.lessons.values_mut().filter(|l| l.teacher_id == Some(id)) {
            lesson.teacher_id = None;
        }
        Ok(true)
    }
}

#[async_trait]
impl PriceListRepository for MemoryStore {
    async fn list_entries(&self) -> RepoResult<Vec<PriceListEntry>> {
        let state = self.state.read().await;
        let mut entries: Vec<PriceListEntry> = state.price_list.values().cloned().collect();
        sort_for_display(&mut entries);
        Ok(entries)
    }

    async fn create_entry(&self, entry: &PriceListEntry) -> RepoResult<()> {
        self.state.write().await.price_list.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn update_entry(&self, entry: &PriceListEntry) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        match state.price_list.get_mut(&entry.id) {
            Some(stored) => {
                *stored = entry.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_entry(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.state.write().await.price_list.remove(&id).is_some())
    }
}

#[async_trait]
impl LessonPricingRepository for MemoryStore {
    async fn list_pricing(&self) -> RepoResult<Vec<LessonPricing>> {
        let state = self.state.read().await;
        let mut rows: Vec<LessonPricing> = state.lesson_pricing.values().cloned().collect();
        rows.sort_by_key(|r| (r.people, r.duration_hours));
        Ok(rows)
    }

    async fn upsert_pricing(&self, pricing: &LessonPricing) -> RepoResult<LessonPricing> {
        let mut state = self.state.write().await;
        let existing = state
            .lesson_pricing
            .values_mut()
            .find(|r| r.people == pricing.people && r.duration_hours == pricing.duration_hours);

        if let Some(row) = existing {
            row.price_cents = pricing.price_cents;
            return Ok(row.clone());
        }
        state.lesson_pricing.insert(pricing.id, pricing.clone());
        Ok(pricing.clone())
    }

    async fn delete_pricing(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.state.write().await.lesson_pricing.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use snowline_catalog::LessonPriceTable;
    use snowline_order::{Discipline, LessonDetails, LessonLevel, LessonRules, Participant, RentalPeriod};
    use snowline_shared::CustomerContact;

    fn contact() -> CustomerContact {
        CustomerContact::new("Liga Ozola", "liga@example.com", "+37126000000")
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2027, 2, d).unwrap()
    }

    fn lesson(prices: &LessonPriceTable) -> Lesson {
        let rules = LessonRules {
            max_participants: 6,
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            day_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            languages: vec!["en".to_string()],
        };
        let details = LessonDetails {
            date: date(10),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration_hours: 1,
            discipline: Discipline::Ski,
            level: LessonLevel::Beginner,
            language: "en".to_string(),
            participants: vec![Participant { name: "Liga".to_string(), age: None }],
        };
        Lesson::new(contact(), details, None, &rules, prices).unwrap()
    }

    #[tokio::test]
    async fn test_seeded_store_has_catalog() {
        let store = MemoryStore::seeded();
        let products = store.list_products(&ProductFilter::default()).await.unwrap();
        assert_eq!(products.len(), demo_products().len());

        let pro = store
            .list_products(&ProductFilter { professional: Some(true), ..Default::default() })
            .await
            .unwrap();
        assert!(pro.iter().all(|p| p.is_professional));

        let pricing = store.list_pricing().await.unwrap();
        assert_eq!(pricing.len(), 18);
        assert_eq!((pricing[0].people, pricing[0].duration_hours), (1, 1));
    }

    #[tokio::test]
    async fn test_upsert_pricing_keeps_id() {
        let store = MemoryStore::new();
        let first = store.upsert_pricing(&LessonPricing::new(2, 1, 6000)).await.unwrap();
        let second = store.upsert_pricing(&LessonPricing::new(2, 1, 6500)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.price_cents, 6500);
        assert_eq!(store.list_pricing().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_product_keeps_booking_snapshot() {
        let store = MemoryStore::new();
        let ski = Product::new(ProductType::Ski, "Ski", 1500, Some("170".to_string()), ProductTier::Standard).unwrap();
        store.create_product(&ski).await.unwrap();

        let period = RentalPeriod::new(date(1), date(3), 14).unwrap();
        let booking = Booking::new(contact(), &[ski.clone()], period, None).unwrap();
        store.create_booking(&booking).await.unwrap();

        assert!(store.delete_product(ski.id).await.unwrap());
        assert!(!store.delete_product(ski.id).await.unwrap());

        let stored = store.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.items[0].product_id, None);
        assert_eq!(stored.items[0].name, "Ski");
        assert_eq!(stored.total_price_cents, 4500);
    }

    #[tokio::test]
    async fn test_delete_teacher_unassigns_lessons() {
        let store = MemoryStore::seeded();
        let prices = LessonPriceTable::new(store.list_pricing().await.unwrap());
        let teacher = store.list_teachers().await.unwrap().remove(0);

        let mut lesson = lesson(&prices);
        lesson.assign_teacher(Some(teacher.id));
        store.create_lesson(&lesson).await.unwrap();

        assert!(store.delete_teacher(teacher.id).await.unwrap());
        let stored = store.get_lesson(lesson.id).await.unwrap().unwrap();
        assert_eq!(stored.teacher_id, None);
    }

    #[tokio::test]
    async fn test_find_teacher_by_name_ignores_case() {
        let store = MemoryStore::seeded();
        let found = store.find_teacher_by_name("  anna berzina ").await.unwrap();
        assert_eq!(found.map(|t| t.name), Some("Anna Berzina".to_string()));

        let teacher = Teacher::new("Ēriks Ozoliņš");
        store.create_teacher(&teacher).await.unwrap();
        let found = store.find_teacher_by_name("ĒRIKS OZOLIŅŠ").await.unwrap();
        assert_eq!(found.map(|t| t.id), Some(teacher.id));
    }

    #[tokio::test]
    async fn test_duplicate_teacher_name_is_rejected() {
        let store = MemoryStore::seeded();
        let err = store.create_teacher(&Teacher::new("OLGA PETROVA")).await.unwrap_err();
        assert!(err.downcast_ref::<DuplicateKey>().is_some());

        let mut anna = store.find_teacher_by_name("Anna Berzina").await.unwrap().unwrap();
        anna.rename("olga petrova");
        assert!(store.update_teacher(&anna).await.is_err());

        // Renaming to the same name in another case is not a clash with itself
        anna.rename("ANNA BERZINA");
        assert!(store.update_teacher(&anna).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let store = MemoryStore::new();
        let period = RentalPeriod::new(date(1), date(1), 14).unwrap();
        let ski = Product::new(ProductType::Ski, "Ski", 1500, None, ProductTier::Standard).unwrap();
        let booking = Booking::new(contact(), &[ski], period, None).unwrap();
        store.create_booking(&booking).await.unwrap();

        for q in ["%", "_"] {
            let filter = BookingFilter { q: Some(q.to_string()), ..Default::default() };
            assert!(store.list_bookings(&filter).await.unwrap().is_empty(), "query {q}");
        }
    }
}
