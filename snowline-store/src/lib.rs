pub mod app_config;
pub mod database;
pub mod product_repo;
pub mod booking_repo;
pub mod lesson_repo;
pub mod teacher_repo;
pub mod pricing_repo;
pub mod memory_repo;
pub mod export;

use std::sync::Arc;

use snowline_core::Repositories;

pub use database::DbClient;
pub use export::export_workbook;
pub use memory_repo::MemoryStore;

/// Postgres-backed repositories sharing one pool
pub fn postgres_repositories(db: &DbClient) -> Repositories {
    let pool = db.pool.clone();
    Repositories {
        products: Arc::new(product_repo::StoreProductRepository::new(pool.clone())),
        bookings: Arc::new(booking_repo::StoreBookingRepository::new(pool.clone())),
        lessons: Arc::new(lesson_repo::StoreLessonRepository::new(pool.clone())),
        teachers: Arc::new(teacher_repo::StoreTeacherRepository::new(pool.clone())),
        price_list: Arc::new(pricing_repo::StorePriceListRepository::new(pool.clone())),
        lesson_pricing: Arc::new(pricing_repo::StoreLessonPricingRepository::new(pool)),
    }
}
