pub mod repository;
pub mod services;

pub use repository::{
    BookingFilter, BookingRepository, DuplicateKey, LessonFilter, LessonPricingRepository, LessonRepository, PriceListRepository,
    ProductFilter, ProductRepository, RepoError, RepoResult, Repositories, TeacherRepository,
};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
