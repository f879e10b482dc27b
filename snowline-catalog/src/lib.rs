pub mod product;
pub mod pricing;
pub mod lesson_pricing;
pub mod price_list;

pub use product::{Product, ProductError, ProductTier, ProductType};
pub use pricing::{quote_rental, PricingError, RentalQuote};
pub use lesson_pricing::{LessonPriceTable, LessonPricing};
pub use price_list::{sort_for_display, PriceListEntry};
