use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use snowline_catalog::{quote_rental, PricingError, Product, ProductType, RentalQuote};
use snowline_shared::CustomerContact;

use crate::status::{ReservationStatus, StatusError};

/// Validated inclusive date range of a rental
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("End date must not be before start date")]
    EndBeforeStart,

    #[error("Rental period of {days} days exceeds the maximum of {max} days")]
    TooLong { days: u32, max: u32 },

    #[error("Start date {0} is in the past")]
    InPast(NaiveDate),
}

impl RentalPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate, max_days: u32) -> Result<Self, PeriodError> {
        if end < start {
            return Err(PeriodError::EndBeforeStart);
        }
        let period = Self { start, end };
        let days = period.days();
        if days > max_days {
            return Err(PeriodError::TooLong { days, max: max_days });
        }
        Ok(period)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Both the pick-up and the return day are charged
    pub fn days(&self) -> u32 {
        let span = (self.end - self.start).num_days() + 1;
        u32::try_from(span).unwrap_or(u32::MAX)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// True when the period shares at least one day with `[from, to]`
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start <= to && from <= self.end
    }

    pub fn ensure_not_past(&self, today: NaiveDate) -> Result<(), PeriodError> {
        if self.start < today {
            return Err(PeriodError::InPast(self.start));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BookingError {
    #[error(transparent)]
    Period(#[from] PeriodError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Product {0} was selected more than once")]
    DuplicateProduct(Uuid),

    #[error("Product {0} does not exist")]
    UnknownProduct(Uuid),
}

/// Check the selected ids against the products found in the catalog and
/// return them in selection order.
pub fn resolve_selection(ids: &[Uuid], found: Vec<Product>) -> Result<Vec<Product>, BookingError> {
    let mut seen = HashSet::new();
    if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(BookingError::DuplicateProduct(*dup));
    }

    ids.iter()
        .map(|id| {
            found
                .iter()
                .find(|p| p.id == *id)
                .cloned()
                .ok_or(BookingError::UnknownProduct(*id))
        })
        .collect()
}

/// Snapshot of a product at the moment it was booked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingItem {
    /// `None` once the product has been removed from the catalog
    pub product_id: Option<Uuid>,
    pub product_type: ProductType,
    pub name: String,
    pub size: Option<String>,
    pub daily_price_cents: i64,
}

impl From<&Product> for BookingItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: Some(product.id),
            product_type: product.product_type,
            name: product.name.clone(),
            size: product.size.clone(),
            daily_price_cents: product.price_cents,
        }
    }
}

/// An equipment rental reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub contact: CustomerContact,
    pub items: Vec<BookingItem>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
    pub total_price_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        contact: CustomerContact,
        products: &[Product],
        period: RentalPeriod,
        notes: Option<String>,
    ) -> Result<Self, BookingError> {
        let quote = quote_rental(products, period.days())?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            contact,
            items: products.iter().map(BookingItem::from).collect(),
            start_date: period.start(),
            end_date: period.end(),
            status: ReservationStatus::Pending,
            total_price_cents: quote.total_cents,
            notes: normalize_notes(notes),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the booked products and dates, recomputing the total from current prices
    pub fn reprice(&mut self, products: &[Product], period: RentalPeriod) -> Result<RentalQuote, BookingError> {
        let quote = quote_rental(products, period.days())?;
        self.items = products.iter().map(BookingItem::from).collect();
        self.start_date = period.start();
        self.end_date = period.end();
        self.total_price_cents = quote.total_cents;
        self.updated_at = Utc::now();
        Ok(quote)
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = normalize_notes(notes);
        self.updated_at = Utc::now();
    }

    pub fn set_status(&mut self, to: ReservationStatus) -> Result<(), StatusError> {
        self.status = self.status.transition(to)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn days(&self) -> u32 {
        let span = (self.end_date - self.start_date).num_days() + 1;
        u32::try_from(span).unwrap_or(0)
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    /// Revenue per booked item: daily price times rental days, `None` on overflow
    pub fn item_revenue(&self) -> impl Iterator<Item = (ProductType, Option<i64>)> + '_ {
        let days = i64::from(self.days());
        self.items
            .iter()
            .map(move |item| (item.product_type, item.daily_price_cents.checked_mul(days)))
    }
}

pub(crate) fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowline_catalog::ProductTier;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn product(product_type: ProductType, price_cents: i64) -> Product {
        Product::new(product_type, product_type.as_str(), price_cents, None, ProductTier::Standard).unwrap()
    }

    fn contact() -> CustomerContact {
        CustomerContact::new("Anna", "anna@example.com", "+37120000000")
    }

    #[test]
    fn test_days_are_inclusive() {
        let period = RentalPeriod::new(date(2027, 1, 10), date(2027, 1, 12), 14).unwrap();
        assert_eq!(period.days(), 3);

        let single = RentalPeriod::new(date(2027, 1, 10), date(2027, 1, 10), 14).unwrap();
        assert_eq!(single.days(), 1);
    }

    #[test]
    fn test_fourteen_day_cap() {
        assert!(RentalPeriod::new(date(2027, 1, 1), date(2027, 1, 14), 14).is_ok());
        assert_eq!(
            RentalPeriod::new(date(2027, 1, 1), date(2027, 1, 15), 14),
            Err(PeriodError::TooLong { days: 15, max: 14 })
        );
    }

    #[test]
    fn test_end_before_start() {
        assert_eq!(
            RentalPeriod::new(date(2027, 1, 5), date(2027, 1, 4), 14),
            Err(PeriodError::EndBeforeStart)
        );
    }

    #[test]
    fn test_not_in_past() {
        let period = RentalPeriod::new(date(2027, 1, 5), date(2027, 1, 6), 14).unwrap();
        assert!(period.ensure_not_past(date(2027, 1, 5)).is_ok());
        assert_eq!(period.ensure_not_past(date(2027, 1, 6)), Err(PeriodError::InPast(date(2027, 1, 5))));
    }

    #[test]
    fn test_overlaps() {
        let period = RentalPeriod::new(date(2027, 2, 10), date(2027, 2, 12), 14).unwrap();
        assert!(period.overlaps(date(2027, 2, 12), date(2027, 2, 20)));
        assert!(period.overlaps(date(2027, 2, 1), date(2027, 2, 10)));
        assert!(!period.overlaps(date(2027, 2, 13), date(2027, 2, 20)));
    }

    #[test]
    fn test_new_booking_prices_all_products_for_all_days() {
        let products = vec![product(ProductType::Ski, 2000), product(ProductType::Helmet, 500)];
        let period = RentalPeriod::new(date(2027, 1, 10), date(2027, 1, 13), 14).unwrap();
        let booking = Booking::new(contact(), &products, period, Some("  ".to_string())).unwrap();

        assert_eq!(booking.total_price_cents, 10_000);
        assert_eq!(booking.status, ReservationStatus::Pending);
        assert_eq!(booking.items.len(), 2);
        assert_eq!(booking.notes, None);
        assert_eq!(booking.days(), 4);
    }

    #[test]
    fn test_booking_without_products_fails() {
        let period = RentalPeriod::new(date(2027, 1, 10), date(2027, 1, 10), 14).unwrap();
        assert_eq!(
            Booking::new(contact(), &[], period, None),
            Err(BookingError::Pricing(PricingError::EmptySelection))
        );
    }

    #[test]
    fn test_reprice() {
        let period = RentalPeriod::new(date(2027, 1, 10), date(2027, 1, 10), 14).unwrap();
        let mut booking = Booking::new(contact(), &[product(ProductType::Ski, 2000)], period, None).unwrap();

        let longer = RentalPeriod::new(date(2027, 1, 10), date(2027, 1, 11), 14).unwrap();
        booking
            .reprice(&[product(ProductType::Snowboard, 2500), product(ProductType::SnowboardBoots, 1000)], longer)
            .unwrap();

        assert_eq!(booking.total_price_cents, 7000);
        assert_eq!(booking.end_date, date(2027, 1, 11));
        assert_eq!(booking.items[0].product_type, ProductType::Snowboard);
    }

    #[test]
    fn test_item_revenue() {
        let period = RentalPeriod::new(date(2027, 1, 10), date(2027, 1, 11), 14).unwrap();
        let booking = Booking::new(
            contact(),
            &[product(ProductType::Ski, 2000), product(ProductType::Poles, 300)],
            period,
            None,
        )
        .unwrap();

        let revenue: Vec<_> = booking.item_revenue().collect();
        assert_eq!(revenue, vec![(ProductType::Ski, Some(4000)), (ProductType::Poles, Some(600))]);
        assert_eq!(revenue.iter().filter_map(|(_, c)| *c).sum::<i64>(), booking.total_price_cents);
    }

    #[test]
    fn test_resolve_selection() {
        let ski = product(ProductType::Ski, 2000);
        let helmet = product(ProductType::Helmet, 500);
        let ids = vec![helmet.id, ski.id];

        let resolved = resolve_selection(&ids, vec![ski.clone(), helmet.clone()]).unwrap();
        assert_eq!(resolved[0].id, helmet.id);
        assert_eq!(resolved[1].id, ski.id);

        assert_eq!(
            resolve_selection(&[ski.id, ski.id], vec![ski.clone()]),
            Err(BookingError::DuplicateProduct(ski.id))
        );

        let missing = Uuid::new_v4();
        assert_eq!(
            resolve_selection(&[ski.id, missing], vec![ski]),
            Err(BookingError::UnknownProduct(missing))
        );
    }

    #[test]
    fn test_status_change() {
        let period = RentalPeriod::new(date(2027, 1, 10), date(2027, 1, 10), 14).unwrap();
        let mut booking = Booking::new(contact(), &[product(ProductType::Ski, 2000)], period, None).unwrap();

        booking.set_status(ReservationStatus::Confirmed).unwrap();
        assert!(booking.set_status(ReservationStatus::Pending).is_err());
        assert_eq!(booking.status, ReservationStatus::Confirmed);
    }
}
