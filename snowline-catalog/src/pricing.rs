use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Price breakdown for a set of products rented over a number of days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalQuote {
    /// Number of rental days, inclusive of both ends
    pub days: u32,

    /// Sum of the daily prices of all selected products
    pub daily_total_cents: i64,

    /// `daily_total_cents * days`
    pub total_cents: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("At least one product must be selected")]
    EmptySelection,

    #[error("Rental must last at least one day")]
    NoDays,

    #[error("Price calculation overflowed")]
    Overflow,
}

/// Calculate the rental total: every product is charged its daily price for each day.
pub fn quote_rental(products: &[Product], days: u32) -> Result<RentalQuote, PricingError> {
    if products.is_empty() {
        return Err(PricingError::EmptySelection);
    }
    if days == 0 {
        return Err(PricingError::NoDays);
    }

    let daily_total_cents = products
        .iter()
        .try_fold(0i64, |acc, p| acc.checked_add(p.price_cents))
        .ok_or(PricingError::Overflow)?;

    let total_cents = daily_total_cents
        .checked_mul(i64::from(days))
        .ok_or(PricingError::Overflow)?;

    Ok(RentalQuote {
        days,
        daily_total_cents,
        total_cents,
    })
}
