use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of the public price table. Display only; rental totals are always
/// computed from product prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceListEntry {
    pub id: Uuid,
    pub category: String,
    pub item: String,
    pub duration_label: String,
    pub price_cents: i64,
    pub position: i32,
}

impl PriceListEntry {
    pub fn new(
        category: impl Into<String>,
        item: impl Into<String>,
        duration_label: impl Into<String>,
        price_cents: i64,
        position: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            item: item.into(),
            duration_label: duration_label.into(),
            price_cents,
            position,
        }
    }
}

/// Order rows for display: by position, then category and item
pub fn sort_for_display(entries: &mut [PriceListEntry]) {
    entries.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.item.cmp(&b.item))
    });
}
