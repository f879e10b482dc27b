use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// One cell of the lesson price matrix: the price for a whole group of
/// `people` taking a lesson of `duration_hours`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPricing {
    pub id: Uuid,
    pub people: u32,
    pub duration_hours: u32,
    pub price_cents: i64,
}

impl LessonPricing {
    pub fn new(people: u32, duration_hours: u32, price_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            people,
            duration_hours,
            price_cents,
        }
    }
}

/// Lookup view over the pricing rows, keyed by people × duration
#[derive(Debug, Clone, Default)]
pub struct LessonPriceTable {
    rows: Vec<LessonPricing>,
}

impl LessonPriceTable {
    pub fn new(mut rows: Vec<LessonPricing>) -> Self {
        rows.sort_by_key(|r| (r.people, r.duration_hours));
        Self { rows }
    }

    pub fn lookup(&self, people: u32, duration_hours: u32) -> Option<i64> {
        self.rows
            .iter()
            .find(|r| r.people == people && r.duration_hours == duration_hours)
            .map(|r| r.price_cents)
    }

    /// Distinct durations that have at least one price
    pub fn durations(&self) -> Vec<u32> {
        self.rows
            .iter()
            .map(|r| r.duration_hours)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn max_people(&self) -> u32 {
        self.rows.iter().map(|r| r.people).max().unwrap_or(0)
    }

    pub fn rows(&self) -> &[LessonPricing] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
