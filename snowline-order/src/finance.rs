use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use snowline_catalog::ProductType;

use crate::booking::Booking;
use crate::lesson::Lesson;

/// Bucket size of a revenue report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    #[default]
    Month,
}

impl Granularity {
    /// First day of the bucket containing `date`
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Month => date.with_day(1).unwrap_or(date),
        }
    }

    fn next_bucket(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Day => start.succ_opt(),
            Granularity::Month => {
                if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
                }
            }
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "month" => Ok(Granularity::Month),
            other => Err(format!("unknown granularity: {other}")),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("Revenue total exceeds the supported amount")]
    Overflow,
}

fn add_cents(total: &mut i64, cents: i64) -> Result<(), ReportError> {
    *total = total.checked_add(cents).ok_or(ReportError::Overflow)?;
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevenueBucket {
    pub period_start: NaiveDate,
    pub rental_cents: i64,
    pub lesson_cents: i64,
    pub total_cents: i64,
    pub booking_count: u32,
    pub lesson_count: u32,
}

/// Confirmed and completed revenue over a date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenueReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub granularity: Granularity,
    pub buckets: Vec<RevenueBucket>,
    pub rental_total_cents: i64,
    pub lesson_total_cents: i64,
    pub total_cents: i64,
    pub rental_by_product_type: BTreeMap<ProductType, i64>,
}

impl RevenueReport {
    /// Bookings are attributed to their start date and lessons to their date.
    /// Every bucket in the range is present, including empty ones.
    pub fn build(
        from: NaiveDate,
        to: NaiveDate,
        granularity: Granularity,
        bookings: &[Booking],
        lessons: &[Lesson],
    ) -> Result<Self, ReportError> {
        let mut buckets: BTreeMap<NaiveDate, RevenueBucket> = BTreeMap::new();
        let mut cursor = Some(granularity.bucket_start(from));
        while let Some(start) = cursor.filter(|s| *s <= to) {
            buckets.insert(
                start,
                RevenueBucket {
                    period_start: start,
                    ..Default::default()
                },
            );
            cursor = granularity.next_bucket(start);
        }

        let in_range = |d: NaiveDate| from <= d && d <= to;
        let mut rental_by_product_type = BTreeMap::new();

        for booking in bookings
            .iter()
            .filter(|b| b.status.counts_as_revenue() && in_range(b.start_date))
        {
            if let Some(bucket) = buckets.get_mut(&granularity.bucket_start(booking.start_date)) {
                add_cents(&mut bucket.rental_cents, booking.total_price_cents)?;
                bucket.booking_count += 1;
            }
            for (product_type, cents) in booking.item_revenue() {
                let cents = cents.ok_or(ReportError::Overflow)?;
                add_cents(rental_by_product_type.entry(product_type).or_insert(0), cents)?;
            }
        }

        for lesson in lessons
            .iter()
            .filter(|l| l.status.counts_as_revenue() && in_range(l.date))
        {
            if let Some(bucket) = buckets.get_mut(&granularity.bucket_start(lesson.date)) {
                add_cents(&mut bucket.lesson_cents, lesson.total_price_cents)?;
                bucket.lesson_count += 1;
            }
        }

        let mut rental_total_cents: i64 = 0;
        let mut lesson_total_cents: i64 = 0;
        let buckets = buckets
            .into_values()
            .map(|mut b| -> Result<RevenueBucket, ReportError> {
                b.total_cents = b.rental_cents.checked_add(b.lesson_cents).ok_or(ReportError::Overflow)?;
                add_cents(&mut rental_total_cents, b.rental_cents)?;
                add_cents(&mut lesson_total_cents, b.lesson_cents)?;
                Ok(b)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let total_cents = rental_total_cents
            .checked_add(lesson_total_cents)
            .ok_or(ReportError::Overflow)?;

        Ok(Self {
            from,
            to,
            granularity,
            buckets,
            rental_total_cents,
            lesson_total_cents,
            total_cents,
            rental_by_product_type,
        })
    }
}
