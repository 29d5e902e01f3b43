//! Per-scheme investment summary.
//!
//! Pure functions over a user's plan records. Callers pass `as_of` explicitly;
//! handlers use today's UTC date.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::SipPlan;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeSummary {
    pub scheme_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_invested: Decimal,
    /// Longest-running plan in the group.
    pub months_invested: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SummaryError {
    #[error("SIP record {id} has a non-positive monthly amount")]
    NonPositiveAmount { id: Uuid },
}

/// Whole calendar months from `start` up to `as_of`.
///
/// A month counts once `as_of` reaches the start's day-of-month. When the
/// start day does not exist in `as_of`'s month (e.g. the 31st in a 30-day
/// month) the last day of that month stands in for it. Future starts give 0.
pub fn months_between(start: NaiveDate, as_of: NaiveDate) -> u32 {
    if start >= as_of {
        return 0;
    }

    let mut months = (as_of.year() - start.year()) * 12 + as_of.month() as i32 - start.month() as i32;
    let anniversary = start.day().min(last_day_of_month(as_of));
    if as_of.day() < anniversary {
        months -= 1;
    }

    months.max(0) as u32
}

fn last_day_of_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Group `records` by exact scheme name, in first-seen order.
///
/// All records must belong to one user. Any record with a non-positive amount
/// fails the whole call.
pub fn summarize(records: &[SipPlan], as_of: NaiveDate) -> Result<Vec<SchemeSummary>, SummaryError> {
    let mut summaries: Vec<SchemeSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        if record.monthly_amount <= Decimal::ZERO {
            return Err(SummaryError::NonPositiveAmount { id: record.id });
        }

        let months = months_between(record.start_date, as_of);
        let invested = record.monthly_amount * Decimal::from(months);

        let slot = *index.entry(record.scheme_name.as_str()).or_insert_with(|| {
            summaries.push(SchemeSummary {
                scheme_name: record.scheme_name.clone(),
                total_invested: Decimal::ZERO,
                months_invested: 0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[slot];
        summary.total_invested += invested;
        summary.months_invested = summary.months_invested.max(months);
    }

    Ok(summaries)
}
