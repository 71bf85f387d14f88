//! Age histogram and oldest-N ranking over fetched records.
//!
//! Both functions are pure: they borrow the records and never reorder the
//! caller's slice, so the same batch can feed the chart and the table.

use crate::domain::model::{AgeBand, AgeHistogram, PersonRecord};
use crate::utils::error::AggregationError;

pub const DEFAULT_TOP_N: i64 = 10;

fn checked_age(index: usize, record: &PersonRecord) -> Result<u64, AggregationError> {
    u64::try_from(record.age()).map_err(|_| AggregationError::NegativeAge {
        index,
        age: record.age(),
    })
}

/// Count records per age band. Empty input gives six zeros.
pub fn bucketize(records: &[PersonRecord]) -> Result<AgeHistogram, AggregationError> {
    let mut histogram = AgeHistogram::default();
    for (index, record) in records.iter().enumerate() {
        let age = checked_age(index, record)?;
        histogram.record(AgeBand::for_age(age));
    }
    Ok(histogram)
}

/// The `n` oldest records, ties kept in input order.
pub fn top_oldest(records: &[PersonRecord], n: i64) -> Result<Vec<PersonRecord>, AggregationError> {
    let n = usize::try_from(n).map_err(|_| AggregationError::NegativeLimit(n))?;
    for (index, record) in records.iter().enumerate() {
        checked_age(index, record)?;
    }

    let mut ranked: Vec<&PersonRecord> = records.iter().collect();
    // sort_by_key is stable
    ranked.sort_by_key(|record| std::cmp::Reverse(record.age()));
    Ok(ranked.into_iter().take(n).cloned().collect())
}

/// Decode the raw `results` array; a record whose age is missing or not an integer is rejected.
pub fn decode_records(items: Vec<serde_json::Value>) -> Result<Vec<PersonRecord>, AggregationError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| AggregationError::MalformedRecord {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}
