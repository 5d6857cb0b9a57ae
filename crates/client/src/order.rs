//! Client-side ordering of fetched history.

use std::cmp::Reverse;

use homeval_interchange::PredictionRecord;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::config::HistoryOrder;

/// Apply `order` to a freshly fetched history, in place.
pub fn apply(order: HistoryOrder, records: &mut [PredictionRecord]) {
    match order {
        HistoryOrder::Server => {}
        HistoryOrder::NewestFirst => sort_newest_first(records),
    }
}

/// Stable sort by `created_at`, newest first.
///
/// Records whose timestamp does not parse as RFC 3339 sort after every
/// parseable one and keep their relative order.
pub fn sort_newest_first(records: &mut [PredictionRecord]) {
    records.sort_by_cached_key(|r| match parse_timestamp(&r.created_at) {
        Some(at) => (false, Reverse(Some(at))),
        None => (true, Reverse(None)),
    });
}

/// Parse a service timestamp (RFC 3339, e.g. `2024-01-01T00:00:00+00:00`).
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339).ok()
}
