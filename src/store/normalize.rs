//! List response normalization
//!
//! The link service is mid-migration and `GET /links` answers in one of two
//! shapes:
//!
//! - legacy: a bare array of records
//! - current: `{ "links": [...], "total": n }`
//!
//! Both are funneled through [`normalize_list_response`] so nothing else in the
//! crate looks at the raw payload. Records are decoded one at a time; a record
//! that doesn't decode is skipped and counted, the rest of the page survives.
//! A payload in neither shape degrades to an empty page.

use serde_json::Value;
use tracing::{trace, warn};

use crate::models::LinkRecord;

/// Which wire shape a list response arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireShape {
    Legacy,
    Current,
    /// Neither shape; treated as an empty result
    Unrecognized,
}

/// A normalized page of records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPage {
    pub records: Vec<LinkRecord>,
    pub total: u64,
    pub shape: WireShape,
    /// Entries of `links` (or of the bare array) that failed to decode
    pub skipped: usize,
}

impl LinkPage {
    fn unrecognized() -> Self {
        Self {
            records: Vec::new(),
            total: 0,
            shape: WireShape::Unrecognized,
            skipped: 0,
        }
    }
}

/// Normalize a `GET /links` payload into records + total.
///
/// - bare array: decodable records, total is the array length (the real
///   total is unknown in this shape)
/// - object: `links` (missing, null or not an array → empty), `total`
///   (missing, null or not a non-negative number → 0). The server's `total`
///   is kept even when some records are skipped.
/// - anything else: empty page
pub fn normalize_list_response(data: Value) -> LinkPage {
    match data {
        Value::Array(items) => {
            let total = items.len() as u64;
            let (records, skipped) = decode_records(items);
            LinkPage {
                records,
                total,
                shape: WireShape::Legacy,
                skipped,
            }
        }
        Value::Object(mut map) => {
            let (records, skipped) = match map.remove("links") {
                None | Some(Value::Null) => (Vec::new(), 0),
                Some(Value::Array(items)) => decode_records(items),
                Some(other) => {
                    warn!(
                        "List payload `links` is a {}, expected an array",
                        value_kind(&other)
                    );
                    (Vec::new(), 0)
                }
            };
            let total = map.get("total").map(read_total).unwrap_or(0);
            LinkPage {
                records,
                total,
                shape: WireShape::Current,
                skipped,
            }
        }
        other => {
            trace!("Unrecognized list payload type: {}", value_kind(&other));
            LinkPage::unrecognized()
        }
    }
}

fn decode_records(items: Vec<Value>) -> (Vec<LinkRecord>, usize) {
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<LinkRecord>(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Skipping list entry {}: {}", index, e);
                skipped += 1;
            }
        }
    }
    (records, skipped)
}

fn read_total(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f > 0.0 => f as u64,
        _ => 0,
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
