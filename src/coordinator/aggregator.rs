//! Scatter-gather response merging
//!
//! Partial results are concatenated Site-A first, then Site-B, each keeping
//! the order its site returned. Records are never deduplicated: the fragments
//! are disjoint by construction, and a site answering for rows it does not own
//! shows up as duplicates rather than being masked here.

use crate::common::partition::SiteId;
use crate::{Error, Result};
use serde_json::Value;

/// Concatenate two partial results in fixed site order.
pub fn merge<T>(site_a: Vec<T>, mut site_b: Vec<T>) -> Vec<T> {
    let mut merged = site_a;
    merged.append(&mut site_b);
    merged
}

/// Decode one site's raw body into its row list.
pub fn decode_rows(site: SiteId, body: &[u8]) -> Result<Vec<Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Array(rows)) => Ok(rows),
        Ok(other) => Err(Error::AggregationFailure {
            site,
            reason: format!("expected a JSON array, got {}", json_type(&other)),
        }),
        Err(e) => Err(Error::AggregationFailure {
            site,
            reason: format!("undecodable payload: {}", e),
        }),
    }
}

/// Decode and merge the raw bodies of a scatter-gather pair.
pub fn gather(site_a: &[u8], site_b: &[u8]) -> Result<Vec<Value>> {
    let a = decode_rows(SiteId::SiteA, site_a)?;
    let b = decode_rows(SiteId::SiteB, site_b)?;
    Ok(merge(a, b))
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
