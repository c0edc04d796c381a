//! Raw response to [`Record`] mapping
//!
//! Search banners carry their own `data` string; host lookups do not, so the
//! lookup path stores the whole raw record as text instead.

use crate::types::{RawRecord, Record, NOT_AVAILABLE};
use chrono::{DateTime, Utc};

/// Maps a raw API item onto the canonical record shape
///
/// Missing fields get their documented defaults: `org` becomes `"N/A"`, list
/// fields become empty, `location` becomes an empty mapping. `data` is the
/// banner string, or the full raw record rendered as JSON when
/// `raw_string_fallback` is set.
///
/// # Examples
///
/// ```
/// use blacked_core::normalize::normalize;
/// use blacked_core::types::RawRecord;
/// use chrono::Utc;
///
/// let record = normalize(&RawRecord::with_ip("8.8.8.8"), Utc::now(), false);
/// assert_eq!(record.org, "N/A");
/// assert!(record.hostnames.is_empty());
/// ```
pub fn normalize(raw: &RawRecord, captured_at: DateTime<Utc>, raw_string_fallback: bool) -> Record {
    let data = if raw_string_fallback {
        raw.render()
    } else {
        raw.banner().unwrap_or_default().to_string()
    };

    Record {
        ip: raw.ip_str().map(String::from),
        port: raw.port(),
        org: raw.org().unwrap_or(NOT_AVAILABLE).to_string(),
        hostnames: raw.hostnames().unwrap_or_default(),
        location: raw.location().unwrap_or_default(),
        domains: raw.domains().unwrap_or_default(),
        data,
        timestamp: captured_at,
    }
}
