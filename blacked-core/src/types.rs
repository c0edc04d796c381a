//! Core data types for raw Shodan responses and normalized records
//!
//! [`RawRecord`] is one item returned by the Shodan API, kept as the exact
//! JSON object the provider sent (explicit `null`s included). Search banners
//! and host lookups carry different shapes, so the known fields are read
//! through lenient accessors that treat absent, `null` and mistyped values
//! alike. [`Record`] is the canonical, fixed-shape entry every export sink
//! consumes.
//!
//! # Examples
//!
//! ```
//! use blacked_core::types::RawRecord;
//!
//! let raw: RawRecord = serde_json::from_str(r#"{"ip_str": "8.8.8.8", "port": 53, "org": null}"#).unwrap();
//! assert_eq!(raw.ip_str(), Some("8.8.8.8"));
//! assert_eq!(raw.port(), Some(53));
//! assert!(raw.org().is_none());
//! assert_eq!(raw.render(), r#"{"ip_str":"8.8.8.8","org":null,"port":53}"#);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder used for missing organization and country names
pub const NOT_AVAILABLE: &str = "N/A";

/// One unnormalized item from the Shodan API
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Creates an empty raw record for the given IP string
    pub fn with_ip(ip: impl Into<String>) -> Self {
        Self::default().set("ip_str", ip.into())
    }

    /// Returns the record with `key` set to `value`
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw value of `key`, `null` included
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn ip_str(&self) -> Option<&str> {
        self.get("ip_str").and_then(Value::as_str)
    }

    pub fn port(&self) -> Option<u16> {
        self.get("port")
            .and_then(Value::as_u64)
            .and_then(|port| u16::try_from(port).ok())
    }

    pub fn org(&self) -> Option<&str> {
        self.get("org").and_then(Value::as_str)
    }

    pub fn hostnames(&self) -> Option<Vec<String>> {
        self.string_list("hostnames")
    }

    pub fn domains(&self) -> Option<Vec<String>> {
        self.string_list("domains")
    }

    /// The `location` object, if the item carries one
    pub fn location(&self) -> Option<Location> {
        match self.get("location") {
            Some(Value::Object(map)) => Some(Location(map.clone())),
            _ => None,
        }
    }

    /// Returns the banner text when `data` is a string
    ///
    /// Host lookups put a list of banners under `data`; that yields `None`.
    pub fn banner(&self) -> Option<&str> {
        self.get("data").and_then(Value::as_str)
    }

    /// Renders the whole record as compact JSON text
    pub fn render(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    fn string_list(&self, key: &str) -> Option<Vec<String>> {
        let items = self.get(key)?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
        )
    }
}

/// Geographic information attached to a host, exactly as the API sent it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Location(Map<String, Value>);

impl Location {
    /// Creates a location carrying only a country name
    pub fn country(name: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("country_name".to_string(), Value::String(name.into()));
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn country_name(&self) -> Option<&str> {
        self.get("country_name").and_then(Value::as_str)
    }

    /// Returns true when the mapping has no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A normalized host entry
///
/// Every record in a batch has the same field set; missing source fields are
/// filled with defaults by [`crate::normalize::normalize`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub org: String,
    pub hostnames: Vec<String>,
    pub location: Location,
    pub domains: Vec<String>,
    pub data: String,
    /// Time the record was normalized, not a value from the API
    pub timestamp: DateTime<Utc>,
}

impl Record {
    /// Returns the country name or `"N/A"`
    pub fn country(&self) -> &str {
        self.location.country_name().unwrap_or(NOT_AVAILABLE)
    }

    /// IP as display text, `"None"` when absent
    pub fn ip_display(&self) -> String {
        self.ip.clone().unwrap_or_else(|| "None".to_string())
    }

    /// Port as display text, `"None"` when absent
    pub fn port_display(&self) -> String {
        self.port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "None".to_string())
    }
}

/// Ordered records produced by a single pipeline run
pub type RecordBatch = Vec<Record>;

/// Subscription details returned by the account check
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccountInfo {
    #[serde(default)]
    pub plan: Option<String>,

    #[serde(default)]
    pub query_credits: Option<i64>,

    #[serde(default)]
    pub scan_credits: Option<i64>,

    #[serde(default)]
    pub unlocked: Option<bool>,
}
