//! Data models shared across the synchronizer.
//!
//! This module contains the upstream record shapes, the canonical country
//! identity and the scalar value type that ends up in the state tree.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

static ALL_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static POINTS_AND_COMMAS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.,]").unwrap());

/// Turn a display name into a storage path segment.
///
/// Whitespace runs become a single underscore, periods and commas are removed.
/// The result only depends on the input, so the same name always lands on the
/// same branch of the tree.
pub fn path_safe(name: &str) -> String {
    let spaced = ALL_SPACES.replace_all(name.trim(), "_");
    POINTS_AND_COMMAS.replace_all(&spaced, "").into_owned()
}

/// A scalar leaf value as stored in the state tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl StateValue {
    /// Converts a JSON value from a feed. `null` means "no value this cycle".
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(StateValue::Bool(*b)),
            Value::Number(n) => n.as_f64().map(StateValue::Number),
            Value::String(s) => Some(StateValue::Text(s.clone())),
            other => Some(StateValue::Text(other.to_string())),
        }
    }

    /// Value type tag recorded on the state object.
    pub fn type_name(&self) -> &'static str {
        match self {
            StateValue::Bool(_) => "boolean",
            StateValue::Number(_) => "number",
            StateValue::Text(_) => "string",
        }
    }

    /// Numeric coercion: numbers pass through, text is parsed after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StateValue::Number(n) => Some(*n),
            StateValue::Text(s) => s.trim().parse::<f64>().ok(),
            StateValue::Bool(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StateValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Bool(b) => write!(f, "{}", b),
            StateValue::Number(n) => write!(f, "{}", n),
            StateValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for StateValue {
    fn from(n: f64) -> Self {
        StateValue::Number(n)
    }
}

impl From<i64> for StateValue {
    fn from(n: i64) -> Self {
        StateValue::Number(n as f64)
    }
}

impl From<bool> for StateValue {
    fn from(b: bool) -> Self {
        StateValue::Bool(b)
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        StateValue::Text(s.to_string())
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        StateValue::Text(s)
    }
}

/// Nested `countryInfo` block of a country record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryInfo {
    #[serde(default)]
    pub iso2: Option<String>,
    #[serde(default)]
    pub iso3: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
    /// Coordinates and feed-internal ids, never written.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One entry of the per-country feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCountryRecord {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(rename = "countryInfo", default)]
    pub country_info: CountryInfo,
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default)]
    pub updated: Option<i64>,
    /// Every other field the feed reports (counters, rates, population).
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl RawCountryRecord {
    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    pub fn cases(&self) -> f64 {
        self.number("cases").unwrap_or(0.0)
    }

    /// Numeric metric fields, excluding `countryInfo`, `continent` and `updated`.
    pub fn metrics(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fields
            .iter()
            .filter_map(|(k, v)| v.as_f64().map(|n| (k.as_str(), n)))
    }

    /// Continent as reported by the feed, `None` when absent or blank.
    pub fn feed_continent(&self) -> Option<&str> {
        self.continent.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Leaf properties written for this record, `countryInfo` reduced to `flag`.
    ///
    /// `country` itself is not a leaf.
    pub fn properties(&self) -> Vec<(String, Option<StateValue>)> {
        let mut props: Vec<(String, Option<StateValue>)> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), StateValue::from_json(v)))
            .collect();

        if let Some(continent) = &self.continent {
            props.push(("continent".to_string(), Some(continent.clone().into())));
        }
        if let Some(updated) = self.updated {
            props.push(("updated".to_string(), Some(updated.into())));
        }
        props.push((
            "flag".to_string(),
            self.country_info.flag.clone().map(StateValue::Text),
        ));

        props
    }
}

/// The resolved identity of a country record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalCountry {
    pub display_name: String,
    pub path_safe_name: String,
    /// Empty only for fallback identities built from unresolved records.
    pub continent: String,
    pub iso_code: Option<String>,
}

impl CanonicalCountry {
    pub fn new(display_name: &str, continent: &str, iso_code: Option<&str>) -> Self {
        Self {
            display_name: display_name.to_string(),
            path_safe_name: path_safe(display_name),
            continent: continent.to_string(),
            iso_code: iso_code.map(str::to_string),
        }
    }

    /// Identity for a record the resolver could not match: the feed's own
    /// name and continent are kept so the record is still written.
    pub fn from_feed(record: &RawCountryRecord) -> Option<Self> {
        let name = record.country.as_deref()?;
        Some(Self::new(
            name,
            record.feed_continent().unwrap_or_default(),
            record.country_info.iso3.as_deref(),
        ))
    }

    pub fn has_continent(&self) -> bool {
        !self.continent.is_empty()
    }
}
