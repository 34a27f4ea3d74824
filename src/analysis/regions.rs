//! Classification of German administrative units into county-like and city-like buckets.

use crate::error::RegionError;
use crate::models::path_safe;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Structural bucket a county-level unit is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    CountyLike,
    CityLike,
}

impl Bucket {
    /// Folder name below `Germany` in the state tree.
    pub fn folder(&self) -> &'static str {
        match self {
            Bucket::CountyLike => "Kreis",
            Bucket::CityLike => "Stadt",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.folder())
    }
}

/// Map an administrative label (`BEZ`) to its bucket.
pub fn classify(administrative_label: &str) -> Result<Bucket, RegionError> {
    match administrative_label {
        "Kreisfreie Stadt" | "Stadtkreis" | "Bezirk" => Ok(Bucket::CityLike),
        "Kreis" | "Landkreis" => Ok(Bucket::CountyLike),
        other => Err(RegionError::UnknownType(other.to_string())),
    }
}

/// Attributes that identify a unit and are not written as leaves.
const IDENTITY_ATTRIBUTES: [&str; 4] = ["county", "GEN", "BEZ", "OBJECTID"];

/// One county-level unit from the counties feed.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub raw_name: String,
    pub path_safe_name: String,
    pub administrative_label: String,
    /// Feed identifier, e.g. `SK Berlin Mitte`.
    pub county_id: Option<String>,
    pub metrics: Map<String, Value>,
}

impl RegionRecord {
    /// Build from a feature's `attributes`; `None` without a `GEN` name.
    pub fn from_attributes(attributes: &Map<String, Value>) -> Option<Self> {
        let raw_name = attributes.get("GEN")?.as_str()?.to_string();
        let administrative_label = attributes
            .get("BEZ")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let metrics = attributes
            .iter()
            .filter(|(key, _)| !IDENTITY_ATTRIBUTES.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Some(Self {
            path_safe_name: path_safe(&raw_name),
            raw_name,
            administrative_label,
            county_id: attributes
                .get("county")
                .and_then(Value::as_str)
                .map(String::from),
            metrics,
        })
    }

    pub fn bucket(&self) -> Result<Bucket, RegionError> {
        classify(&self.administrative_label)
    }
}

/// Which units of a category are materialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub load_all: bool,
    pub allow_list: Vec<String>,
}

impl Selection {
    pub fn new(load_all: bool, allow_list: &[String]) -> Self {
        Self {
            load_all,
            allow_list: allow_list.to_vec(),
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.load_all || self.allow_list.iter().any(|n| n == name)
    }
}
