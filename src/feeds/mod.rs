//! Upstream data feeds.
//!
//! The run only sees feeds through the [`Feeds`] trait. [`HttpFeeds`] is the
//! network implementation; tests substitute canned data.

pub mod hospital;
pub mod http;
pub mod vaccination;

use crate::error::FeedError;
use crate::models::RawCountryRecord;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

pub use hospital::{HospitalCapacity, HospitalFigures, HospitalReport};
pub use http::HttpFeeds;
pub use vaccination::{GermanVaccinations, StateVaccination, VaccinationEntry, VaccinationTable};

/// One feature of a geographic feature collection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Feature {
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

#[derive(Deserialize)]
struct RawFeatureCollection {
    features: Vec<Option<Feature>>,
}

/// Federal-state or county feature collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Validate and convert a decoded payload. `null` features are dropped.
    pub fn from_value(feed: &'static str, value: Value) -> Result<Self, FeedError> {
        if !value.get("features").is_some_and(Value::is_array) {
            return Err(FeedError::Malformed {
                feed,
                reason: "missing features array".to_string(),
            });
        }

        let raw: RawFeatureCollection =
            serde_json::from_value(value).map_err(|e| FeedError::Malformed {
                feed,
                reason: e.to_string(),
            })?;

        Ok(Self {
            features: raw.features.into_iter().flatten().collect(),
        })
    }
}

/// Source of all upstream data used by a run.
#[async_trait]
pub trait Feeds: Send + Sync {
    async fn global_totals(&self) -> Result<Map<String, Value>, FeedError>;

    /// Per-country records, sorted by case count descending.
    async fn countries(&self) -> Result<Vec<RawCountryRecord>, FeedError>;

    async fn federal_states(&self) -> Result<FeatureCollection, FeedError>;

    async fn counties(&self) -> Result<FeatureCollection, FeedError>;

    async fn german_vaccinations(&self) -> Result<GermanVaccinations, FeedError>;

    async fn vaccinations(&self) -> Result<VaccinationTable, FeedError>;

    async fn hospital_capacity(&self) -> Result<HospitalCapacity, FeedError>;
}

/// Handle to a background fetch. Clone it and await wherever the data is needed;
/// `None` means the feed was unavailable.
pub type Prefetched<T> = Shared<BoxFuture<'static, Option<Arc<T>>>>;

/// Start `fetch` on the runtime right away.
pub fn prefetch<T, F>(label: &'static str, fetch: F) -> Prefetched<T>
where
    T: Send + Sync + 'static,
    F: Future<Output = Result<T, FeedError>> + Send + 'static,
{
    tokio::spawn(fetch)
        .map(move |joined| match joined {
            Ok(Ok(data)) => Some(Arc::new(data)),
            Ok(Err(e)) => {
                warn!("{} data unavailable: {}", label, e);
                None
            }
            Err(e) => {
                warn!("{} fetch aborted: {}", label, e);
                None
            }
        })
        .boxed()
        .shared()
}

/// Handles for the two feeds fetched at run start.
#[derive(Clone)]
pub struct PrefetchedFeeds {
    pub vaccinations: Prefetched<VaccinationTable>,
    pub hospital: Prefetched<HospitalCapacity>,
}

impl PrefetchedFeeds {
    pub fn start(feeds: Arc<dyn Feeds>) -> Self {
        let vaccination_feeds = feeds.clone();
        Self {
            vaccinations: prefetch("Vaccination", async move {
                vaccination_feeds.vaccinations().await
            }),
            hospital: prefetch("Hospital", async move { feeds.hospital_capacity().await }),
        }
    }
}
