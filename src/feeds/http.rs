//! Network implementation of [`Feeds`].

use super::vaccination::CountryVaccinationSeries;
use super::{FeatureCollection, Feeds, GermanVaccinations, HospitalCapacity, HospitalReport, VaccinationTable};
use crate::config::SourcesConfig;
use crate::error::FeedError;
use crate::models::RawCountryRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fetches every feed over HTTP.
pub struct HttpFeeds {
    client: reqwest::Client,
    sources: SourcesConfig,
}

impl HttpFeeds {
    pub fn new(sources: SourcesConfig, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("covidsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, sources })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FeedError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FeedError::Timeout {
                    url: url.to_string(),
                }
            } else if e.is_connect() {
                FeedError::Connect {
                    url: url.to_string(),
                }
            } else {
                FeedError::Request {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| FeedError::Request {
            url: url.to_string(),
            source: e,
        })?;

        serde_json::from_slice(&body).map_err(|e| FeedError::Decode {
            url: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl Feeds for HttpFeeds {
    async fn global_totals(&self) -> Result<Map<String, Value>, FeedError> {
        self.get_json(&self.sources.global_totals).await
    }

    async fn countries(&self) -> Result<Vec<RawCountryRecord>, FeedError> {
        let records: Vec<RawCountryRecord> = self.get_json(&self.sources.countries).await?;
        info!("Received {} country records", records.len());
        Ok(records)
    }

    async fn federal_states(&self) -> Result<FeatureCollection, FeedError> {
        let value: Value = self.get_json(&self.sources.federal_states).await?;
        FeatureCollection::from_value("federal states", value)
    }

    async fn counties(&self) -> Result<FeatureCollection, FeedError> {
        let value: Value = self.get_json(&self.sources.counties).await?;
        FeatureCollection::from_value("counties", value)
    }

    async fn german_vaccinations(&self) -> Result<GermanVaccinations, FeedError> {
        self.get_json(&self.sources.german_vaccinations).await
    }

    async fn vaccinations(&self) -> Result<VaccinationTable, FeedError> {
        let series: Vec<CountryVaccinationSeries> =
            self.get_json(&self.sources.vaccinations).await?;
        let table = VaccinationTable::from_series(series);
        if table.is_empty() {
            warn!("Vaccination feed contained no dated entries");
        } else {
            info!("Vaccination data available for {} countries", table.len());
        }
        Ok(table)
    }

    async fn hospital_capacity(&self) -> Result<HospitalCapacity, FeedError> {
        let report: HospitalReport = self.get_json(&self.sources.hospital_capacity).await?;
        Ok(HospitalCapacity::from_report(report))
    }
}
