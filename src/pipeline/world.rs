//! Global totals, countries, leaderboard and continent rollups.

use super::{RunContext, Runner};
use crate::analysis::{aggregate, Aggregates};
use crate::feeds::PrefetchedFeeds;
use crate::models::{CanonicalCountry, RawCountryRecord, StateValue};
use crate::store::ObjectKind;
use anyhow::Result;
use tracing::{debug, info, warn};

const LEADERBOARD: &str = "country_Top_5";
const LEADERBOARD_SIZE: usize = 5;
const CONTINENTS: &str = "global_continents";

impl Runner {
    pub(super) async fn load_global_totals(&self) -> Result<()> {
        let totals = match self.feeds.global_totals().await {
            Ok(totals) => totals,
            Err(e) => {
                warn!("[loadAll] Unable to contact COVID-19 API: {}", e);
                return Ok(());
            }
        };

        self.reconciler
            .ensure_folder(
                "global_totals",
                ObjectKind::Device,
                "Total values of all countries together",
            )
            .await?;
        for (key, value) in &totals {
            self.reconciler
                .reconcile(
                    &format!("global_totals.{}", key),
                    key,
                    StateValue::from_json(value),
                )
                .await;
        }

        debug!("Global totals written ({} values)", totals.len());
        Ok(())
    }

    pub(super) async fn load_countries(
        &self,
        ctx: &mut RunContext,
        prefetched: &PrefetchedFeeds,
    ) -> Result<()> {
        let records = match self.feeds.countries().await {
            Ok(records) => records,
            Err(e) => {
                warn!("[loadCountries] Unable to contact COVID-19 API: {}", e);
                return Ok(());
            }
        };

        let selection = self.config.countries.selection();
        let mut resolved: Vec<(CanonicalCountry, &RawCountryRecord)> = Vec::new();

        for record in &records {
            let Some(raw_name) = record.country.as_deref() else {
                continue;
            };
            let Some(country) = self
                .resolver
                .resolve(raw_name, &record.country_info)
                .or_else(|| CanonicalCountry::from_feed(record))
            else {
                continue;
            };

            debug!(
                "api name: {}, converted name: {}, path: {}, continent: {}",
                raw_name, country.display_name, country.path_safe_name, country.continent
            );
            ctx.countries.push(country.display_name.clone());

            if selection.is_selected(&country.display_name) {
                if let Err(e) = self.write_country(&country, record, prefetched).await {
                    warn!("Cannot write data for {}: {:#}", country.display_name, e);
                }
            } else {
                self.reconciler.prune(&country.path_safe_name).await;
            }
            self.reconciler
                .prune(&format!("{}.countryInfo", country.path_safe_name))
                .await;

            resolved.push((country, record));
        }

        self.write_leaderboard(&records).await?;

        let aggregates = aggregate(resolved.iter().map(|(country, record)| (country, *record)));
        self.write_continents(&aggregates).await?;

        info!("Processed {} countries", resolved.len());
        Ok(())
    }

    async fn write_country(
        &self,
        country: &CanonicalCountry,
        record: &RawCountryRecord,
        prefetched: &PrefetchedFeeds,
    ) -> Result<()> {
        let path = &country.path_safe_name;
        self.reconciler
            .ensure_folder(path, ObjectKind::Device, &country.display_name)
            .await?;
        self.reconciler
            .ensure_folder(
                &format!("{}.Vaccination", path),
                ObjectKind::Channel,
                "Vaccination Data",
            )
            .await?;

        let vaccination = match (&country.iso_code, prefetched.vaccinations.clone().await) {
            (Some(iso3), Some(table)) => table.for_iso3(iso3).cloned(),
            _ => None,
        };
        match vaccination {
            Some(entry) => {
                for (key, value) in entry.leaves() {
                    self.reconciler
                        .reconcile(&format!("{}.Vaccination.{}", path, key), key, value)
                        .await;
                }
            }
            None => debug!("No vaccination data for {}", country.display_name),
        }

        if country.display_name == "Germany" {
            match prefetched.hospital.clone().await {
                Some(capacity) => match capacity.overall() {
                    Some(overall) => self.write_hospital(path, overall).await?,
                    None => debug!("Hospital data has no overall sum"),
                },
                None => debug!("No hospital data for {}", country.display_name),
            }
        }

        for (key, value) in record.properties() {
            self.reconciler
                .reconcile(&format!("{}.{}", path, key), &key, value)
                .await;
        }

        Ok(())
    }

    /// `country_Top_5.<rank>` for the first records in feed order.
    async fn write_leaderboard(&self, records: &[RawCountryRecord]) -> Result<()> {
        self.reconciler
            .ensure_folder(LEADERBOARD, ObjectKind::Device, "country Top 5")
            .await?;

        for (index, record) in records.iter().take(LEADERBOARD_SIZE).enumerate() {
            let rank = index + 1;
            let name = record.country.clone().unwrap_or_default();
            let channel = format!("{}.{}", LEADERBOARD, rank);
            self.reconciler
                .ensure_folder(
                    &channel,
                    ObjectKind::Channel,
                    &format!("Rank {} : {}", rank, name),
                )
                .await?;

            let mut properties = record.properties();
            properties.push(("country".to_string(), Some(StateValue::Text(name))));
            for (key, value) in properties {
                self.reconciler
                    .reconcile(&format!("{}.{}", channel, key), &key, value)
                    .await;
            }
        }

        for rank in records.len() + 1..=LEADERBOARD_SIZE {
            self.reconciler
                .prune(&format!("{}.{}", LEADERBOARD, rank))
                .await;
        }

        Ok(())
    }

    async fn write_continents(&self, aggregates: &Aggregates) -> Result<()> {
        if !self.config.countries.continents {
            self.reconciler.prune(CONTINENTS).await;
            return Ok(());
        }

        self.reconciler
            .ensure_folder(
                CONTINENTS,
                ObjectKind::Device,
                "Global totals for each continent",
            )
            .await?;

        for rollup in aggregates.all() {
            let channel = format!("{}.{}", CONTINENTS, rollup.name);
            self.reconciler
                .ensure_folder_exists(&channel, ObjectKind::Channel, &rollup.name)
                .await?;
            for (key, value) in rollup.leaves() {
                self.reconciler
                    .reconcile(&format!("{}.{}", channel, key), &key, value)
                    .await;
            }
        }

        Ok(())
    }
}
