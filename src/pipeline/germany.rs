//! German federal states, counties and cities.

use super::{RunContext, Runner};
use crate::analysis::{Bucket, RegionRecord};
use crate::error::FeedError;
use crate::feeds::{Feature, GermanVaccinations, PrefetchedFeeds};
use crate::models::{path_safe, StateValue};
use crate::store::ObjectKind;
use anyhow::Result;
use tracing::{debug, error, info, warn};

/// Vaccination leaves of earlier feed layouts, removed wherever they linger.
const LEGACY_VACCINATION_LEAVES: [&str; 14] = [
    "rkiImpfungenProTausend",
    "rkiDifferenzVortag",
    "rkiIndikationAlter",
    "rkiIndikationBeruf",
    "rkiIndikationMedizinisch",
    "rkiImpfungePflegeheim",
    "rkiErstimpfungenBioNTech",
    "rkiErstimpfungenModerna",
    "rkiErstimpfungenAstraZeneca",
    "rkiErstimpfungenDifferenzVortag",
    "rkiZweitimpfungenBioNTech",
    "rkiZweitimpfungenModerna",
    "rkiZweitimpfungenAstraZeneca",
    "rkiZweitimpfungenDifferenzVortag",
];

/// Leaf key for a federal-state feed attribute; `None` for ignored attributes.
pub(super) fn federal_state_leaf(attribute: &str) -> Option<&'static str> {
    match attribute {
        "Aktualisierung" => Some("updated"),
        "Death" => Some("deaths"),
        "Fallzahl" => Some("cases"),
        "faelle_100000_EW" => Some("cases_per_100k"),
        "cases7_bl_per_100k" => Some("cases7_per_100k"),
        _ => None,
    }
}

fn log_unavailable(branch: &str, err: &FeedError) {
    match err {
        FeedError::Malformed { .. } => {
            warn!("[{}] Incorrect data received, values not updated: {}", branch, err)
        }
        _ => warn!("[{}] Unable to contact API: {}", branch, err),
    }
}

impl Runner {
    pub(super) async fn load_federal_states(
        &self,
        ctx: &mut RunContext,
        prefetched: &PrefetchedFeeds,
    ) -> Result<()> {
        let collection = match self.feeds.federal_states().await {
            Ok(collection) => collection,
            Err(e) => {
                log_unavailable("germanyFederalStates", &e);
                return Ok(());
            }
        };

        let vaccinations = match self.feeds.german_vaccinations().await {
            Ok(vaccinations) => Some(vaccinations),
            Err(e) => {
                log_unavailable("germanyFederalStates", &e);
                None
            }
        };

        let selection = self.config.germany.federal_state_selection();

        for feature in &collection.features {
            let Some(name) = feature.attribute_str("LAN_ew_GEN") else {
                debug!("Federal state feature without name: {:?}", feature.attributes);
                continue;
            };
            ctx.federal_states.push(name.to_string());

            let channel = format!("Germany.Bundesland.{}", path_safe(name));
            for legacy in LEGACY_VACCINATION_LEAVES {
                self.reconciler
                    .prune(&format!("{}._Impfungen.{}", channel, legacy))
                    .await;
            }

            if selection.is_selected(name) {
                if let Err(e) = self
                    .write_federal_state(&channel, name, feature, vaccinations.as_ref(), prefetched)
                    .await
                {
                    warn!("Cannot write data for {}: {:#}", name, e);
                }
            } else {
                self.reconciler.prune(&channel).await;
            }
        }

        self.reconciler.prune("Germany._Impfungen").await;

        info!("Processed {} federal states", ctx.federal_states.len());
        Ok(())
    }

    async fn write_federal_state(
        &self,
        channel: &str,
        name: &str,
        feature: &Feature,
        vaccinations: Option<&GermanVaccinations>,
        prefetched: &PrefetchedFeeds,
    ) -> Result<()> {
        self.reconciler
            .ensure_folder(channel, ObjectKind::Channel, name)
            .await?;

        match prefetched.hospital.clone().await {
            Some(capacity) => match capacity.for_federal_state(name) {
                Some(figures) => self.write_hospital(channel, figures).await?,
                None => debug!("No hospital data for {}", name),
            },
            None => debug!("Hospital data unavailable, skipping {}", name),
        }

        if let Some(state) = vaccinations.and_then(|v| v.for_state(name)) {
            let vaccination_channel = format!("{}._Impfungen", channel);
            self.reconciler
                .ensure_folder(
                    &vaccination_channel,
                    ObjectKind::Channel,
                    "Impfungen data by RKI",
                )
                .await?;
            for (key, value) in state.leaves() {
                self.reconciler
                    .reconcile(&format!("{}.{}", vaccination_channel, key), key, Some(value))
                    .await;
            }
        }

        for (attribute, value) in &feature.attributes {
            match federal_state_leaf(attribute) {
                Some(key) => {
                    self.reconciler
                        .reconcile(
                            &format!("{}.{}", channel, key),
                            key,
                            StateValue::from_json(value),
                        )
                        .await
                }
                None => debug!("Data \"{}\" from API ignored having value: {}", attribute, value),
            }
        }

        Ok(())
    }

    pub(super) async fn load_counties(&self, ctx: &mut RunContext) -> Result<()> {
        let collection = match self.feeds.counties().await {
            Ok(collection) => collection,
            Err(e) => {
                log_unavailable("germanyCounties", &e);
                return Ok(());
            }
        };

        let counties = self.config.germany.county_selection();
        let cities = self.config.germany.city_selection();

        for feature in &collection.features {
            let Some(region) = RegionRecord::from_attributes(&feature.attributes) else {
                debug!("County feature without name: {:?}", feature.attributes);
                continue;
            };

            let bucket = match region.bucket() {
                Ok(bucket) => bucket,
                Err(e) => {
                    error!(
                        "{} received for {}: {}",
                        e,
                        region.raw_name,
                        serde_json::Value::Object(feature.attributes.clone())
                    );
                    continue;
                }
            };

            let selection = match bucket {
                Bucket::CountyLike => {
                    ctx.counties.push(region.path_safe_name.clone());
                    &counties
                }
                Bucket::CityLike => {
                    ctx.cities.push(region.path_safe_name.clone());
                    &cities
                }
            };

            debug!(
                "{} ({}) filed under {}",
                region.raw_name,
                region.county_id.as_deref().unwrap_or("no id"),
                bucket
            );
            let folder = format!("Germany.{}", bucket.folder());
            let channel = format!("{}.{}", folder, region.path_safe_name);

            if !selection.is_selected(&region.path_safe_name) {
                self.reconciler.prune(&channel).await;
                continue;
            }

            let folders = async {
                self.reconciler
                    .ensure_folder(&folder, ObjectKind::Channel, bucket.folder())
                    .await?;
                self.reconciler
                    .ensure_folder(&channel, ObjectKind::Channel, &region.path_safe_name)
                    .await
            };
            if let Err(e) = folders.await {
                warn!("Cannot write data for {}: {:#}", region.raw_name, e);
                continue;
            }

            for (key, value) in &region.metrics {
                self.reconciler
                    .reconcile(
                        &format!("{}.{}", channel, key),
                        key,
                        StateValue::from_json(value),
                    )
                    .await;
            }
        }

        info!(
            "Processed {} counties and {} cities",
            ctx.counties.len(),
            ctx.cities.len()
        );
        Ok(())
    }
}
