//! One synchronization run.
//!
//! A run walks the branches in a fixed order: global totals, countries with
//! leaderboard and continent rollups, German federal states, German counties
//! and cities. Every branch degrades on its own; a failure is funnelled
//! through [`report_error`] and the next branch still runs.

mod germany;
mod world;

use crate::config::Config;
use crate::error::{report_error, ErrorSink};
use crate::feeds::{Feeds, HospitalFigures, PrefetchedFeeds};
use crate::reconcile::Reconciler;
use crate::resolver::CountryResolver;
use crate::store::{ObjectKind, ObjectPatch, StateStore};
use anyhow::{Context, Result};
use rand::Rng;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Object holding user translation overrides (value) and the seen lists (native).
pub const TRANSLATOR_ID: &str = "countryTranslator";

const ALL_COUNTRIES: &str = "allCountrys";
const ALL_FEDERAL_STATES: &str = "allGermanyFederalStates";
const ALL_COUNTIES: &str = "allGermanyCounties";
const ALL_CITIES: &str = "allGermanyCities";

/// Which seen lists earlier runs already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadedLists {
    pub federal_states: bool,
    pub counties: bool,
    pub cities: bool,
}

impl LoadedLists {
    fn from_native(native: &Map<String, Value>) -> Self {
        let populated = |key: &str| {
            native
                .get(key)
                .and_then(Value::as_array)
                .is_some_and(|list| !list.is_empty())
        };
        Self {
            federal_states: populated(ALL_FEDERAL_STATES),
            counties: populated(ALL_COUNTIES),
            cities: populated(ALL_CITIES),
        }
    }
}

/// Run-scoped accumulator of everything seen in the feeds.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub loaded: LoadedLists,
    pub countries: Vec<String>,
    pub federal_states: Vec<String>,
    pub counties: Vec<String>,
    pub cities: Vec<String>,
}

impl RunContext {
    pub fn new(loaded: LoadedLists) -> Self {
        Self {
            loaded,
            ..Default::default()
        }
    }

    /// Seen lists for the side channel, sorted. Empty lists are left out so a
    /// branch that could not run keeps the previous run's list.
    fn seen_lists(&self) -> Map<String, Value> {
        let mut native = Map::new();
        for (key, list) in [
            (ALL_COUNTRIES, &self.countries),
            (ALL_FEDERAL_STATES, &self.federal_states),
            (ALL_COUNTIES, &self.counties),
            (ALL_CITIES, &self.cities),
        ] {
            if list.is_empty() {
                continue;
            }
            let mut sorted = list.clone();
            sorted.sort();
            sorted.dedup();
            native.insert(key.to_string(), Value::from(sorted));
        }
        native
    }
}

/// Outcome of a run, for the final report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub countries: usize,
    pub federal_states: usize,
    pub counties: usize,
    pub cities: usize,
    pub unresolved: Vec<String>,
    pub missing_attributes: Vec<String>,
    pub duration_seconds: f64,
}

/// Random delay below `max_seconds`, in milliseconds. Zero disables the delay.
fn startup_delay_millis(max_seconds: u64) -> u64 {
    match max_seconds.saturating_mul(1000) {
        0 => 0,
        bound => rand::thread_rng().gen_range(0..bound),
    }
}

/// Drives one run against a feed source and a store.
pub struct Runner {
    config: Config,
    feeds: Arc<dyn Feeds>,
    reconciler: Reconciler,
    resolver: CountryResolver,
}

impl Runner {
    pub fn new(config: Config, feeds: Arc<dyn Feeds>, store: Arc<dyn StateStore>) -> Self {
        let reconciler = Reconciler::new(store, config.general.delete_unused);
        Self {
            config,
            feeds,
            reconciler,
            resolver: CountryResolver::default(),
        }
    }

    /// Forward escaped errors to an external collector.
    #[allow(dead_code)] // No collector is wired into the binary yet
    pub fn with_sink(mut self, sink: Option<Arc<dyn ErrorSink>>) -> Self {
        self.reconciler = self.reconciler.with_sink(sink);
        self
    }

    fn report(&self, code_part: &str, err: &anyhow::Error) {
        report_error(self.reconciler.sink(), code_part, err);
    }

    /// Execute every branch once and flush the store.
    ///
    /// Only a failing flush is returned as an error.
    pub async fn run(mut self) -> Result<RunSummary> {
        let start_time = Instant::now();

        self.startup_delay().await;

        let loaded = match self.load_context().await {
            Ok(loaded) => loaded,
            Err(e) => {
                self.report("loadContext", &e);
                LoadedLists::default()
            }
        };
        let mut ctx = RunContext::new(loaded);
        debug!("Lists stored by earlier runs: {:?}", ctx.loaded);

        let prefetched = PrefetchedFeeds::start(self.feeds.clone());

        if let Err(e) = self.load_global_totals().await {
            self.report("loadAll", &e);
        }

        if let Err(e) = self.load_countries(&mut ctx, &prefetched).await {
            self.report("loadCountries", &e);
        }

        let germany = &self.config.germany;
        if germany.federal_states || !ctx.loaded.federal_states {
            let result = async {
                self.reconciler
                    .ensure_folder("Germany.Bundesland", ObjectKind::Channel, "Bundesland")
                    .await?;
                self.load_federal_states(&mut ctx, &prefetched).await
            }
            .await;
            if let Err(e) = result {
                self.report("germanyFederalStates", &e);
            }
        } else {
            self.reconciler.prune("Germany.Bundesland").await;
        }

        if germany.cities || germany.counties || !ctx.loaded.cities || !ctx.loaded.counties {
            if let Err(e) = self.load_counties(&mut ctx).await {
                self.report("germanyCounties", &e);
            }
        }
        if !germany.cities {
            self.reconciler.prune("Germany.Stadt").await;
        }
        if !germany.counties {
            self.reconciler.prune("Germany.Kreis").await;
        }

        if let Err(e) = self.write_seen_lists(&ctx).await {
            self.report("countryTranslator", &e);
        }

        self.reconciler
            .store()
            .flush()
            .await
            .context("Failed to save state tree")?;

        let summary = RunSummary {
            countries: ctx.countries.len(),
            federal_states: ctx.federal_states.len(),
            counties: ctx.counties.len(),
            cities: ctx.cities.len(),
            unresolved: self.resolver.unresolved(),
            missing_attributes: self.reconciler.missing_attributes(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        };
        info!(
            "Run finished in {:.1}s: {} countries, {} federal states, {} counties, {} cities",
            summary.duration_seconds,
            summary.countries,
            summary.federal_states,
            summary.counties,
            summary.cities
        );
        Ok(summary)
    }

    /// Random pause so many installations do not hit the upstreams at once.
    async fn startup_delay(&self) {
        let max_seconds = self.config.general.startup_delay_seconds;
        if max_seconds == 0 {
            return;
        }

        let millis = startup_delay_millis(max_seconds);
        info!(
            "Waiting {:.1}s before contacting upstream services",
            millis as f64 / 1000.0
        );
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    /// Read the side channel and merge user translation overrides.
    async fn load_context(&mut self) -> Result<LoadedLists> {
        let store = self.reconciler.store().clone();

        let loaded = store
            .get_object(TRANSLATOR_ID)
            .await?
            .map(|object| LoadedLists::from_native(&object.native))
            .unwrap_or_default();

        if let Some(state) = store.get_state(TRANSLATOR_ID).await? {
            if let Some(json) = state.val.as_text().filter(|s| !s.trim().is_empty()) {
                let translations = self.resolver.translations_mut();
                match translations.merge_json(json) {
                    Ok(added) => debug!(
                        "{} user translations merged, {} known in total",
                        added,
                        translations.len()
                    ),
                    Err(e) => error!(
                        "Can not parse json string for user defined country translation! Check the value of '{}': {}",
                        TRANSLATOR_ID, e
                    ),
                }
            }
        }

        Ok(loaded)
    }

    async fn write_seen_lists(&self, ctx: &RunContext) -> Result<()> {
        let native = ctx.seen_lists();
        if native.is_empty() {
            return Ok(());
        }

        self.reconciler
            .store()
            .extend_object(TRANSLATOR_ID, ObjectPatch::native(native))
            .await
            .context("Failed to store seen lists")
    }

    /// Hospital channel and leaves below `id`.
    async fn write_hospital(&self, id: &str, figures: &HospitalFigures) -> Result<()> {
        let channel = format!("{}.Hospital", id);
        self.reconciler
            .ensure_folder(&channel, ObjectKind::Channel, "Hospital")
            .await?;
        for (key, value) in figures.leaves() {
            self.reconciler
                .reconcile(&format!("{}.{}", channel, key), key, value)
                .await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::feeds::hospital::HospitalReport;
    use crate::feeds::vaccination::CountryVaccinationSeries;
    use crate::feeds::{FeatureCollection, GermanVaccinations, HospitalCapacity, VaccinationTable};
    use crate::log_capture::CapturedLogs;
    use crate::models::{RawCountryRecord, StateValue};
    use crate::store::{JsonStore, State, StateObject};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeFeeds {
        global: Option<Map<String, Value>>,
        countries: Option<Vec<RawCountryRecord>>,
        federal_states: Option<FeatureCollection>,
        counties: Option<FeatureCollection>,
        german_vaccinations: Option<GermanVaccinations>,
        vaccinations: Option<VaccinationTable>,
        hospital: Option<HospitalCapacity>,
        federal_state_calls: AtomicUsize,
        county_calls: AtomicUsize,
    }

    fn canned<T: Clone>(data: &Option<T>) -> Result<T, FeedError> {
        data.clone().ok_or_else(|| FeedError::Connect {
            url: "http://upstream.invalid".to_string(),
        })
    }

    #[async_trait]
    impl Feeds for FakeFeeds {
        async fn global_totals(&self) -> Result<Map<String, Value>, FeedError> {
            canned(&self.global)
        }
        async fn countries(&self) -> Result<Vec<RawCountryRecord>, FeedError> {
            canned(&self.countries)
        }
        async fn federal_states(&self) -> Result<FeatureCollection, FeedError> {
            self.federal_state_calls.fetch_add(1, Ordering::SeqCst);
            canned(&self.federal_states)
        }
        async fn counties(&self) -> Result<FeatureCollection, FeedError> {
            self.county_calls.fetch_add(1, Ordering::SeqCst);
            canned(&self.counties)
        }
        async fn german_vaccinations(&self) -> Result<GermanVaccinations, FeedError> {
            canned(&self.german_vaccinations)
        }
        async fn vaccinations(&self) -> Result<VaccinationTable, FeedError> {
            canned(&self.vaccinations)
        }
        async fn hospital_capacity(&self) -> Result<HospitalCapacity, FeedError> {
            canned(&self.hospital)
        }
    }

    fn full_feeds() -> FakeFeeds {
        let global = json!({"cases": 1400, "deaths": 50, "updated": 30});
        let countries = json!([
            {"country": "USA", "countryInfo": {"iso2": "US", "iso3": "USA", "flag": "https://flags/us.png"},
             "continent": "North America", "updated": 30, "cases": 1000, "deaths": 10,
             "casesPerOneMillion": 100, "deathsPerOneMillion": 1},
            {"country": "France", "countryInfo": {"iso2": "FR", "iso3": "FRA", "flag": "https://flags/fr.png"},
             "continent": "Europe", "updated": 20, "cases": 300, "deaths": 30,
             "casesPerOneMillion": 150, "deathsPerOneMillion": 15},
            {"country": "Germany", "countryInfo": {"iso2": "DE", "iso3": "DEU", "flag": "https://flags/de.png"},
             "continent": "Europe", "updated": 10, "cases": 100, "deaths": 10,
             "casesPerOneMillion": 50, "deathsPerOneMillion": 5},
            {"country": "Foo Land", "countryInfo": {"iso2": null, "iso3": null},
             "continent": "Europe", "updated": 5, "cases": 0, "casesPerOneMillion": 0},
            {"country": "MS Zaandam", "countryInfo": {"iso2": null, "iso3": null},
             "continent": "", "cases": 9, "casesPerOneMillion": 0}
        ]);
        let federal_states = json!({"features": [
            {"attributes": {"OBJECTID": 1, "LAN_ew_GEN": "Berlin", "Fallzahl": 10, "Death": 1,
                            "Aktualisierung": 1620000000000i64, "faelle_100000_EW": 2.5,
                            "cases7_bl_per_100k": 1.25}},
            {"attributes": {"OBJECTID": 2, "LAN_ew_GEN": "Baden-Württemberg", "Fallzahl": 20}}
        ]});
        let counties = json!({"features": [
            {"attributes": {"OBJECTID": 1, "GEN": "Heidelberg", "BEZ": "Stadtkreis",
                            "county": "SK Heidelberg", "cases": 5, "cases7_per_100k": 3.5}},
            {"attributes": {"OBJECTID": 2, "GEN": "Rhein-Neckar-Kreis", "BEZ": "Landkreis",
                            "county": "LK Rhein-Neckar-Kreis", "cases": 7}},
            {"attributes": {"OBJECTID": 3, "GEN": "Nowhere", "BEZ": "Gemeinde", "cases": 1}}
        ]});
        let german_vaccinations = json!({"data": {"states": {
            "BE": {"name": "Berlin", "administeredVaccinations": 1000, "vaccinated": 600,
                   "quote": 0.123456, "secondVaccination": {"vaccinated": 400, "quote": 0.1}}
        }}});
        let vaccinations = json!([
            {"country": "Germany", "iso_code": "DEU", "data": [
                {"date": "2021-05-01", "total_vaccinations": 200},
                {"date": "2021-05-02", "total_vaccinations": 300}
            ]}
        ]);
        let hospital = json!({
            "data": [{"bundesland": "BERLIN", "intensivBettenFrei": 50}],
            "overallSum": {"intensivBettenFrei": 4000}
        });

        FakeFeeds {
            global: serde_json::from_value(global).ok(),
            countries: serde_json::from_value(countries).ok(),
            federal_states: FeatureCollection::from_value("federal states", federal_states).ok(),
            counties: FeatureCollection::from_value("counties", counties).ok(),
            german_vaccinations: serde_json::from_value(german_vaccinations).ok(),
            vaccinations: serde_json::from_value::<Vec<CountryVaccinationSeries>>(vaccinations)
                .ok()
                .map(VaccinationTable::from_series),
            hospital: serde_json::from_value::<HospitalReport>(hospital)
                .ok()
                .map(HospitalCapacity::from_report),
            ..Default::default()
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.general.startup_delay_seconds = 0;
        config.general.delete_unused = true;
        config.countries.continents = true;
        config.germany.federal_states = true;
        config.germany.all_federal_states = true;
        config.germany.counties = true;
        config.germany.cities = true;
        config.germany.all_cities = true;
        config
    }

    async fn run(config: Config, feeds: FakeFeeds, store: Arc<JsonStore>) -> RunSummary {
        Runner::new(config, Arc::new(feeds), store)
            .run()
            .await
            .unwrap()
    }

    async fn value(store: &JsonStore, id: &str) -> Option<StateValue> {
        store.get_state(id).await.unwrap().map(|state| state.val)
    }

    async fn exists(store: &JsonStore, id: &str) -> bool {
        store.get_object(id).await.unwrap().is_some()
    }

    #[tokio::test]
    async fn test_full_run() {
        let store = Arc::new(JsonStore::in_memory());
        // Left over from an earlier selection.
        store
            .set_state("France.cases", State { val: 1.0.into(), ack: true })
            .await
            .unwrap();
        store
            .set_object_not_exists("France", StateObject::folder(ObjectKind::Device, "France"))
            .await
            .unwrap();

        let summary = run(test_config(), full_feeds(), store.clone()).await;

        // Global totals
        assert_eq!(value(&store, "global_totals.cases").await, Some(StateValue::from(1400.0)));

        // Selected country with vaccination and hospital data
        assert_eq!(value(&store, "Germany.cases").await, Some(StateValue::from(100.0)));
        assert_eq!(
            value(&store, "Germany.flag").await,
            Some("https://flags/de.png".into())
        );
        assert_eq!(value(&store, "Germany.continent").await, Some(StateValue::from("Europe")));
        assert_eq!(
            value(&store, "Germany.Vaccination.totalDoses").await,
            Some(300.0.into())
        );
        assert_eq!(
            value(&store, "Germany.Hospital.freeBeds").await,
            Some(4000.0.into())
        );
        assert!(!exists(&store, "Germany.countryInfo").await);
        assert!(!exists(&store, "Germany.country").await);

        // Unselected countries are pruned
        assert!(!exists(&store, "France").await);
        assert!(value(&store, "France.cases").await.is_none());
        assert!(!exists(&store, "United_States").await);

        // Leaderboard in feed order
        let first = store.get_object("country_Top_5.1").await.unwrap().unwrap();
        assert_eq!(first.common.name, "Rank 1 : USA");
        assert_eq!(value(&store, "country_Top_5.1.country").await, Some(StateValue::from("USA")));
        assert_eq!(
            value(&store, "country_Top_5.5.country").await,
            Some("MS Zaandam".into())
        );

        // Continents
        assert_eq!(
            value(&store, "global_continents.Europe.cases").await,
            Some(400.0.into())
        );
        assert_eq!(
            value(&store, "global_continents.Europe.casesPerOneMillion").await,
            Some(100.0.into())
        );
        assert_eq!(
            value(&store, "global_continents.Europe.countries").await,
            Some("France,Germany,Foo Land".into())
        );
        assert_eq!(
            value(&store, "global_continents.America.cases").await,
            Some(1000.0.into())
        );
        assert_eq!(
            value(&store, "global_continents.World_Sum.updated").await,
            Some(30.0.into())
        );
        assert!(exists(&store, "global_continents.North_America").await);
        assert!(!exists(&store, "global_continents.Europe.inhabitants").await);

        // Federal states
        assert_eq!(
            value(&store, "Germany.Bundesland.Berlin.cases").await,
            Some(10.0.into())
        );
        assert_eq!(
            value(&store, "Germany.Bundesland.Berlin.cases7_per_100k").await,
            Some(1.25.into())
        );
        assert!(!exists(&store, "Germany.Bundesland.Berlin.OBJECTID").await);
        assert_eq!(
            value(&store, "Germany.Bundesland.Berlin._Impfungen.rkiErstimpfungenImpfquote").await,
            Some(12.35.into())
        );
        assert_eq!(
            value(&store, "Germany.Bundesland.Berlin.Hospital.freeBeds").await,
            Some(50.0.into())
        );
        assert!(exists(&store, "Germany.Bundesland.Baden-Württemberg.cases").await);
        assert!(!exists(&store, "Germany.Bundesland.Baden-Württemberg.Hospital").await);
        assert!(!exists(&store, "Germany.Bundesland.Baden-Württemberg._Impfungen").await);

        // Counties and cities
        assert_eq!(
            value(&store, "Germany.Stadt.Heidelberg.cases").await,
            Some(5.0.into())
        );
        assert!(!exists(&store, "Germany.Stadt.Heidelberg.GEN").await);
        assert!(!exists(&store, "Germany.Stadt.Heidelberg.county").await);
        assert!(!exists(&store, "Germany.Kreis.Rhein-Neckar-Kreis").await);
        assert!(!exists(&store, "Germany.Kreis.Nowhere").await);
        assert!(!exists(&store, "Germany.Stadt.Nowhere").await);

        // Seen lists
        let translator = store.get_object(TRANSLATOR_ID).await.unwrap().unwrap();
        assert_eq!(
            translator.native[ALL_COUNTRIES],
            json!(["Foo Land", "France", "Germany", "MS Zaandam", "United States"])
        );
        assert_eq!(
            translator.native[ALL_FEDERAL_STATES],
            json!(["Baden-Württemberg", "Berlin"])
        );
        assert_eq!(translator.native[ALL_COUNTIES], json!(["Rhein-Neckar-Kreis"]));
        assert_eq!(translator.native[ALL_CITIES], json!(["Heidelberg"]));

        assert_eq!(summary.countries, 5);
        assert_eq!(summary.unresolved, vec!["Foo Land"]);
        assert!(summary.missing_attributes.is_empty());
    }

    #[tokio::test]
    async fn test_second_run_is_stable() {
        let store = Arc::new(JsonStore::in_memory());
        run(test_config(), full_feeds(), store.clone()).await;
        let ids = store.object_ids().await;
        let cases = value(&store, "global_continents.World_Sum.cases").await;

        run(test_config(), full_feeds(), store.clone()).await;
        assert_eq!(store.object_ids().await, ids);
        assert_eq!(value(&store, "global_continents.World_Sum.cases").await, cases);
    }

    #[tokio::test]
    async fn test_unreachable_upstreams_complete_normally() {
        let store = Arc::new(JsonStore::in_memory());
        let summary = run(test_config(), FakeFeeds::default(), store.clone()).await;

        assert_eq!(summary.countries, 0);
        assert!(!exists(&store, "global_totals").await);
        assert!(!exists(&store, "country_Top_5").await);
        assert!(!exists(&store, TRANSLATOR_ID).await);
        // The federal-state list was never populated, so the branch was attempted.
        assert!(exists(&store, "Germany.Bundesland").await);
    }

    #[tokio::test]
    async fn test_branches_degrade_independently() {
        let store = Arc::new(JsonStore::in_memory());
        let feeds = FakeFeeds {
            countries: None,
            hospital: None,
            german_vaccinations: None,
            ..full_feeds()
        };
        run(test_config(), feeds, store.clone()).await;

        assert!(!exists(&store, "Germany.cases").await);
        assert_eq!(value(&store, "global_totals.cases").await, Some(StateValue::from(1400.0)));
        assert_eq!(
            value(&store, "Germany.Bundesland.Berlin.cases").await,
            Some(10.0.into())
        );
        assert!(!exists(&store, "Germany.Bundesland.Berlin.Hospital").await);
        assert!(!exists(&store, "Germany.Bundesland.Berlin._Impfungen").await);
        assert!(exists(&store, "Germany.Stadt.Heidelberg.cases").await);

        let translator = store.get_object(TRANSLATOR_ID).await.unwrap().unwrap();
        assert!(!translator.native.contains_key(ALL_COUNTRIES));
        assert!(translator.native.contains_key(ALL_CITIES));
    }

    #[tokio::test]
    async fn test_loaded_lists_skip_disabled_branches() {
        let store = Arc::new(JsonStore::in_memory());
        let mut native = Map::new();
        native.insert(ALL_FEDERAL_STATES.to_string(), json!(["Berlin"]));
        native.insert(ALL_COUNTIES.to_string(), json!(["Rhein-Neckar-Kreis"]));
        native.insert(ALL_CITIES.to_string(), json!(["Heidelberg"]));
        store
            .extend_object(TRANSLATOR_ID, ObjectPatch::native(native))
            .await
            .unwrap();
        for folder in [
            "Germany.Bundesland",
            "Germany.Kreis",
            "Germany.Stadt",
            "global_continents",
        ] {
            store
                .extend_object(folder, ObjectPatch::folder(ObjectKind::Channel, folder))
                .await
                .unwrap();
            store
                .set_state(
                    &format!("{}.Sample.cases", folder),
                    State { val: 1.0.into(), ack: true },
                )
                .await
                .unwrap();
        }

        let mut config = test_config();
        config.countries.continents = false;
        config.germany.federal_states = false;
        config.germany.counties = false;
        config.germany.cities = false;

        let feeds = Arc::new(full_feeds());
        Runner::new(config, feeds.clone(), store.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(feeds.federal_state_calls.load(Ordering::SeqCst), 0);
        assert_eq!(feeds.county_calls.load(Ordering::SeqCst), 0);
        assert!(!exists(&store, "Germany.Bundesland").await);
        assert!(!exists(&store, "Germany.Kreis").await);
        assert!(!exists(&store, "Germany.Stadt").await);
        assert!(!exists(&store, "global_continents").await);
        assert!(value(&store, "global_continents.Sample.cases").await.is_none());
        assert!(value(&store, "Germany.Kreis.Sample.cases").await.is_none());

        // Lists of skipped branches survive the write-back.
        let translator = store.get_object(TRANSLATOR_ID).await.unwrap().unwrap();
        assert_eq!(translator.native[ALL_FEDERAL_STATES], json!(["Berlin"]));
        assert!(translator.native.contains_key(ALL_COUNTRIES));
    }

    #[tokio::test]
    async fn test_user_translation_overrides() {
        let store = Arc::new(JsonStore::in_memory());
        store
            .set_state(
                TRANSLATOR_ID,
                State {
                    val: r#"{"Foo Land": "Italy"}"#.into(),
                    ack: false,
                },
            )
            .await
            .unwrap();

        let mut config = test_config();
        config.countries.selected = vec!["Italy".to_string()];
        let summary = run(config, full_feeds(), store.clone()).await;

        assert!(summary.unresolved.is_empty());
        assert_eq!(value(&store, "Italy.cases").await, Some(StateValue::from(0.0)));
        assert!(!exists(&store, "Germany.cases").await);
    }

    #[tokio::test]
    async fn test_broken_user_translation_is_ignored() {
        let store = Arc::new(JsonStore::in_memory());
        store
            .set_state(
                TRANSLATOR_ID,
                State {
                    val: "{not json".into(),
                    ack: false,
                },
            )
            .await
            .unwrap();

        let summary = run(test_config(), full_feeds(), store.clone()).await;
        assert_eq!(summary.unresolved, vec!["Foo Land"]);
        assert_eq!(value(&store, "Germany.cases").await, Some(StateValue::from(100.0)));
    }

    #[tokio::test]
    async fn test_shorter_leaderboard_drops_stale_ranks() {
        let store = Arc::new(JsonStore::in_memory());
        run(test_config(), full_feeds(), store.clone()).await;
        assert!(exists(&store, "country_Top_5.5").await);

        let mut feeds = full_feeds();
        if let Some(countries) = feeds.countries.as_mut() {
            countries.truncate(2);
        }
        run(test_config(), feeds, store.clone()).await;

        assert!(exists(&store, "country_Top_5.2").await);
        assert_eq!(value(&store, "country_Top_5.2.country").await, Some(StateValue::from("France")));
        for rank in 3..=5 {
            assert!(!exists(&store, &format!("country_Top_5.{}", rank)).await);
            assert_eq!(value(&store, &format!("country_Top_5.{}.cases", rank)).await, None);
        }
    }

    #[tokio::test]
    async fn test_unknown_region_type_logs_source_record() {
        let (logs, _guard) = CapturedLogs::install();
        let store = Arc::new(JsonStore::in_memory());
        run(test_config(), full_feeds(), store.clone()).await;

        let lines: Vec<String> = logs
            .contents()
            .lines()
            .filter(|line| line.contains("Unknown administrative type: Gemeinde"))
            .map(String::from)
            .collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(r#""GEN":"Nowhere""#));
        assert!(lines[0].contains(r#""OBJECTID":3"#));
        assert!(!exists(&store, "Germany.Kreis.Nowhere").await);
        assert!(!exists(&store, "Germany.Stadt.Nowhere").await);
    }

    #[test]
    fn test_startup_delay_stays_below_bound() {
        assert_eq!(startup_delay_millis(0), 0);
        assert!(startup_delay_millis(2) < 2000);
        // Saturates instead of overflowing.
        assert!(startup_delay_millis(u64::MAX) < u64::MAX);
    }

    #[test]
    fn test_loaded_lists_from_native() {
        let native = json!({
            "allGermanyFederalStates": ["Berlin"],
            "allGermanyCounties": [],
            "allCountrys": ["Germany"]
        });
        let loaded = LoadedLists::from_native(native.as_object().unwrap());
        assert!(loaded.federal_states);
        assert!(!loaded.counties);
        assert!(!loaded.cities);
    }
}
