//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.covidsync.toml` files.

use crate::analysis::Selection;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".covidsync.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Country selection.
    #[serde(default)]
    pub countries: CountriesConfig,

    /// German federal states, counties and cities.
    #[serde(default)]
    pub germany: GermanyConfig,

    /// Upstream feed URLs.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Delete tree entries that are no longer selected.
    #[serde(default)]
    pub delete_unused: bool,

    /// Path of the persisted state tree.
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Upper bound of the random delay before the first request. 0 disables it.
    #[serde(default = "default_startup_delay")]
    pub startup_delay_seconds: u64,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            delete_unused: false,
            store_path: default_store_path(),
            startup_delay_seconds: default_startup_delay(),
            request_timeout_seconds: default_timeout(),
        }
    }
}

fn default_store_path() -> String {
    "covidsync-state.json".to_string()
}

fn default_startup_delay() -> u64 {
    30
}

fn default_timeout() -> u64 {
    30
}

/// Which countries are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountriesConfig {
    /// Write every country of the feed.
    #[serde(default)]
    pub load_all: bool,

    /// Canonical display names of the countries to write.
    #[serde(default = "default_countries")]
    pub selected: Vec<String>,

    /// Write continent, combined-Americas and world rollups.
    #[serde(default)]
    pub continents: bool,
}

impl Default for CountriesConfig {
    fn default() -> Self {
        Self {
            load_all: false,
            selected: default_countries(),
            continents: false,
        }
    }
}

fn default_countries() -> Vec<String> {
    vec!["Germany".to_string()]
}

impl CountriesConfig {
    pub fn selection(&self) -> Selection {
        Selection::new(self.load_all, &self.selected)
    }
}

/// German sub-national data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GermanyConfig {
    #[serde(default)]
    pub federal_states: bool,
    #[serde(default)]
    pub counties: bool,
    #[serde(default)]
    pub cities: bool,

    #[serde(default)]
    pub all_federal_states: bool,
    #[serde(default)]
    pub all_counties: bool,
    #[serde(default)]
    pub all_cities: bool,

    /// Federal-state names as reported by the feed.
    #[serde(default)]
    pub selected_federal_states: Vec<String>,
    /// Path-safe county names.
    #[serde(default)]
    pub selected_counties: Vec<String>,
    /// Path-safe city names.
    #[serde(default)]
    pub selected_cities: Vec<String>,
}

impl GermanyConfig {
    pub fn federal_state_selection(&self) -> Selection {
        Selection::new(self.all_federal_states, &self.selected_federal_states)
    }

    pub fn county_selection(&self) -> Selection {
        Selection::new(self.all_counties, &self.selected_counties)
    }

    pub fn city_selection(&self) -> Selection {
        Selection::new(self.all_cities, &self.selected_cities)
    }
}

/// Upstream feed URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_global_totals_url")]
    pub global_totals: String,
    #[serde(default = "default_countries_url")]
    pub countries: String,
    #[serde(default = "default_federal_states_url")]
    pub federal_states: String,
    #[serde(default = "default_counties_url")]
    pub counties: String,
    #[serde(default = "default_german_vaccinations_url")]
    pub german_vaccinations: String,
    #[serde(default = "default_vaccinations_url")]
    pub vaccinations: String,
    #[serde(default = "default_hospital_capacity_url")]
    pub hospital_capacity: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            global_totals: default_global_totals_url(),
            countries: default_countries_url(),
            federal_states: default_federal_states_url(),
            counties: default_counties_url(),
            german_vaccinations: default_german_vaccinations_url(),
            vaccinations: default_vaccinations_url(),
            hospital_capacity: default_hospital_capacity_url(),
        }
    }
}

fn default_global_totals_url() -> String {
    "https://disease.sh/v3/covid-19/all".to_string()
}

fn default_countries_url() -> String {
    "https://disease.sh/v3/covid-19/countries?sort=cases".to_string()
}

fn default_federal_states_url() -> String {
    "https://services7.arcgis.com/mOBPykOjAyBO2ZKk/arcgis/rest/services/Coronaf%C3%A4lle_in_den_Bundesl%C3%A4ndern/FeatureServer/0/query?where=1%3D1&outFields=*&returnGeometry=false&outSR=4326&f=json".to_string()
}

fn default_counties_url() -> String {
    "https://services7.arcgis.com/mOBPykOjAyBO2ZKk/arcgis/rest/services/RKI_Landkreisdaten/FeatureServer/0/query?where=1%3D1&outFields=OBJECTID,GEN,BEZ,death_rate,cases,deaths,cases_per_100k,cases7_per_100k,cases_per_population,BL,county,last_update&returnGeometry=false&outSR=4326&f=json".to_string()
}

fn default_german_vaccinations_url() -> String {
    "https://api.corona-zahlen.org/vaccinations".to_string()
}

fn default_vaccinations_url() -> String {
    "https://covid.ourworldindata.org/data/vaccinations/vaccinations.json".to_string()
}

fn default_hospital_capacity_url() -> String {
    "https://www.intensivregister.de/api/public/reporting/laendertabelle".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref store) = args.store {
            self.general.store_path = store.display().to_string();
        }

        // Flags always override
        if args.delete_unused {
            self.general.delete_unused = true;
        }
        if args.no_delay {
            self.general.startup_delay_seconds = 0;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
