//! Country resolution.
//!
//! A raw feed name plus optional ISO codes is mapped to a [`CanonicalCountry`]
//! by an ordered chain of lookup strategies; the first hit with a continent wins.

pub mod countries;
pub mod translator;

use crate::models::{CanonicalCountry, CountryInfo};
use countries::CountryEntry;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{debug, warn};

pub use translator::TranslationTable;

/// Feed entities that are not countries and are skipped without a warning.
const KNOWN_NON_COUNTRIES: [&str; 2] = ["Diamond Princess", "MS Zaandam"];

/// What a strategy gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct LookupKey<'a> {
    pub raw_name: &'a str,
    pub iso2: Option<&'a str>,
    pub iso3: Option<&'a str>,
}

impl<'a> LookupKey<'a> {
    pub fn new(raw_name: &'a str, info: &'a CountryInfo) -> Self {
        Self {
            raw_name,
            iso2: info.iso2.as_deref().filter(|s| !s.is_empty()),
            iso3: info.iso3.as_deref().filter(|s| !s.is_empty()),
        }
    }
}

/// One step of the resolution chain.
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn lookup(
        &self,
        key: &LookupKey<'_>,
        translations: &TranslationTable,
    ) -> Option<&'static CountryEntry>;
}

pub struct Iso3Lookup;

impl ResolveStrategy for Iso3Lookup {
    fn name(&self) -> &'static str {
        "iso3"
    }

    fn lookup(&self, key: &LookupKey<'_>, _: &TranslationTable) -> Option<&'static CountryEntry> {
        key.iso3.and_then(countries::find_by_iso3)
    }
}

pub struct Iso2Lookup;

impl ResolveStrategy for Iso2Lookup {
    fn name(&self) -> &'static str {
        "iso2"
    }

    fn lookup(&self, key: &LookupKey<'_>, _: &TranslationTable) -> Option<&'static CountryEntry> {
        key.iso2.and_then(countries::find_by_iso2)
    }
}

pub struct CleanedNameLookup;

impl CleanedNameLookup {
    fn clean(raw_name: &str) -> String {
        raw_name.replace('_', " ").replace('é', "e").replace('ç', "c")
    }
}

impl ResolveStrategy for CleanedNameLookup {
    fn name(&self) -> &'static str {
        "name"
    }

    fn lookup(&self, key: &LookupKey<'_>, _: &TranslationTable) -> Option<&'static CountryEntry> {
        countries::find_by_name(&Self::clean(key.raw_name))
    }
}

pub struct TranslatedNameLookup;

impl ResolveStrategy for TranslatedNameLookup {
    fn name(&self) -> &'static str {
        "translation"
    }

    fn lookup(
        &self,
        key: &LookupKey<'_>,
        translations: &TranslationTable,
    ) -> Option<&'static CountryEntry> {
        translations
            .get(key.raw_name)
            .and_then(countries::find_by_name)
    }
}

/// Resolves feed records against the static database.
pub struct CountryResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
    translations: TranslationTable,
    unresolved: Mutex<HashSet<String>>,
}

impl Default for CountryResolver {
    fn default() -> Self {
        Self::new(TranslationTable::bundled())
    }
}

impl CountryResolver {
    pub fn new(translations: TranslationTable) -> Self {
        Self {
            strategies: vec![
                Box::new(Iso3Lookup),
                Box::new(Iso2Lookup),
                Box::new(CleanedNameLookup),
                Box::new(TranslatedNameLookup),
            ],
            translations,
            unresolved: Mutex::new(HashSet::new()),
        }
    }

    pub fn translations_mut(&mut self) -> &mut TranslationTable {
        &mut self.translations
    }

    /// Resolve a feed name. `None` means NotFound.
    pub fn resolve(&self, raw_name: &str, info: &CountryInfo) -> Option<CanonicalCountry> {
        let key = LookupKey::new(raw_name, info);

        for strategy in &self.strategies {
            if let Some(entry) = strategy
                .lookup(&key, &self.translations)
                .filter(|e| !e.continent.is_empty())
            {
                debug!(
                    "Resolved {} via {} to {} ({})",
                    raw_name,
                    strategy.name(),
                    entry.name,
                    entry.continent
                );
                return Some(CanonicalCountry::new(
                    entry.name,
                    entry.continent,
                    Some(entry.iso3),
                ));
            }
        }

        if !KNOWN_NON_COUNTRIES.contains(&raw_name) {
            let first_time = self
                .unresolved
                .lock()
                .map(|mut seen| seen.insert(raw_name.to_string()))
                .unwrap_or(true);
            if first_time {
                warn!(
                    "{} (iso2: {}, iso3: {}) not found in country database! Must be added to the country name translator.",
                    raw_name,
                    key.iso2.unwrap_or("undefined"),
                    key.iso3.unwrap_or("undefined")
                );
            }
        }

        None
    }

    /// Names warned about during this run, sorted.
    pub fn unresolved(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .unresolved
            .lock()
            .map(|seen| seen.iter().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_capture::CapturedLogs;

    fn info(iso2: Option<&str>, iso3: Option<&str>) -> CountryInfo {
        CountryInfo {
            iso2: iso2.map(String::from),
            iso3: iso3.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_iso3_wins_over_name() {
        let resolver = CountryResolver::default();
        let country = resolver.resolve("USA", &info(Some("US"), Some("USA"))).unwrap();
        assert_eq!(country.display_name, "United States");
        assert_eq!(country.path_safe_name, "United_States");
        assert_eq!(country.continent, "North America");
        assert_eq!(country.iso_code.as_deref(), Some("USA"));
    }

    #[test]
    fn test_falls_through_unknown_iso3() {
        let resolver = CountryResolver::default();
        let country = resolver.resolve("Foo", &info(Some("FR"), Some("ZZZ"))).unwrap();
        assert_eq!(country.display_name, "France");
    }

    #[test]
    fn test_cleaned_name() {
        let resolver = CountryResolver::default();
        let country = resolver.resolve("New_Zealand", &info(None, None)).unwrap();
        assert_eq!(country.display_name, "New Zealand");

        let country = resolver.resolve("Curaçao", &info(None, None)).unwrap();
        assert_eq!(country.display_name, "Curacao");
    }

    #[test]
    fn test_translated_name() {
        let resolver = CountryResolver::default();
        let country = resolver.resolve("S. Korea", &info(None, None)).unwrap();
        assert_eq!(country.display_name, "South Korea");
        assert_eq!(country.continent, "Asia");
    }

    #[test]
    fn test_user_override_is_used() {
        let mut resolver = CountryResolver::default();
        assert!(resolver.resolve("Kosovo*", &info(None, None)).is_none());

        resolver
            .translations_mut()
            .merge_json(r#"{"Kosovo*": "Kosovo"}"#)
            .unwrap();
        let country = resolver.resolve("Kosovo*", &info(None, None)).unwrap();
        assert_eq!(country.display_name, "Kosovo");
    }

    #[test]
    fn test_known_non_countries_are_silent() {
        let resolver = CountryResolver::default();
        assert!(resolver.resolve("Diamond Princess", &info(None, None)).is_none());
        assert!(resolver.resolve("MS Zaandam", &info(None, None)).is_none());
        assert!(resolver.unresolved().is_empty());
    }

    #[test]
    fn test_unresolved_recorded_once() {
        let (logs, _guard) = CapturedLogs::install();
        let resolver = CountryResolver::default();
        assert!(resolver.resolve("Atlantis", &info(None, None)).is_none());
        assert!(resolver.resolve("Atlantis", &info(Some("ZZ"), None)).is_none());
        assert!(resolver.resolve("Lemuria", &info(None, None)).is_none());
        assert!(resolver.resolve("Atlantis", &info(None, None)).is_none());

        assert_eq!(resolver.unresolved(), vec!["Atlantis", "Lemuria"]);
        assert_eq!(logs.count("Atlantis (iso2:"), 1);
        assert_eq!(logs.count("Lemuria (iso2:"), 1);
        assert_eq!(logs.count("not found in country database"), 2);
    }
}
