//! Continent, combined-Americas and world rollups.
//!
//! Aggregates are recomputed from scratch every run from the resolved
//! country records. Summed fields do not depend on input order.

use crate::models::{CanonicalCountry, RawCountryRecord, StateValue};
use crate::transform::round_half_up;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

/// Name of the synthetic North + South America rollup.
pub const COMBINED_AMERICAS: &str = "America";
/// Name of the rollup over every continent.
pub const WORLD_SUM: &str = "World_Sum";

static AMERICAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(north|south)[ _]america$").unwrap());

/// Whether a continent contributes to the combined-Americas rollup.
pub fn is_americas(continent: &str) -> bool {
    AMERICAS.is_match(continent.trim())
}

/// Rollup of one group of countries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContinentAggregate {
    pub name: String,
    /// The feed's own continent label; unset for the synthetic rollups.
    pub continent: Option<String>,
    pub countries: Vec<String>,
    /// Population-equivalent weight, `cases / casesPerOneMillion` summed.
    pub inhabitants_weight: f64,
    pub totals: BTreeMap<String, f64>,
    pub updated: Option<i64>,
    #[serde(skip)]
    contributions: BTreeMap<String, Vec<f64>>,
    #[serde(skip)]
    weights: Vec<f64>,
}

/// Sum in ascending value order so the result does not depend on feed order.
fn ordered_sum(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.into_iter().sum()
}

impl ContinentAggregate {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn add(&mut self, country: &str, record: &RawCountryRecord, weight: Option<f64>) {
        self.countries.push(country.to_string());
        if let Some(weight) = weight {
            self.weights.push(weight);
        }
        for (key, value) in record.metrics() {
            self.contributions
                .entry(key.to_string())
                .or_default()
                .push(value);
        }
        if let Some(updated) = record.updated {
            self.updated = Some(self.updated.map_or(updated, |current| current.max(updated)));
        }
    }

    /// Recompute `totals` and `inhabitants_weight` from the collected contributions.
    fn settle(&mut self) {
        self.inhabitants_weight = ordered_sum(&self.weights);
        self.totals = self
            .contributions
            .iter()
            .map(|(key, values)| (key.clone(), ordered_sum(values)))
            .collect();
    }

    pub fn total(&self, key: &str) -> f64 {
        self.totals.get(key).copied().unwrap_or(0.0)
    }

    fn per_weight(&self, key: &str) -> Option<f64> {
        (self.inhabitants_weight > 0.0)
            .then(|| round_half_up(self.total(key) / self.inhabitants_weight, 2))
    }

    /// Cases per million inhabitants, recomputed from the totals.
    pub fn cases_per_million(&self) -> Option<f64> {
        self.per_weight("cases")
    }

    /// Deaths per million inhabitants, recomputed from the totals.
    pub fn deaths_per_million(&self) -> Option<f64> {
        self.per_weight("deaths")
    }

    pub fn countries_joined(&self) -> String {
        self.countries.join(",")
    }

    /// Leaf values persisted for this rollup. The weight itself is never written.
    pub fn leaves(&self) -> Vec<(String, Option<StateValue>)> {
        let mut leaves: Vec<(String, Option<StateValue>)> = self
            .totals
            .iter()
            .filter(|(key, _)| {
                !matches!(key.as_str(), "casesPerOneMillion" | "deathsPerOneMillion")
            })
            .map(|(key, value)| (key.clone(), Some(StateValue::Number(*value))))
            .collect();

        leaves.push((
            "casesPerOneMillion".to_string(),
            self.cases_per_million().map(StateValue::Number),
        ));
        leaves.push((
            "deathsPerOneMillion".to_string(),
            self.deaths_per_million().map(StateValue::Number),
        ));
        leaves.push((
            "countries".to_string(),
            Some(StateValue::Text(self.countries_joined())),
        ));
        if let Some(updated) = self.updated {
            leaves.push(("updated".to_string(), Some(updated.into())));
        }
        if let Some(continent) = &self.continent {
            leaves.push(("continent".to_string(), Some(continent.clone().into())));
        }

        leaves
    }
}

/// Result of folding all country records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    /// Keyed by path-safe continent name.
    pub continents: BTreeMap<String, ContinentAggregate>,
    pub combined_americas: Option<ContinentAggregate>,
    pub world: Option<ContinentAggregate>,
}

impl Aggregates {
    /// Every rollup, continents first.
    pub fn all(&self) -> impl Iterator<Item = &ContinentAggregate> {
        self.continents
            .values()
            .chain(self.combined_americas.iter())
            .chain(self.world.iter())
    }

    #[cfg(test)]
    pub fn continent(&self, name: &str) -> Option<&ContinentAggregate> {
        self.continents.get(name)
    }
}

/// Fold resolved records into continent, combined-Americas and world rollups.
///
/// Records without a continent are left out.
pub fn aggregate<'a, I>(records: I) -> Aggregates
where
    I: IntoIterator<Item = (&'a CanonicalCountry, &'a RawCountryRecord)>,
{
    let mut result = Aggregates::default();

    for (country, record) in records {
        if !country.has_continent() {
            debug!("{} has no continent, not aggregated", country.display_name);
            continue;
        }

        let key = crate::models::path_safe(&country.continent);
        let weight = match record.number("casesPerOneMillion") {
            Some(per_million) if per_million != 0.0 => Some(record.cases() / per_million),
            _ => None,
        };

        let continent = result
            .continents
            .entry(key.clone())
            .or_insert_with(|| ContinentAggregate::new(&key));
        if continent.continent.is_none() {
            continent.continent = Some(
                record
                    .feed_continent()
                    .unwrap_or(country.continent.as_str())
                    .to_string(),
            );
        }
        continent.add(&country.display_name, record, weight);

        let americas = result
            .combined_americas
            .get_or_insert_with(|| ContinentAggregate::new(COMBINED_AMERICAS));
        if is_americas(&country.continent) {
            americas.add(&country.display_name, record, weight);
        }

        result
            .world
            .get_or_insert_with(|| ContinentAggregate::new(WORLD_SUM))
            .add(&country.display_name, record, weight);
    }

    for rollup in result
        .continents
        .values_mut()
        .chain(result.combined_americas.iter_mut())
        .chain(result.world.iter_mut())
    {
        rollup.settle();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(
        name: &str,
        continent: &str,
        cases: f64,
        per_million: f64,
        updated: i64,
    ) -> (CanonicalCountry, RawCountryRecord) {
        let raw: RawCountryRecord = serde_json::from_value(json!({
            "country": name,
            "continent": continent,
            "updated": updated,
            "cases": cases,
            "deaths": cases / 10.0,
            "casesPerOneMillion": per_million,
            "deathsPerOneMillion": 1,
        }))
        .unwrap();
        (CanonicalCountry::new(name, continent, None), raw)
    }

    fn run(records: &[(CanonicalCountry, RawCountryRecord)]) -> Aggregates {
        aggregate(records.iter().map(|(c, r)| (c, r)))
    }

    #[test]
    fn test_europe_scenario() {
        let records = vec![
            record("Germany", "Europe", 100.0, 50.0, 1),
            record("France", "Europe", 300.0, 150.0, 2),
        ];
        let result = run(&records);
        let europe = result.continent("Europe").unwrap();

        assert_eq!(europe.inhabitants_weight, 4.0);
        assert_eq!(europe.total("cases"), 400.0);
        assert_eq!(europe.cases_per_million(), Some(100.0));
        assert_eq!(europe.deaths_per_million(), Some(10.0));
        assert_eq!(europe.countries_joined(), "Germany,France");
        assert_eq!(europe.continent.as_deref(), Some("Europe"));
    }

    #[test]
    fn test_combined_americas_only_takes_americas() {
        let records = vec![
            record("United States", "North America", 1000.0, 100.0, 5),
            record("Germany", "Europe", 100.0, 50.0, 9),
            record("Brazil", "South America", 500.0, 50.0, 3),
        ];
        let result = run(&records);
        let americas = result.combined_americas.as_ref().unwrap();

        assert_eq!(americas.total("cases"), 1500.0);
        assert_eq!(americas.inhabitants_weight, 20.0);
        assert_eq!(americas.countries, vec!["United States", "Brazil"]);
        assert_eq!(americas.updated, Some(5));
        assert_eq!(americas.continent, None);

        let world = result.world.as_ref().unwrap();
        assert_eq!(world.total("cases"), 1600.0);
        assert_eq!(world.updated, Some(9));
        assert_eq!(result.continents.len(), 3);
        assert!(result.continent("North_America").is_some());
    }

    #[test]
    fn test_combined_americas_exists_without_american_records() {
        let result = run(&[record("Germany", "Europe", 100.0, 50.0, 1)]);
        let americas = result.combined_americas.unwrap();
        assert!(americas.countries.is_empty());
        assert_eq!(americas.cases_per_million(), None);
    }

    fn with_rate(
        (country, mut raw): (CanonicalCountry, RawCountryRecord),
        active_per_million: f64,
    ) -> (CanonicalCountry, RawCountryRecord) {
        raw.fields
            .insert("activePerOneMillion".to_string(), json!(active_per_million));
        (country, raw)
    }

    fn assert_same_totals(forward: &Aggregates, backward: &Aggregates) {
        for (a, b) in forward.all().zip(backward.all()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.totals, b.totals);
            assert_eq!(a.inhabitants_weight, b.inhabitants_weight);
            assert_eq!(a.updated, b.updated);
            assert_eq!(a.cases_per_million(), b.cases_per_million());
        }
    }

    #[test]
    fn test_order_independent_totals() {
        let mut records = vec![
            record("A", "Asia", 10.0, 5.0, 7),
            record("B", "Asia", 30.0, 10.0, 3),
            record("C", "Africa", 5.0, 1.0, 11),
            record("D", "North America", 8.0, 4.0, 2),
        ];
        let forward = run(&records);
        records.reverse();
        let backward = run(&records);

        assert_same_totals(&forward, &backward);
        assert_eq!(forward.world.unwrap().updated, Some(11));
    }

    #[test]
    fn test_order_independent_fractional_totals() {
        let mut records = vec![
            with_rate(record("Germany", "Europe", 1.0, 3.0, 1), 0.1),
            with_rate(record("France", "Europe", 1.0, 7.0, 2), 0.2),
            with_rate(record("Italy", "Europe", 1.0, 11.0, 3), 0.3),
            with_rate(record("Brazil", "South America", 0.7, 13.0, 4), 0.7),
        ];
        let forward = run(&records);
        for _ in 0..records.len() {
            records.rotate_left(1);
            assert_same_totals(&forward, &run(&records));
        }
        records.reverse();
        assert_same_totals(&forward, &run(&records));

        let europe = forward.continent("Europe").unwrap();
        assert_eq!(europe.total("activePerOneMillion"), 0.1 + 0.2 + 0.3);
        assert_eq!(europe.inhabitants_weight, 1.0 / 11.0 + 1.0 / 7.0 + 1.0 / 3.0);
    }

    #[test]
    fn test_zero_per_million_is_not_weighted() {
        let records = vec![
            record("A", "Oceania", 10.0, 0.0, 1),
            record("B", "Oceania", 20.0, 10.0, 1),
        ];
        let result = run(&records);
        let oceania = result.continent("Oceania").unwrap();
        assert_eq!(oceania.inhabitants_weight, 2.0);
        assert_eq!(oceania.total("cases"), 30.0);
        assert_eq!(oceania.cases_per_million(), Some(15.0));
    }

    #[test]
    fn test_rate_is_rounded() {
        let result = run(&[record("A", "Asia", 10.0, 3.0, 1)]);
        let asia = result.continent("Asia").unwrap();
        // weight 3.333.., 10 / 3.333.. = 3.0
        assert_eq!(asia.cases_per_million(), Some(3.0));

        let result = run(&[
            record("A", "Asia", 1.0, 3.0, 1),
            record("B", "Asia", 1.0, 7.0, 1),
        ]);
        let asia = result.continent("Asia").unwrap();
        let expected = round_half_up(2.0 / (1.0 / 3.0 + 1.0 / 7.0), 2);
        assert_eq!(asia.cases_per_million(), Some(expected));
        assert_eq!(expected, 4.2);
    }

    #[test]
    fn test_records_without_continent_are_skipped() {
        let unresolved = record("MS Zaandam", "", 9.0, 1.0, 1);
        let result = run(&[unresolved]);
        assert!(result.continents.is_empty());
        assert!(result.world.is_none());
    }

    #[test]
    fn test_leaves() {
        let result = run(&[record("Germany", "Europe", 100.0, 50.0, 1)]);
        let leaves = result.continent("Europe").unwrap().leaves();
        let get = |key: &str| leaves.iter().find(|(k, _)| k == key).and_then(|(_, v)| v.clone());

        assert_eq!(get("cases"), Some(StateValue::Number(100.0)));
        assert_eq!(get("casesPerOneMillion"), Some(StateValue::Number(50.0)));
        assert_eq!(get("countries"), Some(StateValue::from("Germany")));
        assert_eq!(get("updated"), Some(StateValue::Number(1.0)));
        assert!(leaves.iter().all(|(k, _)| k != "inhabitants"));
    }

    #[test]
    fn test_is_americas() {
        assert!(is_americas("North America"));
        assert!(is_americas("South_America"));
        assert!(!is_americas("America"));
        assert!(!is_americas("Europe"));
    }
}
