//! Vaccination feeds: per-country time series and German per-state totals.

use crate::models::StateValue;
use crate::transform::transform;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// One day of a country's vaccination series.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VaccinationEntry {
    pub date: String,
    #[serde(default)]
    pub total_vaccinations: Option<f64>,
    #[serde(default)]
    pub people_vaccinated: Option<f64>,
    #[serde(default)]
    pub people_fully_vaccinated: Option<f64>,
    #[serde(default)]
    pub total_boosters: Option<f64>,
    #[serde(default)]
    pub daily_vaccinations: Option<f64>,
    #[serde(default)]
    pub people_vaccinated_per_hundred: Option<f64>,
    #[serde(default)]
    pub people_fully_vaccinated_per_hundred: Option<f64>,
}

impl VaccinationEntry {
    fn day(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Leaves written below `<country>.Vaccination`.
    pub fn leaves(&self) -> Vec<(&'static str, Option<StateValue>)> {
        let number = |v: Option<f64>| v.map(StateValue::Number);
        vec![
            ("totalDoses", number(self.total_vaccinations)),
            ("firstDose", number(self.people_vaccinated)),
            ("secondDose", number(self.people_fully_vaccinated)),
            ("boosterDose", number(self.total_boosters)),
            ("dailyDoses", number(self.daily_vaccinations)),
            ("firstDosePerHundred", number(self.people_vaccinated_per_hundred)),
            (
                "secondDosePerHundred",
                number(self.people_fully_vaccinated_per_hundred),
            ),
            ("date", Some(StateValue::Text(self.date.clone()))),
        ]
    }
}

/// One country of the vaccination feed.
#[derive(Debug, Clone, Deserialize)]
pub struct CountryVaccinationSeries {
    #[serde(default)]
    pub country: String,
    pub iso_code: String,
    #[serde(default)]
    pub data: Vec<VaccinationEntry>,
}

/// Latest vaccination figures keyed by ISO-3 code.
#[derive(Debug, Clone, Default)]
pub struct VaccinationTable {
    latest: HashMap<String, VaccinationEntry>,
}

impl VaccinationTable {
    pub fn from_series(series: Vec<CountryVaccinationSeries>) -> Self {
        let mut latest = HashMap::new();

        for country in series {
            let newest = country
                .data
                .into_iter()
                .filter_map(|entry| entry.day().map(|day| (day, entry)))
                .max_by_key(|(day, _)| *day)
                .map(|(_, entry)| entry);

            match newest {
                Some(entry) => {
                    latest.insert(country.iso_code.to_uppercase(), entry);
                }
                None => debug!("No dated vaccination entries for {}", country.country),
            }
        }

        Self { latest }
    }

    pub fn for_iso3(&self, iso3: &str) -> Option<&VaccinationEntry> {
        self.latest.get(&iso3.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondVaccination {
    #[serde(default)]
    pub vaccinated: f64,
    #[serde(default)]
    pub quote: f64,
}

/// Vaccination totals of one German federal state. Quotes are fractions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateVaccination {
    pub name: String,
    #[serde(default)]
    pub administered_vaccinations: f64,
    #[serde(default)]
    pub vaccinated: f64,
    #[serde(default)]
    pub quote: f64,
    #[serde(default)]
    pub second_vaccination: SecondVaccination,
}

impl StateVaccination {
    /// Leaves written below `<state>._Impfungen`, quotes as percentages.
    pub fn leaves(&self) -> Vec<(&'static str, StateValue)> {
        let percent = |quote: f64| transform("round(2)", StateValue::Number(quote * 100.0));
        vec![
            (
                "rkiImpfungenGesamtVerabreicht",
                self.administered_vaccinations.into(),
            ),
            ("rkiErstimpfungenKumulativ", self.vaccinated.into()),
            (
                "rkiZweitimpfungenKumulativ",
                self.second_vaccination.vaccinated.into(),
            ),
            ("rkiErstimpfungenImpfquote", percent(self.quote)),
            (
                "rkiZweitimpfungenImpfquote",
                percent(self.second_vaccination.quote),
            ),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GermanVaccinationData {
    /// Keyed by state code (`BW`, `BY`, ...).
    pub states: BTreeMap<String, StateVaccination>,
}

/// Payload of the German vaccination feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GermanVaccinations {
    pub data: GermanVaccinationData,
}

impl GermanVaccinations {
    /// Look up a state by its display name (`Baden-Württemberg`).
    pub fn for_state(&self, name: &str) -> Option<&StateVaccination> {
        self.data.states.values().find(|state| state.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_latest_entry_per_iso_code() {
        let series: Vec<CountryVaccinationSeries> = serde_json::from_value(json!([
            {
                "country": "Germany",
                "iso_code": "DEU",
                "data": [
                    {"date": "2021-05-02", "total_vaccinations": 200},
                    {"date": "2021-05-10", "total_vaccinations": 300, "people_vaccinated": 250},
                    {"date": "2021-05-01", "total_vaccinations": 100}
                ]
            },
            {"country": "Nowhere", "iso_code": "XXX", "data": []}
        ]))
        .unwrap();

        let table = VaccinationTable::from_series(series);
        assert_eq!(table.len(), 1);

        let entry = table.for_iso3("deu").unwrap();
        assert_eq!(entry.date, "2021-05-10");
        let leaves = entry.leaves();
        assert!(leaves.contains(&("totalDoses", Some(StateValue::Number(300.0)))));
        assert!(leaves.contains(&("firstDose", Some(StateValue::Number(250.0)))));
        assert!(leaves.contains(&("boosterDose", None)));
        assert!(table.for_iso3("XXX").is_none());
    }

    #[test]
    fn test_state_vaccination_leaves() {
        let feed: GermanVaccinations = serde_json::from_value(json!({
            "data": {
                "states": {
                    "BE": {
                        "name": "Berlin",
                        "administeredVaccinations": 1000,
                        "vaccinated": 600,
                        "quote": 0.123456,
                        "secondVaccination": {"vaccinated": 400, "quote": 0.1}
                    }
                }
            }
        }))
        .unwrap();

        let berlin = feed.for_state("Berlin").unwrap();
        let leaves = berlin.leaves();
        assert_eq!(leaves[0], ("rkiImpfungenGesamtVerabreicht", StateValue::Number(1000.0)));
        assert_eq!(leaves[3], ("rkiErstimpfungenImpfquote", StateValue::Number(12.35)));
        assert_eq!(leaves[4], ("rkiZweitimpfungenImpfquote", StateValue::Number(10.0)));
        assert!(feed.for_state("BE").is_none());
    }
}
