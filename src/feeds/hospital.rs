//! German intensive-care capacity, overall and per federal state.

use crate::models::StateValue;
use serde::Deserialize;
use std::collections::HashMap;

/// Capacity figures of one reporting unit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalFigures {
    #[serde(default)]
    pub intensiv_betten_belegt: Option<f64>,
    #[serde(default)]
    pub intensiv_betten_frei: Option<f64>,
    #[serde(default)]
    pub intensiv_betten_gesamt: Option<f64>,
    #[serde(default)]
    pub faelle_covid_aktuell: Option<f64>,
    #[serde(default)]
    pub faelle_covid_aktuell_beatmet: Option<f64>,
    #[serde(default)]
    pub anteil_covid_betten: Option<f64>,
    #[serde(default)]
    pub creation_timestamp: Option<String>,
}

impl HospitalFigures {
    /// Leaves written below `<id>.Hospital`.
    pub fn leaves(&self) -> Vec<(&'static str, Option<StateValue>)> {
        let number = |v: Option<f64>| v.map(StateValue::Number);
        vec![
            ("occupiedBeds", number(self.intensiv_betten_belegt)),
            ("freeBeds", number(self.intensiv_betten_frei)),
            ("totalBeds", number(self.intensiv_betten_gesamt)),
            ("covidCases", number(self.faelle_covid_aktuell)),
            ("covidCasesVentilated", number(self.faelle_covid_aktuell_beatmet)),
            ("covidBedShare", number(self.anteil_covid_betten)),
            (
                "reportedAt",
                self.creation_timestamp.clone().map(StateValue::Text),
            ),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FederalStateHospitals {
    pub bundesland: String,
    #[serde(flatten)]
    pub figures: HospitalFigures,
}

/// Payload of the hospital capacity feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalReport {
    #[serde(default)]
    pub data: Vec<FederalStateHospitals>,
    #[serde(default)]
    pub overall_sum: Option<HospitalFigures>,
}

/// Normalize a federal-state name to the feed's key form.
///
/// `Baden-Württemberg` becomes `BADEN_WUERTTEMBERG`.
pub fn normalize_state_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.trim().chars() {
        match c {
            'ä' | 'Ä' => out.push_str("AE"),
            'ö' | 'Ö' => out.push_str("OE"),
            'ü' | 'Ü' => out.push_str("UE"),
            'ß' => out.push_str("SS"),
            ' ' | '-' => out.push('_'),
            other => out.extend(other.to_uppercase()),
        }
    }
    out
}

/// Hospital capacity indexed by normalized federal-state name.
#[derive(Debug, Clone, Default)]
pub struct HospitalCapacity {
    states: HashMap<String, HospitalFigures>,
    overall: Option<HospitalFigures>,
}

impl HospitalCapacity {
    pub fn from_report(report: HospitalReport) -> Self {
        let states = report
            .data
            .into_iter()
            .map(|entry| (normalize_state_name(&entry.bundesland), entry.figures))
            .collect();
        Self {
            states,
            overall: report.overall_sum,
        }
    }

    pub fn overall(&self) -> Option<&HospitalFigures> {
        self.overall.as_ref()
    }

    pub fn for_federal_state(&self, name: &str) -> Option<&HospitalFigures> {
        self.states.get(&normalize_state_name(name))
    }
}
