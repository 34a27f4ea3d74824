//! Display metadata for every attribute key written to the tree.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Metadata applied to a leaf when it is created or refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateAttr {
    pub name: &'static str,
    pub role: &'static str,
    pub unit: &'static str,
    pub write: bool,
}

const fn attr(name: &'static str, role: &'static str, unit: &'static str) -> StateAttr {
    StateAttr {
        name,
        role,
        unit,
        write: false,
    }
}

const TABLE: &[(&str, StateAttr)] = &[
    // Global and per-country feed
    ("active", attr("Active cases", "value", "")),
    ("activePerOneMillion", attr("Active cases per one million", "value", "")),
    ("affectedCountries", attr("Affected countries", "value", "")),
    ("cases", attr("Total cases", "value", "")),
    ("casesPerOneMillion", attr("Cases per one million", "value", "")),
    ("continent", attr("Continent", "text", "")),
    ("countries", attr("Countries", "text", "")),
    ("country", attr("Country", "text", "")),
    ("critical", attr("Critical", "value", "")),
    ("criticalPerOneMillion", attr("Critical per one million", "value", "")),
    ("deaths", attr("Deaths", "value", "")),
    ("deathsPerOneMillion", attr("Deaths per one million", "value", "")),
    ("flag", attr("Flag", "text.url", "")),
    ("oneCasePerPeople", attr("One case per people", "value", "")),
    ("oneDeathPerPeople", attr("One death per people", "value", "")),
    ("oneTestPerPeople", attr("One test per people", "value", "")),
    ("population", attr("Population", "value", "")),
    ("recovered", attr("Recovered", "value", "")),
    ("recoveredPerOneMillion", attr("Recovered per one million", "value", "")),
    ("tests", attr("Tests", "value", "")),
    ("testsPerOneMillion", attr("Tests per one million", "value", "")),
    ("todayCases", attr("Cases today", "value", "")),
    ("todayDeaths", attr("Deaths today", "value", "")),
    ("todayRecovered", attr("Recovered today", "value", "")),
    ("updated", attr("Last update", "value.time", "")),
    // German federal states and counties
    ("BL", attr("Federal state", "text", "")),
    ("cases7_per_100k", attr("Cases last 7 days per 100k", "value", "")),
    ("cases_per_100k", attr("Cases per 100k", "value", "")),
    ("cases_per_population", attr("Cases per population", "value", "%")),
    ("death_rate", attr("Death rate", "value", "%")),
    ("last_update", attr("Last update", "text", "")),
    // Vaccination by country
    ("boosterDose", attr("Booster doses", "value", "")),
    ("dailyDoses", attr("Doses administered today", "value", "")),
    ("date", attr("Date of data", "text", "")),
    ("firstDose", attr("People with a first dose", "value", "")),
    ("firstDosePerHundred", attr("First dose per hundred", "value", "%")),
    ("secondDose", attr("People fully vaccinated", "value", "")),
    ("secondDosePerHundred", attr("Fully vaccinated per hundred", "value", "%")),
    ("totalDoses", attr("Total doses administered", "value", "")),
    // Hospital capacity
    ("covidBedShare", attr("Share of beds with COVID-19 patients", "value", "%")),
    ("covidCases", attr("COVID-19 patients in intensive care", "value", "")),
    ("covidCasesVentilated", attr("COVID-19 patients ventilated", "value", "")),
    ("freeBeds", attr("Free intensive care beds", "value", "")),
    ("occupiedBeds", attr("Occupied intensive care beds", "value", "")),
    ("reportedAt", attr("Reported at", "text", "")),
    ("totalBeds", attr("Total intensive care beds", "value", "")),
    // German vaccinations per federal state
    ("rkiErstimpfungenImpfquote", attr("Erstimpfungen Impfquote", "value", "%")),
    ("rkiErstimpfungenKumulativ", attr("Erstimpfungen Kumulativ", "value", "")),
    (
        "rkiImpfungenGesamtVerabreicht",
        attr("Gesamtzahl bisher verabreichter Impfungen", "value", ""),
    ),
    ("rkiZweitimpfungenImpfquote", attr("Zweitimpfungen Impfquote", "value", "%")),
    ("rkiZweitimpfungenKumulativ", attr("Zweitimpfungen Kumulativ", "value", "")),
];

static ATTRIBUTES: LazyLock<HashMap<&'static str, StateAttr>> =
    LazyLock::new(|| TABLE.iter().copied().collect());

/// Metadata for `key`, if the table knows it.
pub fn lookup(key: &str) -> Option<&'static StateAttr> {
    ATTRIBUTES.get(key)
}
