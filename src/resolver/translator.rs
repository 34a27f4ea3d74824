//! Translation of irregular feed country names to names the country database knows.

use std::collections::HashMap;
use tracing::info;

/// Bundled translations. These always win over user overrides.
const BUNDLED: &[(&str, &str)] = &[
    ("UK", "United Kingdom"),
    ("USA", "United States"),
    ("S. Korea", "South Korea"),
    ("S._Korea", "South Korea"),
    ("UAE", "United Arab Emirates"),
    ("DRC", "Democratic Republic of the Congo"),
    ("CAR", "Central African Republic"),
    ("Congo", "Republic of the Congo"),
    ("Czechia", "Czech Republic"),
    ("Côte d'Ivoire", "Ivory Coast"),
    ("Cote d'Ivoire", "Ivory Coast"),
    ("Cabo Verde", "Cape Verde"),
    ("Timor-Leste", "East Timor"),
    ("Lao People's Democratic Republic", "Laos"),
    ("Libyan Arab Jamahiriya", "Libya"),
    ("Macedonia", "North Macedonia"),
    ("Syrian Arab Republic", "Syria"),
    ("Holy See (Vatican City State)", "Vatican"),
    ("Falkland Islands (Malvinas)", "Falkland Islands"),
    ("St. Barth", "Saint Barthelemy"),
    ("Saint Pierre Miquelon", "Saint Pierre and Miquelon"),
    ("Caribbean Netherlands", "Bonaire, Saint Eustatius and Saba"),
    ("Curaçao", "Curacao"),
    ("Réunion", "Reunion"),
    ("Swaziland", "Eswatini"),
    ("Burma", "Myanmar"),
    ("Brunei Darussalam", "Brunei"),
    ("Viet Nam", "Vietnam"),
    ("Russian Federation", "Russia"),
    ("Macao SAR", "Macao"),
    ("Hong Kong SAR", "Hong Kong"),
    ("Palestinian Territory", "Palestine"),
];

/// Raw feed name to canonical name, extended at startup with user overrides.
#[derive(Debug, Clone)]
pub struct TranslationTable {
    entries: HashMap<String, String>,
}

impl Default for TranslationTable {
    fn default() -> Self {
        Self::bundled()
    }
}

impl TranslationTable {
    pub fn bundled() -> Self {
        Self {
            entries: BUNDLED
                .iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, raw_name: &str) -> Option<&str> {
        self.entries.get(raw_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Add user overrides for names not yet known. Returns how many were added.
    pub fn add_overrides<I>(&mut self, overrides: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut added = 0;
        for (raw, canonical) in overrides {
            if self.entries.contains_key(&raw) {
                continue;
            }
            info!("User defined country translation added: {} -> {}", raw, canonical);
            self.entries.insert(raw, canonical);
            added += 1;
        }
        added
    }

    /// Parse overrides from the JSON object string users maintain in the store.
    pub fn merge_json(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        let overrides: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(self.add_overrides(overrides))
    }
}
