use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generation technology eligible under the scheme.
///
/// Parsing never fails: names outside the known set are kept verbatim (after
/// normalisation) as `Unrecognized`, so a record with an odd technology still
/// flows through the engine and resolves to "no rate" instead of erroring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Technology {
    Wind,
    Photovoltaic,
    Hydro,
    AnaerobicDigestion,
    MicroChp,
    Unrecognized(String),
}

impl Technology {
    pub const KNOWN: [Technology; 5] = [
        Technology::Wind,
        Technology::Photovoltaic,
        Technology::Hydro,
        Technology::AnaerobicDigestion,
        Technology::MicroChp,
    ];

    /// Canonical key used in the reference tables.
    pub fn key(&self) -> &str {
        match self {
            Technology::Wind => "wind",
            Technology::Photovoltaic => "photovoltaic",
            Technology::Hydro => "hydro",
            Technology::AnaerobicDigestion => "anaerobic_digestion",
            Technology::MicroChp => "micro_chp",
            Technology::Unrecognized(name) => name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Technology::Wind => "Wind",
            Technology::Photovoltaic => "Photovoltaic",
            Technology::Hydro => "Hydro",
            Technology::AnaerobicDigestion => "Anaerobic Digestion",
            Technology::MicroChp => "Micro CHP",
            Technology::Unrecognized(name) => name,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Technology::Unrecognized(_))
    }

    /// Only photovoltaic output is modelled as decaying over time.
    pub fn degrades(&self) -> bool {
        matches!(self, Technology::Photovoltaic)
    }
}

fn normalise(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

impl From<&str> for Technology {
    fn from(raw: &str) -> Self {
        let key = normalise(raw);
        match key.as_str() {
            "wind" | "onshore_wind" | "wind_turbine" => Technology::Wind,
            "photovoltaic" | "pv" | "solar" | "solar_pv" | "solar_photovoltaic" => {
                Technology::Photovoltaic
            }
            "hydro" | "hydroelectric" | "hydro_power" => Technology::Hydro,
            "anaerobic_digestion" | "ad" | "biogas" => Technology::AnaerobicDigestion,
            "micro_chp" | "microchp" | "mchp" | "micro_combined_heat_and_power" => {
                Technology::MicroChp
            }
            _ => Technology::Unrecognized(key),
        }
    }
}

impl From<String> for Technology {
    fn from(raw: String) -> Self {
        Technology::from(raw.as_str())
    }
}

impl From<Technology> for String {
    fn from(t: Technology) -> Self {
        t.key().to_string()
    }
}

impl FromStr for Technology {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Technology::from(s))
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_normalise() {
        assert_eq!(Technology::from("Solar PV"), Technology::Photovoltaic);
        assert_eq!(Technology::from("micro-CHP"), Technology::MicroChp);
        assert_eq!(Technology::from(" Anaerobic Digestion "), Technology::AnaerobicDigestion);
        assert_eq!(Technology::from("WIND"), Technology::Wind);
    }

    #[test]
    fn test_unknown_is_kept() {
        let t = Technology::from("Tidal Stream");
        assert_eq!(t, Technology::Unrecognized("tidal_stream".into()));
        assert!(!t.is_recognized());
        assert_eq!(t.key(), "tidal_stream");
    }

    #[test]
    fn test_serde_round_trip_uses_table_key() {
        let json = serde_json::to_string(&Technology::AnaerobicDigestion).unwrap();
        assert_eq!(json, "\"anaerobic_digestion\"");
        let back: Technology = serde_json::from_str("\"Hydro\"").unwrap();
        assert_eq!(back, Technology::Hydro);
    }

    #[test]
    fn test_only_pv_degrades() {
        assert!(Technology::Photovoltaic.degrades());
        assert!(!Technology::Wind.degrades());
        assert!(!Technology::Unrecognized("x".into()).degrades());
    }
}
