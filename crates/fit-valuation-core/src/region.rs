use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValuationError;
use crate::reference::{DataQualityWarning, FindingKind};

/// Geographic regions used for yield assumptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Scotland,
    NorthEastEngland,
    NorthWestEngland,
    YorkshireAndTheHumber,
    #[default]
    EastMidlands,
    WestMidlands,
    EastOfEngland,
    London,
    SouthEastEngland,
    SouthWestEngland,
    Wales,
    NorthernIreland,
}

impl Region {
    pub const ALL: [Region; 12] = [
        Region::Scotland,
        Region::NorthEastEngland,
        Region::NorthWestEngland,
        Region::YorkshireAndTheHumber,
        Region::EastMidlands,
        Region::WestMidlands,
        Region::EastOfEngland,
        Region::London,
        Region::SouthEastEngland,
        Region::SouthWestEngland,
        Region::Wales,
        Region::NorthernIreland,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Region::Scotland => "scotland",
            Region::NorthEastEngland => "north_east_england",
            Region::NorthWestEngland => "north_west_england",
            Region::YorkshireAndTheHumber => "yorkshire_and_the_humber",
            Region::EastMidlands => "east_midlands",
            Region::WestMidlands => "west_midlands",
            Region::EastOfEngland => "east_of_england",
            Region::London => "london",
            Region::SouthEastEngland => "south_east_england",
            Region::SouthWestEngland => "south_west_england",
            Region::Wales => "wales",
            Region::NorthernIreland => "northern_ireland",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Scotland => "Scotland",
            Region::NorthEastEngland => "North East England",
            Region::NorthWestEngland => "North West England",
            Region::YorkshireAndTheHumber => "Yorkshire and the Humber",
            Region::EastMidlands => "East Midlands",
            Region::WestMidlands => "West Midlands",
            Region::EastOfEngland => "East of England",
            Region::London => "London",
            Region::SouthEastEngland => "South East England",
            Region::SouthWestEngland => "South West England",
            Region::Wales => "Wales",
            Region::NorthernIreland => "Northern Ireland",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Region {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Region::ALL
            .into_iter()
            .find(|r| r.key() == key)
            .ok_or_else(|| ValuationError::ReferenceData(format!("unknown region '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Postcode area lookup
// ---------------------------------------------------------------------------

/// Postcode area → region. Areas straddling a boundary go to the region
/// holding most of their districts. Crown dependencies (GY, JE, IM) are
/// deliberately absent and take the default.
const POSTCODE_AREAS: &[(&str, Region)] = &[
    // Scotland
    ("AB", Region::Scotland),
    ("DD", Region::Scotland),
    ("DG", Region::Scotland),
    ("EH", Region::Scotland),
    ("FK", Region::Scotland),
    ("G", Region::Scotland),
    ("HS", Region::Scotland),
    ("IV", Region::Scotland),
    ("KA", Region::Scotland),
    ("KW", Region::Scotland),
    ("KY", Region::Scotland),
    ("ML", Region::Scotland),
    ("PA", Region::Scotland),
    ("PH", Region::Scotland),
    ("TD", Region::Scotland),
    ("ZE", Region::Scotland),
    // North East
    ("DH", Region::NorthEastEngland),
    ("DL", Region::NorthEastEngland),
    ("NE", Region::NorthEastEngland),
    ("SR", Region::NorthEastEngland),
    ("TS", Region::NorthEastEngland),
    // North West
    ("BB", Region::NorthWestEngland),
    ("BL", Region::NorthWestEngland),
    ("CA", Region::NorthWestEngland),
    ("CH", Region::NorthWestEngland),
    ("CW", Region::NorthWestEngland),
    ("FY", Region::NorthWestEngland),
    ("L", Region::NorthWestEngland),
    ("LA", Region::NorthWestEngland),
    ("M", Region::NorthWestEngland),
    ("OL", Region::NorthWestEngland),
    ("PR", Region::NorthWestEngland),
    ("SK", Region::NorthWestEngland),
    ("WA", Region::NorthWestEngland),
    ("WN", Region::NorthWestEngland),
    // Yorkshire and the Humber
    ("BD", Region::YorkshireAndTheHumber),
    ("DN", Region::YorkshireAndTheHumber),
    ("HD", Region::YorkshireAndTheHumber),
    ("HG", Region::YorkshireAndTheHumber),
    ("HU", Region::YorkshireAndTheHumber),
    ("HX", Region::YorkshireAndTheHumber),
    ("LS", Region::YorkshireAndTheHumber),
    ("S", Region::YorkshireAndTheHumber),
    ("WF", Region::YorkshireAndTheHumber),
    ("YO", Region::YorkshireAndTheHumber),
    // East Midlands
    ("DE", Region::EastMidlands),
    ("LE", Region::EastMidlands),
    ("LN", Region::EastMidlands),
    ("NG", Region::EastMidlands),
    ("NN", Region::EastMidlands),
    // West Midlands
    ("B", Region::WestMidlands),
    ("CV", Region::WestMidlands),
    ("DY", Region::WestMidlands),
    ("HR", Region::WestMidlands),
    ("ST", Region::WestMidlands),
    ("SY", Region::WestMidlands),
    ("TF", Region::WestMidlands),
    ("WR", Region::WestMidlands),
    ("WS", Region::WestMidlands),
    ("WV", Region::WestMidlands),
    // East of England
    ("AL", Region::EastOfEngland),
    ("CB", Region::EastOfEngland),
    ("CM", Region::EastOfEngland),
    ("CO", Region::EastOfEngland),
    ("IP", Region::EastOfEngland),
    ("LU", Region::EastOfEngland),
    ("NR", Region::EastOfEngland),
    ("PE", Region::EastOfEngland),
    ("SG", Region::EastOfEngland),
    ("SS", Region::EastOfEngland),
    ("WD", Region::EastOfEngland),
    // London
    ("BR", Region::London),
    ("CR", Region::London),
    ("E", Region::London),
    ("EC", Region::London),
    ("EN", Region::London),
    ("HA", Region::London),
    ("IG", Region::London),
    ("N", Region::London),
    ("NW", Region::London),
    ("RM", Region::London),
    ("SE", Region::London),
    ("SM", Region::London),
    ("SW", Region::London),
    ("TW", Region::London),
    ("UB", Region::London),
    ("W", Region::London),
    ("WC", Region::London),
    // South East
    ("BN", Region::SouthEastEngland),
    ("CT", Region::SouthEastEngland),
    ("DA", Region::SouthEastEngland),
    ("GU", Region::SouthEastEngland),
    ("HP", Region::SouthEastEngland),
    ("KT", Region::SouthEastEngland),
    ("ME", Region::SouthEastEngland),
    ("MK", Region::SouthEastEngland),
    ("OX", Region::SouthEastEngland),
    ("PO", Region::SouthEastEngland),
    ("RG", Region::SouthEastEngland),
    ("RH", Region::SouthEastEngland),
    ("SL", Region::SouthEastEngland),
    ("SO", Region::SouthEastEngland),
    ("TN", Region::SouthEastEngland),
    // South West
    ("BA", Region::SouthWestEngland),
    ("BH", Region::SouthWestEngland),
    ("BS", Region::SouthWestEngland),
    ("DT", Region::SouthWestEngland),
    ("EX", Region::SouthWestEngland),
    ("GL", Region::SouthWestEngland),
    ("PL", Region::SouthWestEngland),
    ("SN", Region::SouthWestEngland),
    ("SP", Region::SouthWestEngland),
    ("TA", Region::SouthWestEngland),
    ("TQ", Region::SouthWestEngland),
    ("TR", Region::SouthWestEngland),
    // Wales
    ("CF", Region::Wales),
    ("LD", Region::Wales),
    ("LL", Region::Wales),
    ("NP", Region::Wales),
    ("SA", Region::Wales),
    // Northern Ireland
    ("BT", Region::NorthernIreland),
];

/// How a region was arrived at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionResolution {
    pub region: Region,
    /// The postcode area that was looked up, if one could be extracted.
    pub postcode_area: Option<String>,
    /// True when the default region was used.
    pub defaulted: bool,
}

impl RegionResolution {
    pub fn warning(&self, postcode: &str) -> Option<DataQualityWarning> {
        self.defaulted.then(|| {
            DataQualityWarning::new(
                FindingKind::RegionDefaulted,
                None,
                format!("postcode '{postcode}' not mapped; using default region {}", self.region),
            )
        })
    }
}

/// Extract the postcode area: the 1–2 letters before the first digit.
///
/// Returns `None` when the postcode does not start with a letter, has more
/// than two letters before its first digit, or contains no digit at all.
pub fn postcode_area(postcode: &str) -> Option<String> {
    let compact: String = postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    let first_digit = compact.find(|c: char| c.is_ascii_digit())?;
    let prefix = &compact[..first_digit];
    if prefix.is_empty() || prefix.len() > 2 || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(prefix.to_string())
}

/// Map a postcode to its region. Never fails: unmapped or malformed
/// postcodes resolve to `default`.
pub fn resolve_region(postcode: &str, default: Region) -> RegionResolution {
    let area = postcode_area(postcode);
    let mapped = area.as_deref().and_then(|a| {
        POSTCODE_AREAS
            .iter()
            .find(|(prefix, _)| *prefix == a)
            .map(|(_, region)| *region)
    });

    match mapped {
        Some(region) => RegionResolution {
            region,
            postcode_area: area,
            defaulted: false,
        },
        None => {
            tracing::debug!(postcode, ?area, default = %default, "postcode unmapped; using default region");
            RegionResolution {
                region: default,
                postcode_area: area,
                defaulted: true,
            }
        }
    }
}
