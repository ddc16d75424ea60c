use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ValuationError;
use crate::types::Kilowatts;

/// A capacity band descriptor, parsed once from the table's string form.
///
/// * `"50-150"`  → `Range { min: 50, max: 150 }`, inclusive both ends
/// * `"<=4"`     → `AtMost { max: 4 }`
/// * `">5000"`   → `MoreThan { min: 5000 }`, exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CapacityBand {
    Range { min: Kilowatts, max: Kilowatts },
    AtMost { max: Kilowatts },
    MoreThan { min: Kilowatts },
}

impl CapacityBand {
    pub fn contains(&self, capacity_kw: Kilowatts) -> bool {
        match *self {
            CapacityBand::Range { min, max } => min <= capacity_kw && capacity_kw <= max,
            CapacityBand::AtMost { max } => capacity_kw <= max,
            CapacityBand::MoreThan { min } => capacity_kw > min,
        }
    }

    /// Lowest capacity the band can cover (exclusive for `MoreThan`).
    pub fn lower(&self) -> Kilowatts {
        match *self {
            CapacityBand::Range { min, .. } => min,
            CapacityBand::AtMost { .. } => Decimal::ZERO,
            CapacityBand::MoreThan { min } => min,
        }
    }

    /// Highest capacity covered, `None` when open above.
    pub fn upper(&self) -> Option<Kilowatts> {
        match *self {
            CapacityBand::Range { max, .. } | CapacityBand::AtMost { max } => Some(max),
            CapacityBand::MoreThan { .. } => None,
        }
    }

    fn lower_is_exclusive(&self) -> bool {
        matches!(self, CapacityBand::MoreThan { .. })
    }

    /// True when `capacity_kw` sits strictly inside the band, i.e. it is not a
    /// point the band merely shares with a neighbour.
    pub fn contains_interior(&self, capacity_kw: Kilowatts) -> bool {
        let above_lower = capacity_kw > self.lower()
            || (capacity_kw == self.lower() && self.lower().is_zero() && !self.lower_is_exclusive());
        let below_upper = self.upper().map_or(true, |u| capacity_kw < u);
        above_lower && below_upper
    }

    /// Ordering used to lay out a table's bands: by lower bound, then closed
    /// lower bounds before open ones, then narrower before wider.
    pub(crate) fn layout_cmp(&self, other: &CapacityBand) -> Ordering {
        self.lower()
            .cmp(&other.lower())
            .then_with(|| self.lower_is_exclusive().cmp(&other.lower_is_exclusive()))
            .then_with(|| match (self.upper(), other.upper()) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

fn parse_kw(raw: &str, descriptor: &str) -> Result<Kilowatts, ValuationError> {
    let value = Decimal::from_str(raw.trim()).map_err(|_| {
        ValuationError::ReferenceData(format!(
            "band '{descriptor}': '{}' is not a number",
            raw.trim()
        ))
    })?;
    if value.is_sign_negative() {
        return Err(ValuationError::ReferenceData(format!(
            "band '{descriptor}': capacity bounds must be non-negative"
        )));
    }
    Ok(value)
}

impl FromStr for CapacityBand {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let descriptor = s.trim();
        if let Some(rest) = descriptor.strip_prefix("<=") {
            return Ok(CapacityBand::AtMost {
                max: parse_kw(rest, descriptor)?,
            });
        }
        if let Some(rest) = descriptor.strip_prefix('>') {
            return Ok(CapacityBand::MoreThan {
                min: parse_kw(rest, descriptor)?,
            });
        }
        let (lo, hi) = descriptor.split_once('-').ok_or_else(|| {
            ValuationError::ReferenceData(format!(
                "band '{descriptor}' is not one of 'min-max', '<=max', '>min'"
            ))
        })?;
        let min = parse_kw(lo, descriptor)?;
        let max = parse_kw(hi, descriptor)?;
        if min > max {
            return Err(ValuationError::ReferenceData(format!(
                "band '{descriptor}': lower bound exceeds upper bound"
            )));
        }
        Ok(CapacityBand::Range { min, max })
    }
}

impl TryFrom<String> for CapacityBand {
    type Error = ValuationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CapacityBand> for String {
    fn from(b: CapacityBand) -> Self {
        b.to_string()
    }
}

impl fmt::Display for CapacityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityBand::Range { min, max } => {
                write!(f, "{}-{}", min.normalize(), max.normalize())
            }
            CapacityBand::AtMost { max } => write!(f, "<={}", max.normalize()),
            CapacityBand::MoreThan { min } => write!(f, ">{}", min.normalize()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_descriptors() {
        assert_eq!(
            "100-500".parse::<CapacityBand>().unwrap(),
            CapacityBand::Range { min: dec!(100), max: dec!(500) }
        );
        assert_eq!(
            "<=1.5".parse::<CapacityBand>().unwrap(),
            CapacityBand::AtMost { max: dec!(1.5) }
        );
        assert_eq!(
            " >5000 ".parse::<CapacityBand>().unwrap(),
            CapacityBand::MoreThan { min: dec!(5000) }
        );
    }

    #[test]
    fn test_reject_malformed_descriptors() {
        assert!("500-100".parse::<CapacityBand>().is_err());
        assert!("about 50".parse::<CapacityBand>().is_err());
        assert!("<=".parse::<CapacityBand>().is_err());
        assert!(">-5".parse::<CapacityBand>().is_err());
    }

    #[test]
    fn test_containment_semantics() {
        let range: CapacityBand = "100-500".parse().unwrap();
        assert!(range.contains(dec!(100)));
        assert!(range.contains(dec!(500)));
        assert!(!range.contains(dec!(500.01)));

        let at_most: CapacityBand = "<=4".parse().unwrap();
        assert!(at_most.contains(dec!(4)));
        assert!(!at_most.contains(dec!(4.001)));

        let more_than: CapacityBand = ">1500".parse().unwrap();
        assert!(!more_than.contains(dec!(1500)));
        assert!(more_than.contains(dec!(1500.1)));
    }

    #[test]
    fn test_shared_endpoint_is_not_interior() {
        let lower: CapacityBand = "1.5-15".parse().unwrap();
        let upper: CapacityBand = "15-100".parse().unwrap();
        assert!(lower.contains(dec!(15)) && upper.contains(dec!(15)));
        assert!(!lower.contains_interior(dec!(15)));
        assert!(!upper.contains_interior(dec!(15)));
        assert!(upper.contains_interior(dec!(15.5)));
    }

    #[test]
    fn test_display_round_trips() {
        for raw in ["0-4", "<=1.5", ">250", "10-50"] {
            let band: CapacityBand = raw.parse().unwrap();
            assert_eq!(band.to_string(), raw);
        }
    }
}
