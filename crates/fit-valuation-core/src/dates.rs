use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValuationError;
use crate::types::Years;
use crate::FitResult;

const DAYS_PER_YEAR: Decimal = dec!(365.25);

/// First month of the scheme year (April).
pub const SCHEME_YEAR_START_MONTH: u32 = 4;

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

// ---------------------------------------------------------------------------
// Scheme years
// ---------------------------------------------------------------------------

/// A subsidy scheme year running 1 April to 31 March, identified by the
/// calendar year in which it starts. Renders as `"2012/13"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemeYear(i32);

impl SchemeYear {
    pub fn starting(year: i32) -> Self {
        SchemeYear(year)
    }

    /// The scheme year a date falls into.
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= SCHEME_YEAR_START_MONTH {
            SchemeYear(date.year())
        } else {
            SchemeYear(date.year() - 1)
        }
    }

    pub fn start_year(&self) -> i32 {
        self.0
    }

    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, SCHEME_YEAR_START_MONTH, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Number of scheme years from `earlier` to `self` (negative if `earlier` is later).
    pub fn years_since(&self, earlier: SchemeYear) -> i32 {
        self.0 - earlier.0
    }
}

impl fmt::Display for SchemeYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }
}

impl FromStr for SchemeYear {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bad = || ValuationError::DateError(format!("'{trimmed}' is not a scheme year label"));

        let (start, end) = trimmed
            .split_once('/')
            .or_else(|| trimmed.split_once('-'))
            .ok_or_else(bad)?;
        let start: i32 = start.trim().parse().map_err(|_| bad())?;
        let end_raw = end.trim();
        let end: i32 = end_raw.parse().map_err(|_| bad())?;

        let expected_end = start + 1;
        let matches = match end_raw.len() {
            2 => end == expected_end.rem_euclid(100),
            4 => end == expected_end,
            _ => false,
        };
        if !matches {
            return Err(bad());
        }
        Ok(SchemeYear(start))
    }
}

impl TryFrom<String> for SchemeYear {
    type Error = ValuationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SchemeYear> for String {
    fn from(y: SchemeYear) -> Self {
        y.to_string()
    }
}

// ---------------------------------------------------------------------------
// Date helpers
// ---------------------------------------------------------------------------

/// Parse a free-text date. Empty or whitespace-only input is `Ok(None)`;
/// anything non-empty that matches no known format is an `InvalidInput`.
pub fn parse_optional_date(field: &str, raw: Option<&str>) -> FitResult<Option<NaiveDate>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(Some(d));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Some(dt.date()));
        }
    }

    Err(ValuationError::invalid(
        field,
        format!("'{raw}' is not a recognisable date"),
    ))
}

/// Add whole calendar years, clamping 29 February to 28 February.
pub fn add_years(date: NaiveDate, years: u32) -> FitResult<NaiveDate> {
    years
        .checked_mul(12)
        .and_then(|months| date.checked_add_months(Months::new(months)))
        .ok_or_else(|| ValuationError::DateError(format!("{date} + {years} years overflows")))
}

/// Signed year fraction between two dates on a 365.25-day year, rounded to one
/// decimal place.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> Years {
    let days = Decimal::from((to - from).num_days());
    (days / DAYS_PER_YEAR).round_dp(1)
}

/// Completed years between two dates (floored, never negative).
pub fn whole_years_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let days = Decimal::from((to - from).num_days());
    if days <= Decimal::ZERO {
        return 0;
    }
    (days / DAYS_PER_YEAR).floor().to_u32().unwrap_or(0)
}
