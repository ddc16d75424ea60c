use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Years;

/// Urgency of replacing or re-contracting an asset, by remaining subsidy term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoweringWindow {
    /// Contract has ended.
    Expired,
    /// Two years or less remaining.
    Immediate,
    /// Five years or less remaining.
    Urgent,
    /// Ten years or less remaining.
    Optimal,
    /// Within the planning horizon.
    Planning,
    /// Beyond the planning horizon.
    Future,
}

impl RepoweringWindow {
    pub const ALL: [RepoweringWindow; 6] = [
        RepoweringWindow::Expired,
        RepoweringWindow::Immediate,
        RepoweringWindow::Urgent,
        RepoweringWindow::Optimal,
        RepoweringWindow::Planning,
        RepoweringWindow::Future,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RepoweringWindow::Expired => "Expired",
            RepoweringWindow::Immediate => "Immediate",
            RepoweringWindow::Urgent => "Urgent",
            RepoweringWindow::Optimal => "Optimal",
            RepoweringWindow::Planning => "Planning",
            RepoweringWindow::Future => "Future",
        }
    }
}

impl fmt::Display for RepoweringWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify remaining contract years. Total over all inputs, including
/// negative remainders.
pub fn classify(years_remaining: Years, planning_horizon_years: u32) -> RepoweringWindow {
    let horizon = Decimal::from(planning_horizon_years);
    if years_remaining <= Decimal::ZERO {
        RepoweringWindow::Expired
    } else if years_remaining <= Decimal::TWO {
        RepoweringWindow::Immediate
    } else if years_remaining <= Decimal::from(5) {
        RepoweringWindow::Urgent
    } else if years_remaining <= Decimal::TEN {
        RepoweringWindow::Optimal
    } else if years_remaining <= horizon {
        RepoweringWindow::Planning
    } else {
        RepoweringWindow::Future
    }
}
