//! BAC display units and safety constants.
//!
//! Estimation always happens in percent BAC; conversion to other units is a
//! display concern applied at the edge.

use serde::{Deserialize, Serialize};

/// Common legal driving limit, in percent BAC.
pub const LEGAL_LIMIT_PERCENT: f64 = 0.05;

/// Shown alongside every estimate surfaced to the user.
pub const DISCLAIMER: &str = "Estimates are based on the Widmark formula and do not account for \
food or fatigue. Never use them to decide whether you are fit to drive.";

/// Unit used when presenting a BAC value
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BacUnit {
    Percent,
    GramsPerLitre,
}

impl BacUnit {
    /// Convert a percent BAC value into this unit.
    pub fn convert(&self, bac_percent: f64) -> f64 {
        match self {
            BacUnit::Percent => bac_percent,
            BacUnit::GramsPerLitre => bac_percent * 10.0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BacUnit::Percent => "%",
            BacUnit::GramsPerLitre => "g/L",
        }
    }

    /// Display precision: percent carries three decimals, g/L two.
    pub fn decimals(&self) -> usize {
        match self {
            BacUnit::Percent => 3,
            BacUnit::GramsPerLitre => 2,
        }
    }

    /// Render a percent BAC value in this unit, e.g. `0.011 %` or `0.11 g/L`.
    pub fn format_value(&self, bac_percent: f64) -> String {
        format!(
            "{:.*} {}",
            self.decimals(),
            self.convert(bac_percent),
            self.symbol()
        )
    }

    pub fn legal_limit(&self) -> f64 {
        self.convert(LEGAL_LIMIT_PERCENT)
    }
}

/// Parse a unit name as typed on the command line.
pub fn parse_unit(s: &str) -> Option<BacUnit> {
    match s.to_lowercase().as_str() {
        "percent" | "%" => Some(BacUnit::Percent),
        "gl" | "g/l" | "grams-per-litre" | "grams_per_litre" => Some(BacUnit::GramsPerLitre),
        _ => None,
    }
}
