//! Core domain types for the Bacchus BAC estimator.
//!
//! This module defines the fundamental types used throughout the system:
//! - Drink events and catalog metadata
//! - The user's physiological profile
//! - Estimated status (level, tier, sober projection)
//! - Trend series points

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Drink Types
// ============================================================================

/// Broad category of drink
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrinkKind {
    Beer,
    Wine,
    Cocktail,
    Spirit,
    Other,
}

impl DrinkKind {
    /// Emoji shown next to drinks of this kind.
    pub fn icon(&self) -> &'static str {
        match self {
            DrinkKind::Beer => "🍺",
            DrinkKind::Wine => "🍷",
            DrinkKind::Cocktail => "🍹",
            DrinkKind::Spirit => "🥃",
            DrinkKind::Other => "🍸",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DrinkKind::Beer => "beer",
            DrinkKind::Wine => "wine",
            DrinkKind::Cocktail => "cocktail",
            DrinkKind::Spirit => "spirit",
            DrinkKind::Other => "other",
        }
    }
}

/// How quickly a drink is being consumed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    Slow,
    Average,
    Fast,
}

/// A single logged drink
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DrinkEvent {
    pub id: Uuid,
    pub name: String,
    pub volume_ml: f64,
    pub abv: f64,
    pub consumed_at: DateTime<Utc>,
    pub icon: Option<String>,
}

impl DrinkEvent {
    pub fn new(name: &str, volume_ml: f64, abv: f64, consumed_at: DateTime<Utc>) -> Self {
        DrinkEvent {
            id: Uuid::new_v4(),
            name: name.to_string(),
            volume_ml: volume_ml.round(),
            abv: (abv * 10.0).round() / 10.0,
            consumed_at,
            icon: None,
        }
    }

    /// Build a mixed drink by blending an alcoholic pour with a mixer.
    ///
    /// The pure alcohol volume stays constant while the total volume grows,
    /// so the effective ABV drops proportionally. Volume is rounded to whole
    /// millilitres, ABV to one decimal.
    pub fn mixed(
        name: &str,
        alcohol_ml: f64,
        alcohol_abv: f64,
        mixer_ml: f64,
        consumed_at: DateTime<Utc>,
    ) -> Self {
        let total_ml = alcohol_ml + mixer_ml;
        let pure_alcohol_ml = alcohol_ml * (alcohol_abv / 100.0);
        let effective_abv = if total_ml > 0.0 {
            (pure_alcohol_ml / total_ml) * 100.0
        } else {
            0.0
        };
        let final_name = if mixer_ml > 0.0 {
            format!("{} & Mixer", name)
        } else {
            name.to_string()
        };
        DrinkEvent::new(&final_name, total_ml, effective_abv, consumed_at)
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    /// A drink is usable by the estimator only if its numbers are physically
    /// plausible: positive finite volume and an ABV within 0..=100.
    pub fn is_valid(&self) -> bool {
        self.volume_ml.is_finite()
            && self.volume_ml > 0.0
            && self.abv.is_finite()
            && (0.0..=100.0).contains(&self.abv)
    }
}

// ============================================================================
// Profile Types
// ============================================================================

/// Biological sex, used to select the Widmark distribution ratio
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BiologicalSex {
    Male,
    Female,
}

/// The user's persistent physiological profile
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub weight_kg: f64,
    pub sex: BiologicalSex,
    pub is_setup: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        UserProfile {
            weight_kg: 0.0,
            sex: BiologicalSex::Male,
            is_setup: false,
        }
    }
}

impl UserProfile {
    /// Estimation requires an explicit setup step and a positive body weight.
    pub fn is_complete(&self) -> bool {
        self.is_setup && self.weight_kg.is_finite() && self.weight_kg > 0.0
    }
}

// ============================================================================
// Status Types
// ============================================================================

/// Qualitative impairment tier derived from the rounded BAC
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BacTier {
    IncompleteProfile,
    Sober,
    Buzzed,
    Tipsy,
    Drunk,
}

/// Colour bucket a tier maps to in user-facing surfaces
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Safe,
    Buzz,
    Drunk,
    Danger,
}

impl BacTier {
    pub fn label(&self) -> &'static str {
        match self {
            BacTier::IncompleteProfile => "Setup Required",
            BacTier::Sober => "Sober",
            BacTier::Buzzed => "Buzzed",
            BacTier::Tipsy => "Tipsy",
            BacTier::Drunk => "Drunk",
        }
    }

    pub fn color(&self) -> StatusColor {
        match self {
            BacTier::IncompleteProfile => StatusColor::Safe,
            BacTier::Sober => StatusColor::Safe,
            BacTier::Buzzed => StatusColor::Buzz,
            BacTier::Tipsy => StatusColor::Drunk,
            BacTier::Drunk => StatusColor::Danger,
        }
    }
}

/// Point-in-time estimate returned by the estimator
#[derive(Clone, Debug, PartialEq)]
pub struct BacStatus {
    pub current_bac: f64,
    pub sober_at: Option<DateTime<Utc>>,
    pub tier: BacTier,
}

/// One sample of the BAC trend series
#[derive(Clone, Debug, PartialEq)]
pub struct TrendPoint {
    pub at: DateTime<Utc>,
    pub bac: f64,
}

// ============================================================================
// Catalog Type
// ============================================================================

/// A known drink with a reference ABV (e.g., "Guinness")
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DrinkReference {
    pub id: String,
    pub name: String,
    pub kind: DrinkKind,
    pub abv: f64,
}

/// A named serving size (e.g., "pint" for 500 ml)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServingPreset {
    pub label: String,
    pub ml: f64,
}

/// The complete catalog of drink references and serving presets
#[derive(Clone, Debug)]
pub struct Catalog {
    pub references: HashMap<String, DrinkReference>,
    pub beer_presets: Vec<ServingPreset>,
    pub shot_presets: Vec<ServingPreset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_drink_blends_volume_and_abv() {
        let at = Utc::now();
        let drink = DrinkEvent::mixed("Vodka", 50.0, 40.0, 150.0, at);
        assert_eq!(drink.name, "Vodka & Mixer");
        assert_eq!(drink.volume_ml, 200.0);
        // 20 ml pure alcohol in 200 ml total
        assert_eq!(drink.abv, 10.0);
    }

    #[test]
    fn mixed_drink_without_mixer_keeps_name_and_abv() {
        let at = Utc::now();
        let drink = DrinkEvent::mixed("Whisky", 40.0, 43.0, 0.0, at);
        assert_eq!(drink.name, "Whisky");
        assert_eq!(drink.volume_ml, 40.0);
        assert_eq!(drink.abv, 43.0);
    }

    #[test]
    fn constructor_rounds_volume_and_abv() {
        let drink = DrinkEvent::new("Lager", 330.4, 5.26, Utc::now());
        assert_eq!(drink.volume_ml, 330.0);
        assert_eq!(drink.abv, 5.3);
    }

    #[test]
    fn validity_rejects_implausible_numbers() {
        let at = Utc::now();
        assert!(DrinkEvent::new("Ok", 500.0, 5.0, at).is_valid());
        assert!(!DrinkEvent::new("Empty", 0.0, 5.0, at).is_valid());
        assert!(!DrinkEvent::new("Negative", -10.0, 5.0, at).is_valid());

        let mut rocket_fuel = DrinkEvent::new("Rocket", 100.0, 5.0, at);
        rocket_fuel.abv = 120.0;
        assert!(!rocket_fuel.is_valid());

        let mut nan = DrinkEvent::new("NaN", 100.0, 5.0, at);
        nan.volume_ml = f64::NAN;
        assert!(!nan.is_valid());
    }

    #[test]
    fn profile_completeness_requires_setup_and_weight() {
        let mut profile = UserProfile::default();
        assert!(!profile.is_complete());

        profile.weight_kg = 70.0;
        assert!(!profile.is_complete());

        profile.is_setup = true;
        assert!(profile.is_complete());

        profile.weight_kg = 0.0;
        assert!(!profile.is_complete());
    }

    #[test]
    fn tier_labels_and_colors() {
        assert_eq!(BacTier::Sober.label(), "Sober");
        assert_eq!(BacTier::Drunk.label(), "Drunk");
        assert_eq!(BacTier::Buzzed.color(), StatusColor::Buzz);
        assert_eq!(BacTier::Tipsy.color(), StatusColor::Drunk);
        assert_eq!(BacTier::IncompleteProfile.color(), StatusColor::Safe);
    }
}
