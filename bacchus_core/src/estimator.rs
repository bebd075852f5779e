//! BAC estimation engine built on the Widmark model.
//!
//! This module implements the estimation pipeline:
//! - Per-drink decay: ingested grams of ethanol → peak BAC → linear elimination
//! - Aggregation across the drink log with fixed rounding
//! - Tier classification and time-to-sober projection

use crate::config::ModelConfig;
use crate::{BacStatus, BacTier, DrinkEvent, UserProfile};
use chrono::{DateTime, Duration, Utc};

/// Density of ethanol in grams per millilitre.
pub const ETHANOL_DENSITY_G_PER_ML: f64 = 0.789;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// BAC values are compared and displayed at three decimal places, so the
/// aggregated total is rounded once, before classification.
fn round_bac(bac: f64) -> f64 {
    (bac * 1000.0).round() / 1000.0
}

/// Contribution of a single drink to the BAC at `at`, in percent.
///
/// The drink's ethanol mass is spread over the body water implied by weight
/// and the distribution ratio, then eliminated linearly. A drink contributes
/// exactly zero at any instant before it was consumed, and never less than
/// zero afterwards. Implausible drinks (see [`DrinkEvent::is_valid`]) count
/// as zero.
pub fn drink_contribution(
    drink: &DrinkEvent,
    weight_kg: f64,
    distribution_ratio: f64,
    elimination_rate_per_hour: f64,
    at: DateTime<Utc>,
) -> f64 {
    if !drink.is_valid() {
        tracing::debug!("Ignoring implausible drink {} in estimation", drink.id);
        return 0.0;
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return 0.0;
    }
    if !distribution_ratio.is_finite() || distribution_ratio <= 0.0 {
        return 0.0;
    }
    if at < drink.consumed_at {
        return 0.0;
    }

    let alcohol_grams = drink.volume_ml * (drink.abv / 100.0) * ETHANOL_DENSITY_G_PER_ML;
    let peak_bac = alcohol_grams / (weight_kg * 1000.0 * distribution_ratio) * 100.0;

    let hours_elapsed = (at - drink.consumed_at).num_milliseconds() as f64 / MILLIS_PER_HOUR;
    (peak_bac - hours_elapsed * elimination_rate_per_hour).max(0.0)
}

/// Total BAC across the drink log at `at`, rounded to three decimals.
///
/// Returns zero when the profile is incomplete; estimation needs a body
/// weight to spread alcohol over.
pub fn total_bac_at(
    drinks: &[DrinkEvent],
    profile: &UserProfile,
    model: &ModelConfig,
    at: DateTime<Utc>,
) -> f64 {
    if !profile.is_complete() {
        return 0.0;
    }

    let ratio = model.distribution_ratio(&profile.sex);
    let total: f64 = drinks
        .iter()
        .map(|d| {
            drink_contribution(
                d,
                profile.weight_kg,
                ratio,
                model.elimination_rate_per_hour,
                at,
            )
        })
        .sum();

    round_bac(total).max(0.0)
}

/// Map a rounded BAC value onto an impairment tier.
///
/// Thresholds are lower-inclusive: a BAC sitting exactly on a boundary
/// belongs to the higher tier.
pub fn classify_bac(bac: f64, model: &ModelConfig) -> BacTier {
    if bac <= 0.0 {
        BacTier::Sober
    } else if bac < model.tipsy_threshold {
        BacTier::Buzzed
    } else if bac < model.drunk_threshold {
        BacTier::Tipsy
    } else {
        BacTier::Drunk
    }
}

/// Estimate the full BAC status at `at`: level, tier, and sober projection.
pub fn estimate_bac(
    drinks: &[DrinkEvent],
    profile: &UserProfile,
    model: &ModelConfig,
    at: DateTime<Utc>,
) -> BacStatus {
    if !profile.is_complete() {
        tracing::debug!("Profile incomplete, skipping estimation");
        return BacStatus {
            current_bac: 0.0,
            sober_at: None,
            tier: BacTier::IncompleteProfile,
        };
    }

    let bac = total_bac_at(drinks, profile, model, at);

    let sober_at = if bac > 0.0 && model.elimination_rate_per_hour > 0.0 {
        let hours_to_sober = bac / model.elimination_rate_per_hour;
        let millis = (hours_to_sober * MILLIS_PER_HOUR).round() as i64;
        Some(at + Duration::milliseconds(millis))
    } else {
        None
    };

    let tier = classify_bac(bac, model);
    tracing::debug!(
        "Estimated BAC {:.3} ({:?}) from {} drinks",
        bac,
        tier,
        drinks.len()
    );

    BacStatus {
        current_bac: bac,
        sober_at,
        tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BiologicalSex;
    use chrono::Utc;

    fn create_test_profile() -> UserProfile {
        UserProfile {
            weight_kg: 70.0,
            sex: BiologicalSex::Male,
            is_setup: true,
        }
    }

    #[test]
    fn test_worked_example_pint_two_hours_ago() {
        // 70 kg male, 500 ml at 5% ABV consumed two hours before evaluation:
        // 19.725 g ethanol → 0.0414% peak → minus 0.030% eliminated → 0.011%.
        let now = Utc::now();
        let drink = DrinkEvent::new("Pint", 500.0, 5.0, now - Duration::hours(2));
        let model = ModelConfig::default();

        let status = estimate_bac(&[drink], &create_test_profile(), &model, now);

        assert_eq!(status.current_bac, 0.011);
        assert_eq!(status.tier, BacTier::Buzzed);
        assert!(status.sober_at.is_some());
    }

    #[test]
    fn test_no_drinks_is_sober() {
        let now = Utc::now();
        let model = ModelConfig::default();

        let status = estimate_bac(&[], &create_test_profile(), &model, now);

        assert_eq!(status.current_bac, 0.0);
        assert_eq!(status.tier, BacTier::Sober);
        assert_eq!(status.sober_at, None);
    }

    #[test]
    fn test_incomplete_profile_yields_guard_tier() {
        let now = Utc::now();
        let drink = DrinkEvent::new("Pint", 500.0, 5.0, now - Duration::hours(1));
        let model = ModelConfig::default();

        let status = estimate_bac(&[drink], &UserProfile::default(), &model, now);

        assert_eq!(status.current_bac, 0.0);
        assert_eq!(status.tier, BacTier::IncompleteProfile);
        assert_eq!(status.sober_at, None);
    }

    #[test]
    fn test_no_contribution_before_drink() {
        let consumed_at = Utc::now();
        let drink = DrinkEvent::new("Pint", 500.0, 5.0, consumed_at);

        let before = drink_contribution(&drink, 70.0, 0.68, 0.015, consumed_at - Duration::minutes(1));
        assert_eq!(before, 0.0);

        let at_consumption = drink_contribution(&drink, 70.0, 0.68, 0.015, consumed_at);
        assert!(at_consumption > 0.04);
    }

    #[test]
    fn test_contribution_decays_monotonically_to_zero() {
        let consumed_at = Utc::now();
        let drink = DrinkEvent::new("Pint", 500.0, 5.0, consumed_at);

        let mut previous = f64::INFINITY;
        for hour in 0..6 {
            let c = drink_contribution(
                &drink,
                70.0,
                0.68,
                0.015,
                consumed_at + Duration::hours(hour),
            );
            assert!(c <= previous);
            assert!(c >= 0.0);
            previous = c;
        }

        // 0.0414% peak is fully eliminated within three hours at 0.015%/h.
        let long_after = drink_contribution(
            &drink,
            70.0,
            0.68,
            0.015,
            consumed_at + Duration::hours(12),
        );
        assert_eq!(long_after, 0.0);
    }

    #[test]
    fn test_total_is_rounded_sum_of_contributions() {
        let now = Utc::now();
        let profile = create_test_profile();
        let model = ModelConfig::default();
        let drinks = vec![
            DrinkEvent::new("Pint", 500.0, 5.0, now - Duration::minutes(30)),
            DrinkEvent::new("Wine", 150.0, 12.5, now - Duration::minutes(90)),
        ];

        let ratio = model.distribution_ratio(&profile.sex);
        let by_hand: f64 = drinks
            .iter()
            .map(|d| {
                drink_contribution(d, profile.weight_kg, ratio, model.elimination_rate_per_hour, now)
            })
            .sum();

        assert_eq!(total_bac_at(&drinks, &profile, &model, now), round_bac(by_hand));
    }

    #[test]
    fn test_malformed_drinks_count_as_zero() {
        let now = Utc::now();
        let mut zero_volume = DrinkEvent::new("Ghost", 100.0, 5.0, now);
        zero_volume.volume_ml = 0.0;
        let mut silly_abv = DrinkEvent::new("Rocket", 100.0, 5.0, now);
        silly_abv.abv = 250.0;

        assert_eq!(drink_contribution(&zero_volume, 70.0, 0.68, 0.015, now), 0.0);
        assert_eq!(drink_contribution(&silly_abv, 70.0, 0.68, 0.015, now), 0.0);

        let status = estimate_bac(
            &[zero_volume, silly_abv],
            &create_test_profile(),
            &ModelConfig::default(),
            now,
        );
        assert_eq!(status.tier, BacTier::Sober);
    }

    #[test]
    fn test_future_drink_does_not_affect_status() {
        let now = Utc::now();
        let later = DrinkEvent::new("Pint", 500.0, 5.0, now + Duration::hours(1));
        let model = ModelConfig::default();

        let status = estimate_bac(&[later], &create_test_profile(), &model, now);

        assert_eq!(status.current_bac, 0.0);
        assert_eq!(status.tier, BacTier::Sober);
    }

    #[test]
    fn test_classification_boundaries_are_lower_inclusive() {
        let model = ModelConfig::default();

        assert_eq!(classify_bac(0.0, &model), BacTier::Sober);
        assert_eq!(classify_bac(0.001, &model), BacTier::Buzzed);
        assert_eq!(classify_bac(0.049999, &model), BacTier::Buzzed);
        assert_eq!(classify_bac(0.05, &model), BacTier::Tipsy);
        assert_eq!(classify_bac(0.119, &model), BacTier::Tipsy);
        assert_eq!(classify_bac(0.12, &model), BacTier::Drunk);
        assert_eq!(classify_bac(0.3, &model), BacTier::Drunk);
    }

    #[test]
    fn test_total_rounds_to_three_decimals() {
        let now = Utc::now();
        let drink = DrinkEvent::new("Pint", 500.0, 5.0, now);
        let model = ModelConfig::default();

        // Raw peak is 0.041439...%, which must surface as exactly 0.041.
        let total = total_bac_at(&[drink], &create_test_profile(), &model, now);
        assert_eq!(total, 0.041);
    }

    #[test]
    fn test_sober_projection_uses_elimination_rate() {
        let now = Utc::now();
        let drink = DrinkEvent::new("Pint", 500.0, 5.0, now - Duration::hours(2));
        let model = ModelConfig::default();

        let status = estimate_bac(&[drink], &create_test_profile(), &model, now);

        // 0.011% at 0.015%/h is 44 minutes from sober.
        let sober_at = status.sober_at.unwrap();
        assert_eq!((sober_at - now).num_minutes(), 44);
    }

    #[test]
    fn test_female_ratio_raises_estimate() {
        let now = Utc::now();
        let drink = DrinkEvent::new("Pint", 500.0, 5.0, now);
        let model = ModelConfig::default();

        let male = create_test_profile();
        let female = UserProfile {
            sex: BiologicalSex::Female,
            ..create_test_profile()
        };

        let male_bac = total_bac_at(&[drink.clone()], &male, &model, now);
        let female_bac = total_bac_at(&[drink], &female, &model, now);

        assert!(female_bac > male_bac);
    }
}
