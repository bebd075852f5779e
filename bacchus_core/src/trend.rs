//! BAC trend sampling around a centre instant.
//!
//! The trend is a symmetric, evenly spaced series: half the window looks
//! back over drinks already logged, half projects forward assuming nothing
//! more is consumed. Every sample goes through the same aggregation and
//! rounding as a point-in-time estimate, so chart values always agree with
//! the headline number.

use crate::config::{ModelConfig, TrendConfig};
use crate::estimator::total_bac_at;
use crate::{DrinkEvent, TrendPoint, UserProfile};
use chrono::{DateTime, Duration, Utc};

/// Sample the BAC curve at fixed steps across `center ± half_window`.
///
/// Points are returned in ascending time order, endpoints included. An empty
/// drink log (or an incomplete profile) yields a full-length series of
/// zeroes, never an empty vector.
pub fn sample_trend(
    drinks: &[DrinkEvent],
    profile: &UserProfile,
    model: &ModelConfig,
    trend: &TrendConfig,
    center: DateTime<Utc>,
) -> Vec<TrendPoint> {
    if trend.half_window_minutes <= 0 || trend.step_minutes <= 0 {
        tracing::warn!(
            "Degenerate trend window ({} min / {} min step), sampling centre only",
            trend.half_window_minutes,
            trend.step_minutes
        );
        return vec![TrendPoint {
            at: center,
            bac: total_bac_at(drinks, profile, model, center),
        }];
    }

    let start = center - Duration::minutes(trend.half_window_minutes);
    let steps = (trend.half_window_minutes * 2) / trend.step_minutes;

    let mut points = Vec::with_capacity(steps as usize + 1);
    for i in 0..=steps {
        let at = start + Duration::minutes(i * trend.step_minutes);
        points.push(TrendPoint {
            at,
            bac: total_bac_at(drinks, profile, model, at),
        });
    }
    points
}

/// The highest sample in a series, earliest instant winning ties.
pub fn peak(points: &[TrendPoint]) -> Option<&TrendPoint> {
    points.iter().reduce(|best, p| if p.bac > best.bac { p } else { best })
}
