use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Settings, WeightPoint};

/// Where the weight-loss goal stands today.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub start_weight: f64,
    pub current_weight: f64,
    pub goal_weight: f64,
    pub goal_date: NaiveDate,
    /// Weight the straight line from start to goal passes through today.
    pub expected_weight: f64,
    /// 100 = on pace, above 100 ahead, below 100 behind.
    pub pace_percent: f64,
    pub days_total: i64,
    pub days_done: i64,
}

/// Project progress against the goal from the earliest and latest logged weights.
///
/// With no logged weight, the settings start weight stands in for both start and
/// current weight and the plan starts today.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn project(
    settings: &Settings,
    first: Option<WeightPoint>,
    latest: Option<WeightPoint>,
    today: NaiveDate,
) -> Projection {
    let days_total = (settings.goal_date - today).num_days().max(1);

    let start_weight = first.map_or(settings.start_weight, |p| p.weight);
    let current_weight = latest.map_or(start_weight, |p| p.weight);
    let start_day = first.map_or(today, |p| p.date);
    let days_done = (today - start_day).num_days().max(0);

    let fraction = days_done.min(days_total) as f64 / days_total as f64;
    let expected_weight = start_weight + fraction * (settings.goal_weight - start_weight);

    let target_loss = start_weight - expected_weight;
    let actual_loss = start_weight - current_weight;
    let pace_percent = if target_loss > 0.0 {
        round_to(actual_loss / target_loss * 100.0, 1)
    } else {
        100.0
    };

    Projection {
        start_weight,
        current_weight,
        goal_weight: settings.goal_weight,
        goal_date: settings.goal_date,
        expected_weight,
        pace_percent,
        days_total,
        days_done,
    }
}

/// Round to `places` decimals, ties to even.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Straight line from `start` to `end` over `points` samples (at least two), 2 dp.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn goal_line(start: f64, end: f64, points: usize) -> Vec<f64> {
    let n = points.max(2);
    (0..n)
        .map(|i| round_to(start + (i as f64 / (n - 1) as f64) * (end - start), 2))
        .collect()
}
