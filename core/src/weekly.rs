use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::DayLog;
use crate::projection::{goal_line, round_to};
use crate::score::compliance_score;

/// Days of history the weekly table looks back over.
pub const WEEKLY_LOOKBACK_DAYS: i64 = 90;
/// Most weeks shown, newest first.
pub const MAX_WEEKS: usize = 16;
pub const DASHBOARD_TREND_DAYS: i64 = 30;
pub const WEEKLY_TREND_DAYS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    /// Monday of the week.
    pub week_start: NaiveDate,
    pub days: usize,
    pub avg_weight: Option<f64>,
    pub avg_waist: Option<f64>,
    pub avg_cals: Option<f64>,
    pub avg_prot: Option<f64>,
    pub avg_miles: Option<f64>,
    pub avg_active: Option<f64>,
    pub rings_pct: Option<f64>,
    pub avg_comp: Option<f64>,
}

/// Monday on or before `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Earliest date included in a window of `days` ending today.
#[must_use]
pub fn window_start(today: NaiveDate, days: i64) -> NaiveDate {
    today - Duration::days(days)
}

/// Mean of the present values rounded to `places`, `None` when nothing is present.
#[allow(clippy::cast_precision_loss)]
fn mean<I>(values: I, places: i32) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| round_to(sum / count as f64, places))
}

#[allow(clippy::cast_precision_loss)]
fn summarize(week_start: NaiveDate, logs: &[&DayLog]) -> WeeklySummary {
    let rings_pct = (!logs.is_empty()).then(|| {
        let closed = logs.iter().filter(|l| l.rings_closed).count();
        round_to(closed as f64 / logs.len() as f64 * 100.0, 0)
    });

    WeeklySummary {
        week_start,
        days: logs.len(),
        avg_weight: mean(logs.iter().map(|l| l.weight_am), 1),
        avg_waist: mean(logs.iter().map(|l| l.waist_in), 1),
        avg_cals: mean(logs.iter().map(|l| l.calories_total.map(|v| v as f64)), 0),
        avg_prot: mean(logs.iter().map(|l| l.protein_g_total.map(|v| v as f64)), 0),
        avg_miles: mean(logs.iter().map(|l| l.walking_miles), 2),
        avg_active: mean(logs.iter().map(|l| l.active_calories.map(|v| v as f64)), 0),
        rings_pct,
        avg_comp: mean(
            logs.iter().map(|l| Some(f64::from(compliance_score(l)))),
            2,
        ),
    }
}

/// Group day logs into Monday-start weeks, newest week first, at most [`MAX_WEEKS`].
///
/// Averages skip days where the field is absent rather than counting them as zero.
#[must_use]
pub fn weekly_summaries(logs: &[DayLog]) -> Vec<WeeklySummary> {
    let mut weeks: BTreeMap<NaiveDate, Vec<&DayLog>> = BTreeMap::new();
    for log in logs {
        weeks.entry(week_start(log.date)).or_default().push(log);
    }

    weeks
        .iter()
        .rev()
        .take(MAX_WEEKS)
        .map(|(start, days)| summarize(*start, days))
        .collect()
}

/// Chart series for the dashboard: weight and compliance per day plus the goal line.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardTrend {
    pub labels: Vec<String>,
    pub weights: Vec<Option<f64>>,
    pub compliance: Vec<u8>,
    pub goal_line: Vec<f64>,
}

impl DashboardTrend {
    /// `logs` must be in ascending date order.
    #[must_use]
    pub fn from_logs(logs: &[DayLog], start_weight: f64, goal_weight: f64) -> Self {
        Self {
            labels: logs.iter().map(|l| chart_label(l.date)).collect(),
            weights: logs.iter().map(|l| l.weight_am).collect(),
            compliance: logs.iter().map(compliance_score).collect(),
            goal_line: goal_line(start_weight, goal_weight, logs.len()),
        }
    }
}

/// Chart series for the weekly page.
#[derive(Debug, Clone, Serialize)]
pub struct BodyTrend {
    pub labels: Vec<String>,
    pub waist: Vec<Option<f64>>,
    pub miles: Vec<Option<f64>>,
}

impl BodyTrend {
    #[must_use]
    pub fn from_logs(logs: &[DayLog]) -> Self {
        Self {
            labels: logs.iter().map(|l| chart_label(l.date)).collect(),
            waist: logs.iter().map(|l| l.waist_in).collect(),
            miles: logs.iter().map(|l| l.walking_miles).collect(),
        }
    }
}

fn chart_label(date: NaiveDate) -> String {
    date.format("%b %d").to_string()
}
