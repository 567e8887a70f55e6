use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CAL_TARGET: i64 = 2000;
pub const DEFAULT_PROT_TARGET: i64 = 190;
pub const DEFAULT_START_WEIGHT: f64 = 225.0;
pub const DEFAULT_GOAL_WEIGHT: f64 = 190.0;

/// Longest workout note kept; longer input is cut at a char boundary.
pub const WORKOUT_NOTES_MAX: usize = 250;

/// Name used for quick-add meals submitted without a name.
pub const QUICK_ADD_NAME: &str = "Quick add";

/// One row per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLog {
    pub id: i64,
    pub date: NaiveDate,
    pub weight_am: Option<f64>,
    pub waist_in: Option<f64>,
    pub calories_total: Option<i64>,
    pub protein_g_total: Option<i64>,
    pub walk_done: bool,
    pub lift_done: bool,
    /// Eating window (11am-7pm) adhered to.
    pub if_done: bool,
    pub rings_closed: bool,
    pub walking_miles: Option<f64>,
    pub active_calories: Option<i64>,
    pub cal_target: Option<i64>,
    pub prot_target: Option<i64>,
    pub notes: Option<String>,
}

impl DayLog {
    /// A fresh, unsaved log for `date` with the default targets.
    #[must_use]
    pub fn blank(date: NaiveDate) -> Self {
        Self {
            id: 0,
            date,
            weight_am: None,
            waist_in: None,
            calories_total: None,
            protein_g_total: None,
            walk_done: false,
            lift_done: false,
            if_done: false,
            rings_closed: false,
            walking_miles: None,
            active_calories: None,
            cal_target: Some(DEFAULT_CAL_TARGET),
            prot_target: Some(DEFAULT_PROT_TARGET),
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub start_weight: f64,
    pub goal_weight: f64,
    pub goal_date: NaiveDate,
}

impl Settings {
    /// Defaults used when no settings row exists yet.
    ///
    /// The goal date is June 1 of the current year, or of next year once that
    /// date has passed.
    #[must_use]
    pub fn defaults(today: NaiveDate) -> Self {
        Self {
            start_weight: DEFAULT_START_WEIGHT,
            goal_weight: DEFAULT_GOAL_WEIGHT,
            goal_date: default_goal_date(today),
        }
    }
}

#[must_use]
pub fn default_goal_date(today: NaiveDate) -> NaiveDate {
    let june_first = |year| NaiveDate::from_ymd_opt(year, 6, 1).unwrap_or(today);
    let this_year = june_first(today.year());
    if this_year < today {
        june_first(today.year() + 1)
    } else {
        this_year
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub start_weight: Option<f64>,
    pub goal_weight: Option<f64>,
    pub goal_date: Option<NaiveDate>,
}

impl SettingsUpdate {
    /// Apply onto `current`. Absent or zero weights keep the existing value.
    #[must_use]
    pub fn apply(&self, current: &Settings) -> Settings {
        Settings {
            start_weight: non_zero_f64(self.start_weight).unwrap_or(current.start_weight),
            goal_weight: non_zero_f64(self.goal_weight).unwrap_or(current.goal_weight),
            goal_date: self.goal_date.unwrap_or(current.goal_date),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Meal {
    pub id: i64,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub name: String,
    pub calories: Option<i64>,
    pub protein_g: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewMeal {
    pub date: NaiveDate,
    pub time: Option<String>,
    pub name: String,
    pub calories: Option<i64>,
    pub protein_g: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedMeal {
    pub id: i64,
    pub name: String,
    pub calories: Option<i64>,
    pub protein_g: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewSavedMeal {
    pub name: String,
    pub calories: Option<i64>,
    pub protein_g: Option<i64>,
}

impl SavedMeal {
    /// Copy this template into a meal for `date`.
    #[must_use]
    pub fn to_new_meal(&self, date: NaiveDate, time: Option<String>) -> NewMeal {
        NewMeal {
            date,
            time,
            name: self.name.clone(),
            calories: self.calories,
            protein_g: self.protein_g,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutLog {
    pub id: i64,
    pub date: NaiveDate,
    pub workout_type: String,
    pub minutes: i64,
    pub calories: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub date: NaiveDate,
    pub workout_type: String,
    pub minutes: i64,
    pub calories: i64,
    pub notes: Option<String>,
}

/// A full replacement of a day's user-entered fields, as submitted by the day form.
///
/// `cal_target` and `prot_target` are the exception: `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct DayUpdate {
    pub weight_am: Option<f64>,
    pub waist_in: Option<f64>,
    pub walking_miles: Option<f64>,
    pub active_calories: Option<i64>,
    pub walk_done: bool,
    pub lift_done: bool,
    pub if_done: bool,
    pub rings_closed: bool,
    pub cal_target: Option<i64>,
    pub prot_target: Option<i64>,
    pub notes: Option<String>,
}

/// A dated weight reading taken from a day log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightPoint {
    pub date: NaiveDate,
    pub weight: f64,
}

// --- Permissive form parsing ---

/// Trimmed text, or `None` when the field is missing or blank.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

pub fn parse_optional_f64(value: Option<&str>) -> Result<Option<f64>> {
    non_blank(value)
        .map(|v| {
            v.parse::<f64>()
                .with_context(|| format!("Invalid number '{v}'"))
        })
        .transpose()
}

pub fn parse_optional_i64(value: Option<&str>) -> Result<Option<i64>> {
    non_blank(value)
        .map(|v| {
            v.parse::<i64>()
                .with_context(|| format!("Invalid whole number '{v}'"))
        })
        .transpose()
}

pub fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    non_blank(value)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{v}'. Use YYYY-MM-DD"))
        })
        .transpose()
}

/// HTML checkbox semantics: checked boxes submit `on`, unchecked ones submit nothing.
#[must_use]
pub fn parse_checkbox(value: Option<&str>) -> bool {
    value == Some("on")
}

/// Zero is treated like a blank field for targets and goal weights.
#[must_use]
pub fn non_zero_i64(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v != 0)
}

#[must_use]
pub fn non_zero_f64(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.abs() > f64::EPSILON)
}

/// Truncate to at most `max` characters without splitting a code point.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
