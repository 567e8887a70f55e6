use std::path::Path;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::export;
use crate::models::{
    DayLog, DayUpdate, Meal, NewMeal, NewSavedMeal, NewWorkout, QUICK_ADD_NAME, SavedMeal,
    Settings, SettingsUpdate, WORKOUT_NOTES_MAX, WorkoutLog, non_blank, non_zero_i64,
    truncate_chars,
};
use crate::projection::{Projection, project};
use crate::score::compliance_score;
use crate::suggest::{self, MealSuggestions, QUICK_ADD_PRESETS, QuickAddPreset};
use crate::weekly::{
    BodyTrend, DASHBOARD_TREND_DAYS, DashboardTrend, WEEKLY_LOOKBACK_DAYS, WEEKLY_TREND_DAYS,
    WeeklySummary, weekly_summaries, window_start,
};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub today: DayLog,
    pub meals: Vec<Meal>,
    /// Calories over (+) or under (-) target.
    pub cal_delta: i64,
    pub prot_delta: i64,
    pub score: u8,
    pub trend: DashboardTrend,
    pub projection: Projection,
    pub quick_add: Vec<QuickAddPreset>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub log: DayLog,
    pub meals: Vec<Meal>,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyView {
    pub weeks: Vec<WeeklySummary>,
    pub trend: BodyTrend,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutsView {
    pub date: NaiveDate,
    pub workouts: Vec<WorkoutLog>,
    pub total_minutes: i64,
    pub total_calories: i64,
}

/// Front door for every read and write: mutations go through here so day
/// totals are recomputed before anything is shown.
pub struct Tracker {
    db: Database,
    settings: Settings,
}

impl Tracker {
    pub fn open(path: &Path, today: NaiveDate) -> Result<Self> {
        Self::with_database(Database::open(path)?, today)
    }

    pub fn open_in_memory(today: NaiveDate) -> Result<Self> {
        Self::with_database(Database::open_in_memory()?, today)
    }

    fn with_database(db: Database, today: NaiveDate) -> Result<Self> {
        let settings = db.load_settings(today)?;
        Ok(Self { db, settings })
    }

    // --- Views ---

    pub fn dashboard(&self, today: NaiveDate) -> Result<DashboardView> {
        let log = self.db.recalc_totals(today)?;
        let meals = self.db.meals_for_date(today)?;
        let trend_logs = self
            .db
            .day_logs_since(window_start(today, DASHBOARD_TREND_DAYS))?;
        let projection = project(
            &self.settings,
            self.db.first_weight()?,
            self.db.latest_weight()?,
            today,
        );

        Ok(DashboardView {
            cal_delta: log.calories_total.unwrap_or_default() - log.cal_target.unwrap_or_default(),
            prot_delta: log.protein_g_total.unwrap_or_default()
                - log.prot_target.unwrap_or_default(),
            score: compliance_score(&log),
            trend: DashboardTrend::from_logs(
                &trend_logs,
                self.settings.start_weight,
                self.settings.goal_weight,
            ),
            projection,
            quick_add: QUICK_ADD_PRESETS.to_vec(),
            today: log,
            meals,
        })
    }

    pub fn day_view(&self, date: NaiveDate) -> Result<DayView> {
        let log = self.db.recalc_totals(date)?;
        let meals = self.db.meals_for_date(date)?;
        Ok(DayView {
            score: compliance_score(&log),
            log,
            meals,
        })
    }

    pub fn weekly(&self, today: NaiveDate) -> Result<WeeklyView> {
        let logs = self
            .db
            .day_logs_since(window_start(today, WEEKLY_LOOKBACK_DAYS))?;
        let trend_logs = self
            .db
            .day_logs_since(window_start(today, WEEKLY_TREND_DAYS))?;
        Ok(WeeklyView {
            weeks: weekly_summaries(&logs),
            trend: BodyTrend::from_logs(&trend_logs),
        })
    }

    pub fn meal_suggestions(&self, today: NaiveDate) -> Result<MealSuggestions> {
        let log = self.db.recalc_totals(today)?;
        Ok(suggest::meal_suggestions(&log))
    }

    pub fn export_csv(&self) -> Result<String> {
        export::export_csv(&self.db.all_day_logs()?)
    }

    // --- Day logs ---

    /// Apply a day form. Zero targets keep the stored ones; blank notes clear them,
    /// other notes are stored as typed.
    pub fn update_day(&self, date: NaiveDate, update: &DayUpdate) -> Result<DayLog> {
        let update = DayUpdate {
            cal_target: non_zero_i64(update.cal_target),
            prot_target: non_zero_i64(update.prot_target),
            notes: update.notes.clone().filter(|n| !n.trim().is_empty()),
            ..update.clone()
        };
        self.db.update_day(date, &update)?;
        self.db.recalc_totals(date)
    }

    // --- Meals ---

    /// Log a meal. Returns `None` without writing when the name is blank.
    pub fn add_meal(&self, meal: &NewMeal) -> Result<Option<Meal>> {
        let Some(name) = non_blank(Some(&meal.name)) else {
            return Ok(None);
        };
        let saved = self.db.insert_meal(&NewMeal {
            name,
            time: non_blank(meal.time.as_deref()),
            ..meal.clone()
        })?;
        self.db.recalc_totals(saved.date)?;
        Ok(Some(saved))
    }

    /// Like [`Tracker::add_meal`], but a blank name falls back to "Quick add".
    pub fn quick_add_meal(&self, meal: &NewMeal) -> Result<Meal> {
        let name = non_blank(Some(&meal.name)).unwrap_or_else(|| QUICK_ADD_NAME.to_string());
        let saved = self.db.insert_meal(&NewMeal {
            name,
            time: non_blank(meal.time.as_deref()),
            ..meal.clone()
        })?;
        self.db.recalc_totals(saved.date)?;
        Ok(saved)
    }

    pub fn meal(&self, id: i64) -> Result<Meal> {
        self.db.get_meal(id)
    }

    pub fn meals_for_date(&self, date: NaiveDate) -> Result<Vec<Meal>> {
        self.db.meals_for_date(date)
    }

    /// Delete a meal and recompute its day. Returns the deleted meal.
    pub fn delete_meal(&self, id: i64) -> Result<Meal> {
        let meal = self.db.get_meal(id)?;
        if !self.db.delete_meal(id)? {
            bail!("Meal not found");
        }
        self.db.recalc_totals(meal.date)?;
        Ok(meal)
    }

    // --- Saved meals ---

    pub fn saved_meals(&self) -> Result<Vec<SavedMeal>> {
        self.db.list_saved_meals()
    }

    pub fn saved_meal(&self, id: i64) -> Result<SavedMeal> {
        self.db.get_saved_meal(id)
    }

    /// Save a meal template. Returns `None` without writing when the name is blank.
    pub fn add_saved_meal(&self, meal: &NewSavedMeal) -> Result<Option<SavedMeal>> {
        let Some(name) = non_blank(Some(&meal.name)) else {
            return Ok(None);
        };
        self.db
            .insert_saved_meal(&NewSavedMeal {
                name,
                ..meal.clone()
            })
            .map(Some)
    }

    pub fn delete_saved_meal(&self, id: i64) -> Result<()> {
        if !self.db.delete_saved_meal(id)? {
            bail!("Saved meal not found");
        }
        Ok(())
    }

    /// Copy a saved meal into `date`'s meals.
    pub fn log_saved_meal(&self, id: i64, date: NaiveDate, time: Option<&str>) -> Result<Meal> {
        let saved = self.db.get_saved_meal(id)?;
        let meal = self
            .db
            .insert_meal(&saved.to_new_meal(date, non_blank(time)))?;
        self.db.recalc_totals(date)?;
        Ok(meal)
    }

    // --- Workouts ---

    pub fn workouts(&self, date: NaiveDate) -> Result<WorkoutsView> {
        let workouts = self.db.workouts_for_date(date)?;
        Ok(WorkoutsView {
            date,
            total_minutes: workouts.iter().map(|w| w.minutes).sum(),
            total_calories: workouts.iter().map(|w| w.calories).sum(),
            workouts,
        })
    }

    /// Log a workout. Returns `None` without writing when the type is blank.
    pub fn add_workout(&self, workout: &NewWorkout) -> Result<Option<WorkoutLog>> {
        let Some(workout_type) = non_blank(Some(&workout.workout_type)) else {
            return Ok(None);
        };
        let notes = non_blank(workout.notes.as_deref())
            .map(|n| truncate_chars(&n, WORKOUT_NOTES_MAX));
        self.db
            .insert_workout(&NewWorkout {
                workout_type,
                notes,
                ..workout.clone()
            })
            .map(Some)
    }

    // --- Settings ---

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn update_settings(&mut self, update: &SettingsUpdate) -> Result<&Settings> {
        let next = update.apply(&self.settings);
        self.db.save_settings(&next)?;
        self.settings = next;
        Ok(&self.settings)
    }
}
