use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{
    DEFAULT_CAL_TARGET, DEFAULT_PROT_TARGET, DayLog, DayUpdate, Meal, NewMeal, NewSavedMeal,
    NewWorkout, SavedMeal, Settings, WeightPoint, WorkoutLog,
};

const DAY_LOG_COLUMNS: &str = "id, date, weight_am, waist_in, calories_total, protein_g_total,
     walk_done, lift_done, if_done, rings_closed, walking_miles, active_calories,
     cal_target, prot_target, notes";

const MEAL_COLUMNS: &str = "id, date, time, name, calories, protein_g, created_at";

const WORKOUT_COLUMNS: &str = "id, date, workout_type, minutes, calories, notes, created_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS day_logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date TEXT NOT NULL UNIQUE,
                    weight_am REAL,
                    waist_in REAL,
                    calories_total INTEGER,
                    protein_g_total INTEGER,
                    walk_done INTEGER NOT NULL DEFAULT 0,
                    lift_done INTEGER NOT NULL DEFAULT 0,
                    if_done INTEGER NOT NULL DEFAULT 0,
                    rings_closed INTEGER NOT NULL DEFAULT 0,
                    walking_miles REAL,
                    active_calories INTEGER,
                    cal_target INTEGER DEFAULT 2000,
                    prot_target INTEGER DEFAULT 190,
                    notes TEXT
                );

                CREATE TABLE IF NOT EXISTS settings (
                    id INTEGER PRIMARY KEY,
                    start_weight REAL NOT NULL,
                    goal_weight REAL NOT NULL,
                    goal_date TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS meals (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date TEXT NOT NULL,
                    time TEXT,
                    name TEXT NOT NULL,
                    calories INTEGER,
                    protein_g INTEGER,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS saved_meals (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    calories INTEGER,
                    protein_g INTEGER,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS workout_logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date TEXT NOT NULL,
                    workout_type TEXT NOT NULL,
                    minutes INTEGER NOT NULL DEFAULT 0,
                    calories INTEGER NOT NULL DEFAULT 0,
                    notes TEXT,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_meals_date ON meals(date);
                CREATE INDEX IF NOT EXISTS idx_workout_logs_date ON workout_logs(date);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
        let raw: String = row.get(idx)?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    }

    // Expects DAY_LOG_COLUMNS order.
    fn day_log_from_row(row: &rusqlite::Row) -> rusqlite::Result<DayLog> {
        Ok(DayLog {
            id: row.get(0)?,
            date: Self::date_column(row, 1)?,
            weight_am: row.get(2)?,
            waist_in: row.get(3)?,
            calories_total: row.get(4)?,
            protein_g_total: row.get(5)?,
            walk_done: row.get(6)?,
            lift_done: row.get(7)?,
            if_done: row.get(8)?,
            rings_closed: row.get(9)?,
            walking_miles: row.get(10)?,
            active_calories: row.get(11)?,
            cal_target: row.get(12)?,
            prot_target: row.get(13)?,
            notes: row.get(14)?,
        })
    }

    fn meal_from_row(row: &rusqlite::Row) -> rusqlite::Result<Meal> {
        Ok(Meal {
            id: row.get(0)?,
            date: Self::date_column(row, 1)?,
            time: row.get(2)?,
            name: row.get(3)?,
            calories: row.get(4)?,
            protein_g: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn saved_meal_from_row(row: &rusqlite::Row) -> rusqlite::Result<SavedMeal> {
        Ok(SavedMeal {
            id: row.get(0)?,
            name: row.get(1)?,
            calories: row.get(2)?,
            protein_g: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn workout_from_row(row: &rusqlite::Row) -> rusqlite::Result<WorkoutLog> {
        Ok(WorkoutLog {
            id: row.get(0)?,
            date: Self::date_column(row, 1)?,
            workout_type: row.get(2)?,
            minutes: row.get(3)?,
            calories: row.get(4)?,
            notes: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    // --- Day logs ---

    pub fn get_day(&self, date: NaiveDate) -> Result<Option<DayLog>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let log = self
            .conn
            .query_row(
                &format!("SELECT {DAY_LOG_COLUMNS} FROM day_logs WHERE date = ?1"),
                params![date_str],
                Self::day_log_from_row,
            )
            .optional()?;
        Ok(log)
    }

    /// Return the log for `date`, inserting one with default targets if none exists.
    pub fn find_or_insert_day(&self, date: NaiveDate) -> Result<DayLog> {
        let date_str = date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO day_logs (date, cal_target, prot_target) VALUES (?1, ?2, ?3)
             ON CONFLICT(date) DO NOTHING",
            params![date_str, DEFAULT_CAL_TARGET, DEFAULT_PROT_TARGET],
        )?;
        self.get_day(date)?
            .context("Day log not found after insert")
    }

    /// Overwrite the user-entered fields of a day. Totals are left to `recalc_totals`.
    pub fn update_day(&self, date: NaiveDate, update: &DayUpdate) -> Result<DayLog> {
        let log = self.find_or_insert_day(date)?;
        self.conn.execute(
            "UPDATE day_logs SET
                weight_am = ?1,
                waist_in = ?2,
                walking_miles = ?3,
                active_calories = ?4,
                walk_done = ?5,
                lift_done = ?6,
                if_done = ?7,
                rings_closed = ?8,
                cal_target = COALESCE(?9, cal_target),
                prot_target = COALESCE(?10, prot_target),
                notes = ?11
             WHERE id = ?12",
            params![
                update.weight_am,
                update.waist_in,
                update.walking_miles,
                update.active_calories,
                update.walk_done,
                update.lift_done,
                update.if_done,
                update.rings_closed,
                update.cal_target,
                update.prot_target,
                update.notes,
                log.id,
            ],
        )?;
        self.get_day(date)?.context("Day log not found")
    }

    /// Re-derive a day's calorie and protein totals from its meals.
    ///
    /// Missing meal values count as zero; a day without meals gets (0, 0).
    pub fn recalc_totals(&self, date: NaiveDate) -> Result<DayLog> {
        let log = self.find_or_insert_day(date)?;
        let date_str = date.format("%Y-%m-%d").to_string();
        let (calories, protein): (i64, i64) = self.conn.query_row(
            "SELECT COALESCE(SUM(calories), 0), COALESCE(SUM(protein_g), 0)
             FROM meals WHERE date = ?1",
            params![date_str],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        self.conn.execute(
            "UPDATE day_logs SET calories_total = ?1, protein_g_total = ?2 WHERE id = ?3",
            params![calories, protein, log.id],
        )?;
        self.get_day(date)?.context("Day log not found")
    }

    /// Day logs on or after `start`, oldest first.
    pub fn day_logs_since(&self, start: NaiveDate) -> Result<Vec<DayLog>> {
        let start_str = start.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DAY_LOG_COLUMNS} FROM day_logs WHERE date >= ?1 ORDER BY date ASC"
        ))?;
        let logs = stmt
            .query_map(params![start_str], Self::day_log_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    pub fn all_day_logs(&self) -> Result<Vec<DayLog>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DAY_LOG_COLUMNS} FROM day_logs ORDER BY date ASC"
        ))?;
        let logs = stmt
            .query_map([], Self::day_log_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    fn weight_point(&self, order: &str) -> Result<Option<WeightPoint>> {
        let point = self
            .conn
            .query_row(
                &format!(
                    "SELECT date, weight_am FROM day_logs
                     WHERE weight_am IS NOT NULL ORDER BY date {order} LIMIT 1"
                ),
                [],
                |row| {
                    Ok(WeightPoint {
                        date: Self::date_column(row, 0)?,
                        weight: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(point)
    }

    pub fn first_weight(&self) -> Result<Option<WeightPoint>> {
        self.weight_point("ASC")
    }

    pub fn latest_weight(&self) -> Result<Option<WeightPoint>> {
        self.weight_point("DESC")
    }

    // --- Meals ---

    pub fn insert_meal(&self, meal: &NewMeal) -> Result<Meal> {
        let now = Local::now().to_rfc3339();
        let date_str = meal.date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO meals (date, time, name, calories, protein_g, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                date_str,
                meal.time,
                meal.name,
                meal.calories,
                meal.protein_g,
                now
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_meal(id)
    }

    pub fn get_meal(&self, id: i64) -> Result<Meal> {
        self.conn
            .query_row(
                &format!("SELECT {MEAL_COLUMNS} FROM meals WHERE id = ?1"),
                params![id],
                Self::meal_from_row,
            )
            .context("Meal not found")
    }

    pub fn delete_meal(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM meals WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Meals for a day, most recently logged first.
    pub fn meals_for_date(&self, date: NaiveDate) -> Result<Vec<Meal>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals WHERE date = ?1 ORDER BY id DESC"
        ))?;
        let meals = stmt
            .query_map(params![date_str], Self::meal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(meals)
    }

    // --- Saved meals ---

    pub fn insert_saved_meal(&self, meal: &NewSavedMeal) -> Result<SavedMeal> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO saved_meals (name, calories, protein_g, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![meal.name, meal.calories, meal.protein_g, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_saved_meal(id)
    }

    pub fn get_saved_meal(&self, id: i64) -> Result<SavedMeal> {
        self.conn
            .query_row(
                "SELECT id, name, calories, protein_g, created_at FROM saved_meals WHERE id = ?1",
                params![id],
                Self::saved_meal_from_row,
            )
            .context("Saved meal not found")
    }

    pub fn delete_saved_meal(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM saved_meals WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn list_saved_meals(&self) -> Result<Vec<SavedMeal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, calories, protein_g, created_at FROM saved_meals
             ORDER BY id DESC",
        )?;
        let meals = stmt
            .query_map([], Self::saved_meal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(meals)
    }

    // --- Workouts ---

    pub fn insert_workout(&self, workout: &NewWorkout) -> Result<WorkoutLog> {
        let now = Local::now().to_rfc3339();
        let date_str = workout.date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO workout_logs (date, workout_type, minutes, calories, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                date_str,
                workout.workout_type,
                workout.minutes,
                workout.calories,
                workout.notes,
                now
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.conn
            .query_row(
                &format!("SELECT {WORKOUT_COLUMNS} FROM workout_logs WHERE id = ?1"),
                params![id],
                Self::workout_from_row,
            )
            .context("Workout not found after insert")
    }

    pub fn workouts_for_date(&self, date: NaiveDate) -> Result<Vec<WorkoutLog>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workout_logs WHERE date = ?1
             ORDER BY id DESC"
        ))?;
        let workouts = stmt
            .query_map(params![date_str], Self::workout_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(workouts)
    }

    // --- Settings ---

    pub fn get_settings(&self) -> Result<Option<Settings>> {
        let settings = self
            .conn
            .query_row(
                "SELECT start_weight, goal_weight, goal_date FROM settings ORDER BY id LIMIT 1",
                [],
                |row| {
                    Ok(Settings {
                        start_weight: row.get(0)?,
                        goal_weight: row.get(1)?,
                        goal_date: Self::date_column(row, 2)?,
                    })
                },
            )
            .optional()?;
        Ok(settings)
    }

    /// Load the settings row, inserting defaults computed from `today` if absent.
    pub fn load_settings(&self, today: NaiveDate) -> Result<Settings> {
        if let Some(settings) = self.get_settings()? {
            return Ok(settings);
        }
        let settings = Settings::defaults(today);
        self.save_settings(&settings)?;
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let goal_date = settings.goal_date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO settings (id, start_weight, goal_weight, goal_date)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                start_weight = excluded.start_weight,
                goal_weight = excluded.goal_weight,
                goal_date = excluded.goal_date",
            params![settings.start_weight, settings.goal_weight, goal_date],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn meal(day: NaiveDate, name: &str, calories: Option<i64>, protein_g: Option<i64>) -> NewMeal {
        NewMeal {
            date: day,
            time: None,
            name: name.to_string(),
            calories,
            protein_g,
        }
    }

    fn set_weight(db: &Database, day: NaiveDate, weight: f64) {
        db.update_day(
            day,
            &DayUpdate {
                weight_am: Some(weight),
                ..DayUpdate::default()
            },
        )
        .unwrap();
    }

    #[test]
    fn test_find_or_insert_day_creates_with_defaults() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        assert!(db.get_day(day).unwrap().is_none());

        let log = db.find_or_insert_day(day).unwrap();
        assert_eq!(log.date, day);
        assert_eq!(log.cal_target, Some(2000));
        assert_eq!(log.prot_target, Some(190));
        assert!(log.calories_total.is_none());
        assert!(!log.rings_closed);
    }

    #[test]
    fn test_find_or_insert_day_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let first = db.find_or_insert_day(day).unwrap();
        let second = db.find_or_insert_day(day).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(db.all_day_logs().unwrap().len(), 1);
    }

    #[test]
    fn test_update_day_overwrites_fields() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let log = db
            .update_day(
                day,
                &DayUpdate {
                    weight_am: Some(221.4),
                    waist_in: Some(40.5),
                    walking_miles: Some(3.2),
                    active_calories: Some(540),
                    walk_done: true,
                    lift_done: false,
                    if_done: true,
                    rings_closed: true,
                    cal_target: Some(1800),
                    prot_target: None,
                    notes: Some("felt good".to_string()),
                },
            )
            .unwrap();

        assert_eq!(log.weight_am, Some(221.4));
        assert_eq!(log.waist_in, Some(40.5));
        assert_eq!(log.walking_miles, Some(3.2));
        assert_eq!(log.active_calories, Some(540));
        assert!(log.walk_done);
        assert!(!log.lift_done);
        assert!(log.if_done);
        assert!(log.rings_closed);
        assert_eq!(log.cal_target, Some(1800));
        // None keeps the stored target
        assert_eq!(log.prot_target, Some(190));
        assert_eq!(log.notes.as_deref(), Some("felt good"));
    }

    #[test]
    fn test_update_day_clears_unset_fields() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        set_weight(&db, day, 220.0);
        let log = db.update_day(day, &DayUpdate::default()).unwrap();
        assert!(log.weight_am.is_none());
        assert_eq!(log.cal_target, Some(2000));
    }

    #[test]
    fn test_recalc_totals_sums_meals() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        db.insert_meal(&meal(day, "Shake", Some(200), Some(30)))
            .unwrap();
        db.insert_meal(&meal(day, "Chicken bowl", Some(500), Some(50)))
            .unwrap();
        // Another day must not leak in
        db.insert_meal(&meal(date(2024, 6, 16), "Steak", Some(600), Some(55)))
            .unwrap();

        let log = db.recalc_totals(day).unwrap();
        assert_eq!(log.calories_total, Some(700));
        assert_eq!(log.protein_g_total, Some(80));
    }

    #[test]
    fn test_recalc_totals_treats_missing_as_zero() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        db.insert_meal(&meal(day, "Coffee", None, None)).unwrap();
        db.insert_meal(&meal(day, "Tuna", Some(250), None)).unwrap();
        db.insert_meal(&meal(day, "Whey", None, Some(30))).unwrap();

        let log = db.recalc_totals(day).unwrap();
        assert_eq!(log.calories_total, Some(250));
        assert_eq!(log.protein_g_total, Some(30));
    }

    #[test]
    fn test_recalc_totals_empty_day_is_zero() {
        let db = Database::open_in_memory().unwrap();
        let log = db.recalc_totals(date(2024, 6, 15)).unwrap();
        assert_eq!(log.calories_total, Some(0));
        assert_eq!(log.protein_g_total, Some(0));
    }

    #[test]
    fn test_recalc_after_delete() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let shake = db
            .insert_meal(&meal(day, "Shake", Some(200), Some(30)))
            .unwrap();
        db.insert_meal(&meal(day, "Yogurt", Some(300), Some(35)))
            .unwrap();
        db.recalc_totals(day).unwrap();

        assert!(db.delete_meal(shake.id).unwrap());
        let log = db.recalc_totals(day).unwrap();
        assert_eq!(log.calories_total, Some(300));
        assert_eq!(log.protein_g_total, Some(35));
    }

    #[test]
    fn test_get_meal_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_meal(99).is_err());
        assert!(!db.delete_meal(99).unwrap());
    }

    #[test]
    fn test_meals_for_date_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        db.insert_meal(&meal(day, "First", Some(100), None)).unwrap();
        db.insert_meal(&meal(day, "Second", Some(100), None))
            .unwrap();

        let meals = db.meals_for_date(day).unwrap();
        assert_eq!(meals.len(), 2);
        assert_eq!(meals[0].name, "Second");
        assert_eq!(meals[1].name, "First");
    }

    #[test]
    fn test_day_logs_since_is_ascending_and_bounded() {
        let db = Database::open_in_memory().unwrap();
        db.find_or_insert_day(date(2024, 6, 20)).unwrap();
        db.find_or_insert_day(date(2024, 6, 1)).unwrap();
        db.find_or_insert_day(date(2024, 6, 10)).unwrap();

        let logs = db.day_logs_since(date(2024, 6, 10)).unwrap();
        let dates: Vec<NaiveDate> = logs.iter().map(|l| l.date).collect();
        assert_eq!(dates, vec![date(2024, 6, 10), date(2024, 6, 20)]);
    }

    #[test]
    fn test_first_and_latest_weight() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.first_weight().unwrap().is_none());
        assert!(db.latest_weight().unwrap().is_none());

        set_weight(&db, date(2024, 6, 10), 224.0);
        set_weight(&db, date(2024, 6, 1), 226.0);
        set_weight(&db, date(2024, 6, 12), 222.5);
        // A day without weight is skipped
        db.find_or_insert_day(date(2024, 6, 14)).unwrap();

        let first = db.first_weight().unwrap().unwrap();
        assert_eq!(first.date, date(2024, 6, 1));
        assert!((first.weight - 226.0).abs() < f64::EPSILON);

        let latest = db.latest_weight().unwrap().unwrap();
        assert_eq!(latest.date, date(2024, 6, 12));
        assert!((latest.weight - 222.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_saved_meal_crud() {
        let db = Database::open_in_memory().unwrap();
        let saved = db
            .insert_saved_meal(&NewSavedMeal {
                name: "Tuna pack + apple".to_string(),
                calories: Some(250),
                protein_g: Some(30),
            })
            .unwrap();
        assert_eq!(saved.name, "Tuna pack + apple");

        let fetched = db.get_saved_meal(saved.id).unwrap();
        assert_eq!(fetched.calories, Some(250));
        assert_eq!(db.list_saved_meals().unwrap().len(), 1);

        assert!(db.delete_saved_meal(saved.id).unwrap());
        assert!(!db.delete_saved_meal(saved.id).unwrap());
        assert!(db.get_saved_meal(saved.id).is_err());
    }

    #[test]
    fn test_workouts_for_date() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        db.insert_workout(&NewWorkout {
            date: day,
            workout_type: "Walk".to_string(),
            minutes: 45,
            calories: 220,
            notes: None,
        })
        .unwrap();
        db.insert_workout(&NewWorkout {
            date: day,
            workout_type: "Lift".to_string(),
            minutes: 20,
            calories: 120,
            notes: Some("upper body".to_string()),
        })
        .unwrap();
        db.insert_workout(&NewWorkout {
            date: date(2024, 6, 16),
            workout_type: "Swim".to_string(),
            minutes: 30,
            calories: 300,
            notes: None,
        })
        .unwrap();

        let workouts = db.workouts_for_date(day).unwrap();
        assert_eq!(workouts.len(), 2);
        assert_eq!(workouts[0].workout_type, "Lift");
        assert_eq!(workouts[0].notes.as_deref(), Some("upper body"));
    }

    #[test]
    fn test_load_settings_inserts_defaults_once() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_settings().unwrap().is_none());

        let settings = db.load_settings(date(2024, 3, 1)).unwrap();
        assert!((settings.start_weight - 225.0).abs() < f64::EPSILON);
        assert!((settings.goal_weight - 190.0).abs() < f64::EPSILON);
        assert_eq!(settings.goal_date, date(2024, 6, 1));

        // A later load keeps the stored goal date instead of recomputing it
        let again = db.load_settings(date(2024, 9, 1)).unwrap();
        assert_eq!(again.goal_date, date(2024, 6, 1));
    }

    #[test]
    fn test_save_settings_updates_singleton() {
        let db = Database::open_in_memory().unwrap();
        db.load_settings(date(2024, 3, 1)).unwrap();
        db.save_settings(&Settings {
            start_weight: 230.0,
            goal_weight: 185.0,
            goal_date: date(2024, 12, 31),
        })
        .unwrap();

        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        let settings = db.get_settings().unwrap().unwrap();
        assert!((settings.start_weight - 230.0).abs() < f64::EPSILON);
        assert_eq!(settings.goal_date, date(2024, 12, 31));
    }

    #[test]
    fn test_migration_sets_user_version() {
        let db = Database::open_in_memory().unwrap();
        let version: i64 = db
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_open_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fittrack.db");

        {
            let db = Database::open(&path).unwrap();
            set_weight(&db, date(2024, 6, 15), 221.0);
        }
        let db = Database::open(&path).unwrap();
        let log = db.get_day(date(2024, 6, 15)).unwrap().unwrap();
        assert_eq!(log.weight_am, Some(221.0));
    }
}
