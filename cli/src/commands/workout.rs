use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fittrack_core::models::NewWorkout;
use fittrack_core::service::Tracker;

use super::helpers::{json_error, parse_date, print_json, truncate};

pub(crate) struct WorkoutArgs {
    pub date: Option<String>,
    pub workout_type: String,
    pub minutes: i64,
    pub calories: i64,
    pub notes: Option<String>,
}

pub(crate) fn cmd_workout_add(tracker: &Tracker, args: WorkoutArgs, json: bool) -> Result<()> {
    let workout = NewWorkout {
        date: parse_date(args.date)?,
        workout_type: args.workout_type,
        minutes: args.minutes,
        calories: args.calories,
        notes: args.notes,
    };

    match tracker.add_workout(&workout)? {
        Some(saved) if json => print_json(&saved)?,
        Some(saved) => println!(
            "Logged {} — {} min, {} kcal on {}",
            saved.workout_type,
            saved.minutes,
            saved.calories,
            saved.date.format("%Y-%m-%d")
        ),
        None if json => println!("{}", json_error("Workout type is empty, nothing logged")),
        None => eprintln!("Workout type is empty, nothing logged"),
    }
    Ok(())
}

pub(crate) fn cmd_workout_list(tracker: &Tracker, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let view = tracker.workouts(date)?;

    if json {
        return print_json(&view);
    }
    if view.workouts.is_empty() {
        eprintln!("No workouts for {}", date.format("%Y-%m-%d"));
        return Ok(());
    }

    #[derive(Tabled)]
    struct WorkoutRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Type")]
        workout_type: String,
        #[tabled(rename = "Minutes")]
        minutes: i64,
        #[tabled(rename = "kcal")]
        calories: i64,
        #[tabled(rename = "Notes")]
        notes: String,
    }

    let rows: Vec<WorkoutRow> = view
        .workouts
        .iter()
        .map(|w| WorkoutRow {
            id: w.id,
            workout_type: w.workout_type.clone(),
            minutes: w.minutes,
            calories: w.calories,
            notes: w.notes.as_deref().map(|n| truncate(n, 40)).unwrap_or_default(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    println!(
        "  TOTAL: {} min, {} kcal",
        view.total_minutes, view.total_calories
    );

    Ok(())
}
