use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fittrack_core::models::NewSavedMeal;
use fittrack_core::service::Tracker;

use super::helpers::{fmt_opt_int, json_error, parse_date, print_json, truncate};

fn not_found(id: i64, json: bool) -> ! {
    if json {
        println!("{}", json_error(&format!("Saved meal {id} not found")));
    } else {
        eprintln!("Saved meal {id} not found");
    }
    process::exit(2);
}

pub(crate) fn cmd_saved_list(tracker: &Tracker, json: bool) -> Result<()> {
    let saved = tracker.saved_meals()?;

    if json {
        return print_json(&saved);
    }
    if saved.is_empty() {
        eprintln!("No saved meals. Use `fittrack saved add` to create one.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct SavedRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "kcal")]
        calories: String,
        #[tabled(rename = "Protein (g)")]
        protein: String,
    }

    let rows: Vec<SavedRow> = saved
        .iter()
        .map(|m| SavedRow {
            id: m.id,
            name: truncate(&m.name, 40),
            calories: fmt_opt_int(m.calories),
            protein: fmt_opt_int(m.protein_g),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_saved_add(
    tracker: &Tracker,
    name: String,
    calories: Option<i64>,
    protein: Option<i64>,
    json: bool,
) -> Result<()> {
    let meal = NewSavedMeal {
        name,
        calories,
        protein_g: protein,
    };
    match tracker.add_saved_meal(&meal)? {
        Some(saved) if json => print_json(&saved)?,
        Some(saved) => println!("Saved [{}] {}", saved.id, saved.name),
        None if json => println!("{}", json_error("Saved meal name is empty, nothing saved")),
        None => eprintln!("Saved meal name is empty, nothing saved"),
    }
    Ok(())
}

pub(crate) fn cmd_saved_delete(tracker: &Tracker, id: i64, json: bool) -> Result<()> {
    if tracker.saved_meal(id).is_err() {
        not_found(id, json);
    }
    tracker.delete_saved_meal(id)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted saved meal {id}");
    }
    Ok(())
}

pub(crate) fn cmd_saved_log(
    tracker: &Tracker,
    id: i64,
    date: Option<String>,
    time: Option<&str>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    if tracker.saved_meal(id).is_err() {
        not_found(id, json);
    }
    let meal = tracker.log_saved_meal(id, date, time)?;

    if json {
        print_json(&meal)
    } else {
        println!(
            "Logged [{}] {} on {}",
            meal.id,
            meal.name,
            meal.date.format("%Y-%m-%d")
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_saved_add_then_log() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let tracker = Tracker::open_in_memory(date).unwrap();
        cmd_saved_add(
            &tracker,
            "Protein Shake".to_string(),
            Some(200),
            Some(30),
            true,
        )
        .unwrap();
        let saved = tracker.saved_meals().unwrap();
        assert_eq!(saved.len(), 1);

        cmd_saved_log(
            &tracker,
            saved[0].id,
            Some("2024-06-15".to_string()),
            None,
            true,
        )
        .unwrap();
        let log = tracker.day_view(date).unwrap().log;
        assert_eq!(log.protein_g_total, Some(30));

        cmd_saved_delete(&tracker, saved[0].id, true).unwrap();
        assert!(tracker.saved_meals().unwrap().is_empty());
    }

    #[test]
    fn test_saved_add_blank_name_saves_nothing() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let tracker = Tracker::open_in_memory(date).unwrap();
        cmd_saved_add(&tracker, "  ".to_string(), Some(100), None, false).unwrap();
        assert!(tracker.saved_meals().unwrap().is_empty());
    }
}
