use anyhow::Result;
use std::process;

use fittrack_core::models::{Meal, NewMeal};
use fittrack_core::service::Tracker;

use super::helpers::{fmt_opt_int, json_error, parse_date, print_json};

pub(crate) struct MealArgs {
    pub date: Option<String>,
    pub time: Option<String>,
    pub name: String,
    pub calories: Option<i64>,
    pub protein: Option<i64>,
}

impl MealArgs {
    fn into_new_meal(self) -> Result<NewMeal> {
        Ok(NewMeal {
            date: parse_date(self.date)?,
            time: self.time,
            name: self.name,
            calories: self.calories,
            protein_g: self.protein,
        })
    }
}

fn print_logged(meal: &Meal) {
    println!(
        "Logged [{}] {} — {} kcal, {} g protein on {}",
        meal.id,
        meal.name,
        fmt_opt_int(meal.calories),
        fmt_opt_int(meal.protein_g),
        meal.date.format("%Y-%m-%d")
    );
}

pub(crate) fn cmd_meal_add(tracker: &Tracker, args: MealArgs, json: bool) -> Result<()> {
    let meal = args.into_new_meal()?;
    match tracker.add_meal(&meal)? {
        Some(saved) if json => print_json(&saved)?,
        Some(saved) => print_logged(&saved),
        None if json => println!("{}", json_error("Meal name is empty, nothing logged")),
        None => eprintln!("Meal name is empty, nothing logged"),
    }
    Ok(())
}

pub(crate) fn cmd_meal_quick_add(tracker: &Tracker, args: MealArgs, json: bool) -> Result<()> {
    let meal = args.into_new_meal()?;
    let saved = tracker.quick_add_meal(&meal)?;
    if json {
        print_json(&saved)
    } else {
        print_logged(&saved);
        Ok(())
    }
}

pub(crate) fn cmd_meal_delete(tracker: &Tracker, id: i64, json: bool) -> Result<()> {
    if tracker.meal(id).is_err() {
        if json {
            println!("{}", json_error(&format!("Meal {id} not found")));
        } else {
            eprintln!("Meal {id} not found");
        }
        process::exit(2);
    }

    let meal = tracker.delete_meal(id)?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "deleted": id, "date": meal.date.format("%Y-%m-%d").to_string() })
        );
    } else {
        println!("Deleted meal {id} ({})", meal.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn args(name: &str) -> MealArgs {
        MealArgs {
            date: Some("2024-06-15".to_string()),
            time: Some("12:30".to_string()),
            name: name.to_string(),
            calories: Some(450),
            protein: Some(50),
        }
    }

    #[test]
    fn test_meal_args_parse_date() {
        let meal = args("Chicken salad").into_new_meal().unwrap();
        assert_eq!(meal.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(meal.protein_g, Some(50));
    }

    #[test]
    fn test_meal_args_bad_date() {
        let bad = MealArgs {
            date: Some("15/06/2024".to_string()),
            ..args("Chicken salad")
        };
        assert!(bad.into_new_meal().is_err());
    }

    #[test]
    fn test_add_and_quick_add_update_totals() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let tracker = Tracker::open_in_memory(date).unwrap();
        cmd_meal_add(&tracker, args("Chicken salad"), true).unwrap();
        cmd_meal_quick_add(&tracker, args(""), true).unwrap();

        let view = tracker.day_view(date).unwrap();
        assert_eq!(view.meals.len(), 2);
        assert_eq!(view.meals[0].name, "Quick add");
        assert_eq!(view.log.calories_total, Some(900));
    }
}
