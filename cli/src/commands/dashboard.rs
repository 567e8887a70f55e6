use anyhow::Result;
use chrono::NaiveDate;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fittrack_core::score::MAX_SCORE;
use fittrack_core::service::Tracker;
use fittrack_core::suggest::{MealIdea, QuickAddPreset};

use super::helpers::{check, fmt_opt_float, fmt_opt_int, print_json, truncate};

#[derive(Tabled)]
struct IdeaRow {
    #[tabled(rename = "Idea")]
    name: String,
    #[tabled(rename = "kcal")]
    calories: i64,
    #[tabled(rename = "Protein (g)")]
    protein: i64,
}

fn print_ideas(ideas: &[MealIdea]) {
    let rows: Vec<IdeaRow> = ideas
        .iter()
        .map(|i| IdeaRow {
            name: truncate(i.name, 40),
            calories: i.calories,
            protein: i.protein_g,
        })
        .collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

#[derive(Tabled)]
struct PresetRow {
    #[tabled(rename = "Preset")]
    label: &'static str,
    #[tabled(rename = "Logs as")]
    name: String,
    #[tabled(rename = "kcal")]
    calories: i64,
    #[tabled(rename = "Protein (g)")]
    protein: i64,
}

fn print_presets(presets: &[QuickAddPreset]) {
    let rows: Vec<PresetRow> = presets
        .iter()
        .map(|p| PresetRow {
            label: p.label,
            name: truncate(p.name, 40),
            calories: p.calories,
            protein: p.protein_g,
        })
        .collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn cmd_dashboard(tracker: &Tracker, today: NaiveDate, json: bool) -> Result<()> {
    let view = tracker.dashboard(today)?;

    if json {
        return print_json(&view);
    }

    let log = &view.today;
    println!("=== {} ===\n", today.format("%Y-%m-%d"));
    println!(
        "  Calories: {} / {}  ({:+})",
        fmt_opt_int(log.calories_total),
        fmt_opt_int(log.cal_target),
        view.cal_delta
    );
    println!(
        "  Protein:  {} / {} g  ({:+})",
        fmt_opt_int(log.protein_g_total),
        fmt_opt_int(log.prot_target),
        view.prot_delta
    );
    println!(
        "  Walk {}  Lift {}  IF {}  Rings {}",
        check(log.walk_done),
        check(log.lift_done),
        check(log.if_done),
        check(log.rings_closed)
    );
    println!("  Score: {}/{MAX_SCORE}", view.score);
    println!("  Weight: {}", fmt_opt_float(log.weight_am, 1));

    let p = &view.projection;
    println!(
        "\n  Goal: {:.1} → {:.1} by {}",
        p.start_weight,
        p.goal_weight,
        p.goal_date.format("%Y-%m-%d")
    );
    println!(
        "  Expected today: {:.1}  Current: {:.1}  Pace: {:.1}%",
        p.expected_weight, p.current_weight, p.pace_percent
    );

    if !view.meals.is_empty() {
        println!("\n  Meals:");
        for m in &view.meals {
            let time = m.time.as_deref().map(|t| format!("{t} ")).unwrap_or_default();
            println!(
                "    [{}] {time}{} — {} kcal, {} g protein",
                m.id,
                m.name,
                fmt_opt_int(m.calories),
                fmt_opt_int(m.protein_g)
            );
        }
    }

    println!("\n  Quick add:");
    print_presets(&view.quick_add);

    Ok(())
}

pub(crate) fn cmd_suggest(tracker: &Tracker, today: NaiveDate, json: bool) -> Result<()> {
    let suggestions = tracker.meal_suggestions(today)?;

    if json {
        return print_json(&suggestions);
    }

    println!(
        "Remaining today: {} kcal, {} g protein (eating window {})\n",
        suggestions.cal_remaining, suggestions.prot_remaining, suggestions.eating_window
    );
    if suggestions.ideas.is_empty() {
        eprintln!("No meal ideas fit the remaining calories.");
    } else {
        print_ideas(&suggestions.ideas);
    }
    println!();
    for hint in &suggestions.plate_hints {
        println!("  {}: {}", hint.title, hint.detail);
    }

    Ok(())
}
