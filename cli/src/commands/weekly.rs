use anyhow::Result;
use chrono::NaiveDate;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fittrack_core::service::Tracker;

use super::helpers::{fmt_opt_float, print_json};

pub(crate) fn cmd_weekly(tracker: &Tracker, today: NaiveDate, json: bool) -> Result<()> {
    let view = tracker.weekly(today)?;

    if json {
        return print_json(&view);
    }
    if view.weeks.is_empty() {
        eprintln!("No days logged in the last 90 days.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct WeekRow {
        #[tabled(rename = "Week of")]
        week: String,
        #[tabled(rename = "Days")]
        days: usize,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Waist")]
        waist: String,
        #[tabled(rename = "kcal")]
        cals: String,
        #[tabled(rename = "Protein")]
        prot: String,
        #[tabled(rename = "Miles")]
        miles: String,
        #[tabled(rename = "Active")]
        active: String,
        #[tabled(rename = "Rings %")]
        rings: String,
        #[tabled(rename = "Score")]
        comp: String,
    }

    let rows: Vec<WeekRow> = view
        .weeks
        .iter()
        .map(|w| WeekRow {
            week: w.week_start.format("%Y-%m-%d").to_string(),
            days: w.days,
            weight: fmt_opt_float(w.avg_weight, 1),
            waist: fmt_opt_float(w.avg_waist, 1),
            cals: fmt_opt_float(w.avg_cals, 0),
            prot: fmt_opt_float(w.avg_prot, 0),
            miles: fmt_opt_float(w.avg_miles, 2),
            active: fmt_opt_float(w.avg_active, 0),
            rings: fmt_opt_float(w.rings_pct, 0),
            comp: fmt_opt_float(w.avg_comp, 2),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..10)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
