use anyhow::Result;
use clap::Args;

use fittrack_core::models::{DayLog, DayUpdate};
use fittrack_core::score::{MAX_SCORE, compliance_score};
use fittrack_core::service::Tracker;

use super::helpers::{check, fmt_opt_float, fmt_opt_int, parse_date, print_json};

/// Fields left out keep their stored value; `--notes ""` clears the notes.
#[derive(Args, Debug, Default)]
pub(crate) struct DayUpdateArgs {
    /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
    #[arg(long)]
    pub date: Option<String>,
    /// Morning weight
    #[arg(long)]
    pub weight: Option<f64>,
    /// Waist in inches
    #[arg(long)]
    pub waist: Option<f64>,
    /// Walking miles
    #[arg(long)]
    pub miles: Option<f64>,
    /// Active calories burned
    #[arg(long)]
    pub active: Option<i64>,
    /// Walk done (true/false)
    #[arg(long)]
    pub walk: Option<bool>,
    /// Lift done (true/false)
    #[arg(long)]
    pub lift: Option<bool>,
    /// Eating window kept (true/false)
    #[arg(long = "if")]
    pub if_done: Option<bool>,
    /// Activity rings closed (true/false)
    #[arg(long)]
    pub rings: Option<bool>,
    /// Calorie target (0 keeps the current one)
    #[arg(long)]
    pub cal_target: Option<i64>,
    /// Protein target in grams (0 keeps the current one)
    #[arg(long)]
    pub prot_target: Option<i64>,
    /// Notes for the day
    #[arg(long)]
    pub notes: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DayUpdateArgs {
    /// Overlay the given flags on the stored log.
    fn merge(&self, current: &DayLog) -> DayUpdate {
        DayUpdate {
            weight_am: self.weight.or(current.weight_am),
            waist_in: self.waist.or(current.waist_in),
            walking_miles: self.miles.or(current.walking_miles),
            active_calories: self.active.or(current.active_calories),
            walk_done: self.walk.unwrap_or(current.walk_done),
            lift_done: self.lift.unwrap_or(current.lift_done),
            if_done: self.if_done.unwrap_or(current.if_done),
            rings_closed: self.rings.unwrap_or(current.rings_closed),
            cal_target: self.cal_target,
            prot_target: self.prot_target,
            notes: self.notes.clone().or_else(|| current.notes.clone()),
        }
    }
}

fn print_day(log: &DayLog, score: u8) {
    println!("=== {} ===\n", log.date.format("%Y-%m-%d"));
    println!("  Weight:   {}", fmt_opt_float(log.weight_am, 1));
    println!("  Waist:    {}", fmt_opt_float(log.waist_in, 1));
    println!(
        "  Calories: {} / {}",
        fmt_opt_int(log.calories_total),
        fmt_opt_int(log.cal_target)
    );
    println!(
        "  Protein:  {} / {} g",
        fmt_opt_int(log.protein_g_total),
        fmt_opt_int(log.prot_target)
    );
    println!(
        "  Miles:    {}   Active: {} kcal",
        fmt_opt_float(log.walking_miles, 2),
        fmt_opt_int(log.active_calories)
    );
    println!(
        "  Walk {}  Lift {}  IF {}  Rings {}",
        check(log.walk_done),
        check(log.lift_done),
        check(log.if_done),
        check(log.rings_closed)
    );
    println!("  Score: {score}/{MAX_SCORE}");
    if let Some(ref n) = log.notes {
        println!("  Notes: {n}");
    }
}

pub(crate) fn cmd_day_show(tracker: &Tracker, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let view = tracker.day_view(date)?;

    if json {
        return print_json(&view);
    }

    print_day(&view.log, view.score);
    if view.meals.is_empty() {
        println!("\n  No meals logged.");
    } else {
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

    Ok(())
}

pub(crate) fn cmd_day_update(tracker: &Tracker, args: &DayUpdateArgs) -> Result<()> {
    let date = parse_date(args.date.clone())?;
    let current = tracker.day_view(date)?.log;
    let log = tracker.update_day(date, &args.merge(&current))?;

    if args.json {
        return print_json(&log);
    }

    println!("Updated {}", date.format("%Y-%m-%d"));
    print_day(&log, compliance_score(&log));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stored() -> DayLog {
        DayLog {
            weight_am: Some(222.0),
            walk_done: true,
            notes: Some("before".to_string()),
            ..DayLog::blank(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
        }
    }

    #[test]
    fn test_merge_keeps_unspecified_fields() {
        let args = DayUpdateArgs {
            waist: Some(40.5),
            lift: Some(true),
            ..DayUpdateArgs::default()
        };
        let update = args.merge(&stored());
        assert_eq!(update.weight_am, Some(222.0));
        assert_eq!(update.waist_in, Some(40.5));
        assert!(update.walk_done);
        assert!(update.lift_done);
        assert_eq!(update.notes.as_deref(), Some("before"));
        assert_eq!(update.cal_target, None);
    }

    #[test]
    fn test_merge_overrides_and_clears_notes() {
        let args = DayUpdateArgs {
            weight: Some(221.0),
            walk: Some(false),
            notes: Some(String::new()),
            ..DayUpdateArgs::default()
        };
        let update = args.merge(&stored());
        assert_eq!(update.weight_am, Some(221.0));
        assert!(!update.walk_done);
        assert_eq!(update.notes.as_deref(), Some(""));
    }

    #[test]
    fn test_update_through_tracker() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let tracker = Tracker::open_in_memory(date).unwrap();
        let args = DayUpdateArgs {
            date: Some("2024-06-15".to_string()),
            weight: Some(220.5),
            rings: Some(true),
            notes: Some(String::new()),
            ..DayUpdateArgs::default()
        };
        cmd_day_update(&tracker, &args).unwrap();

        let log = tracker.day_view(date).unwrap().log;
        assert_eq!(log.weight_am, Some(220.5));
        assert!(log.rings_closed);
        assert_eq!(log.notes, None);
    }
}
