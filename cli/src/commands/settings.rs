use anyhow::{Result, bail};

use fittrack_core::models::{Settings, SettingsUpdate, parse_optional_date};
use fittrack_core::service::Tracker;

use super::helpers::print_json;

fn print_settings(settings: &Settings) {
    println!("  Start weight: {:.1}", settings.start_weight);
    println!("  Goal weight:  {:.1}", settings.goal_weight);
    println!("  Goal date:    {}", settings.goal_date.format("%Y-%m-%d"));
}

pub(crate) fn cmd_settings_show(tracker: &Tracker, json: bool) -> Result<()> {
    if json {
        return print_json(tracker.settings());
    }
    print_settings(tracker.settings());
    Ok(())
}

pub(crate) fn cmd_settings_set(
    tracker: &mut Tracker,
    start_weight: Option<f64>,
    goal_weight: Option<f64>,
    goal_date: Option<&str>,
    json: bool,
) -> Result<()> {
    if start_weight.is_none() && goal_weight.is_none() && goal_date.is_none() {
        bail!("Nothing to update. Provide at least one of --start-weight, --goal-weight, or --goal-date");
    }

    let update = SettingsUpdate {
        start_weight,
        goal_weight,
        goal_date: parse_optional_date(goal_date)?,
    };
    let settings = tracker.update_settings(&update)?;

    if json {
        return print_json(settings);
    }
    println!("Settings updated");
    print_settings(settings);
    Ok(())
}
