mod dashboard;
mod day;
mod export;
mod helpers;
mod meal;
mod saved;
mod settings;
mod weekly;
mod workout;

pub(crate) use dashboard::{cmd_dashboard, cmd_suggest};
pub(crate) use day::{DayUpdateArgs, cmd_day_show, cmd_day_update};
pub(crate) use export::cmd_export;
pub(crate) use helpers::today;
pub(crate) use meal::{MealArgs, cmd_meal_add, cmd_meal_delete, cmd_meal_quick_add};
pub(crate) use saved::{cmd_saved_add, cmd_saved_delete, cmd_saved_list, cmd_saved_log};
pub(crate) use settings::{cmd_settings_set, cmd_settings_show};
pub(crate) use weekly::cmd_weekly;
pub(crate) use workout::{WorkoutArgs, cmd_workout_add, cmd_workout_list};
