mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, fmt};

use crate::commands::{
    DayUpdateArgs, MealArgs, WorkoutArgs, cmd_dashboard, cmd_day_show, cmd_day_update,
    cmd_export, cmd_meal_add, cmd_meal_delete, cmd_meal_quick_add, cmd_saved_add,
    cmd_saved_delete, cmd_saved_list, cmd_saved_log, cmd_settings_set, cmd_settings_show,
    cmd_suggest, cmd_weekly, cmd_workout_add, cmd_workout_list, today,
};
use crate::config::Config;
use fittrack_core::service::Tracker;

#[derive(Parser)]
#[command(
    name = "fittrack",
    version,
    about = "Daily weight, nutrition, and workout tracker"
)]
struct Cli {
    /// Database file (overrides FITTRACK_DB and the default data directory)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Today's totals, score, goal pace, and quick-add presets
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or update a day's log
    Day {
        #[command(subcommand)]
        command: DayCommands,
    },
    /// Log or delete meals
    Meal {
        #[command(subcommand)]
        command: MealCommands,
    },
    /// Manage saved meal templates
    Saved {
        #[command(subcommand)]
        command: SavedCommands,
    },
    /// Log and list workouts
    Workout {
        #[command(subcommand)]
        command: WorkoutCommands,
    },
    /// Weekly averages for the last 90 days
    Weekly {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change the weight goal
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Meal ideas that fit what is left of today's budget
    Suggest {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export every day log as CSV
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Disable API key authentication (for development/testing)
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
enum DayCommands {
    /// Show a day's log and meals (default: today)
    Show {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a day's measurements and habits
    Update(DayUpdateArgs),
}

#[derive(Subcommand)]
enum MealCommands {
    /// Log a meal
    Add {
        /// Meal name
        name: String,
        /// Calories
        #[arg(short, long)]
        calories: Option<i64>,
        /// Protein in grams
        #[arg(short, long)]
        protein: Option<i64>,
        /// Time eaten (HH:MM)
        #[arg(short, long)]
        time: Option<String>,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log calories and protein without a name
    QuickAdd {
        /// Calories
        calories: Option<i64>,
        /// Protein in grams
        protein: Option<i64>,
        /// Name (default: "Quick add")
        #[arg(short, long, default_value = "")]
        name: String,
        /// Time eaten (HH:MM)
        #[arg(short, long)]
        time: Option<String>,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a meal by ID
    Delete {
        /// Meal ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SavedCommands {
    /// List saved meals
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a meal template
    Add {
        /// Meal name
        name: String,
        /// Calories
        #[arg(short, long)]
        calories: Option<i64>,
        /// Protein in grams
        #[arg(short, long)]
        protein: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved meal by ID
    Delete {
        /// Saved meal ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a saved meal
    Log {
        /// Saved meal ID
        id: i64,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Time eaten (HH:MM)
        #[arg(short, long)]
        time: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WorkoutCommands {
    /// Log a workout
    Add {
        /// Workout type (e.g. Walk, Lift, Swim)
        workout_type: String,
        /// Duration in minutes
        #[arg(short, long, default_value = "0")]
        minutes: i64,
        /// Calories burned
        #[arg(short, long, default_value = "0")]
        calories: i64,
        /// Notes (up to 250 characters)
        #[arg(short, long)]
        notes: Option<String>,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a day's workouts (default: today)
    List {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show the weight goal
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the weight goal (0 or omitted keeps the current value)
    Set {
        /// Starting weight
        #[arg(long)]
        start_weight: Option<f64>,
        /// Goal weight
        #[arg(long)]
        goal_weight: Option<f64>,
        /// Goal date (YYYY-MM-DD)
        #[arg(long)]
        goal_date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;
    let today = today();
    let mut tracker = Tracker::open(&config.db_path, today)?;

    match cli.command {
        Commands::Dashboard { json } => cmd_dashboard(&tracker, today, json),
        Commands::Day { command } => match command {
            DayCommands::Show { date, json } => cmd_day_show(&tracker, date, json),
            DayCommands::Update(args) => cmd_day_update(&tracker, &args),
        },
        Commands::Meal { command } => match command {
            MealCommands::Add {
                name,
                calories,
                protein,
                time,
                date,
                json,
            } => cmd_meal_add(
                &tracker,
                MealArgs {
                    date,
                    time,
                    name,
                    calories,
                    protein,
                },
                json,
            ),
            MealCommands::QuickAdd {
                calories,
                protein,
                name,
                time,
                date,
                json,
            } => cmd_meal_quick_add(
                &tracker,
                MealArgs {
                    date,
                    time,
                    name,
                    calories,
                    protein,
                },
                json,
            ),
            MealCommands::Delete { id, json } => cmd_meal_delete(&tracker, id, json),
        },
        Commands::Saved { command } => match command {
            SavedCommands::List { json } => cmd_saved_list(&tracker, json),
            SavedCommands::Add {
                name,
                calories,
                protein,
                json,
            } => cmd_saved_add(&tracker, name, calories, protein, json),
            SavedCommands::Delete { id, json } => cmd_saved_delete(&tracker, id, json),
            SavedCommands::Log {
                id,
                date,
                time,
                json,
            } => cmd_saved_log(&tracker, id, date, time.as_deref(), json),
        },
        Commands::Workout { command } => match command {
            WorkoutCommands::Add {
                workout_type,
                minutes,
                calories,
                notes,
                date,
                json,
            } => cmd_workout_add(
                &tracker,
                WorkoutArgs {
                    date,
                    workout_type,
                    minutes,
                    calories,
                    notes,
                },
                json,
            ),
            WorkoutCommands::List { date, json } => cmd_workout_list(&tracker, date, json),
        },
        Commands::Weekly { json } => cmd_weekly(&tracker, today, json),
        Commands::Settings { command } => match command {
            SettingsCommands::Show { json } => cmd_settings_show(&tracker, json),
            SettingsCommands::Set {
                start_weight,
                goal_weight,
                goal_date,
                json,
            } => cmd_settings_set(
                &mut tracker,
                start_weight,
                goal_weight,
                goal_date.as_deref(),
                json,
            ),
        },
        Commands::Suggest { json } => cmd_suggest(&tracker, today, json),
        Commands::Export { output } => cmd_export(&tracker, output.as_deref()),
        Commands::Serve {
            port,
            bind,
            no_auth,
        } => {
            let (api_key, new_api_key) = if no_auth {
                (None, false)
            } else {
                let (key, new) = config.load_or_create_api_key()?;
                (Some(key), new)
            };
            server::start_server(tracker, port, &bind, api_key, new_api_key).await
        }
    }
}
