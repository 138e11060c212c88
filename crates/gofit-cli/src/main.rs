//! GoFit CLI
//!
//! Command-line interface for GoFit - workouts, exercises, schedule and
//! activity tracking on the local device.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gofit_core::models::StatsUpdate;
use gofit_core::{ActivityStatus, Config, NewExercise, ScheduleStatus, WorkoutData, WorkoutType};

mod commands;
mod output;

use commands::exercise::EditArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "gofit")]
#[command(about = "GoFit - Personal fitness tracker")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's workout and exercises (default)
    Today,
    /// Manage workouts
    Workout {
        #[command(subcommand)]
        command: WorkoutCommands,
    },
    /// Manage exercises
    Exercise {
        #[command(subcommand)]
        command: ExerciseCommands,
    },
    /// Manage scheduled workouts
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
    /// Track activities
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Show or update the user profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommands>,
    },
    /// Show or update workout stats
    Stats {
        #[command(subcommand)]
        command: Option<StatsCommands>,
    },
    /// Show storage location and record counts
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Delete all stored data
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum WorkoutCommands {
    /// Create a workout for today
    #[command(alias = "add")]
    Create {
        /// Workout name
        name: String,
        /// Exercise as NAME:SETSxREPS[@KG] (repeatable)
        #[arg(short, long = "exercise")]
        exercises: Vec<String>,
    },
    /// List all workouts
    #[command(alias = "ls")]
    List,
    /// Show a workout with its exercises
    Show {
        /// Workout ID (full or prefix)
        id: String,
    },
    /// Mark a workout and its exercises completed
    Complete {
        /// Workout ID (full or prefix)
        id: String,
    },
    /// Delete a workout
    #[command(alias = "rm")]
    Delete {
        /// Workout ID (full or prefix)
        id: String,
        /// Also delete the workout's exercises
        #[arg(long)]
        with_exercises: bool,
    },
}

#[derive(Subcommand)]
enum ExerciseCommands {
    /// Record an exercise for today
    Add {
        /// Exercise name
        name: String,
        #[arg(short, long, default_value_t = 3)]
        sets: u32,
        #[arg(short, long, default_value_t = 10)]
        reps: u32,
        /// Weight in kg
        #[arg(short, long)]
        weight: Option<f64>,
        /// Duration in seconds
        #[arg(short, long)]
        duration: Option<u32>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List today's exercises
    #[command(alias = "ls")]
    List {
        /// Include every date
        #[arg(short, long)]
        all: bool,
    },
    /// Edit an exercise
    Edit {
        /// Exercise ID (full or prefix)
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        sets: Option<u32>,
        #[arg(long)]
        reps: Option<u32>,
        /// Weight in kg ("none" clears it)
        #[arg(long)]
        weight: Option<String>,
        /// Duration in seconds ("none" clears it)
        #[arg(long)]
        duration: Option<String>,
        /// Notes ("none" clears them)
        #[arg(long)]
        notes: Option<String>,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },
    /// Toggle completion of an exercise in today's workout
    Toggle {
        /// Position in today's workout, starting at 1
        position: usize,
    },
    /// Delete an exercise
    #[command(alias = "rm")]
    Delete {
        /// Exercise ID (full or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum ScheduleCommands {
    /// Plan a workout
    Add {
        /// Workout name
        name: String,
        /// Date as YYYY-MM-DD
        #[arg(short, long)]
        date: String,
        /// Start time as HH:MM
        #[arg(short, long)]
        time: String,
        /// Length in minutes
        #[arg(short = 'm', long, default_value_t = 45)]
        duration: u32,
        /// strength, cardio, flexibility or mixed
        #[arg(short = 'k', long = "type", default_value = "strength")]
        workout_type: WorkoutType,
    },
    /// List scheduled workouts
    #[command(alias = "ls")]
    List {
        /// Only this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Set the status of a scheduled workout, or show counts per status
    Status {
        /// Scheduled workout ID (full or prefix)
        id: Option<String>,
        /// scheduled, completed or missed
        #[arg(requires = "id")]
        status: Option<ScheduleStatus>,
    },
    /// Delete a scheduled workout
    #[command(alias = "rm")]
    Delete {
        /// Scheduled workout ID (full or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum ActivityCommands {
    /// Record an activity
    Add {
        /// Activity name
        name: String,
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// completed, in-progress or scheduled
        #[arg(short, long, default_value = "completed")]
        status: ActivityStatus,
        /// Exercises completed
        #[arg(long, default_value_t = 0)]
        completed: u32,
        /// Exercises in total
        #[arg(long, default_value_t = 0)]
        total: u32,
        /// Length in minutes
        #[arg(short = 'm', long)]
        duration: Option<u32>,
    },
    /// List activities
    #[command(alias = "ls")]
    List {
        /// Only this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Put an activity back in progress
    Resume {
        /// Activity ID (full or prefix)
        id: String,
    },
    /// Totals over completed activities
    Summary,
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the profile
    Show,
    /// Update profile fields
    Set {
        #[arg(long)]
        name: Option<String>,
        /// Avatar URL
        #[arg(long)]
        avatar: Option<String>,
        /// Fitness goal (repeatable, replaces the stored goals)
        #[arg(long = "goal")]
        goals: Vec<String>,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        member_since: Option<String>,
    },
}

#[derive(Subcommand)]
enum StatsCommands {
    /// Show stats
    Show,
    /// Update stat counters
    Set(StatsArgs),
}

#[derive(Args)]
struct StatsArgs {
    #[arg(long)]
    total_workouts: Option<u32>,
    /// Minutes
    #[arg(long)]
    total_duration: Option<u32>,
    /// Days
    #[arg(long)]
    longest_streak: Option<u32>,
    /// Days
    #[arg(long)]
    current_streak: Option<u32>,
    /// Minutes
    #[arg(long)]
    average_workout_duration: Option<u32>,
    /// Workouts per week
    #[arg(long)]
    weekly_goal: Option<u32>,
    #[arg(long)]
    completed_this_week: Option<u32>,
}

impl From<StatsArgs> for StatsUpdate {
    fn from(args: StatsArgs) -> Self {
        StatsUpdate {
            total_workouts: args.total_workouts,
            total_duration: args.total_duration,
            longest_streak: args.longest_streak,
            current_streak: args.current_streak,
            average_workout_duration: args.average_workout_duration,
            weekly_goal: args.weekly_goal,
            completed_this_week: args.completed_this_week,
        }
    }
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file, log_level)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config);

    let data = WorkoutData::open_with_config(&config).await?;

    match cli.command.unwrap_or(Commands::Today) {
        Commands::Today => commands::workout::today(&data, &output),
        Commands::Workout { command } => handle_workout_command(command, &data, &output).await,
        Commands::Exercise { command } => handle_exercise_command(command, &data, &output).await,
        Commands::Schedule { command } => handle_schedule_command(command, &data, &output).await,
        Commands::Activity { command } => handle_activity_command(command, &data, &output).await,
        Commands::Profile { command } => match command {
            Some(ProfileCommands::Show) | None => commands::profile::show(&data, &output),
            Some(ProfileCommands::Set {
                name,
                avatar,
                goals,
                member_since,
            }) => commands::profile::set(&data, name, avatar, goals, member_since, &output).await,
        },
        Commands::Stats { command } => match command {
            Some(StatsCommands::Show) | None => commands::profile::show_stats(&data, &output),
            Some(StatsCommands::Set(args)) => {
                commands::profile::set_stats(&data, args.into(), &output).await
            }
        },
        Commands::Status => commands::status::show(&data, &config, &output).await,
        Commands::Reset { yes } => reset(&data, yes, &output).await,
        Commands::Config { .. } => Ok(()), // Handled above
    }
}

async fn handle_workout_command(
    command: WorkoutCommands,
    data: &WorkoutData,
    output: &Output,
) -> Result<()> {
    match command {
        WorkoutCommands::Create { name, exercises } => {
            commands::workout::create(data, name, exercises, output).await
        }
        WorkoutCommands::List => commands::workout::list(data, output),
        WorkoutCommands::Show { id } => commands::workout::show(data, id, output),
        WorkoutCommands::Complete { id } => commands::workout::complete(data, id, output).await,
        WorkoutCommands::Delete { id, with_exercises } => {
            commands::workout::delete(data, id, with_exercises, output).await
        }
    }
}

async fn handle_exercise_command(
    command: ExerciseCommands,
    data: &WorkoutData,
    output: &Output,
) -> Result<()> {
    match command {
        ExerciseCommands::Add {
            name,
            sets,
            reps,
            weight,
            duration,
            notes,
        } => {
            let exercise = NewExercise {
                weight,
                duration,
                notes,
                ..NewExercise::new(name, sets, reps)
            };
            commands::exercise::add(data, exercise, output).await
        }
        ExerciseCommands::List { all } => commands::exercise::list(data, all, output),
        ExerciseCommands::Edit {
            id,
            name,
            sets,
            reps,
            weight,
            duration,
            notes,
            date,
        } => {
            let args = EditArgs {
                name,
                sets,
                reps,
                weight,
                duration,
                notes,
                date,
            };
            commands::exercise::edit(data, id, args, output).await
        }
        ExerciseCommands::Toggle { position } => {
            commands::exercise::toggle(data, position, output).await
        }
        ExerciseCommands::Delete { id } => commands::exercise::delete(data, id, output).await,
    }
}

async fn handle_schedule_command(
    command: ScheduleCommands,
    data: &WorkoutData,
    output: &Output,
) -> Result<()> {
    match command {
        ScheduleCommands::Add {
            name,
            date,
            time,
            duration,
            workout_type,
        } => {
            let new = commands::schedule::new_scheduled(name, &date, time, duration, workout_type)?;
            commands::schedule::add(data, new, output).await
        }
        ScheduleCommands::List { date } => commands::schedule::list(data, date, output),
        ScheduleCommands::Status { id, status } => match (id, status) {
            (Some(id), Some(status)) => {
                commands::schedule::set_status(data, id, status, output).await
            }
            (Some(_), None) => anyhow::bail!("Missing status (scheduled, completed, missed)"),
            _ => commands::schedule::summary(data, output),
        },
        ScheduleCommands::Delete { id } => commands::schedule::delete(data, id, output).await,
    }
}

async fn handle_activity_command(
    command: ActivityCommands,
    data: &WorkoutData,
    output: &Output,
) -> Result<()> {
    match command {
        ActivityCommands::Add {
            name,
            date,
            status,
            completed,
            total,
            duration,
        } => {
            commands::activity::add(data, name, date, status, completed, total, duration, output)
                .await
        }
        ActivityCommands::List { date } => commands::activity::list(data, date, output),
        ActivityCommands::Resume { id } => commands::activity::resume(data, id, output).await,
        ActivityCommands::Summary => commands::activity::summary(data, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

async fn reset(data: &WorkoutData, yes: bool, output: &Output) -> Result<()> {
    if !yes {
        if !output.should_prompt() {
            anyhow::bail!("Refusing to reset without confirmation. Pass --yes.");
        }
        if !commands::confirm("Delete ALL workouts, exercises, schedule and activities?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    data.reset().await?;
    output.success("All data deleted");
    Ok(())
}

/// Initialize file-based logging
///
/// Logs to `config.log_file` (default `<data_dir>/gofit.log`) at
/// `config.log_level`. Failure to open the file only disables logging.
fn init_logging(config: &Config) {
    let log_path = config.log_path();

    let log_file = match open_log_file(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "gofit_core={},gofit_cli={}",
        config.log_level, config.log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}

/// Open the log file for appending, creating its directory first
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
