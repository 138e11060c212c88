//! Status command handler

use anyhow::Result;

use gofit_core::{Config, WorkoutData};

use crate::output::{Output, OutputFormat};

/// Show storage location and record counts
pub async fn show(data: &WorkoutData, config: &Config, output: &Output) -> Result<()> {
    let keys = data.storage().kv().list_keys().await;
    let state = data.state();
    let database_size = std::fs::metadata(config.sqlite_path())
        .map(|m| m.len())
        .unwrap_or(0);

    match output.format {
        OutputFormat::Json => {
            output.print_json(&serde_json::json!({
                "data_dir": config.data_dir,
                "database": config.sqlite_path(),
                "database_size": database_size,
                "log_file": config.log_path(),
                "stored_keys": keys,
                "counts": {
                    "workouts": state.workouts.len(),
                    "exercises": state.exercises.len(),
                    "scheduled_workouts": state.scheduled_workouts.len(),
                    "activities": state.activities.len()
                }
            }));
        }
        OutputFormat::Quiet => {
            println!("{}", config.sqlite_path().display());
        }
        OutputFormat::Human => {
            println!("GoFit Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  Database: {} ({} bytes)", config.sqlite_path().display(), database_size);
            println!("  Log file: {}", config.log_path().display());
            println!("  Keys:     {}", keys.join(", "));
            println!();
            println!("Contents:");
            println!("  Workouts:           {}", state.workouts.len());
            println!("  Exercises:          {}", state.exercises.len());
            println!("  Scheduled workouts: {}", state.scheduled_workouts.len());
            println!("  Activities:         {}", state.activities.len());
            println!(
                "  Profile:            {}",
                if state.user_profile.is_some() {
                    "set"
                } else {
                    "not set"
                }
            );
        }
    }

    Ok(())
}
