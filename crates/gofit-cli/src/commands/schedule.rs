//! Schedule command handlers

use anyhow::{anyhow, bail, Result};
use chrono::NaiveTime;

use gofit_core::models::ScheduledWorkoutUpdate;
use gofit_core::{NewScheduledWorkout, ScheduleStatus, WorkoutData, WorkoutType};

use super::{parse_date, resolve_id};
use crate::output::Output;

/// Plan a workout for a date and time
pub async fn add(data: &WorkoutData, new: NewScheduledWorkout, output: &Output) -> Result<()> {
    if new.name.trim().is_empty() {
        bail!("Workout name cannot be empty");
    }
    validate_time(&new.time)?;

    let scheduled = data.add_scheduled_workout(new).await?;
    output.success(&format!(
        "Scheduled {} on {} at {}",
        scheduled.name, scheduled.date, scheduled.time
    ));
    if !output.should_prompt() {
        output.print_scheduled(std::slice::from_ref(&scheduled));
    }
    Ok(())
}

/// List scheduled workouts, optionally for one date
pub fn list(data: &WorkoutData, date: Option<String>, output: &Output) -> Result<()> {
    let scheduled = match date {
        Some(date) => data.scheduled_for_date(parse_date(&date)?),
        None => data.scheduled_workouts(),
    };
    output.print_scheduled(&scheduled);
    Ok(())
}

/// Set the status of a scheduled workout
pub async fn set_status(
    data: &WorkoutData,
    id: String,
    status: ScheduleStatus,
    output: &Output,
) -> Result<()> {
    let id = resolve_id(&data.scheduled_workouts(), &id, "scheduled workout")?;
    let updated = data
        .update_scheduled_workout(
            &id,
            ScheduledWorkoutUpdate {
                status: Some(status),
                ..ScheduledWorkoutUpdate::default()
            },
        )
        .await?
        .ok_or_else(|| anyhow!("Scheduled workout not found: {}", id))?;

    output.success(&format!("{} is now {}", updated.name, updated.status));
    Ok(())
}

pub async fn delete(data: &WorkoutData, id: String, output: &Output) -> Result<()> {
    let id = resolve_id(&data.scheduled_workouts(), &id, "scheduled workout")?;
    data.delete_scheduled_workout(&id).await?;
    output.success(&format!("Deleted scheduled workout: {}", id));
    Ok(())
}

/// Show counts per status
pub fn summary(data: &WorkoutData, output: &Output) -> Result<()> {
    output.print_schedule_summary(&data.schedule_summary());
    Ok(())
}

/// Build the creation input from raw arguments
pub fn new_scheduled(
    name: String,
    date: &str,
    time: String,
    duration: u32,
    workout_type: WorkoutType,
) -> Result<NewScheduledWorkout> {
    Ok(NewScheduledWorkout {
        name,
        date: parse_date(date)?,
        time,
        duration,
        workout_type,
        status: ScheduleStatus::Scheduled,
    })
}

fn validate_time(time: &str) -> Result<()> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map(|_| ())
        .map_err(|_| anyhow!("Invalid time '{}'. Use HH:MM.", time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_time() {
        assert!(validate_time("07:30").is_ok());
        assert!(validate_time("23:59").is_ok());
        assert!(validate_time("7.30").is_err());
        assert!(validate_time("25:00").is_err());
    }

    #[test]
    fn test_new_scheduled_defaults_to_scheduled() {
        let new = new_scheduled(
            "Morning run".to_string(),
            "2024-03-20",
            "06:45".to_string(),
            30,
            WorkoutType::Cardio,
        )
        .unwrap();
        assert_eq!(new.status, ScheduleStatus::Scheduled);
        assert!(new_scheduled(String::new(), "tomorrow", String::new(), 0, WorkoutType::Mixed).is_err());
    }
}
