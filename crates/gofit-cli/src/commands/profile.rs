//! Profile and stats command handlers

use anyhow::Result;

use gofit_core::models::{ProfileUpdate, StatsUpdate};
use gofit_core::WorkoutData;

use super::parse_date;
use crate::output::Output;

pub fn show(data: &WorkoutData, output: &Output) -> Result<()> {
    output.print_profile(data.user_profile().as_ref());
    Ok(())
}

/// Update profile fields; goals replace the stored list when given
pub async fn set(
    data: &WorkoutData,
    name: Option<String>,
    avatar: Option<String>,
    goals: Vec<String>,
    member_since: Option<String>,
    output: &Output,
) -> Result<()> {
    let updates = ProfileUpdate {
        name,
        avatar,
        fitness_goals: if goals.is_empty() { None } else { Some(goals) },
        member_since: member_since.as_deref().map(parse_date).transpose()?,
    };

    let profile = data.update_user_profile(updates).await?;
    output.success("Profile updated");
    output.print_profile(Some(&profile));
    Ok(())
}

pub fn show_stats(data: &WorkoutData, output: &Output) -> Result<()> {
    output.print_stats(&data.workout_stats().unwrap_or_default());
    Ok(())
}

pub async fn set_stats(data: &WorkoutData, updates: StatsUpdate, output: &Output) -> Result<()> {
    let stats = data.update_workout_stats(updates).await?;
    output.success("Stats updated");
    output.print_stats(&stats);
    Ok(())
}
