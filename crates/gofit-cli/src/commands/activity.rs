//! Activity command handlers

use anyhow::{anyhow, bail, Result};

use gofit_core::models::ExerciseCounts;
use gofit_core::{ActivityStatus, NewActivity, WorkoutData};

use super::{parse_date, resolve_id};
use crate::output::Output;

#[allow(clippy::too_many_arguments)]
pub async fn add(
    data: &WorkoutData,
    name: String,
    date: Option<String>,
    status: ActivityStatus,
    completed: u32,
    total: u32,
    duration: Option<u32>,
    output: &Output,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Activity name cannot be empty");
    }
    if completed > total {
        bail!("Completed exercises ({}) exceed total ({})", completed, total);
    }

    let activity = data
        .add_activity(NewActivity {
            name,
            date: date.as_deref().map(parse_date).transpose()?,
            status,
            exercises: ExerciseCounts { completed, total },
            duration,
        })
        .await?;

    output.success(&format!("Recorded activity: {}", activity.id));
    Ok(())
}

/// List activities, optionally for one date
pub fn list(data: &WorkoutData, date: Option<String>, output: &Output) -> Result<()> {
    let activities = match date {
        Some(date) => data.activities_for_date(parse_date(&date)?),
        None => data.activities(),
    };
    output.print_activities(&activities);
    Ok(())
}

pub async fn resume(data: &WorkoutData, id: String, output: &Output) -> Result<()> {
    let id = resolve_id(&data.activities(), &id, "activity")?;
    let activity = data
        .resume_activity(&id)
        .await?
        .ok_or_else(|| anyhow!("Activity not found: {}", id))?;

    output.success(&format!("Resumed {}", activity.name));
    Ok(())
}

pub fn summary(data: &WorkoutData, output: &Output) -> Result<()> {
    output.print_activity_summary(&data.activity_summary());
    Ok(())
}
