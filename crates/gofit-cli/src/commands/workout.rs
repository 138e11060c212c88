//! Workout command handlers

use anyhow::{anyhow, bail, Context, Result};

use gofit_core::{NewExercise, WorkoutData};

use super::{confirm, resolve_id};
use crate::output::Output;

/// Show the dashboard for today
pub fn today(data: &WorkoutData, output: &Output) -> Result<()> {
    let workout = data.today_workout();
    let workout_exercises = data.today_workout_exercises();
    output.print_today(
        workout.as_ref(),
        &workout_exercises,
        data.today_progress(),
        &data.today_exercises(),
    );
    Ok(())
}

/// Create a workout for today from `NAME:SETSxREPS[@KG]` exercise specs
pub async fn create(
    data: &WorkoutData,
    name: String,
    exercises: Vec<String>,
    output: &Output,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Workout name cannot be empty");
    }
    let exercises = exercises
        .iter()
        .map(|s| parse_exercise_spec(s))
        .collect::<Result<Vec<_>>>()?;

    let workout = data
        .create_workout(name, exercises)
        .await
        .context("Failed to create workout")?;

    output.success(&format!("Created workout: {}", workout.id));
    output.print_workout(&workout, &data.workout_exercises(&workout));
    Ok(())
}

pub fn list(data: &WorkoutData, output: &Output) -> Result<()> {
    output.print_workouts(&data.workouts());
    Ok(())
}

pub fn show(data: &WorkoutData, id: String, output: &Output) -> Result<()> {
    let workouts = data.workouts();
    let id = resolve_id(&workouts, &id, "workout")?;
    let workout = workouts
        .iter()
        .find(|w| w.id == id)
        .ok_or_else(|| anyhow!("Workout not found: {}", id))?;

    output.print_workout(workout, &data.workout_exercises(workout));
    Ok(())
}

/// Mark a workout and its exercises completed
pub async fn complete(data: &WorkoutData, id: String, output: &Output) -> Result<()> {
    let id = resolve_id(&data.workouts(), &id, "workout")?;
    let workout = data
        .complete_workout(&id)
        .await?
        .ok_or_else(|| anyhow!("Workout not found: {}", id))?;

    output.success(&format!("Completed workout: {}", workout.name));
    Ok(())
}

/// Delete a workout, optionally together with its exercises
pub async fn delete(
    data: &WorkoutData,
    id: String,
    with_exercises: bool,
    output: &Output,
) -> Result<()> {
    let workouts = data.workouts();
    let id = resolve_id(&workouts, &id, "workout")?;

    if output.should_prompt() {
        if let Some(workout) = workouts.iter().find(|w| w.id == id) {
            println!("Delete workout: {} - {}", workout.id, workout.name);
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if with_exercises {
        data.delete_workout_with_exercises(&id).await?;
    } else {
        data.delete_workout(&id).await?;
    }

    output.success(&format!("Deleted workout: {}", id));
    Ok(())
}

/// Parse `NAME:SETSxREPS` with an optional `@WEIGHT` suffix
pub fn parse_exercise_spec(spec: &str) -> Result<NewExercise> {
    let invalid = || anyhow!("Invalid exercise '{}'. Use NAME:SETSxREPS[@KG]", spec);

    let (name, rest) = spec.rsplit_once(':').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid());
    }

    let (volume, weight) = match rest.split_once('@') {
        Some((volume, weight)) => (volume, Some(weight)),
        None => (rest, None),
    };
    let (sets, reps) = volume
        .trim()
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(invalid)?;

    let mut exercise = NewExercise::new(
        name,
        sets.trim().parse().map_err(|_| invalid())?,
        reps.trim().parse().map_err(|_| invalid())?,
    );
    if let Some(weight) = weight {
        exercise = exercise.with_weight(weight.trim().parse().map_err(|_| invalid())?);
    }
    Ok(exercise)
}
