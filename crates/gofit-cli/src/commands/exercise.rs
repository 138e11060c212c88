//! Exercise command handlers

use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

use gofit_core::models::ExerciseUpdate;
use gofit_core::{NewExercise, WorkoutData};

use super::{clearable, confirm, parse_date, resolve_id};
use crate::output::Output;

/// Fields accepted by `exercise edit`
#[derive(Debug, Default)]
pub struct EditArgs {
    pub name: Option<String>,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub weight: Option<String>,
    pub duration: Option<String>,
    pub notes: Option<String>,
    pub date: Option<String>,
}

/// Record an exercise for today
pub async fn add(data: &WorkoutData, exercise: NewExercise, output: &Output) -> Result<()> {
    if exercise.name.trim().is_empty() {
        bail!("Exercise name cannot be empty");
    }
    let exercise = data
        .add_exercise(exercise)
        .await
        .context("Failed to add exercise")?;

    output.success(&format!("Added exercise: {}", exercise.id));
    output.print_exercise(&exercise);
    Ok(())
}

/// List today's exercises, or every exercise with `all`
pub fn list(data: &WorkoutData, all: bool, output: &Output) -> Result<()> {
    let exercises = if all {
        data.exercises()
    } else {
        data.today_exercises()
    };
    output.print_exercises(&exercises);
    Ok(())
}

/// Edit fields of an exercise
pub async fn edit(data: &WorkoutData, id: String, args: EditArgs, output: &Output) -> Result<()> {
    let id = resolve_id(&data.exercises(), &id, "exercise")?;
    let updates = build_update(args)?;

    let exercise = data
        .edit_exercise(&id, updates)
        .await?
        .ok_or_else(|| anyhow!("Exercise not found: {}", id))?;

    output.success("Exercise updated");
    output.print_exercise(&exercise);
    Ok(())
}

/// Turn edit arguments into an update; "none" or "" clears optional fields
fn build_update(args: EditArgs) -> Result<ExerciseUpdate> {
    let updates = ExerciseUpdate {
        name: args.name,
        sets: args.sets,
        reps: args.reps,
        weight: args
            .weight
            .map(|w| parse_clearable::<f64>(&w, "weight"))
            .transpose()?,
        duration: args
            .duration
            .map(|d| parse_clearable::<u32>(&d, "duration"))
            .transpose()?,
        notes: args.notes.map(|n| clearable(&n)),
        date: args.date.as_deref().map(parse_date).transpose()?,
        ..ExerciseUpdate::default()
    };

    if updates == ExerciseUpdate::default() {
        bail!("Nothing to change. Pass at least one field to edit.");
    }
    Ok(updates)
}

fn parse_clearable<T: FromStr>(value: &str, field: &str) -> Result<Option<T>> {
    clearable(value)
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| anyhow!("Invalid {} '{}'", field, v))
        })
        .transpose()
}

/// Toggle an exercise of today's workout by its 1-based position
pub async fn toggle(data: &WorkoutData, position: usize, output: &Output) -> Result<()> {
    if position == 0 {
        bail!("Positions start at 1");
    }
    match data.toggle_exercise_completed(position - 1).await? {
        Some(exercise) => {
            let state = if exercise.completed {
                "completed"
            } else {
                "not completed"
            };
            output.success(&format!("{} marked {}", exercise.name, state));
        }
        None => output.message("No workout planned for today."),
    }
    Ok(())
}

pub async fn delete(data: &WorkoutData, id: String, output: &Output) -> Result<()> {
    let exercises = data.exercises();
    let id = resolve_id(&exercises, &id, "exercise")?;

    if output.should_prompt() {
        if let Some(exercise) = exercises.iter().find(|e| e.id == id) {
            println!("Delete exercise: {} - {}", exercise.id, exercise.name);
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    data.delete_exercise(&id).await?;
    output.success(&format!("Deleted exercise: {}", id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_update_clears_optional_fields() {
        let updates = build_update(EditArgs {
            weight: Some("none".to_string()),
            duration: Some("none".to_string()),
            notes: Some(String::new()),
            ..EditArgs::default()
        })
        .unwrap();

        assert_eq!(updates.weight, Some(None));
        assert_eq!(updates.duration, Some(None));
        assert_eq!(updates.notes, Some(None));
        assert!(updates.sets.is_none());
    }

    #[test]
    fn test_build_update_parses_values() {
        let updates = build_update(EditArgs {
            weight: Some("62.5".to_string()),
            duration: Some("90".to_string()),
            ..EditArgs::default()
        })
        .unwrap();
        assert_eq!(updates.weight, Some(Some(62.5)));
        assert_eq!(updates.duration, Some(Some(90)));

        assert!(build_update(EditArgs {
            duration: Some("long".to_string()),
            ..EditArgs::default()
        })
        .is_err());
        assert!(build_update(EditArgs::default()).is_err());
    }
}
