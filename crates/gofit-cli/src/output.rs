//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag, prints ids only)

use serde::Serialize;

use gofit_core::models::{ActivitySummary, Progress, ScheduleSummary};
use gofit_core::{Activity, Exercise, ScheduledWorkout, UserProfile, Workout, WorkoutStats};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print any serializable value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to format output: {}", e),
        }
    }

    // ==================== Exercises ====================

    pub fn print_exercise(&self, exercise: &Exercise) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", exercise.id);
                println!("Name:      {}", exercise.name);
                println!("Sets/reps: {} x {}", exercise.sets, exercise.reps);
                if let Some(weight) = exercise.weight {
                    println!("Weight:    {} kg", weight);
                }
                if let Some(duration) = exercise.duration {
                    println!("Duration:  {}", format_seconds(duration));
                }
                if let Some(ref notes) = exercise.notes {
                    println!("Notes:     {}", notes);
                }
                println!("Date:      {}", exercise.date);
                match exercise.time_completed {
                    Some(at) if exercise.completed => {
                        println!("Completed: yes ({})", at.format("%Y-%m-%d %H:%M"))
                    }
                    _ => println!("Completed: {}", yes_no(exercise.completed)),
                }
            }
            OutputFormat::Json => self.print_json(exercise),
            OutputFormat::Quiet => println!("{}", exercise.id),
        }
    }

    /// Print a numbered exercise list
    pub fn print_exercises(&self, exercises: &[Exercise]) {
        match self.format {
            OutputFormat::Human => {
                if exercises.is_empty() {
                    println!("No exercises found.");
                    return;
                }
                for (i, exercise) in exercises.iter().enumerate() {
                    println!("{:>2}. {}", i + 1, exercise_line(exercise));
                }
                println!("\n{} exercise(s)", exercises.len());
            }
            OutputFormat::Json => self.print_json(exercises),
            OutputFormat::Quiet => {
                for exercise in exercises {
                    println!("{}", exercise.id);
                }
            }
        }
    }

    // ==================== Workouts ====================

    /// Print a workout with its resolved exercises
    pub fn print_workout(&self, workout: &Workout, exercises: &[Exercise]) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", workout.id);
                println!("Name:      {}", workout.name);
                println!("Date:      {}", workout.date);
                println!("Created:   {}", workout.created_at.format("%Y-%m-%d %H:%M"));
                match workout.completed_at {
                    Some(at) if workout.completed => {
                        println!("Completed: yes ({})", at.format("%Y-%m-%d %H:%M"))
                    }
                    _ => println!("Completed: {}", yes_no(workout.completed)),
                }
                println!();
                println!("── Exercises ({}) ──", exercises.len());
                for (i, exercise) in exercises.iter().enumerate() {
                    println!("{:>2}. {}", i + 1, exercise_line(exercise));
                }
            }
            OutputFormat::Json => self.print_json(&serde_json::json!({
                "workout": workout,
                "exercises": exercises,
            })),
            OutputFormat::Quiet => println!("{}", workout.id),
        }
    }

    pub fn print_workouts(&self, workouts: &[Workout]) {
        match self.format {
            OutputFormat::Human => {
                if workouts.is_empty() {
                    println!("No workouts found.");
                    return;
                }
                for workout in workouts {
                    println!(
                        "{} | {} | {} | {} exercise(s){}",
                        workout.id,
                        workout.date,
                        truncate(&workout.name, 30),
                        workout.exercise_ids.len(),
                        if workout.completed { " | done" } else { "" }
                    );
                }
                println!("\n{} workout(s)", workouts.len());
            }
            OutputFormat::Json => self.print_json(workouts),
            OutputFormat::Quiet => {
                for workout in workouts {
                    println!("{}", workout.id);
                }
            }
        }
    }

    /// Print the dashboard: today's workout, progress and today's exercises
    pub fn print_today(
        &self,
        workout: Option<&Workout>,
        workout_exercises: &[Exercise],
        progress: Progress,
        today_exercises: &[Exercise],
    ) {
        match self.format {
            OutputFormat::Human => {
                match workout {
                    Some(workout) => {
                        println!("Today's workout: {} ({})", workout.name, workout.id);
                        println!(
                            "Progress: {}/{} ({:.0}%)",
                            progress.completed,
                            progress.total,
                            progress.percent()
                        );
                        println!();
                        for (i, exercise) in workout_exercises.iter().enumerate() {
                            let mark = if exercise.completed { "x" } else { " " };
                            println!("[{}] {}. {}", mark, i + 1, exercise_line(exercise));
                        }
                    }
                    None => println!("No workout planned for today."),
                }
                let standalone: Vec<&Exercise> = today_exercises
                    .iter()
                    .filter(|e| !workout_exercises.iter().any(|w| w.id == e.id))
                    .collect();
                if !standalone.is_empty() {
                    println!();
                    println!("── Other exercises today ({}) ──", standalone.len());
                    for exercise in standalone {
                        println!("    {}", exercise_line(exercise));
                    }
                }
            }
            OutputFormat::Json => self.print_json(&serde_json::json!({
                "todayWorkout": workout,
                "workoutExercises": workout_exercises,
                "progress": progress,
                "todayExercises": today_exercises,
            })),
            OutputFormat::Quiet => {
                if let Some(workout) = workout {
                    println!("{}", workout.id);
                }
            }
        }
    }

    // ==================== Schedule ====================

    pub fn print_scheduled(&self, scheduled: &[ScheduledWorkout]) {
        match self.format {
            OutputFormat::Human => {
                if scheduled.is_empty() {
                    println!("No scheduled workouts found.");
                    return;
                }
                for s in scheduled {
                    println!(
                        "{} | {} {} | {} | {} | {} min | {}",
                        s.id,
                        s.date,
                        s.time,
                        truncate(&s.name, 25),
                        s.workout_type,
                        s.duration,
                        s.status
                    );
                }
                println!("\n{} scheduled workout(s)", scheduled.len());
            }
            OutputFormat::Json => self.print_json(scheduled),
            OutputFormat::Quiet => {
                for s in scheduled {
                    println!("{}", s.id);
                }
            }
        }
    }

    pub fn print_schedule_summary(&self, summary: &ScheduleSummary) {
        match self.format {
            OutputFormat::Human => {
                println!("Scheduled: {}", summary.scheduled);
                println!("Completed: {}", summary.completed);
                println!("Missed:    {}", summary.missed);
            }
            OutputFormat::Json => self.print_json(summary),
            OutputFormat::Quiet => println!("{}", summary.scheduled),
        }
    }

    // ==================== Activities ====================

    pub fn print_activities(&self, activities: &[Activity]) {
        match self.format {
            OutputFormat::Human => {
                if activities.is_empty() {
                    println!("No activities found.");
                    return;
                }
                for a in activities {
                    let duration = a
                        .duration
                        .map(|d| format!("{} min", d))
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{} | {} | {} | {} | {}/{} exercises | {}",
                        a.id,
                        a.date,
                        truncate(&a.name, 25),
                        a.status,
                        a.exercises.completed,
                        a.exercises.total,
                        duration
                    );
                }
                println!("\n{} activit(ies)", activities.len());
            }
            OutputFormat::Json => self.print_json(activities),
            OutputFormat::Quiet => {
                for a in activities {
                    println!("{}", a.id);
                }
            }
        }
    }

    pub fn print_activity_summary(&self, summary: &ActivitySummary) {
        match self.format {
            OutputFormat::Human => {
                println!("Completed activities: {}", summary.completed);
                println!("Total duration:       {} min", summary.total_duration);
            }
            OutputFormat::Json => self.print_json(summary),
            OutputFormat::Quiet => println!("{}", summary.completed),
        }
    }

    // ==================== Profile & stats ====================

    pub fn print_profile(&self, profile: Option<&UserProfile>) {
        match (self.format, profile) {
            (OutputFormat::Human, None) => println!("No profile set."),
            (OutputFormat::Human, Some(p)) => {
                println!("Name:         {}", p.name);
                if !p.avatar.is_empty() {
                    println!("Avatar:       {}", p.avatar);
                }
                println!("Member since: {}", p.member_since);
                if !p.fitness_goals.is_empty() {
                    println!("Goals:        {}", p.fitness_goals.join(", "));
                }
            }
            (OutputFormat::Json, _) => self.print_json(&profile),
            (OutputFormat::Quiet, Some(p)) => println!("{}", p.name),
            (OutputFormat::Quiet, None) => {}
        }
    }

    pub fn print_stats(&self, stats: &WorkoutStats) {
        match self.format {
            OutputFormat::Human => {
                println!("Total workouts:   {}", stats.total_workouts);
                println!("Total duration:   {} min", stats.total_duration);
                println!("Average workout:  {} min", stats.average_workout_duration);
                println!("Current streak:   {} day(s)", stats.current_streak);
                println!("Longest streak:   {} day(s)", stats.longest_streak);
                println!(
                    "This week:        {}/{} ({:.0}%)",
                    stats.completed_this_week,
                    stats.weekly_goal,
                    stats.weekly_progress()
                );
            }
            OutputFormat::Json => self.print_json(&serde_json::json!({
                "stats": stats,
                "weeklyProgress": stats.weekly_progress(),
            })),
            OutputFormat::Quiet => println!("{}", stats.total_workouts),
        }
    }

    // ==================== Messages ====================

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// One-line summary of an exercise
fn exercise_line(exercise: &Exercise) -> String {
    let mut line = format!(
        "{} - {} x {}",
        truncate(&exercise.name, 30),
        exercise.sets,
        exercise.reps
    );
    if let Some(weight) = exercise.weight {
        line.push_str(&format!(" @ {} kg", weight));
    }
    if let Some(duration) = exercise.duration {
        line.push_str(&format!(" ({})", format_seconds(duration)));
    }
    if exercise.completed {
        line.push_str(" ✓");
    }
    line
}

/// Format seconds as `M:SS`
fn format_seconds(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
