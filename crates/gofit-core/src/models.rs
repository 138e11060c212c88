//! Data models for GoFit
//!
//! Defines the persisted records (exercises, workouts, scheduled workouts,
//! activities, the user profile and workout stats), the inputs used to
//! create them and the partial "updates" merged into them.
//!
//! Records serialize with camelCase field names and dates as `YYYY-MM-DD`.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a record id from the current timestamp in milliseconds
///
/// Ids are strictly increasing within a process, so records created in the
/// same millisecond still get distinct ids.
pub fn new_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::SeqCst);
    loop {
        let next = now.max(last + 1);
        match LAST_ID.compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return next.to_string(),
            Err(actual) => last = actual,
        }
    }
}

/// The current local calendar date
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// A record stored in one of the list collections
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Partial update merged by [`Record::apply`]
    type Update;

    fn id(&self) -> &str;

    /// Overwrite exactly the fields present in `updates`
    fn apply(&mut self, updates: &Self::Update);
}

/// Error for parsing the string form of an enum value
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseValueError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

// ==================== Exercise ====================

/// A single exercise entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    /// Weight in kg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_completed: Option<DateTime<Utc>>,
    /// Workout this exercise was created for (not enforced)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_id: Option<String>,
}

impl Exercise {
    /// Build a stored exercise from user input
    ///
    /// The record always starts uncompleted and dated `date`.
    pub fn create(new: NewExercise, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: new.name,
            sets: new.sets,
            reps: new.reps,
            weight: new.weight,
            duration: new.duration,
            notes: new.notes,
            date,
            created_at: now,
            completed: false,
            time_completed: None,
            workout_id: new.workout_id,
        }
    }

    /// Set the completion flag, stamping or clearing the completion time
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;
        self.time_completed = if completed { Some(now) } else { None };
    }
}

impl Record for Exercise {
    type Update = ExerciseUpdate;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, updates: &ExerciseUpdate) {
        if let Some(name) = &updates.name {
            self.name = name.clone();
        }
        if let Some(sets) = updates.sets {
            self.sets = sets;
        }
        if let Some(reps) = updates.reps {
            self.reps = reps;
        }
        if let Some(weight) = updates.weight {
            self.weight = weight;
        }
        if let Some(duration) = updates.duration {
            self.duration = duration;
        }
        if let Some(notes) = &updates.notes {
            self.notes = notes.clone();
        }
        if let Some(date) = updates.date {
            self.date = date;
        }
        if let Some(completed) = updates.completed {
            self.completed = completed;
        }
        if let Some(time_completed) = updates.time_completed {
            self.time_completed = time_completed;
        }
        if let Some(workout_id) = &updates.workout_id {
            self.workout_id = workout_id.clone();
        }
    }
}

/// Input for creating an exercise
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewExercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: Option<f64>,
    pub duration: Option<u32>,
    pub notes: Option<String>,
    pub workout_id: Option<String>,
}

impl NewExercise {
    pub fn new(name: impl Into<String>, sets: u32, reps: u32) -> Self {
        Self {
            name: name.into(),
            sets,
            reps,
            ..Self::default()
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Fields to overwrite on an exercise
///
/// For optional fields, `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseUpdate {
    pub name: Option<String>,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub weight: Option<Option<f64>>,
    pub duration: Option<Option<u32>>,
    pub notes: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub completed: Option<bool>,
    pub time_completed: Option<Option<DateTime<Utc>>>,
    pub workout_id: Option<Option<String>>,
}

// ==================== Workout ====================

/// A named workout made of exercises
///
/// Exercises are referenced by id; the exercise collection holds the
/// only copy of each exercise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub exercise_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub date: NaiveDate,
}

impl Workout {
    /// Create an empty, uncompleted workout
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self::new_at(name, date, Utc::now())
    }

    /// Same as [`Workout::new`] with an explicit creation time
    pub fn new_at(name: impl Into<String>, date: NaiveDate, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            exercise_ids: Vec::new(),
            created_at,
            completed: false,
            completed_at: None,
            date,
        }
    }

    pub fn with_exercises(mut self, exercise_ids: Vec<String>) -> Self {
        self.exercise_ids = exercise_ids;
        self
    }
}

impl Record for Workout {
    type Update = WorkoutUpdate;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, updates: &WorkoutUpdate) {
        if let Some(name) = &updates.name {
            self.name = name.clone();
        }
        if let Some(exercise_ids) = &updates.exercise_ids {
            self.exercise_ids = exercise_ids.clone();
        }
        if let Some(completed) = updates.completed {
            self.completed = completed;
        }
        if let Some(completed_at) = updates.completed_at {
            self.completed_at = completed_at;
        }
        if let Some(date) = updates.date {
            self.date = date;
        }
    }
}

/// Fields to overwrite on a workout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutUpdate {
    pub name: Option<String>,
    pub exercise_ids: Option<Vec<String>>,
    pub completed: Option<bool>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub date: Option<NaiveDate>,
}

// ==================== Scheduled workout ====================

/// Kind of training planned for a scheduled workout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Strength,
    Cardio,
    Flexibility,
    Mixed,
}

impl WorkoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Strength => "strength",
            WorkoutType::Cardio => "cardio",
            WorkoutType::Flexibility => "flexibility",
            WorkoutType::Mixed => "mixed",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutType {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strength" => Ok(WorkoutType::Strength),
            "cardio" => Ok(WorkoutType::Cardio),
            "flexibility" => Ok(WorkoutType::Flexibility),
            "mixed" => Ok(WorkoutType::Mixed),
            _ => Err(ParseValueError {
                kind: "workout type",
                value: s.to_string(),
                expected: "strength, cardio, flexibility, mixed",
            }),
        }
    }
}

/// Lifecycle of a scheduled workout
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    #[default]
    Scheduled,
    Completed,
    Missed,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "scheduled",
            ScheduleStatus::Completed => "completed",
            ScheduleStatus::Missed => "missed",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(ScheduleStatus::Scheduled),
            "completed" => Ok(ScheduleStatus::Completed),
            "missed" => Ok(ScheduleStatus::Missed),
            _ => Err(ParseValueError {
                kind: "schedule status",
                value: s.to_string(),
                expected: "scheduled, completed, missed",
            }),
        }
    }
}

/// A workout planned for a date and time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledWorkout {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    /// Start time as `HH:MM`
    pub time: String,
    /// Planned length in minutes
    pub duration: u32,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    #[serde(default)]
    pub status: ScheduleStatus,
    pub created_at: DateTime<Utc>,
}

impl ScheduledWorkout {
    pub fn create(new: NewScheduledWorkout, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: new.name,
            date: new.date,
            time: new.time,
            duration: new.duration,
            workout_type: new.workout_type,
            status: new.status,
            created_at: now,
        }
    }
}

impl Record for ScheduledWorkout {
    type Update = ScheduledWorkoutUpdate;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, updates: &ScheduledWorkoutUpdate) {
        if let Some(name) = &updates.name {
            self.name = name.clone();
        }
        if let Some(date) = updates.date {
            self.date = date;
        }
        if let Some(time) = &updates.time {
            self.time = time.clone();
        }
        if let Some(duration) = updates.duration {
            self.duration = duration;
        }
        if let Some(workout_type) = updates.workout_type {
            self.workout_type = workout_type;
        }
        if let Some(status) = updates.status {
            self.status = status;
        }
    }
}

/// Input for scheduling a workout
#[derive(Debug, Clone, PartialEq)]
pub struct NewScheduledWorkout {
    pub name: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration: u32,
    pub workout_type: WorkoutType,
    pub status: ScheduleStatus,
}

/// Fields to overwrite on a scheduled workout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduledWorkoutUpdate {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub duration: Option<u32>,
    pub workout_type: Option<WorkoutType>,
    pub status: Option<ScheduleStatus>,
}

/// Count of scheduled workouts per status
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ScheduleSummary {
    pub scheduled: usize,
    pub completed: usize,
    pub missed: usize,
}

// ==================== Activity ====================

/// Progress state of a tracked activity
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityStatus {
    Completed,
    InProgress,
    #[default]
    Scheduled,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Completed => "completed",
            ActivityStatus::InProgress => "in-progress",
            ActivityStatus::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityStatus {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(ActivityStatus::Completed),
            "in-progress" | "in_progress" => Ok(ActivityStatus::InProgress),
            "scheduled" => Ok(ActivityStatus::Scheduled),
            _ => Err(ParseValueError {
                kind: "activity status",
                value: s.to_string(),
                expected: "completed, in-progress, scheduled",
            }),
        }
    }
}

/// Completed/total exercise counts of an activity
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseCounts {
    pub completed: u32,
    pub total: u32,
}

/// A tracked training session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default)]
    pub exercises: ExerciseCounts,
    /// Length in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    /// Build a stored activity, dating it `today` when no date was given
    pub fn create(new: NewActivity, today: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: new.name,
            date: new.date.unwrap_or(today),
            status: new.status,
            exercises: new.exercises,
            duration: new.duration,
            resumed_at: None,
            created_at: now,
        }
    }
}

impl Record for Activity {
    type Update = ActivityUpdate;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, updates: &ActivityUpdate) {
        if let Some(name) = &updates.name {
            self.name = name.clone();
        }
        if let Some(date) = updates.date {
            self.date = date;
        }
        if let Some(status) = updates.status {
            self.status = status;
        }
        if let Some(exercises) = updates.exercises {
            self.exercises = exercises;
        }
        if let Some(duration) = updates.duration {
            self.duration = duration;
        }
        if let Some(resumed_at) = updates.resumed_at {
            self.resumed_at = resumed_at;
        }
    }
}

/// Input for recording an activity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewActivity {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub status: ActivityStatus,
    pub exercises: ExerciseCounts,
    pub duration: Option<u32>,
}

/// Fields to overwrite on an activity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityUpdate {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<ActivityStatus>,
    pub exercises: Option<ExerciseCounts>,
    pub duration: Option<Option<u32>>,
    pub resumed_at: Option<Option<DateTime<Utc>>>,
}

/// Totals over completed activities
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub completed: usize,
    /// Minutes
    pub total_duration: u32,
}

// ==================== Profile & stats ====================

/// The user's profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub fitness_goals: Vec<String>,
    pub member_since: NaiveDate,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, member_since: NaiveDate) -> Self {
        Self {
            name: name.into(),
            avatar: String::new(),
            fitness_goals: Vec::new(),
            member_since,
        }
    }

    pub fn apply(&mut self, updates: &ProfileUpdate) {
        if let Some(name) = &updates.name {
            self.name = name.clone();
        }
        if let Some(avatar) = &updates.avatar {
            self.avatar = avatar.clone();
        }
        if let Some(goals) = &updates.fitness_goals {
            self.fitness_goals = goals.clone();
        }
        if let Some(member_since) = updates.member_since {
            self.member_since = member_since;
        }
    }
}

/// Fields to overwrite on the profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub fitness_goals: Option<Vec<String>>,
    pub member_since: Option<NaiveDate>,
}

/// Aggregate training counters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkoutStats {
    pub total_workouts: u32,
    /// Minutes
    pub total_duration: u32,
    /// Days
    pub longest_streak: u32,
    /// Days
    pub current_streak: u32,
    /// Minutes
    pub average_workout_duration: u32,
    /// Workouts per week
    pub weekly_goal: u32,
    pub completed_this_week: u32,
}

impl WorkoutStats {
    /// Percentage of the weekly goal reached, capped at 100
    pub fn weekly_progress(&self) -> f64 {
        if self.weekly_goal == 0 {
            return 0.0;
        }
        let percent = f64::from(self.completed_this_week) / f64::from(self.weekly_goal) * 100.0;
        percent.min(100.0)
    }

    pub fn apply(&mut self, updates: &StatsUpdate) {
        if let Some(v) = updates.total_workouts {
            self.total_workouts = v;
        }
        if let Some(v) = updates.total_duration {
            self.total_duration = v;
        }
        if let Some(v) = updates.longest_streak {
            self.longest_streak = v;
        }
        if let Some(v) = updates.current_streak {
            self.current_streak = v;
        }
        if let Some(v) = updates.average_workout_duration {
            self.average_workout_duration = v;
        }
        if let Some(v) = updates.weekly_goal {
            self.weekly_goal = v;
        }
        if let Some(v) = updates.completed_this_week {
            self.completed_this_week = v;
        }
    }
}

/// Fields to overwrite on the stats record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsUpdate {
    pub total_workouts: Option<u32>,
    pub total_duration: Option<u32>,
    pub longest_streak: Option<u32>,
    pub current_streak: Option<u32>,
    pub average_workout_duration: Option<u32>,
    pub weekly_goal: Option<u32>,
    pub completed_this_week: Option<u32>,
}

/// Completed/total exercises of a workout
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completion percentage; 0 for an empty workout
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_new_ids_are_unique_and_increasing() {
        let ids: Vec<i64> = (0..100).map(|_| new_id().parse().unwrap()).collect();
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_exercise_create_defaults() {
        let new = NewExercise::new("Push-ups", 3, 15).with_notes("slow negatives");
        let exercise = Exercise::create(new, date("2024-03-01"), Utc::now());

        assert_eq!(exercise.name, "Push-ups");
        assert_eq!(exercise.date, date("2024-03-01"));
        assert!(!exercise.completed);
        assert!(exercise.time_completed.is_none());
        assert_eq!(exercise.notes.as_deref(), Some("slow negatives"));
    }

    #[test]
    fn test_exercise_apply_overwrites_only_given_fields() {
        let mut exercise = Exercise::create(
            NewExercise::new("Squat", 5, 5).with_weight(100.0),
            date("2024-03-01"),
            Utc::now(),
        );
        let before = exercise.clone();

        exercise.apply(&ExerciseUpdate {
            reps: Some(3),
            weight: Some(None),
            ..ExerciseUpdate::default()
        });

        assert_eq!(exercise.reps, 3);
        assert!(exercise.weight.is_none());
        assert_eq!(exercise.name, before.name);
        assert_eq!(exercise.sets, before.sets);
        assert_eq!(exercise.date, before.date);
        assert_eq!(exercise.id, before.id);
    }

    #[test]
    fn test_exercise_json_layout() {
        let mut exercise = Exercise::create(
            NewExercise::new("Plank", 3, 1).with_duration(60),
            date("2024-03-01"),
            Utc::now(),
        );
        exercise.workout_id = Some("42".to_string());

        let json = serde_json::to_value(&exercise).unwrap();
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["workoutId"], "42");
        assert_eq!(json["duration"], 60);
        assert!(json.get("timeCompleted").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_set_completed_stamps_time() {
        let now = Utc::now();
        let mut exercise = Exercise::create(NewExercise::new("Row", 3, 10), date("2024-03-01"), now);

        exercise.set_completed(true, now);
        assert_eq!(exercise.time_completed, Some(now));

        exercise.set_completed(false, now);
        assert!(exercise.time_completed.is_none());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&ActivityStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(serde_json::to_string(&WorkoutType::Cardio).unwrap(), "\"cardio\"");
        assert_eq!(
            serde_json::to_string(&ScheduleStatus::Missed).unwrap(),
            "\"missed\""
        );
        assert_eq!("Strength".parse::<WorkoutType>(), Ok(WorkoutType::Strength));
        assert_eq!(
            "in-progress".parse::<ActivityStatus>(),
            Ok(ActivityStatus::InProgress)
        );
        assert!("sometimes".parse::<ScheduleStatus>().is_err());
    }

    #[test]
    fn test_scheduled_workout_type_field() {
        let scheduled = ScheduledWorkout::create(
            NewScheduledWorkout {
                name: "Morning run".to_string(),
                date: date("2024-03-02"),
                time: "07:00".to_string(),
                duration: 45,
                workout_type: WorkoutType::Cardio,
                status: ScheduleStatus::default(),
            },
            Utc::now(),
        );

        let json = serde_json::to_value(&scheduled).unwrap();
        assert_eq!(json["type"], "cardio");
        assert_eq!(json["status"], "scheduled");
    }

    #[test]
    fn test_activity_defaults_date_to_today() {
        let today = date("2024-03-03");
        let activity = Activity::create(
            NewActivity {
                name: "Leg day".to_string(),
                ..NewActivity::default()
            },
            today,
            Utc::now(),
        );
        assert_eq!(activity.date, today);

        let dated = Activity::create(
            NewActivity {
                name: "Leg day".to_string(),
                date: Some(date("2024-02-01")),
                ..NewActivity::default()
            },
            today,
            Utc::now(),
        );
        assert_eq!(dated.date, date("2024-02-01"));
    }

    #[test]
    fn test_weekly_progress_is_capped() {
        let mut stats = WorkoutStats {
            weekly_goal: 5,
            completed_this_week: 3,
            ..WorkoutStats::default()
        };
        assert!((stats.weekly_progress() - 60.0).abs() < f64::EPSILON);

        stats.apply(&StatsUpdate {
            completed_this_week: Some(8),
            ..StatsUpdate::default()
        });
        assert_eq!(stats.weekly_progress(), 100.0);
        assert_eq!(stats.weekly_goal, 5);

        assert_eq!(WorkoutStats::default().weekly_progress(), 0.0);
    }

    #[test]
    fn test_profile_apply() {
        let mut profile = UserProfile::new("Alex", date("2024-01-15"));
        profile.apply(&ProfileUpdate {
            fitness_goals: Some(vec!["Build Muscle".to_string()]),
            ..ProfileUpdate::default()
        });

        assert_eq!(profile.name, "Alex");
        assert_eq!(profile.fitness_goals, vec!["Build Muscle"]);
        assert_eq!(profile.member_since, date("2024-01-15"));
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(Progress::default().percent(), 0.0);
        let progress = Progress {
            completed: 1,
            total: 4,
        };
        assert_eq!(progress.percent(), 25.0);
    }
}
