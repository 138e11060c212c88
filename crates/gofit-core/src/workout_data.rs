//! Workout data controller
//!
//! `WorkoutData` owns the in-memory state bundle (all collections plus the
//! derived "today" views) and funnels every mutation through
//! [`WorkoutStorage`]. A mutation re-reads its collection under the key
//! lock, writes the whole collection back, and only then replaces the
//! in-memory copy, so memory never runs ahead of storage.
//!
//! ## Usage
//!
//! ```text
//! let data = WorkoutData::open_with_config(&config).await?;
//!
//! let exercise = data.add_exercise(NewExercise::new("Push-ups", 3, 15)).await?;
//! let today = data.today_exercises();
//! ```

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{
    Activity, ActivityStatus, ActivitySummary, ActivityUpdate, Exercise, ExerciseUpdate,
    NewActivity, NewExercise, NewScheduledWorkout, ProfileUpdate, Progress, Record,
    ScheduleStatus, ScheduleSummary, ScheduledWorkout, ScheduledWorkoutUpdate, StatsUpdate,
    UserProfile, Workout, WorkoutStats, WorkoutUpdate,
};
use crate::storage::collections::{remove_by_id, update_by_id};
use crate::storage::{KvStore, WorkoutStorage};

/// Source of the current time, replaceable in tests
pub type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// Snapshot of everything the controller holds in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutState {
    pub workouts: Vec<Workout>,
    pub exercises: Vec<Exercise>,
    pub scheduled_workouts: Vec<ScheduledWorkout>,
    pub activities: Vec<Activity>,
    pub user_profile: Option<UserProfile>,
    pub workout_stats: Option<WorkoutStats>,
    /// Today's workout
    pub today_workout: Option<Workout>,
    /// Exercises dated today
    pub today_exercises: Vec<Exercise>,
    pub loading: bool,
}

impl WorkoutState {
    fn refresh_today_exercises(&mut self, today: NaiveDate) {
        self.today_exercises = self
            .exercises
            .iter()
            .filter(|e| e.date == today)
            .cloned()
            .collect();
    }

    /// Point `today_workout` at the current stored copy of itself
    fn refresh_today_workout(&mut self) {
        if let Some(current) = &self.today_workout {
            self.today_workout = self.workouts.iter().find(|w| w.id == current.id).cloned();
        }
    }

    fn derive_today(&mut self, today: NaiveDate) {
        self.today_workout = self
            .workouts
            .iter()
            .find(|w| w.date == today && !w.completed)
            .cloned();
        self.refresh_today_exercises(today);
    }
}

/// In-memory workout state kept in step with local storage
pub struct WorkoutData {
    storage: WorkoutStorage,
    state: RwLock<WorkoutState>,
    clock: Clock,
}

impl WorkoutData {
    /// Create a controller with empty, still-loading state
    ///
    /// Call [`load_all`](Self::load_all) before reading state, or use
    /// [`load`](Self::load) which does both.
    pub fn new(storage: WorkoutStorage) -> Self {
        Self::with_clock(storage, Arc::new(Local::now))
    }

    /// Create a controller that reads the time from `clock`
    pub fn with_clock(storage: WorkoutStorage, clock: Clock) -> Self {
        Self {
            storage,
            state: RwLock::new(WorkoutState {
                loading: true,
                ..WorkoutState::default()
            }),
            clock,
        }
    }

    /// Create a controller and load every collection
    pub async fn load(storage: WorkoutStorage) -> Self {
        let data = Self::new(storage);
        data.load_all().await;
        data
    }

    /// Open the SQLite store described by the configuration and load it
    pub async fn open_with_config(config: &Config) -> Result<Self> {
        let kv = KvStore::open_sqlite(&config.sqlite_path())
            .with_context(|| format!("Failed to open store at {:?}", config.sqlite_path()))?;
        Ok(Self::load(WorkoutStorage::new(kv)).await)
    }

    /// The storage this controller writes through
    pub fn storage(&self) -> &WorkoutStorage {
        &self.storage
    }

    /// Current local date
    pub fn today(&self) -> NaiveDate {
        (self.clock)().date_naive()
    }

    /// Current time from the controller's clock
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)().with_timezone(&Utc)
    }

    fn read(&self) -> RwLockReadGuard<'_, WorkoutState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, WorkoutState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== State access ====================

    /// Clone of the whole state bundle
    pub fn state(&self) -> WorkoutState {
        self.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn workouts(&self) -> Vec<Workout> {
        self.read().workouts.clone()
    }

    pub fn exercises(&self) -> Vec<Exercise> {
        self.read().exercises.clone()
    }

    pub fn scheduled_workouts(&self) -> Vec<ScheduledWorkout> {
        self.read().scheduled_workouts.clone()
    }

    pub fn activities(&self) -> Vec<Activity> {
        self.read().activities.clone()
    }

    pub fn user_profile(&self) -> Option<UserProfile> {
        self.read().user_profile.clone()
    }

    pub fn workout_stats(&self) -> Option<WorkoutStats> {
        self.read().workout_stats
    }

    pub fn today_workout(&self) -> Option<Workout> {
        self.read().today_workout.clone()
    }

    pub fn today_exercises(&self) -> Vec<Exercise> {
        self.read().today_exercises.clone()
    }

    // ==================== Loading ====================

    /// Reload every collection and recompute the "today" views
    ///
    /// Unreadable collections load as empty (see [`KvStore::get`]). State is
    /// replaced while the storage key locks are held, so a write committing
    /// during the reload is never overwritten by older data.
    pub async fn load_all(&self) {
        self.write().loading = true;
        let today = self.today();

        self.storage
            .load_snapshot(|snapshot| {
                info!(
                    "Loaded {} workouts, {} exercises, {} scheduled workouts, {} activities",
                    snapshot.workouts.len(),
                    snapshot.exercises.len(),
                    snapshot.scheduled_workouts.len(),
                    snapshot.activities.len()
                );

                let mut state = self.write();
                state.workouts = snapshot.workouts;
                state.exercises = snapshot.exercises;
                state.scheduled_workouts = snapshot.scheduled_workouts;
                state.activities = snapshot.activities;
                state.user_profile = snapshot.user_profile;
                state.workout_stats = snapshot.workout_stats;
                state.derive_today(today);
                state.loading = false;
            })
            .await;
    }

    // ==================== Workouts ====================

    /// An empty workout stamped with this controller's clock
    pub fn new_workout(&self, name: impl Into<String>, date: NaiveDate) -> Workout {
        Workout::new_at(name, date, self.now())
    }

    /// Append a workout; a workout dated today becomes today's workout
    pub async fn add_workout(&self, workout: Workout) -> Result<Workout> {
        let today = self.today();
        let inserted = self
            .storage
            .modify_workouts(
                |workouts| {
                    if workouts.iter().any(|w| w.id == workout.id) {
                        return false;
                    }
                    workouts.push(workout.clone());
                    true
                },
                |saved, inserted| {
                    if !*inserted {
                        return;
                    }
                    let mut state = self.write();
                    state.workouts = saved.to_vec();
                    if workout.date == today {
                        state.today_workout = Some(workout.clone());
                    }
                },
            )
            .await
            .context("Failed to add workout")?;

        if !inserted {
            bail!("Workout {} already exists", workout.id);
        }
        debug!("Added workout {}", workout.id);
        Ok(workout)
    }

    /// Merge `updates` into the workout with `id`
    ///
    /// Returns the merged workout, or `None` if no workout has that id.
    pub async fn update_workout(&self, id: &str, updates: WorkoutUpdate) -> Result<Option<Workout>> {
        self.storage
            .modify_workouts(
                |workouts| update_by_id(workouts, id, &updates),
                |saved, _| {
                    let mut state = self.write();
                    state.workouts = saved.to_vec();
                    state.refresh_today_workout();
                },
            )
            .await
            .context("Failed to update workout")
    }

    /// Remove the workout with `id`; missing ids are a no-op
    pub async fn delete_workout(&self, id: &str) -> Result<()> {
        self.storage
            .modify_workouts(
                |workouts| remove_by_id(workouts, id),
                |saved, _| {
                    let mut state = self.write();
                    state.workouts = saved.to_vec();
                    state.refresh_today_workout();
                },
            )
            .await
            .context("Failed to delete workout")?;
        Ok(())
    }

    /// Create a workout dated today together with its exercises
    ///
    /// All exercises are written in one save, then the workout referencing
    /// them is added.
    pub async fn create_workout(
        &self,
        name: impl Into<String>,
        exercises: Vec<NewExercise>,
    ) -> Result<Workout> {
        let today = self.today();
        let now = self.now();
        let mut workout = self.new_workout(name, today);

        let records: Vec<Exercise> = exercises
            .into_iter()
            .map(|new| {
                let mut exercise = Exercise::create(new, today, now);
                exercise.workout_id = Some(workout.id.clone());
                exercise
            })
            .collect();
        workout.exercise_ids = records.iter().map(|e| e.id.clone()).collect();

        self.storage
            .modify_exercises(
                |items| items.extend(records.iter().cloned()),
                |saved, _| self.replace_exercises(saved, today),
            )
            .await
            .context("Failed to save workout exercises")?;

        self.add_workout(workout).await
    }

    /// Mark a workout and all of its exercises completed
    pub async fn complete_workout(&self, id: &str) -> Result<Option<Workout>> {
        let now = self.now();
        let today = self.today();
        let updates = WorkoutUpdate {
            completed: Some(true),
            completed_at: Some(Some(now)),
            ..WorkoutUpdate::default()
        };

        let Some(workout) = self.update_workout(id, updates).await? else {
            return Ok(None);
        };

        let ids: HashSet<&str> = workout.exercise_ids.iter().map(String::as_str).collect();
        self.storage
            .modify_exercises(
                |items| {
                    for exercise in items.iter_mut().filter(|e| ids.contains(e.id.as_str())) {
                        if !exercise.completed {
                            exercise.set_completed(true, now);
                        }
                    }
                },
                |saved, _| self.replace_exercises(saved, today),
            )
            .await
            .context("Failed to complete workout exercises")?;

        Ok(Some(workout))
    }

    /// Delete a workout and every exercise it references
    pub async fn delete_workout_with_exercises(&self, id: &str) -> Result<()> {
        let today = self.today();
        let removed = self
            .storage
            .modify_workouts(
                |workouts| remove_by_id(workouts, id),
                |saved, _| {
                    let mut state = self.write();
                    state.workouts = saved.to_vec();
                    state.refresh_today_workout();
                },
            )
            .await
            .context("Failed to delete workout")?;

        let Some(workout) = removed else {
            return Ok(());
        };

        self.storage
            .modify_exercises(
                |items| items.retain(|e| !workout.exercise_ids.contains(&e.id)),
                |saved, _| self.replace_exercises(saved, today),
            )
            .await
            .context("Failed to delete workout exercises")?;
        Ok(())
    }

    /// Resolve a workout's exercise ids to records, in workout order
    pub fn workout_exercises(&self, workout: &Workout) -> Vec<Exercise> {
        let state = self.read();
        workout
            .exercise_ids
            .iter()
            .filter_map(|id| state.exercises.iter().find(|e| &e.id == id).cloned())
            .collect()
    }

    /// Exercises of today's workout, in order
    pub fn today_workout_exercises(&self) -> Vec<Exercise> {
        match self.today_workout() {
            Some(workout) => self.workout_exercises(&workout),
            None => Vec::new(),
        }
    }

    /// Completed/total exercises of today's workout
    pub fn today_progress(&self) -> Progress {
        let exercises = self.today_workout_exercises();
        Progress {
            completed: exercises.iter().filter(|e| e.completed).count(),
            total: exercises.len(),
        }
    }

    // ==================== Exercises ====================

    fn replace_exercises(&self, saved: &[Exercise], today: NaiveDate) {
        let mut state = self.write();
        state.exercises = saved.to_vec();
        state.refresh_today_exercises(today);
    }

    /// Record a new exercise dated today
    pub async fn add_exercise(&self, new: NewExercise) -> Result<Exercise> {
        let today = self.today();
        let exercise = Exercise::create(new, today, self.now());

        self.storage
            .modify_exercises(
                |items| items.push(exercise.clone()),
                |saved, _| self.replace_exercises(saved, today),
            )
            .await
            .context("Failed to add exercise")?;

        debug!("Added exercise {} ({})", exercise.id, exercise.name);
        Ok(exercise)
    }

    /// Merge `updates` into the exercise with `id`
    pub async fn update_exercise(
        &self,
        id: &str,
        updates: ExerciseUpdate,
    ) -> Result<Option<Exercise>> {
        let today = self.today();
        self.storage
            .modify_exercises(
                |items| update_by_id(items, id, &updates),
                |saved, _| self.replace_exercises(saved, today),
            )
            .await
            .context("Failed to update exercise")
    }

    /// Merge `updates` into the exercise with `id`, then reload everything
    pub async fn edit_exercise(&self, id: &str, updates: ExerciseUpdate) -> Result<Option<Exercise>> {
        let updated = self
            .update_exercise(id, updates)
            .await
            .context("Failed to edit exercise")?;
        self.load_all().await;
        Ok(updated)
    }

    /// Remove the exercise with `id` and drop it from every workout
    pub async fn delete_exercise(&self, id: &str) -> Result<()> {
        let today = self.today();
        self.storage
            .modify_exercises(
                |items| remove_by_id(items, id),
                |saved, _| self.replace_exercises(saved, today),
            )
            .await
            .context("Failed to delete exercise")?;

        self.storage
            .modify_workouts(
                |workouts| {
                    for workout in workouts.iter_mut() {
                        workout.exercise_ids.retain(|e| e != id);
                    }
                },
                |saved, _| {
                    let mut state = self.write();
                    state.workouts = saved.to_vec();
                    state.refresh_today_workout();
                },
            )
            .await
            .context("Failed to remove exercise from workouts")?;
        Ok(())
    }

    /// Flip completion of the exercise at `index` in today's workout
    ///
    /// Returns `None` when there is no workout today.
    pub async fn toggle_exercise_completed(&self, index: usize) -> Result<Option<Exercise>> {
        let Some(workout) = self.today_workout() else {
            return Ok(None);
        };
        let exercise_id = workout
            .exercise_ids
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("Today's workout has no exercise at position {}", index))?;

        let today = self.today();
        let now = self.now();
        let toggled = self
            .storage
            .modify_exercises(
                |items| {
                    let exercise = items.iter_mut().find(|e| e.id == exercise_id)?;
                    let completed = !exercise.completed;
                    exercise.set_completed(completed, now);
                    Some(exercise.clone())
                },
                |saved, _| self.replace_exercises(saved, today),
            )
            .await
            .context("Failed to toggle exercise")?;

        toggled
            .map(Some)
            .ok_or_else(|| anyhow!("Exercise {} of workout {} no longer exists", exercise_id, workout.id))
    }

    // ==================== Scheduled workouts ====================

    pub async fn add_scheduled_workout(&self, new: NewScheduledWorkout) -> Result<ScheduledWorkout> {
        let scheduled = ScheduledWorkout::create(new, self.now());
        self.storage
            .modify_scheduled_workouts(
                |items| items.push(scheduled.clone()),
                |saved, _| self.write().scheduled_workouts = saved.to_vec(),
            )
            .await
            .context("Failed to add scheduled workout")?;
        Ok(scheduled)
    }

    pub async fn update_scheduled_workout(
        &self,
        id: &str,
        updates: ScheduledWorkoutUpdate,
    ) -> Result<Option<ScheduledWorkout>> {
        self.storage
            .modify_scheduled_workouts(
                |items| update_by_id(items, id, &updates),
                |saved, _| self.write().scheduled_workouts = saved.to_vec(),
            )
            .await
            .context("Failed to update scheduled workout")
    }

    /// Remove the scheduled workout with `id`; missing ids are a no-op
    pub async fn delete_scheduled_workout(&self, id: &str) -> Result<()> {
        self.storage
            .modify_scheduled_workouts(
                |items| remove_by_id(items, id),
                |saved, _| self.write().scheduled_workouts = saved.to_vec(),
            )
            .await
            .context("Failed to delete scheduled workout")?;
        Ok(())
    }

    pub fn scheduled_for_date(&self, date: NaiveDate) -> Vec<ScheduledWorkout> {
        self.read()
            .scheduled_workouts
            .iter()
            .filter(|s| s.date == date)
            .cloned()
            .collect()
    }

    pub fn schedule_summary(&self) -> ScheduleSummary {
        let state = self.read();
        let count = |status: ScheduleStatus| {
            state
                .scheduled_workouts
                .iter()
                .filter(|s| s.status == status)
                .count()
        };
        ScheduleSummary {
            scheduled: count(ScheduleStatus::Scheduled),
            completed: count(ScheduleStatus::Completed),
            missed: count(ScheduleStatus::Missed),
        }
    }

    // ==================== Activities ====================

    /// Record an activity, dated today unless the input names a date
    pub async fn add_activity(&self, new: NewActivity) -> Result<Activity> {
        let activity = Activity::create(new, self.today(), self.now());
        self.storage
            .modify_activities(
                |items| items.push(activity.clone()),
                |saved, _| self.write().activities = saved.to_vec(),
            )
            .await
            .context("Failed to add activity")?;
        Ok(activity)
    }

    pub async fn update_activity(&self, id: &str, updates: ActivityUpdate) -> Result<Option<Activity>> {
        self.storage
            .modify_activities(
                |items| update_by_id(items, id, &updates),
                |saved, _| self.write().activities = saved.to_vec(),
            )
            .await
            .context("Failed to update activity")
    }

    /// Put an activity back in progress
    pub async fn resume_activity(&self, id: &str) -> Result<Option<Activity>> {
        self.update_activity(
            id,
            ActivityUpdate {
                status: Some(ActivityStatus::InProgress),
                resumed_at: Some(Some(self.now())),
                ..ActivityUpdate::default()
            },
        )
        .await
    }

    pub fn activities_for_date(&self, date: NaiveDate) -> Vec<Activity> {
        self.read()
            .activities
            .iter()
            .filter(|a| a.date == date)
            .cloned()
            .collect()
    }

    /// Count and total minutes of completed activities
    pub fn activity_summary(&self) -> ActivitySummary {
        self.read()
            .activities
            .iter()
            .filter(|a| a.status == ActivityStatus::Completed)
            .fold(ActivitySummary::default(), |mut acc, a| {
                acc.completed += 1;
                acc.total_duration += a.duration.unwrap_or(0);
                acc
            })
    }

    // ==================== Profile & stats ====================

    /// Merge `updates` into the stored profile, creating it if needed
    pub async fn update_user_profile(&self, updates: ProfileUpdate) -> Result<UserProfile> {
        let today = self.today();
        self.storage
            .modify_user_profile(
                |current| {
                    let mut profile = current.unwrap_or_else(|| UserProfile::new("", today));
                    profile.apply(&updates);
                    profile
                },
                |saved| self.write().user_profile = Some(saved.clone()),
            )
            .await
            .context("Failed to update user profile")
    }

    /// Merge `updates` into the stored stats, starting from zeros if needed
    pub async fn update_workout_stats(&self, updates: StatsUpdate) -> Result<WorkoutStats> {
        self.storage
            .modify_workout_stats(
                |current| {
                    let mut stats = current.unwrap_or_default();
                    stats.apply(&updates);
                    stats
                },
                |saved| self.write().workout_stats = Some(*saved),
            )
            .await
            .context("Failed to update workout stats")
    }

    // ==================== Maintenance ====================

    /// Delete all stored data and empty the in-memory state
    pub async fn reset(&self) -> Result<()> {
        self.storage
            .clear_all()
            .await
            .context("Failed to clear storage")?;
        *self.write() = WorkoutState::default();
        info!("Cleared all workout data");
        Ok(())
    }

    /// Find a record of any list collection by id prefix
    pub fn find_by_prefix<'a, T: Record>(items: &'a [T], prefix: &str) -> Vec<&'a T> {
        items.iter().filter(|item| item.id().starts_with(prefix)).collect()
    }
}
